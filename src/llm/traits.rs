//! 推理后端抽象
//!
//! 所有后端（OpenAI 兼容 / DeepSeek / Mock）实现 ReasoningClient：一次请求 / 一次响应，不持有可变共享缓冲，
//! 可在多个 Agent 间并发共享。任何失败都以 ClientFailure 返回，绝不 panic 越过边界。

use async_trait::async_trait;
use thiserror::Error;

/// 推理后端调用失败（网络、后端错误、超时、输出无法解析均归一到这里）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientFailure {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Malformed output: {0}")]
    Malformed(String),
}

impl ClientFailure {
    /// 失败原因（用于活动日志）
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// 推理客户端 trait：generate 返回原始文本（可能包在 ```json 代码块里）
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// 单次生成；schema_hint 为期望的 JSON 结构说明，可选
    async fn generate(&self, prompt: &str, schema_hint: Option<&str>) -> Result<String, ClientFailure>;
}

/// 将 schema 提示拼到 prompt 末尾，要求后端只输出合法 JSON
pub fn compose_prompt(prompt: &str, schema_hint: Option<&str>) -> String {
    match schema_hint {
        Some(schema) => format!(
            "{}\n\nReturn the response in strictly valid JSON format matching this schema: {}. \
             Do not include any markdown formatting or extra text.",
            prompt.trim_end(),
            schema
        ),
        None => prompt.to_string(),
    }
}
