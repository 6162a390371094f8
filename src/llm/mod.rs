//! 推理后端层：客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）

pub mod deepseek;
pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

pub use deepseek::{create_deepseek_client, DEEPSEEK_CHAT};
pub use mock::MockReasoningClient;
pub use openai::OpenAiClient;
pub use traits::{compose_prompt, ClientFailure, ReasoningClient};

use crate::config::AppConfig;

/// 根据配置与环境变量选择推理后端（DeepSeek / OpenAI 兼容 / Mock）
///
/// 没有任何 API Key 或 provider 为 mock 时返回永远失败的 Mock，所有 Agent 走兜底结果。
pub fn create_reasoning_client(cfg: &AppConfig) -> Arc<dyn ReasoningClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let timeout = cfg.llm.timeouts.request;
    if provider == "mock" {
        tracing::info!("Using Mock reasoning backend (configured)");
        return Arc::new(MockReasoningClient::failing());
    }

    // 有 DeepSeek Key 或（配置为 deepseek 且仅有 OpenAI Key 时也走 DeepSeek 兼容端点）
    let use_deepseek = std::env::var("DEEPSEEK_API_KEY").is_ok()
        || (provider == "deepseek" && std::env::var("OPENAI_API_KEY").is_ok());
    let use_openai = std::env::var("OPENAI_API_KEY").is_ok() && provider != "deepseek";

    if use_deepseek {
        let model = cfg
            .llm
            .deepseek
            .model
            .clone()
            .unwrap_or_else(|| cfg.llm.model.clone());
        tracing::info!("Using DeepSeek reasoning backend ({})", model);
        Arc::new(create_deepseek_client(Some(&model), timeout))
    } else if use_openai {
        let model = cfg
            .llm
            .openai
            .model
            .clone()
            .unwrap_or_else(|| "gpt-4o-mini".to_string());
        let base = cfg.llm.base_url.as_deref();
        tracing::info!("Using OpenAI reasoning backend ({})", model);
        Arc::new(
            OpenAiClient::new(base, &model, std::env::var("OPENAI_API_KEY").ok().as_deref())
                .with_timeout_secs(timeout),
        )
    } else {
        tracing::warn!("No API key set or provider unknown, every agent will serve its fallback");
        Arc::new(MockReasoningClient::failing())
    }
}
