//! Mock 推理客户端（用于测试与无 API Key 的本地运行）
//!
//! 默认总是失败，让每个 Agent 走确定性兜底；也可以预置一串响应，按调用顺序依次返回。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{ClientFailure, ReasoningClient};

/// Mock 客户端：按队列返回预置结果，队列耗尽后返回 ClientFailure::Unavailable
#[derive(Debug, Default)]
pub struct MockReasoningClient {
    responses: Mutex<VecDeque<Result<String, ClientFailure>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockReasoningClient {
    /// 永远失败的后端
    pub fn failing() -> Self {
        Self::default()
    }

    /// 依次返回给定文本
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = responses.into_iter().map(|r| Ok(r.into())).collect();
        Self {
            responses: Mutex::new(queue),
            ..Self::default()
        }
    }

    /// 追加一个结果（成功或失败）
    pub fn push(&self, result: Result<String, ClientFailure>) {
        if let Ok(mut q) = self.responses.lock() {
            q.push_back(result);
        }
    }

    /// 已收到的调用次数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 已收到的 prompt（按调用顺序）
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ReasoningClient for MockReasoningClient {
    async fn generate(&self, prompt: &str, _schema_hint: Option<&str>) -> Result<String, ClientFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut p) = self.prompts.lock() {
            p.push(prompt.to_string());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| Err(ClientFailure::Unavailable("No API client available".to_string())))
    }
}
