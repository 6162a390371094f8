//! OpenAI 兼容 API 客户端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；支持 DeepSeek、OpenAI、自建代理等。
//! 每次请求都有显式超时，超时视为 ClientFailure::Timeout。

use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::llm::traits::compose_prompt;
use crate::llm::{ClientFailure, ReasoningClient};

/// OpenAI 兼容客户端：持有 Client、model 名与请求超时
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(base_url: Option<&str>, model: &str, api_key: Option<&str>) -> Self {
        let api_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_else(|| "sk-placeholder".to_string());

        let config = if let Some(url) = base_url {
            OpenAIConfig::new()
                .with_api_base(url)
                .with_api_key(api_key)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// 设置单次请求超时（秒）
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs.max(1));
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request(&self, content: String) -> Result<String, ClientFailure> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| ClientFailure::Backend(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![ChatCompletionRequestMessage::User(message)])
            .build()
            .map_err(|e| ClientFailure::Backend(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ClientFailure::Unavailable(e.to_string()))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ClientFailure::Malformed("empty completion".to_string()))
    }
}

#[async_trait]
impl ReasoningClient for OpenAiClient {
    async fn generate(&self, prompt: &str, schema_hint: Option<&str>) -> Result<String, ClientFailure> {
        let content = compose_prompt(prompt, schema_hint);
        match tokio::time::timeout(self.timeout, self.request(content)).await {
            Ok(result) => result,
            Err(_) => Err(ClientFailure::Timeout(self.timeout.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_floor_and_model() {
        let client = OpenAiClient::new(Some("http://localhost:1/v1"), "deepseek-chat", Some("sk-test"))
            .with_timeout_secs(0);
        assert_eq!(client.model(), "deepseek-chat");
        // 超时下限 1 秒
        assert_eq!(client.timeout, Duration::from_secs(1));
    }
}
