// LLM模块 - 对话服务客户端

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// 系统提示
pub const SYSTEM_PROMPT: &str =
    "You are a car AI assistant that detects driver emotions. Keep responses under 100 words.";

/// 对话服务
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// 提供商名称
    fn name(&self) -> &str;

    /// 发送提示并返回回复文本
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    system: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    response: Option<String>,
}

/// HTTP 对话服务（POST {message, system, model} -> {response}）
pub struct HttpChatProvider {
    client: Client,
    url: String,
    model: String,
    timeout: Duration,
}

impl HttpChatProvider {
    pub fn new(client: Client, url: String, model: String, timeout: Duration) -> Self {
        Self {
            client,
            url,
            model,
            timeout,
        }
    }
}

#[async_trait]
impl ChatProvider for HttpChatProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            message: prompt,
            system: SYSTEM_PROMPT,
            model: &self.model,
        };

        debug!("调用对话服务: url={}, model={}", self.url, self.model);

        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .context("对话服务请求失败")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("对话服务返回错误状态: {}", status));
        }

        let body: ChatResponse = response.json().await.context("解析对话服务响应失败")?;
        let text = body.response.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(anyhow!("对话服务返回空回复"));
        }
        Ok(text)
    }
}

/// 未配置对话服务时使用，总是失败以触发兜底回复
pub struct OfflineChatProvider;

#[async_trait]
impl ChatProvider for OfflineChatProvider {
    fn name(&self) -> &str {
        "offline"
    }

    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("对话服务未启用"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            message: "hi",
            system: SYSTEM_PROMPT,
            model: "gpt-4o",
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["message"], "hi");
        assert_eq!(value["model"], "gpt-4o");
        assert!(value["system"].as_str().unwrap().contains("100 words"));
    }

    #[test]
    fn test_response_without_field() {
        let body: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(body.response.is_none());
    }

    #[tokio::test]
    async fn test_offline_provider_fails() {
        assert!(OfflineChatProvider.complete("hello").await.is_err());
    }
}
