// 紧急通知实现

use super::Notifier;
use crate::models::{EmergencyContact, Location};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{error, info, warn};

/// 只记录日志的通知器
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, location: Option<Location>, contacts: &[EmergencyContact]) -> Result<()> {
        match location {
            Some(loc) => warn!(
                "紧急通知已发送: 位置 ({}, {}), 联系人 {} 个",
                loc.latitude,
                loc.longitude,
                contacts.len()
            ),
            None => warn!("紧急通知已发送: 位置未知, 联系人 {} 个", contacts.len()),
        }
        for contact in contacts {
            info!("  -> {} ({}) {}", contact.name, contact.relation, contact.phone_number);
        }
        Ok(())
    }
}

/// 通过 webhook 推送紧急通知
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, location: Option<Location>, contacts: &[EmergencyContact]) -> Result<()> {
        let body = json!({
            "latitude": location.map(|l| l.latitude),
            "longitude": location.map(|l| l.longitude),
            "contacts": contacts,
            "sent_at": chrono::Utc::now(),
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .context("紧急通知请求失败")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("紧急通知 webhook 返回错误: {} {}", status, text);
            return Err(anyhow!("紧急通知 webhook 返回错误状态: {}", status));
        }

        info!("紧急通知已推送到 webhook: {}", self.url);
        Ok(())
    }
}
