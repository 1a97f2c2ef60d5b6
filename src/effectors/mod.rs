// 外部执行器 - 语音播报、紧急通知、定位
//
// 状态机只依赖这些 trait，具体实现在构建应用时注入

pub mod location;
pub mod notifier;
pub mod speech;

#[cfg(test)]
pub mod testing;

use crate::models::{EmergencyContact, Location, VoiceOptions};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use location::{StaticLocationProvider, UnavailableLocationProvider};
pub use notifier::{LogNotifier, WebhookNotifier};
pub use speech::{HttpSpeaker, LogSpeaker};

/// 语音播报
#[async_trait]
pub trait Speaker: Send + Sync {
    /// 播报文本
    async fn speak(&self, text: &str, voice: &VoiceOptions) -> Result<()>;
}

/// 紧急通知
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 将位置发送给紧急联系人
    async fn notify(&self, location: Option<Location>, contacts: &[EmergencyContact]) -> Result<()>;
}

/// 定位
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// 获取当前位置
    async fn current_location(&self) -> Result<Location>;
}

/// 执行器集合
#[derive(Clone)]
pub struct Effectors {
    pub speaker: Arc<dyn Speaker>,
    pub notifier: Arc<dyn Notifier>,
    pub location: Arc<dyn LocationProvider>,
}

impl Effectors {
    /// 全部只记录日志的执行器
    pub fn logging() -> Self {
        Self {
            speaker: Arc::new(LogSpeaker),
            notifier: Arc::new(LogNotifier),
            location: Arc::new(UnavailableLocationProvider),
        }
    }
}

/// 尽力播报：在后台任务中执行，失败只记录日志
pub fn speak_detached(speaker: Arc<dyn Speaker>, text: String, voice: VoiceOptions) {
    tokio::spawn(async move {
        if let Err(e) = speaker.speak(&text, &voice).await {
            tracing::warn!("语音播报失败: {}", e);
        }
    });
}
