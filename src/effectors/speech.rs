// 语音播报实现

use super::Speaker;
use crate::models::VoiceOptions;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, info};

/// 只记录日志的播报器
pub struct LogSpeaker;

#[async_trait]
impl Speaker for LogSpeaker {
    async fn speak(&self, text: &str, voice: &VoiceOptions) -> Result<()> {
        info!("[语音 {} x{}] {}", voice.voice, voice.speed, text);
        Ok(())
    }
}

/// 通过后端语音合成接口播报
///
/// 调用 `{base_url}/synthesize`，将返回的音频写入输出目录
pub struct HttpSpeaker {
    client: Client,
    base_url: String,
    output_dir: PathBuf,
}

impl HttpSpeaker {
    pub fn new(client: Client, base_url: String, output_dir: PathBuf) -> Self {
        Self {
            client,
            base_url,
            output_dir,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/synthesize", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Speaker for HttpSpeaker {
    async fn speak(&self, text: &str, voice: &VoiceOptions) -> Result<()> {
        let body = json!({
            "text": text,
            "voice": voice.voice,
            "model": voice.model,
            "speed": voice.speed,
        });

        debug!("调用语音合成: {}", self.endpoint());
        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .context("语音合成请求失败")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("语音合成返回错误状态: {}", status));
        }

        let audio = response.bytes().await?;
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self
            .output_dir
            .join(format!("{}.mp3", chrono::Utc::now().timestamp_millis()));
        tokio::fs::write(&path, &audio)
            .await
            .with_context(|| format!("写入语音文件失败: {:?}", path))?;

        info!("语音已合成: {:?} ({} 字节)", path, audio.len());
        Ok(())
    }
}
