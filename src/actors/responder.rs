// Responder Actor - 使用Actor模式管理智能回复
//
// 独占回复策略和历史记录，按顺序处理注意力采样

use crate::effectors::Speaker;
use crate::event_bus::{AppEvent, EventBus};
use crate::llm::ChatProvider;
use crate::models::{
    AttentionSample, ResponderSettings, ResponseEntry, ResponseHistory, ResponseType, VoiceOptions,
};
use crate::responder::{
    clean_response, determine_response_type, fallback_response, generate_prompt, PolicyTimings,
    ResponsePolicy,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// 智能回复命令
pub enum ResponderCommand {
    /// 处理注意力采样
    HandleSample { sample: AttentionSample },

    /// 重播最后一条回复
    PlayLast {
        reply: oneshot::Sender<Option<ResponseEntry>>,
    },

    /// 获取回复历史
    GetHistory {
        reply: oneshot::Sender<ResponseHistory>,
    },

    /// 健康检查（Ping）
    HealthCheck { reply: oneshot::Sender<()> },
}

/// 智能回复Actor
pub struct ResponderActor {
    receiver: mpsc::Receiver<ResponderCommand>,
    enabled: bool,
    policy: ResponsePolicy,
    history: ResponseHistory,
    provider: Arc<dyn ChatProvider>,
    speaker: Arc<dyn Speaker>,
    event_bus: Arc<EventBus>,
}

impl ResponderActor {
    /// 创建新的Actor
    pub fn new(
        settings: &ResponderSettings,
        provider: Arc<dyn ChatProvider>,
        speaker: Arc<dyn Speaker>,
        event_bus: Arc<EventBus>,
    ) -> (Self, ResponderHandle) {
        let (sender, receiver) = mpsc::channel(100);
        let actor = Self {
            receiver,
            enabled: settings.enabled,
            policy: ResponsePolicy::new(PolicyTimings::from(settings), Instant::now()),
            history: ResponseHistory::default(),
            provider,
            speaker,
            event_bus,
        };
        let handle = ResponderHandle { sender };
        (actor, handle)
    }

    /// 运行Actor
    pub async fn run(mut self) {
        info!(
            "Responder Actor 已启动 (provider: {}, 启用: {})",
            self.provider.name(),
            self.enabled
        );

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                ResponderCommand::HandleSample { sample } => {
                    self.handle_emotion_update(sample).await;
                }

                ResponderCommand::PlayLast { reply } => {
                    let entry = self.play_last_response().await;
                    let _ = reply.send(entry);
                }

                ResponderCommand::GetHistory { reply } => {
                    let _ = reply.send(self.history.clone());
                }

                ResponderCommand::HealthCheck { reply } => {
                    let _ = reply.send(());
                }
            }
        }

        info!("Responder Actor 已停止");
    }

    async fn handle_emotion_update(&mut self, sample: AttentionSample) {
        if !self.enabled {
            return;
        }
        if !self.policy.should_generate(&sample, Instant::now()) {
            return;
        }

        let response_type =
            determine_response_type(sample.emotion, sample.attention_score, sample.face_detected);
        self.generate_response(&sample, response_type).await;
    }

    async fn generate_response(&mut self, sample: &AttentionSample, response_type: ResponseType) {
        self.policy.begin_response(Instant::now());

        let prompt = generate_prompt(sample.emotion, sample.attention_score, response_type);
        let (message, from_fallback) = match self.provider.complete(&prompt).await {
            Ok(text) => (clean_response(&text), false),
            Err(e) => {
                warn!("获取AI回复失败，使用兜底回复: {}", e);
                (fallback_response(response_type).to_string(), true)
            }
        };

        debug!(
            "生成回复: type={}, emotion={}, attention={}",
            response_type, sample.emotion, sample.attention_score
        );

        let entry = ResponseEntry {
            id: uuid::Uuid::new_v4(),
            message,
            response_type,
            timestamp: chrono::Utc::now(),
            emotion: sample.emotion,
            attention_score: sample.attention_score,
            played: false,
        };

        self.history.responses.push(entry.clone());
        self.history.last_response = Some(entry.clone());
        self.event_bus.publish(AppEvent::ResponseGenerated {
            response_id: entry.id,
            response_type,
            message: entry.message.clone(),
            from_fallback,
        });

        let played = self.play(&entry).await;
        self.mark_played(entry.id, played);

        self.policy.complete_response(sample, Instant::now());
    }

    async fn play_last_response(&mut self) -> Option<ResponseEntry> {
        let entry = self.history.last_response.clone()?;
        let played = self.play(&entry).await;
        self.mark_played(entry.id, played);
        self.history.last_response.clone()
    }

    async fn play(&self, entry: &ResponseEntry) -> bool {
        let voice = VoiceOptions {
            speed: if entry.response_type == ResponseType::Emergency {
                1.2
            } else {
                1.0
            },
            ..VoiceOptions::default()
        };

        match self.speaker.speak(&entry.message, &voice).await {
            Ok(()) => true,
            Err(e) => {
                warn!("播放回复失败: {}", e);
                false
            }
        }
    }

    fn mark_played(&mut self, id: uuid::Uuid, played: bool) {
        if !played {
            return;
        }
        if let Some(entry) = self.history.responses.iter_mut().find(|e| e.id == id) {
            entry.played = true;
        }
        if let Some(last) = self.history.last_response.as_mut().filter(|e| e.id == id) {
            last.played = true;
        }
    }
}

/// 智能回复Handle（可克隆）
#[derive(Clone)]
pub struct ResponderHandle {
    sender: mpsc::Sender<ResponderCommand>,
}

impl ResponderHandle {
    /// 提交注意力采样
    pub async fn handle_emotion_update(&self, sample: AttentionSample) -> Result<()> {
        self.sender
            .send(ResponderCommand::HandleSample { sample })
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        Ok(())
    }

    /// 重播最后一条回复
    pub async fn play_last_response(&self) -> Result<Option<ResponseEntry>> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(ResponderCommand::PlayLast { reply })
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        rx.await.map_err(|_| anyhow::anyhow!("Actor已停止"))
    }

    /// 获取回复历史
    pub async fn history(&self) -> Result<ResponseHistory> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(ResponderCommand::GetHistory { reply })
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        rx.await.map_err(|_| anyhow::anyhow!("Actor已停止"))
    }

    /// 健康检查
    pub async fn health_check(&self) -> bool {
        let (reply, rx) = oneshot::channel();
        if self
            .sender
            .send(ResponderCommand::HealthCheck { reply })
            .await
            .is_err()
        {
            warn!("Responder Actor 健康检查失败: 通道已关闭");
            return false;
        }
        matches!(
            tokio::time::timeout(std::time::Duration::from_secs(5), rx).await,
            Ok(Ok(()))
        )
    }
}
