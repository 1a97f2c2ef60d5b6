// 注意力监测 - 将采样流分发给紧急协议和智能回复
//
// 未检测到人脸 -> 开始紧急倒计时；其他任何采样都视为驾驶员响应

use crate::actors::{EmergencyHandle, ResponderHandle};
use crate::event_bus::{AppEvent, EventBus};
use crate::models::AttentionSample;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// 注意力监测器
pub struct AttentionMonitor {
    emergency: EmergencyHandle,
    responder: Option<ResponderHandle>,
    event_bus: Arc<EventBus>,
}

impl AttentionMonitor {
    pub fn new(
        emergency: EmergencyHandle,
        responder: Option<ResponderHandle>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            emergency,
            responder,
            event_bus,
        }
    }

    /// 处理一条采样
    pub async fn process_sample(&self, sample: AttentionSample) -> Result<()> {
        debug!(
            "收到采样: {} (注意力: {}, 人脸: {})",
            sample.emotion, sample.attention_score, sample.face_detected
        );
        self.event_bus.publish(AppEvent::SampleReceived {
            emotion: sample.emotion,
            attention_score: sample.attention_score,
            face_detected: sample.face_detected,
            timestamp: sample.timestamp,
        });

        if let Some(responder) = &self.responder {
            if let Err(e) = responder.handle_emotion_update(sample.clone()).await {
                warn!("提交智能回复失败: {}", e);
            }
        }

        if sample.is_unresponsive() {
            self.emergency.start_countdown().await?;
        } else {
            self.emergency.handle_driver_response().await?;
        }
        Ok(())
    }

    /// 持续处理采样直到通道关闭
    pub async fn run(self, mut samples: mpsc::Receiver<AttentionSample>) {
        info!("注意力监测已启动");

        while let Some(sample) = samples.recv().await {
            if let Err(e) = self.process_sample(sample).await {
                error!("处理采样失败: {}", e);
            }
        }

        info!("采样流已结束，注意力监测停止");
    }

    /// 在后台任务中运行
    pub fn spawn(self, samples: mpsc::Receiver<AttentionSample>) -> JoinHandle<()> {
        tokio::spawn(self.run(samples))
    }
}
