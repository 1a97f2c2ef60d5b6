// 应用装配 - 根据配置创建执行器、Actor 和注意力监测
//
// 领域划分:
// - 紧急协议：EmergencyActor
// - 智能回复：ResponderActor
// - 采样分发：AttentionMonitor
// - 事件总线：用于模块间解耦通信

use crate::actors::{EmergencyActor, EmergencyHandle, ResponderActor, ResponderHandle};
use crate::effectors::{
    Effectors, HttpSpeaker, LocationProvider, LogNotifier, LogSpeaker, Notifier, Speaker,
    StaticLocationProvider, UnavailableLocationProvider, WebhookNotifier,
};
use crate::event_bus::EventBus;
use crate::llm::{ChatProvider, HttpChatProvider};
use crate::models::{AttentionSample, EffectorSettings, PersistedConfig};
use crate::monitor::AttentionMonitor;
use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// 运行中的应用
pub struct GuardApp {
    pub emergency: EmergencyHandle,
    pub responder: ResponderHandle,
    pub event_bus: Arc<EventBus>,
    samples: mpsc::Sender<AttentionSample>,
    monitor_task: JoinHandle<()>,
}

impl GuardApp {
    /// 使用配置中的执行器启动
    pub fn start(config: &PersistedConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let effectors = build_effectors(&config.effectors, &config.responder.chat_url, client.clone())?;
        let provider: Arc<dyn ChatProvider> = Arc::new(HttpChatProvider::new(
            client,
            config.responder.chat_url.clone(),
            config.responder.model.clone(),
            Duration::from_secs(config.responder.request_timeout_secs),
        ));
        Ok(Self::start_with(config, effectors, provider))
    }

    /// 使用指定的执行器启动
    pub fn start_with(
        config: &PersistedConfig,
        effectors: Effectors,
        provider: Arc<dyn ChatProvider>,
    ) -> Self {
        let event_bus = Arc::new(EventBus::new(1000));

        let (emergency_actor, emergency) =
            EmergencyActor::new(&config.emergency, effectors.clone(), event_bus.clone());
        tokio::spawn(emergency_actor.run());

        let (responder_actor, responder) = ResponderActor::new(
            &config.responder,
            provider,
            effectors.speaker.clone(),
            event_bus.clone(),
        );
        tokio::spawn(responder_actor.run());

        let (samples, rx) = mpsc::channel(64);
        let monitor =
            AttentionMonitor::new(emergency.clone(), Some(responder.clone()), event_bus.clone());
        let monitor_task = monitor.spawn(rx);

        info!(
            "应用已启动: 倒计时 {}秒, 采样间隔 {}ms",
            config.emergency.countdown_duration, config.sample_interval_ms
        );

        Self {
            emergency,
            responder,
            event_bus,
            samples,
            monitor_task,
        }
    }

    /// 采样输入端（可克隆给采样器）
    pub fn sample_sender(&self) -> mpsc::Sender<AttentionSample> {
        self.samples.clone()
    }

    /// 全部 Actor 是否正常
    pub async fn health_check(&self) -> bool {
        self.emergency.health_check().await && self.responder.health_check().await
    }

    /// 关闭采样输入并等待监测结束
    pub async fn shutdown(self) -> Result<()> {
        drop(self.samples);
        self.monitor_task
            .await
            .map_err(|e| anyhow!("注意力监测任务异常退出: {}", e))?;
        info!("应用已关闭");
        Ok(())
    }
}

/// 根据配置创建执行器
pub fn build_effectors(
    settings: &EffectorSettings,
    speech_base_url: &str,
    client: reqwest::Client,
) -> Result<Effectors> {
    let speaker: Arc<dyn Speaker> = match settings.speech_backend.as_str() {
        "log" => Arc::new(LogSpeaker),
        "http" => {
            let output_dir = settings
                .speech_output_dir
                .clone()
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join("driver-guard-speech"));
            Arc::new(HttpSpeaker::new(
                client.clone(),
                speech_base_url.to_string(),
                output_dir,
            ))
        }
        other => return Err(anyhow!("未知的语音后端: {}", other)),
    };

    let notifier: Arc<dyn Notifier> = match &settings.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(client, url.clone())),
        None => Arc::new(LogNotifier),
    };

    let location: Arc<dyn LocationProvider> = match settings.fixed_location {
        Some((latitude, longitude)) => Arc::new(StaticLocationProvider::new(latitude, longitude)),
        None => Arc::new(UnavailableLocationProvider),
    };

    Ok(Effectors {
        speaker,
        notifier,
        location,
    })
}
