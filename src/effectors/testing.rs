// 测试用执行器

use super::{Effectors, LocationProvider, Notifier, Speaker};
use crate::models::{EmergencyContact, Location, VoiceOptions};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 记录所有播报内容
#[derive(Default)]
pub struct RecordingSpeaker {
    spoken: Mutex<Vec<(String, VoiceOptions)>>,
    fail: bool,
}

impl RecordingSpeaker {
    /// 每次播报都返回错误（仍然记录内容）
    pub fn failing() -> Self {
        Self {
            spoken: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }

    pub fn voices(&self) -> Vec<VoiceOptions> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|(_, voice)| voice.clone())
            .collect()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.messages().iter().filter(|m| m.contains(needle)).count()
    }
}

#[async_trait]
impl Speaker for RecordingSpeaker {
    async fn speak(&self, text: &str, voice: &VoiceOptions) -> Result<()> {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), voice.clone()));
        if self.fail {
            return Err(anyhow!("扬声器不可用"));
        }
        Ok(())
    }
}

/// 记录通知调用
#[derive(Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<(Option<Location>, Vec<EmergencyContact>)>>,
    fail: bool,
}

impl RecordingNotifier {
    /// 每次通知都返回错误（仍然记录调用）
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<(Option<Location>, Vec<EmergencyContact>)> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, location: Option<Location>, contacts: &[EmergencyContact]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((location, contacts.to_vec()));
        if self.fail {
            return Err(anyhow!("通知服务不可用"));
        }
        Ok(())
    }
}

/// 响应很慢的定位器
pub struct SlowLocationProvider {
    pub delay: Duration,
}

#[async_trait]
impl LocationProvider for SlowLocationProvider {
    async fn current_location(&self) -> Result<Location> {
        tokio::time::sleep(self.delay).await;
        Ok(Location {
            latitude: 1.0,
            longitude: 2.0,
            captured_at: chrono::Utc::now(),
        })
    }
}

/// 测试用执行器组合
pub struct TestEffectors {
    pub speaker: Arc<RecordingSpeaker>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestEffectors {
    pub fn new() -> Self {
        Self {
            speaker: Arc::new(RecordingSpeaker::default()),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    pub fn with_speaker(speaker: RecordingSpeaker) -> Self {
        Self {
            speaker: Arc::new(speaker),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    pub fn with_notifier(notifier: RecordingNotifier) -> Self {
        Self {
            speaker: Arc::new(RecordingSpeaker::default()),
            notifier: Arc::new(notifier),
        }
    }

    pub fn effectors(&self, location: Arc<dyn LocationProvider>) -> Effectors {
        Effectors {
            speaker: self.speaker.clone(),
            notifier: self.notifier.clone(),
            location,
        }
    }
}
