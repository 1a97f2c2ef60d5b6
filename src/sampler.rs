// 脚本化采样器 - 按固定间隔回放注意力采样
//
// 用于演示和测试，真实部署中由摄像头识别模块提供采样

use crate::models::{AttentionSample, Emotion};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, trace};

/// 场景中的一步
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub emotion: Emotion,
    pub attention_score: u8,
    /// 为空时按情绪推断（no-face 即无人脸）
    #[serde(default)]
    pub face_detected: Option<bool>,
    /// 重复次数
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

fn default_repeat() -> u32 {
    1
}

impl ScenarioStep {
    fn new(emotion: Emotion, attention_score: u8, repeat: u32) -> Self {
        Self {
            emotion,
            attention_score,
            face_detected: None,
            repeat,
        }
    }

    fn sample(&self) -> AttentionSample {
        let face = self
            .face_detected
            .unwrap_or(self.emotion != Emotion::NoFace);
        AttentionSample::new(self.emotion, self.attention_score, face)
    }
}

/// 采样场景
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// 驾驶员逐渐疲劳并失去响应，直到触发紧急通知
    pub fn unresponsive_driver() -> Self {
        Self {
            name: "unresponsive".to_string(),
            steps: vec![
                ScenarioStep::new(Emotion::Neutral, 90, 3),
                ScenarioStep::new(Emotion::Tired, 55, 3),
                ScenarioStep::new(Emotion::Tired, 35, 2),
                ScenarioStep::new(Emotion::NoFace, 0, 20),
                ScenarioStep::new(Emotion::Neutral, 80, 2),
            ],
        }
    }

    /// 驾驶员短暂离开视线后及时响应
    pub fn recovered_driver() -> Self {
        Self {
            name: "recovered".to_string(),
            steps: vec![
                ScenarioStep::new(Emotion::Happy, 95, 2),
                ScenarioStep::new(Emotion::Distracted, 40, 2),
                ScenarioStep::new(Emotion::NoFace, 0, 4),
                ScenarioStep::new(Emotion::Neutral, 85, 3),
            ],
        }
    }

    /// 内置场景
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "unresponsive" => Some(Self::unresponsive_driver()),
            "recovered" => Some(Self::recovered_driver()),
            _ => None,
        }
    }

    /// 从 JSON 文件加载
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("读取场景文件失败: {:?}", path))?;
        let scenario: Scenario = serde_json::from_slice(&bytes).context("解析场景文件失败")?;
        if scenario.steps.is_empty() {
            return Err(anyhow!("场景 {} 没有任何步骤", scenario.name));
        }
        Ok(scenario)
    }

    /// 采样总数
    pub fn total_samples(&self) -> usize {
        self.steps.iter().map(|s| s.repeat as usize).sum()
    }

    fn samples(&self) -> impl Iterator<Item = &ScenarioStep> {
        self.steps
            .iter()
            .flat_map(|step| std::iter::repeat(step).take(step.repeat as usize))
    }
}

/// 脚本化采样器
pub struct ScriptedSampler {
    scenario: Scenario,
    interval: Duration,
}

impl ScriptedSampler {
    pub fn new(scenario: Scenario, interval_ms: u64) -> Self {
        Self {
            scenario,
            interval: Duration::from_millis(interval_ms.max(1)),
        }
    }

    /// 按间隔发送全部采样，结束后关闭通道
    pub async fn run(self, sender: mpsc::Sender<AttentionSample>) -> Result<usize> {
        info!(
            "采样场景 {} 开始: {} 条采样, 间隔 {:?}",
            self.scenario.name,
            self.scenario.total_samples(),
            self.interval
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sent = 0;

        for step in self.scenario.samples() {
            ticker.tick().await;
            let sample = step.sample();
            trace!("发送采样: {} ({})", sample.emotion, sample.attention_score);
            sender
                .send(sample)
                .await
                .map_err(|_| anyhow!("采样接收端已关闭"))?;
            sent += 1;
        }

        info!("采样场景 {} 结束，共发送 {} 条", self.scenario.name, sent);
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_scenarios() {
        assert_eq!(Scenario::unresponsive_driver().total_samples(), 30);
        assert!(Scenario::builtin("recovered").is_some());
        assert!(Scenario::builtin("nope").is_none());
    }

    #[tokio::test]
    async fn test_load_scenario_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");
        tokio::fs::write(
            &path,
            r#"{"name": "custom", "steps": [
                {"emotion": "no-face", "attention_score": 0, "repeat": 2},
                {"emotion": "happy", "attention_score": 90, "face_detected": true}
            ]}"#,
        )
        .await
        .unwrap();

        let scenario = Scenario::load(&path).await.unwrap();
        assert_eq!(scenario.name, "custom");
        assert_eq!(scenario.total_samples(), 3);
    }

    #[tokio::test]
    async fn test_empty_scenario_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        tokio::fs::write(&path, r#"{"name": "empty", "steps": []}"#)
            .await
            .unwrap();
        assert!(Scenario::load(&path).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampler_emits_in_order_at_interval() {
        let (tx, mut rx) = mpsc::channel(64);
        let sampler = ScriptedSampler::new(Scenario::recovered_driver(), 2_000);
        let start = tokio::time::Instant::now();
        let task = tokio::spawn(sampler.run(tx));

        let mut samples = Vec::new();
        while let Some(sample) = rx.recv().await {
            samples.push(sample);
        }
        assert_eq!(task.await.unwrap().unwrap(), 11);
        assert_eq!(samples.len(), 11);
        assert_eq!(samples[0].emotion, Emotion::Happy);
        assert!(!samples[4].face_detected);
        assert!(samples[10].face_detected);
        // 第一条立即发送，其余每2秒一条
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }
}
