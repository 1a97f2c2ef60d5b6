// 智能回复策略
//
// 根据情绪和注意力变化决定是否、以何种语气与驾驶员对话

pub mod prompts;

use crate::models::{AttentionSample, Emotion, ResponderSettings, ResponseType};
use std::time::Duration;
use tokio::time::Instant;

pub use prompts::{clean_response, fallback_response, generate_prompt};

/// 根据情绪和注意力确定回复类型
pub fn determine_response_type(
    emotion: Emotion,
    attention_score: u8,
    face_detected: bool,
) -> ResponseType {
    // 长时间未检测到人脸
    if !face_detected && emotion == Emotion::NoFace {
        return ResponseType::Emergency;
    }

    if emotion == Emotion::Distracted
        || attention_score < 30
        || (emotion == Emotion::Tired && attention_score < 40)
    {
        return ResponseType::Alert;
    }

    if emotion == Emotion::Angry
        || (emotion == Emotion::Tired && attention_score < 60)
        || attention_score < 50
    {
        return ResponseType::Concern;
    }

    if matches!(emotion, Emotion::Sad | Emotion::Anxious) {
        return ResponseType::Support;
    }

    ResponseType::Encourage
}

/// 回复节流参数
#[derive(Debug, Clone)]
pub struct PolicyTimings {
    pub cooldown: Duration,
    pub min_interval: Duration,
    pub low_attention_interval: Duration,
    pub idle_interval: Duration,
}

impl From<&ResponderSettings> for PolicyTimings {
    fn from(settings: &ResponderSettings) -> Self {
        Self {
            cooldown: Duration::from_millis(settings.cooldown_ms),
            min_interval: Duration::from_millis(settings.min_interval_ms),
            low_attention_interval: Duration::from_millis(settings.low_attention_interval_ms),
            idle_interval: Duration::from_millis(settings.idle_interval_ms),
        }
    }
}

#[derive(Debug, Clone)]
struct LastResponse {
    emotion: Emotion,
    attention_score: u8,
    at: Instant,
}

/// 回复策略
#[derive(Debug)]
pub struct ResponsePolicy {
    timings: PolicyTimings,
    /// 紧急状态锁存：同一次无人脸期间只回复一次
    emergency_mode: bool,
    cooldown_until: Option<Instant>,
    last: LastResponse,
}

impl ResponsePolicy {
    pub fn new(timings: PolicyTimings, now: Instant) -> Self {
        Self {
            timings,
            emergency_mode: false,
            cooldown_until: None,
            last: LastResponse {
                emotion: Emotion::Neutral,
                attention_score: 100,
                at: now,
            },
        }
    }

    /// 是否需要生成新回复
    pub fn should_generate(&mut self, sample: &AttentionSample, now: Instant) -> bool {
        if !sample.face_detected && sample.emotion == Emotion::NoFace {
            if self.emergency_mode {
                return false;
            }
            self.emergency_mode = true;
            return true;
        }
        self.emergency_mode = false;

        if self.cooldown_until.is_some_and(|until| now < until) {
            return false;
        }

        let since_last = now.saturating_duration_since(self.last.at);
        if since_last < self.timings.min_interval {
            return false;
        }

        // 注意力大幅下降
        if i16::from(self.last.attention_score) - i16::from(sample.attention_score) > 20 {
            return true;
        }

        if self.last.emotion != sample.emotion {
            return true;
        }

        if sample.attention_score < 50 && since_last > self.timings.low_attention_interval {
            return true;
        }

        since_last > self.timings.idle_interval
    }

    /// 开始生成回复，进入冷却
    pub fn begin_response(&mut self, now: Instant) {
        self.cooldown_until = Some(now + self.timings.cooldown);
    }

    /// 回复播放完成，记录本次状态
    pub fn complete_response(&mut self, sample: &AttentionSample, now: Instant) {
        self.last = LastResponse {
            emotion: sample.emotion,
            attention_score: sample.attention_score,
            at: now,
        };
    }
}
