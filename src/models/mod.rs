// 数据模型模块 - 定义所有的数据结构

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 驾驶员情绪（由注意力采样器给出）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Emotion {
    Neutral,
    Happy,
    Sad,
    Angry,
    Anxious,
    Tired,
    Distracted,
    NoFace, // 未检测到人脸
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Anxious => "anxious",
            Self::Tired => "tired",
            Self::Distracted => "distracted",
            Self::NoFace => "no-face",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 注意力采样
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttentionSample {
    /// 主要情绪
    pub emotion: Emotion,
    /// 注意力分数（0-100）
    pub attention_score: u8,
    /// 是否检测到人脸
    pub face_detected: bool,
    /// 采样时间
    pub timestamp: DateTime<Utc>,
}

impl AttentionSample {
    /// 创建采样，分数超过100时截断
    pub fn new(emotion: Emotion, attention_score: u8, face_detected: bool) -> Self {
        Self {
            emotion,
            attention_score: attention_score.min(100),
            face_detected,
            timestamp: Utc::now(),
        }
    }

    /// 模拟器输入：no-face 即视为未检测到人脸
    pub fn simulated(emotion: Emotion, attention_score: u8) -> Self {
        Self::new(emotion, attention_score, emotion != Emotion::NoFace)
    }

    /// 驾驶员是否失去响应
    pub fn is_unresponsive(&self) -> bool {
        self.emotion == Emotion::NoFace
    }
}

/// 紧急联系人
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone_number: String,
    pub relation: String,
}

impl EmergencyContact {
    pub fn new(name: &str, phone_number: &str, relation: &str) -> Self {
        Self {
            name: name.to_string(),
            phone_number: phone_number.to_string(),
            relation: relation.to_string(),
        }
    }
}

/// 默认紧急联系人列表
pub fn default_contacts() -> Vec<EmergencyContact> {
    vec![
        EmergencyContact::new("Emergency Services", "911", "Emergency"),
        EmergencyContact::new("John Smith", "+1234567890", "Family"),
        EmergencyContact::new("Sarah Johnson", "+1987654321", "Friend"),
    ]
}

/// 定位结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub captured_at: DateTime<Utc>,
}

/// 紧急协议阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyPhase {
    /// 空闲
    Idle,
    /// 倒计时中
    Counting,
    /// 已通知，等待驾驶员响应
    Notified,
}

/// 紧急状态快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyState {
    pub phase: EmergencyPhase,
    pub is_active: bool,
    pub countdown_seconds: u32,
    pub notification_sent: bool,
    pub location: Option<Location>,
    pub emergency_contacts: Vec<EmergencyContact>,
}

/// 语音合成参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceOptions {
    pub voice: String,
    pub model: String,
    pub speed: f32,
}

impl VoiceOptions {
    /// 紧急提示使用的语速
    pub fn emergency() -> Self {
        Self {
            speed: 1.2,
            ..Self::default()
        }
    }
}

impl Default for VoiceOptions {
    fn default() -> Self {
        Self {
            voice: "shimmer".to_string(),
            model: "tts-1".to_string(),
            speed: 1.0,
        }
    }
}

/// 回复类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Alert,
    Concern,
    Support,
    Encourage,
    Emergency,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Concern => "concern",
            Self::Support => "support",
            Self::Encourage => "encourage",
            Self::Emergency => "emergency",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 回复记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEntry {
    pub id: uuid::Uuid,
    pub message: String,
    pub response_type: ResponseType,
    pub timestamp: DateTime<Utc>,
    pub emotion: Emotion,
    pub attention_score: u8,
    /// 是否已播放成功
    pub played: bool,
}

/// 回复历史
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseHistory {
    pub responses: Vec<ResponseEntry>,
    pub last_response: Option<ResponseEntry>,
}

/// 紧急协议配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencySettings {
    /// 倒计时时长（秒）
    pub countdown_duration: u32,
    /// 重复触发冷却时间（毫秒）
    pub retrigger_cooldown_ms: u64,
    /// 升级提示间隔（秒）
    pub escalation_interval: u32,
    /// 定位超时（毫秒）
    pub location_timeout_ms: u64,
    /// 紧急联系人
    pub contacts: Vec<EmergencyContact>,
}

impl Default for EmergencySettings {
    fn default() -> Self {
        Self {
            countdown_duration: 30,
            retrigger_cooldown_ms: 5_000,
            escalation_interval: 10,
            location_timeout_ms: 10_000,
            contacts: default_contacts(),
        }
    }
}

/// 智能回复配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderSettings {
    /// 是否启用智能回复
    pub enabled: bool,
    /// 对话服务地址
    pub chat_url: String,
    /// 模型名称
    pub model: String,
    /// 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 生成回复后的冷却时间（毫秒）
    pub cooldown_ms: u64,
    /// 两次回复之间的最小间隔（毫秒）
    pub min_interval_ms: u64,
    /// 低注意力状态下的回复间隔（毫秒）
    pub low_attention_interval_ms: u64,
    /// 正常状态下的回复间隔（毫秒）
    pub idle_interval_ms: u64,
}

impl Default for ResponderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            chat_url: "http://localhost:5003/ai".to_string(),
            model: "gpt-4o".to_string(),
            request_timeout_secs: 10,
            cooldown_ms: 3_000,
            min_interval_ms: 5_000,
            low_attention_interval_ms: 15_000,
            idle_interval_ms: 45_000,
        }
    }
}

/// 外部执行器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectorSettings {
    /// 语音合成后端: "log" 或 "http"
    pub speech_backend: String,
    /// 语音文件输出目录（http 后端）
    pub speech_output_dir: Option<String>,
    /// 通知 webhook 地址，为空时只记录日志
    pub webhook_url: Option<String>,
    /// 固定定位（纬度, 经度），为空表示定位不可用
    pub fixed_location: Option<(f64, f64)>,
}

impl Default for EffectorSettings {
    fn default() -> Self {
        Self {
            speech_backend: "log".to_string(),
            speech_output_dir: None,
            webhook_url: None,
            fixed_location: None,
        }
    }
}

/// 持久化的应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedConfig {
    /// 采样间隔（毫秒）
    pub sample_interval_ms: u64,
    pub emergency: EmergencySettings,
    pub responder: ResponderSettings,
    pub effectors: EffectorSettings,
}

impl Default for PersistedConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: Self::DEFAULT_SAMPLE_INTERVAL_MS,
            emergency: EmergencySettings::default(),
            responder: ResponderSettings::default(),
            effectors: EffectorSettings::default(),
        }
    }
}

impl PersistedConfig {
    /// 默认采样间隔
    pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 2_000;

    /// 校验配置
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sample_interval_ms == 0 {
            return Err(anyhow::anyhow!("采样间隔必须大于0"));
        }
        if self.emergency.countdown_duration == 0 {
            return Err(anyhow::anyhow!("倒计时时长必须大于0"));
        }
        if self.emergency.escalation_interval == 0 {
            return Err(anyhow::anyhow!("升级提示间隔必须大于0"));
        }
        Ok(())
    }
}

/// 配置更新（字段为空表示不修改）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub sample_interval_ms: Option<u64>,
    pub countdown_duration: Option<u32>,
    pub retrigger_cooldown_ms: Option<u64>,
    pub escalation_interval: Option<u32>,
    pub contacts: Option<Vec<EmergencyContact>>,
    pub responder: Option<ResponderSettings>,
    pub effectors: Option<EffectorSettings>,
}

impl ConfigUpdate {
    /// 本次更新涉及的配置分区
    pub fn changed_sections(&self) -> Vec<&'static str> {
        let mut sections = Vec::new();
        if self.sample_interval_ms.is_some() {
            sections.push("sampler");
        }
        if self.countdown_duration.is_some()
            || self.retrigger_cooldown_ms.is_some()
            || self.escalation_interval.is_some()
            || self.contacts.is_some()
        {
            sections.push("emergency");
        }
        if self.responder.is_some() {
            sections.push("responder");
        }
        if self.effectors.is_some() {
            sections.push("effectors");
        }
        sections
    }
}
