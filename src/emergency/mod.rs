// 紧急协议状态机
//
// Idle -> Counting -> Notified，驾驶员响应后回到 Idle
// 只负责状态转移，计时器和外部执行器由 actors::emergency 驱动

use crate::models::{
    EmergencyContact, EmergencyPhase, EmergencySettings, EmergencyState, Location,
};
use anyhow::{anyhow, Result};
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// 倒计时开始时的提示
pub const INITIAL_ALERT: &str =
    "Attention required. Please respond or emergency protocol will activate.";
/// 通知联系人时的提示
pub const FINAL_ALERT: &str =
    "Driver unresponsive. Emergency contacts being notified with your current location.";
/// 驾驶员响应后的确认
pub const CANCEL_ALERT: &str = "Emergency protocol canceled. Thank you for responding.";

/// 升级提示文本
pub fn escalation_message(remaining: u32) -> String {
    format!(
        "Emergency protocol activating in {} seconds. Please respond.",
        remaining
    )
}

/// 状态机参数
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    /// 倒计时时长（秒）
    pub countdown_duration: u32,
    /// 重复触发冷却
    pub retrigger_cooldown: Duration,
    /// 升级提示间隔（秒）
    pub escalation_interval: u32,
}

impl From<&EmergencySettings> for ProtocolConfig {
    fn from(settings: &EmergencySettings) -> Self {
        Self {
            countdown_duration: settings.countdown_duration.max(1),
            retrigger_cooldown: Duration::from_millis(settings.retrigger_cooldown_ms),
            escalation_interval: settings.escalation_interval.max(1),
        }
    }
}

/// start 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// 已开始新的倒计时
    Started { episode_id: Uuid },
    /// 已在倒计时或已通知
    AlreadyActive,
    /// 处于冷却期
    CoolingDown { remaining: Duration },
}

/// tick 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// 当前没有倒计时，忽略
    Ignored,
    /// 继续倒计时，可能附带升级提示
    Counting {
        remaining: u32,
        escalation: Option<String>,
    },
    /// 倒计时结束，需要定位并通知
    Expired,
}

/// 驾驶员响应的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    pub episode_id: Uuid,
    /// 取消时剩余秒数
    pub remaining: u32,
}

/// 紧急协议
#[derive(Debug)]
pub struct EmergencyProtocol {
    config: ProtocolConfig,
    phase: EmergencyPhase,
    countdown_seconds: u32,
    notification_sent: bool,
    location: Option<Location>,
    contacts: Vec<EmergencyContact>,
    last_start: Option<Instant>,
    episode_id: Option<Uuid>,
}

impl EmergencyProtocol {
    pub fn new(config: ProtocolConfig, contacts: Vec<EmergencyContact>) -> Self {
        Self {
            countdown_seconds: config.countdown_duration,
            config,
            phase: EmergencyPhase::Idle,
            notification_sent: false,
            location: None,
            contacts,
            last_start: None,
            episode_id: None,
        }
    }

    pub fn phase(&self) -> EmergencyPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != EmergencyPhase::Idle
    }

    pub fn countdown_seconds(&self) -> u32 {
        self.countdown_seconds
    }

    pub fn episode_id(&self) -> Option<Uuid> {
        self.episode_id
    }

    pub fn contacts(&self) -> &[EmergencyContact] {
        &self.contacts
    }

    /// 开始倒计时
    pub fn start(&mut self, now: Instant) -> StartOutcome {
        if self.is_active() {
            return StartOutcome::AlreadyActive;
        }

        if let Some(last) = self.last_start {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.config.retrigger_cooldown {
                return StartOutcome::CoolingDown {
                    remaining: self.config.retrigger_cooldown - elapsed,
                };
            }
        }

        let episode_id = Uuid::new_v4();
        self.phase = EmergencyPhase::Counting;
        self.countdown_seconds = self.config.countdown_duration;
        self.notification_sent = false;
        self.location = None;
        self.last_start = Some(now);
        self.episode_id = Some(episode_id);

        StartOutcome::Started { episode_id }
    }

    /// 每秒调用一次
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != EmergencyPhase::Counting {
            return TickOutcome::Ignored;
        }

        self.countdown_seconds = self.countdown_seconds.saturating_sub(1);

        if self.countdown_seconds == 0 {
            self.phase = EmergencyPhase::Notified;
            return TickOutcome::Expired;
        }

        let escalation = (self.countdown_seconds % self.config.escalation_interval == 0)
            .then(|| escalation_message(self.countdown_seconds));

        TickOutcome::Counting {
            remaining: self.countdown_seconds,
            escalation,
        }
    }

    /// 记录通知已发出
    ///
    /// 只有同一轮倒计时仍处于 Notified 阶段且尚未发送时生效，返回是否生效
    pub fn mark_notified(&mut self, episode_id: Uuid, location: Option<Location>) -> bool {
        if self.episode_id != Some(episode_id)
            || self.phase != EmergencyPhase::Notified
            || self.countdown_seconds != 0
            || self.notification_sent
        {
            return false;
        }
        self.location = location;
        self.notification_sent = true;
        true
    }

    /// 驾驶员响应
    ///
    /// 空闲时返回 None，不改变任何状态
    pub fn driver_response(&mut self) -> Option<Cancellation> {
        if !self.is_active() {
            return None;
        }

        let cancellation = Cancellation {
            episode_id: self.episode_id.unwrap_or_else(Uuid::nil),
            remaining: self.countdown_seconds,
        };
        self.clear();
        Some(cancellation)
    }

    /// 强制重置（不提示）
    pub fn reset(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.phase = EmergencyPhase::Idle;
        self.countdown_seconds = self.config.countdown_duration;
        self.notification_sent = false;
        self.location = None;
        self.episode_id = None;
    }

    pub fn add_contact(&mut self, contact: EmergencyContact) {
        self.contacts.push(contact);
    }

    pub fn remove_contact(&mut self, index: usize) -> Result<EmergencyContact> {
        if index >= self.contacts.len() {
            return Err(anyhow!(
                "联系人索引越界: {} (共 {} 个)",
                index,
                self.contacts.len()
            ));
        }
        Ok(self.contacts.remove(index))
    }

    /// 状态快照
    pub fn state(&self) -> EmergencyState {
        EmergencyState {
            phase: self.phase,
            is_active: self.is_active(),
            countdown_seconds: self.countdown_seconds,
            notification_sent: self.notification_sent,
            location: self.location,
            emergency_contacts: self.contacts.clone(),
        }
    }
}
