// 事件总线 - 用于模块间解耦通信
//
// 实现发布/订阅模式,消除模块间的直接依赖关系
// 使用 tokio::sync::broadcast 实现高效的事件分发

use crate::models::{Emotion, Location, ResponseType};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

/// 应用事件枚举 - 定义所有可能的系统事件
#[derive(Debug, Clone)]
pub enum AppEvent {
    // --- 采样事件 ---

    /// 收到注意力采样
    SampleReceived {
        emotion: Emotion,
        attention_score: u8,
        face_detected: bool,
        timestamp: DateTime<Utc>,
    },

    // --- 紧急协议事件 ---

    /// 倒计时开始
    CountdownStarted {
        episode_id: Uuid,
        countdown_seconds: u32,
    },

    /// 倒计时跳动
    CountdownTick {
        episode_id: Uuid,
        remaining: u32,
    },

    /// 升级提示
    EscalationAlert {
        episode_id: Uuid,
        remaining: u32,
        message: String,
    },

    /// 已通知紧急联系人
    EmergencyNotified {
        episode_id: Uuid,
        location: Option<Location>,
        contact_count: usize,
    },

    /// 驾驶员响应，协议取消
    EmergencyCancelled {
        episode_id: Uuid,
        remaining: u32,
    },

    /// 强制重置
    EmergencyReset,

    // --- 回复事件 ---

    /// 智能回复已生成
    ResponseGenerated {
        response_id: Uuid,
        response_type: ResponseType,
        message: String,
        from_fallback: bool,
    },

    // --- 系统事件 ---

    /// 配置更新事件
    ConfigUpdated {
        config_type: String,
    },
}

/// 事件总线 - 用于模块间解耦通信
///
/// 使用 broadcast channel 实现发布/订阅模式
/// 支持多个订阅者同时接收事件
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// 创建新的事件总线
    ///
    /// # 参数
    /// - `capacity`: 事件缓冲区大小,建议 100-1000
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 发布事件
    ///
    /// 如果没有订阅者,事件会被丢弃(这是正常的)
    pub fn publish(&self, event: AppEvent) {
        match self.sender.send(event) {
            Ok(receiver_count) => {
                tracing::trace!("事件已发布，订阅者数量: {}", receiver_count);
            }
            Err(_) => {
                // 没有订阅者,忽略错误
                tracing::trace!("事件已发布但无订阅者");
            }
        }
    }

    /// 订阅事件
    ///
    /// 返回一个接收器,可以用 `.recv().await` 接收事件
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// 获取当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_basic() {
        let bus = EventBus::new(100);

        // 订阅事件
        let mut receiver = bus.subscribe();

        // 发布事件
        bus.publish(AppEvent::EmergencyReset);

        // 接收事件
        match receiver.recv().await {
            Ok(AppEvent::EmergencyReset) => {}
            _ => panic!("未收到预期事件"),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new(100);

        // 创建多个订阅者
        let mut receiver1 = bus.subscribe();
        let mut receiver2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        // 发布事件
        bus.publish(AppEvent::CountdownStarted {
            episode_id: Uuid::new_v4(),
            countdown_seconds: 30,
        });

        // 两个订阅者都应该收到事件
        assert!(receiver1.try_recv().is_ok());
        assert!(receiver2.try_recv().is_ok());
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(10);
        bus.publish(AppEvent::ConfigUpdated {
            config_type: "emergency".to_string(),
        });
        assert_eq!(bus.subscriber_count(), 0);
    }
}
