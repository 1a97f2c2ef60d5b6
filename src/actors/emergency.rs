// Emergency Actor - 使用Actor模式驱动紧急倒计时
//
// Actor 独占 EmergencyProtocol 和计时器句柄，命令优先于 tick 处理，
// 驾驶员响应清除句柄后不会再有任何 tick

use crate::effectors::{speak_detached, Effectors, LocationProvider};
use crate::emergency::{
    EmergencyProtocol, ProtocolConfig, StartOutcome, TickOutcome, CANCEL_ALERT, FINAL_ALERT,
    INITIAL_ALERT,
};
use crate::event_bus::{AppEvent, EventBus};
use crate::models::{EmergencyContact, EmergencySettings, EmergencyState, Location, VoiceOptions};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 倒计时步长
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// 紧急协议命令
pub enum EmergencyCommand {
    /// 开始倒计时
    Start {
        reply: oneshot::Sender<StartOutcome>,
    },

    /// 驾驶员响应
    DriverResponse { reply: oneshot::Sender<bool> },

    /// 强制重置
    Reset { reply: oneshot::Sender<()> },

    /// 添加紧急联系人
    AddContact { contact: EmergencyContact },

    /// 删除紧急联系人
    RemoveContact {
        index: usize,
        reply: oneshot::Sender<Result<EmergencyContact>>,
    },

    /// 获取状态
    GetState {
        reply: oneshot::Sender<EmergencyState>,
    },

    /// 健康检查（Ping）
    HealthCheck { reply: oneshot::Sender<()> },
}

/// 紧急协议Actor
pub struct EmergencyActor {
    receiver: mpsc::Receiver<EmergencyCommand>,
    protocol: EmergencyProtocol,
    /// 倒计时计时器，None 表示没有倒计时在运行
    ticker: Option<Interval>,
    effectors: Effectors,
    event_bus: Arc<EventBus>,
    location_timeout: Duration,
    /// 后台定位结果回传
    located_tx: mpsc::Sender<LocationResolved>,
    located_rx: mpsc::Receiver<LocationResolved>,
}

/// 倒计时归零后后台定位的结果
struct LocationResolved {
    episode_id: Uuid,
    location: Option<Location>,
}

impl EmergencyActor {
    /// 创建新的Actor
    pub fn new(
        settings: &EmergencySettings,
        effectors: Effectors,
        event_bus: Arc<EventBus>,
    ) -> (Self, EmergencyHandle) {
        let (sender, receiver) = mpsc::channel(50);
        let (located_tx, located_rx) = mpsc::channel(4);
        let actor = Self {
            receiver,
            protocol: EmergencyProtocol::new(
                ProtocolConfig::from(settings),
                settings.contacts.clone(),
            ),
            ticker: None,
            effectors,
            event_bus,
            location_timeout: Duration::from_millis(settings.location_timeout_ms),
            located_tx,
            located_rx,
        };
        let handle = EmergencyHandle { sender };
        (actor, handle)
    }

    /// 运行Actor
    pub async fn run(mut self) {
        info!("Emergency Actor 已启动");

        loop {
            tokio::select! {
                biased;

                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },

                Some(resolved) = self.located_rx.recv() => self.on_location_resolved(resolved),

                _ = next_tick(&mut self.ticker) => self.on_tick(),
            }
        }

        info!("Emergency Actor 已停止");
    }

    fn handle_command(&mut self, cmd: EmergencyCommand) {
        match cmd {
            EmergencyCommand::Start { reply } => {
                let outcome = self.start();
                let _ = reply.send(outcome);
            }

            EmergencyCommand::DriverResponse { reply } => {
                let cancelled = self.driver_response();
                let _ = reply.send(cancelled);
            }

            EmergencyCommand::Reset { reply } => {
                self.ticker = None;
                self.protocol.reset();
                self.event_bus.publish(AppEvent::EmergencyReset);
                info!("紧急状态已强制重置");
                let _ = reply.send(());
            }

            EmergencyCommand::AddContact { contact } => {
                info!("添加紧急联系人: {} ({})", contact.name, contact.relation);
                self.protocol.add_contact(contact);
            }

            EmergencyCommand::RemoveContact { index, reply } => {
                let result = self.protocol.remove_contact(index);
                if let Ok(contact) = &result {
                    info!("删除紧急联系人: {}", contact.name);
                }
                let _ = reply.send(result);
            }

            EmergencyCommand::GetState { reply } => {
                let _ = reply.send(self.protocol.state());
            }

            EmergencyCommand::HealthCheck { reply } => {
                let _ = reply.send(());
            }
        }
    }

    fn start(&mut self) -> StartOutcome {
        let now = Instant::now();
        let outcome = self.protocol.start(now);

        match &outcome {
            StartOutcome::Started { episode_id } => {
                let countdown_seconds = self.protocol.countdown_seconds();
                warn!("驾驶员无响应，紧急倒计时开始: {}秒", countdown_seconds);

                let mut ticker = interval_at(now + TICK_PERIOD, TICK_PERIOD);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
                self.ticker = Some(ticker);

                self.alert(INITIAL_ALERT);
                self.event_bus.publish(AppEvent::CountdownStarted {
                    episode_id: *episode_id,
                    countdown_seconds,
                });
            }
            StartOutcome::AlreadyActive => {
                debug!("紧急倒计时已在进行中，忽略");
            }
            StartOutcome::CoolingDown { remaining } => {
                debug!("紧急倒计时冷却中，剩余 {:?}，忽略", remaining);
            }
        }

        outcome
    }

    fn driver_response(&mut self) -> bool {
        let Some(cancellation) = self.protocol.driver_response() else {
            return false;
        };

        // 先清除计时器句柄，保证之后不会再 tick
        self.ticker = None;
        info!("驾驶员已响应，紧急协议取消 (剩余 {}秒)", cancellation.remaining);

        self.alert(CANCEL_ALERT);
        self.event_bus.publish(AppEvent::EmergencyCancelled {
            episode_id: cancellation.episode_id,
            remaining: cancellation.remaining,
        });
        true
    }

    fn on_tick(&mut self) {
        let episode_id = self.protocol.episode_id().unwrap_or_else(Uuid::nil);

        match self.protocol.tick() {
            TickOutcome::Ignored => {
                self.ticker = None;
            }
            TickOutcome::Counting {
                remaining,
                escalation,
            } => {
                self.event_bus.publish(AppEvent::CountdownTick {
                    episode_id,
                    remaining,
                });
                if let Some(message) = escalation {
                    warn!("紧急协议升级提示: 剩余 {}秒", remaining);
                    self.alert(&message);
                    self.event_bus.publish(AppEvent::EscalationAlert {
                        episode_id,
                        remaining,
                        message,
                    });
                }
            }
            TickOutcome::Expired => {
                self.ticker = None;
                self.event_bus.publish(AppEvent::CountdownTick {
                    episode_id,
                    remaining: 0,
                });
                self.spawn_location_capture(episode_id);
            }
        }
    }

    /// 后台定位，结果通过内部通道回到 Actor，期间命令照常处理
    fn spawn_location_capture(&self, episode_id: Uuid) {
        let provider = self.effectors.location.clone();
        let timeout = self.location_timeout;
        let located_tx = self.located_tx.clone();

        tokio::spawn(async move {
            let location = capture_location(provider, timeout).await;
            let _ = located_tx
                .send(LocationResolved {
                    episode_id,
                    location,
                })
                .await;
        });
    }

    fn on_location_resolved(&mut self, resolved: LocationResolved) {
        let LocationResolved {
            episode_id,
            location,
        } = resolved;

        if !self.protocol.mark_notified(episode_id, location) {
            info!("倒计时 {} 已结束或被取消，不再发送紧急通知", episode_id);
            return;
        }

        self.alert(FINAL_ALERT);

        let contacts = self.protocol.contacts().to_vec();
        let contact_count = contacts.len();
        let notifier = self.effectors.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(location, &contacts).await {
                error!("发送紧急通知失败: {}", e);
            }
        });

        error!("驾驶员无响应，已通知 {} 个紧急联系人", contact_count);
        self.event_bus.publish(AppEvent::EmergencyNotified {
            episode_id,
            location,
            contact_count,
        });
    }

    fn alert(&self, message: &str) {
        speak_detached(
            self.effectors.speaker.clone(),
            message.to_string(),
            VoiceOptions::emergency(),
        );
    }
}

/// 尽力获取位置，失败或超时返回 None
async fn capture_location(
    provider: Arc<dyn LocationProvider>,
    timeout: Duration,
) -> Option<Location> {
    match tokio::time::timeout(timeout, provider.current_location()).await {
        Ok(Ok(location)) => Some(location),
        Ok(Err(e)) => {
            warn!("获取位置失败，使用未知位置: {}", e);
            None
        }
        Err(_) => {
            warn!("获取位置超时({:?})，使用未知位置", timeout);
            None
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// 紧急协议Handle（可克隆）
#[derive(Clone)]
pub struct EmergencyHandle {
    sender: mpsc::Sender<EmergencyCommand>,
}

impl EmergencyHandle {
    /// 开始紧急倒计时
    pub async fn start_countdown(&self) -> Result<StartOutcome> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(EmergencyCommand::Start { reply })
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        rx.await.map_err(|_| anyhow::anyhow!("Actor已停止"))
    }

    /// 驾驶员响应，返回是否取消了正在进行的协议
    pub async fn handle_driver_response(&self) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(EmergencyCommand::DriverResponse { reply })
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        rx.await.map_err(|_| anyhow::anyhow!("Actor已停止"))
    }

    /// 强制重置
    pub async fn reset_emergency_state(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(EmergencyCommand::Reset { reply })
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        rx.await.map_err(|_| anyhow::anyhow!("Actor已停止"))
    }

    /// 添加紧急联系人
    pub async fn add_emergency_contact(&self, contact: EmergencyContact) -> Result<()> {
        self.sender
            .send(EmergencyCommand::AddContact { contact })
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        Ok(())
    }

    /// 删除紧急联系人
    pub async fn remove_emergency_contact(&self, index: usize) -> Result<EmergencyContact> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(EmergencyCommand::RemoveContact { index, reply })
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        rx.await.map_err(|_| anyhow::anyhow!("Actor已停止"))?
    }

    /// 获取状态
    pub async fn state(&self) -> Result<EmergencyState> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(EmergencyCommand::GetState { reply })
            .await
            .map_err(|_| anyhow::anyhow!("Actor通道已关闭"))?;
        rx.await.map_err(|_| anyhow::anyhow!("Actor已停止"))
    }

    /// 健康检查
    /// 返回true表示Actor正常运行，超时时间为5秒
    pub async fn health_check(&self) -> bool {
        let (reply, rx) = oneshot::channel();

        if self
            .sender
            .send(EmergencyCommand::HealthCheck { reply })
            .await
            .is_err()
        {
            warn!("Emergency Actor 健康检查失败: 通道已关闭");
            return false;
        }

        match tokio::time::timeout(Duration::from_secs(5), rx).await {
            Ok(Ok(())) => true,
            Ok(Err(_)) => {
                warn!("Emergency Actor 健康检查失败: Actor已停止");
                false
            }
            Err(_) => {
                warn!("Emergency Actor 健康检查失败: 超时(5秒)");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effectors::testing::{
        RecordingNotifier, RecordingSpeaker, SlowLocationProvider, TestEffectors,
    };
    use crate::effectors::{StaticLocationProvider, UnavailableLocationProvider};
    use crate::models::EmergencyPhase;
    use tokio::sync::broadcast;

    fn settings(duration: u32) -> EmergencySettings {
        EmergencySettings {
            countdown_duration: duration,
            ..Default::default()
        }
    }

    fn spawn(
        settings: &EmergencySettings,
        fx: &TestEffectors,
        location: Arc<dyn LocationProvider>,
    ) -> (EmergencyHandle, broadcast::Receiver<AppEvent>) {
        let bus = Arc::new(EventBus::new(512));
        let events = bus.subscribe();
        let (actor, handle) = EmergencyActor::new(settings, fx.effectors(location), bus);
        tokio::spawn(actor.run());
        (handle, events)
    }

    fn drain(events: &mut broadcast::Receiver<AppEvent>) -> Vec<AppEvent> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }

    async fn advance_secs(secs: f64) {
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unanswered_countdown_notifies_exactly_once() {
        for duration in [1, 3, 12] {
            let fx = TestEffectors::new();
            let (handle, _events) =
                spawn(&settings(duration), &fx, Arc::new(UnavailableLocationProvider));

            let outcome = handle.start_countdown().await.unwrap();
            assert!(matches!(outcome, StartOutcome::Started { .. }));

            advance_secs(duration as f64 + 0.5).await;

            let state = handle.state().await.unwrap();
            assert_eq!(state.phase, EmergencyPhase::Notified);
            assert!(state.is_active);
            assert!(state.notification_sent);
            assert_eq!(state.countdown_seconds, 0);
            assert_eq!(fx.notifier.call_count(), 1, "duration {}", duration);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_thirty_second_scenario() {
        let fx = TestEffectors::new();
        let (handle, mut events) =
            spawn(&settings(30), &fx, Arc::new(UnavailableLocationProvider));

        handle.start_countdown().await.unwrap();
        advance_secs(10.5).await;

        assert_eq!(fx.speaker.count_containing("activating in"), 1);
        assert_eq!(fx.speaker.count_containing("20 seconds"), 1);
        assert_eq!(fx.speaker.count_containing(INITIAL_ALERT), 1);
        assert_eq!(fx.notifier.call_count(), 0);

        advance_secs(20.0).await;

        assert_eq!(fx.notifier.call_count(), 1);
        let (location, contacts) = fx.notifier.last_call().unwrap();
        assert!(location.is_none());
        assert_eq!(contacts.len(), 3);
        assert_eq!(fx.speaker.count_containing("10 seconds"), 1);
        assert_eq!(fx.speaker.count_containing(FINAL_ALERT), 1);

        let state = handle.state().await.unwrap();
        assert!(state.notification_sent);

        let ticks: Vec<u32> = drain(&mut events)
            .into_iter()
            .filter_map(|e| match e {
                AppEvent::CountdownTick { remaining, .. } => Some(remaining),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, (0..30).rev().collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_repeat_notification_after_zero() {
        let fx = TestEffectors::new();
        let (handle, _events) = spawn(&settings(5), &fx, Arc::new(UnavailableLocationProvider));

        handle.start_countdown().await.unwrap();
        advance_secs(60.0).await;

        assert_eq!(fx.notifier.call_count(), 1);
        let state = handle.state().await.unwrap();
        assert_eq!(state.countdown_seconds, 0);
        assert_eq!(fx.speaker.count_containing(FINAL_ALERT), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_response_cancels_ticks() {
        let fx = TestEffectors::new();
        let (handle, mut events) =
            spawn(&settings(30), &fx, Arc::new(UnavailableLocationProvider));

        handle.start_countdown().await.unwrap();
        advance_secs(5.5).await;

        assert!(handle.handle_driver_response().await.unwrap());
        let state = handle.state().await.unwrap();
        assert!(!state.is_active);
        assert_eq!(state.countdown_seconds, 30);
        assert!(!state.notification_sent);

        let before = drain(&mut events);
        assert!(matches!(
            before.last(),
            Some(AppEvent::EmergencyCancelled { remaining: 25, .. })
        ));

        advance_secs(60.0).await;
        assert!(drain(&mut events).is_empty(), "取消后不应再有任何事件");
        assert_eq!(fx.notifier.call_count(), 0);
        assert_eq!(fx.speaker.count_containing(CANCEL_ALERT), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_response_when_idle_is_silent() {
        let fx = TestEffectors::new();
        let (handle, mut events) =
            spawn(&settings(30), &fx, Arc::new(UnavailableLocationProvider));

        assert!(!handle.handle_driver_response().await.unwrap());
        assert!(!handle.handle_driver_response().await.unwrap());
        advance_secs(1.0).await;

        assert!(fx.speaker.messages().is_empty());
        assert!(drain(&mut events).is_empty());
        assert_eq!(handle.state().await.unwrap().phase, EmergencyPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_within_cooldown() {
        let fx = TestEffectors::new();
        let (handle, mut events) =
            spawn(&settings(30), &fx, Arc::new(UnavailableLocationProvider));

        assert!(matches!(
            handle.start_countdown().await.unwrap(),
            StartOutcome::Started { .. }
        ));
        assert_eq!(
            handle.start_countdown().await.unwrap(),
            StartOutcome::AlreadyActive
        );

        advance_secs(1.0).await;
        handle.handle_driver_response().await.unwrap();
        assert!(matches!(
            handle.start_countdown().await.unwrap(),
            StartOutcome::CoolingDown { .. }
        ));

        advance_secs(4.5).await;
        assert!(matches!(
            handle.start_countdown().await.unwrap(),
            StartOutcome::Started { .. }
        ));
        advance_secs(0.1).await;

        let started = drain(&mut events)
            .into_iter()
            .filter(|e| matches!(e, AppEvent::CountdownStarted { .. }))
            .count();
        assert_eq!(started, 2);
        assert_eq!(fx.speaker.count_containing(INITIAL_ALERT), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_is_captured_when_available() {
        let fx = TestEffectors::new();
        let (handle, _events) = spawn(
            &settings(2),
            &fx,
            Arc::new(StaticLocationProvider::new(37.77, -122.42)),
        );

        handle.start_countdown().await.unwrap();
        advance_secs(2.5).await;

        let (location, _) = fx.notifier.last_call().unwrap();
        let location = location.unwrap();
        assert_eq!(location.latitude, 37.77);
        let state = handle.state().await.unwrap();
        assert_eq!(state.location.map(|l| l.longitude), Some(-122.42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_timeout_degrades_to_unknown() {
        let fx = TestEffectors::new();
        let mut settings = settings(2);
        settings.location_timeout_ms = 3_000;
        let (handle, _events) = spawn(
            &settings,
            &fx,
            Arc::new(SlowLocationProvider {
                delay: Duration::from_secs(60),
            }),
        );

        handle.start_countdown().await.unwrap();
        advance_secs(4.0).await;
        assert_eq!(fx.notifier.call_count(), 0);

        advance_secs(2.0).await;
        assert_eq!(fx.notifier.call_count(), 1);
        let (location, _) = fx.notifier.last_call().unwrap();
        assert!(location.is_none());
        assert!(handle.state().await.unwrap().notification_sent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_are_served_while_locating() {
        let fx = TestEffectors::new();
        let (handle, mut events) = spawn(
            &settings(2),
            &fx,
            Arc::new(SlowLocationProvider {
                delay: Duration::from_secs(60),
            }),
        );

        handle.start_countdown().await.unwrap();
        advance_secs(2.5).await;
        assert_eq!(
            handle.state().await.unwrap().phase,
            EmergencyPhase::Notified
        );

        let asked = Instant::now();
        assert!(handle.health_check().await);
        assert!(handle.handle_driver_response().await.unwrap());
        assert!(asked.elapsed() < Duration::from_millis(100));

        // 定位超时结束后也不应再通知已响应的驾驶员
        advance_secs(15.0).await;
        assert_eq!(fx.notifier.call_count(), 0);
        assert_eq!(fx.speaker.count_containing(FINAL_ALERT), 0);
        let state = handle.state().await.unwrap();
        assert!(!state.is_active);
        assert!(!state.notification_sent);
        assert!(!drain(&mut events)
            .iter()
            .any(|e| matches!(e, AppEvent::EmergencyNotified { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifier_failure_is_not_retried() {
        let fx = TestEffectors::with_notifier(RecordingNotifier::failing());
        let (handle, _events) = spawn(&settings(3), &fx, Arc::new(UnavailableLocationProvider));

        handle.start_countdown().await.unwrap();
        advance_secs(3.5).await;

        assert_eq!(fx.notifier.call_count(), 1);
        let state = handle.state().await.unwrap();
        assert!(state.notification_sent);
        assert_eq!(state.phase, EmergencyPhase::Notified);

        advance_secs(30.0).await;
        assert_eq!(fx.notifier.call_count(), 1);
        assert!(handle.health_check().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_speech_failure_does_not_block_transitions() {
        let fx = TestEffectors::with_speaker(RecordingSpeaker::failing());
        let (handle, _events) = spawn(&settings(3), &fx, Arc::new(UnavailableLocationProvider));

        handle.start_countdown().await.unwrap();
        advance_secs(3.5).await;

        assert!(!fx.speaker.messages().is_empty());
        assert_eq!(fx.notifier.call_count(), 1);
        assert!(handle.state().await.unwrap().notification_sent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_is_silent() {
        let fx = TestEffectors::new();
        let (handle, mut events) =
            spawn(&settings(30), &fx, Arc::new(UnavailableLocationProvider));

        handle.start_countdown().await.unwrap();
        advance_secs(2.5).await;
        handle.reset_emergency_state().await.unwrap();
        advance_secs(40.0).await;

        assert_eq!(fx.speaker.messages(), vec![INITIAL_ALERT.to_string()]);
        assert_eq!(fx.notifier.call_count(), 0);
        assert!(matches!(
            drain(&mut events).last(),
            Some(AppEvent::EmergencyReset)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_alerts_use_emergency_voice() {
        let fx = TestEffectors::new();
        let (handle, _events) = spawn(&settings(30), &fx, Arc::new(UnavailableLocationProvider));

        handle.start_countdown().await.unwrap();
        advance_secs(0.5).await;

        let voices = fx.speaker.voices();
        assert_eq!(voices, vec![VoiceOptions::emergency()]);
    }

    #[tokio::test]
    async fn test_contacts_through_handle() {
        let fx = TestEffectors::new();
        let (handle, _events) = spawn(&settings(30), &fx, Arc::new(UnavailableLocationProvider));

        handle
            .add_emergency_contact(EmergencyContact::new("Dr. Lee", "+15550100", "Doctor"))
            .await
            .unwrap();
        let removed = handle.remove_emergency_contact(1).await.unwrap();
        assert_eq!(removed.name, "John Smith");
        assert!(handle.remove_emergency_contact(99).await.is_err());

        let contacts = handle.state().await.unwrap().emergency_contacts;
        let names: Vec<_> = contacts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Emergency Services", "Sarah Johnson", "Dr. Lee"]);
    }

    #[tokio::test]
    async fn test_health_check() {
        let fx = TestEffectors::new();
        let (handle, _events) = spawn(&settings(30), &fx, Arc::new(UnavailableLocationProvider));
        assert!(handle.health_check().await);

        let bus = Arc::new(EventBus::new(8));
        let (actor, stopped) =
            EmergencyActor::new(&settings(30), fx.effectors(Arc::new(UnavailableLocationProvider)), bus);
        drop(actor);
        assert!(!stopped.health_check().await);
    }
}
