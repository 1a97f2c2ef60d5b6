// 驾驶员注意力守护 - 主库
//
// 注意力采样 -> 紧急倒计时协议 / 智能回复 -> 语音播报、紧急通知

// 声明模块
pub mod actors;
pub mod app;
pub mod effectors;
pub mod emergency;
pub mod event_bus;
pub mod llm;
pub mod logger;
pub mod models;
pub mod monitor;
pub mod responder;
pub mod sampler;
pub mod settings;

pub use app::GuardApp;
pub use emergency::{EmergencyProtocol, StartOutcome, TickOutcome};
pub use event_bus::{AppEvent, EventBus};
pub use models::{AttentionSample, EmergencyContact, EmergencyState, Emotion};
