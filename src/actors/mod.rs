// Actor模块 - 使用Actor模式管理并发状态
//
// 每个Actor独占自己的状态，通过消息传递访问，无需Arc<Mutex<T>>

pub mod emergency;
pub mod responder;

pub use emergency::{EmergencyActor, EmergencyCommand, EmergencyHandle};
pub use responder::{ResponderActor, ResponderCommand, ResponderHandle};
