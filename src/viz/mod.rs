//! 展示层接口（更新通道 + 渲染回调）
//!
//! 设计目标：
//! - **结构化**：后台任务发送带类型的事件，而不是拼接文本
//! - **不阻塞**：通道无界，展示层以非阻塞方式排空
//! - **可回放**：事件可序列化为 JSON

mod channel;
mod console;
mod renderer;
mod types;

pub use channel::{RunGate, UpdateReceiver, UpdateSender, update_channel};
pub use console::ConsoleRenderer;
pub use renderer::{Renderer, dispatch};
pub use types::{Delivery, EventLog, HopEnd, PacketSnapshot, SimEvent};
