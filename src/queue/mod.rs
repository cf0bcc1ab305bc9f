//! 中继节点排队
//!
//! 目前只有交换机缓冲区：记录处于 `at_switch` 状态的数据包。

mod switch_buffer;

pub use switch_buffer::SwitchBuffer;
