//! 网络模型模块
//!
//! 此模块包含模拟网络的静态部分（终端、中继节点）与数据包实体。

// 子模块声明
mod endpoint;
mod id;
mod packet;
mod stats;

// 重新导出公共接口
pub use endpoint::{EndpointStatus, Endpoints};
pub use id::{EndpointId, PacketId};
pub use packet::{InvalidTransition, PACKET_PALETTE, Packet, PacketState, color_for};
pub use stats::Stats;
