//! 仿真核心模块
//!
//! 此模块包含数据包生成器、动画引擎以及管理二者生命周期的控制器。

// 子模块声明
mod config;
mod controller;
mod engine;
mod error;
mod generator;

// 重新导出公共接口
pub use config::{
    DEFAULT_FRAME_MS, DEFAULT_PROGRESS_STEP, DEFAULT_RATE, DEFAULT_RELAY_HOLD_MS, MAX_RATE,
    MIN_RATE, SimConfig, check_rate,
};
pub use controller::SimulationController;
pub use engine::{AnimationEngine, TickSummary};
pub use error::SimError;
pub use generator::PacketGenerator;
