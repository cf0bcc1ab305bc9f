//! 错误类型
//!
//! 控制面的错误；数据包级别的异常在动画引擎内部被跳过，不会上抛。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// 仿真已在运行，状态未改变
    #[error("simulation is already running")]
    AlreadyRunning,
    /// 速率超出支持范围，没有启动任何任务
    #[error("rate {0} is outside the supported range 1..=10 packets/s")]
    InvalidRate(u32),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to spawn {name} thread")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}
