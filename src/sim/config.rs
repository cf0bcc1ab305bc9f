//! 仿真配置
//!
//! 拓扑、帧周期、中继停留时间等在启动前确定，运行期间只读。

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::SimError;
use crate::net::Endpoints;

/// 支持的生成速率（包/秒）
pub const MIN_RATE: u32 = 1;
pub const MAX_RATE: u32 = 10;

pub const DEFAULT_RATE: u32 = 2;
/// 20 FPS
pub const DEFAULT_FRAME_MS: u64 = 50;
pub const DEFAULT_RELAY_HOLD_MS: u64 = 100;
pub const DEFAULT_PROGRESS_STEP: f64 = 0.02;
pub const DEFAULT_MIN_PKT_BYTES: u32 = 50;
pub const DEFAULT_MAX_PKT_BYTES: u32 = 500;

/// 校验速率
pub fn check_rate(rate: u32) -> Result<u32, SimError> {
    if (MIN_RATE..=MAX_RATE).contains(&rate) {
        Ok(rate)
    } else {
        Err(SimError::InvalidRate(rate))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub terminals: Vec<String>,
    pub relay: String,
    /// 动画帧周期（毫秒）
    pub frame_ms: u64,
    /// 数据包在中继节点上的处理停顿（毫秒），在动画线程内同步等待
    pub relay_hold_ms: u64,
    /// 每个 tick 的进度增量，不做 delta-time 补偿
    pub progress_step: f64,
    pub min_pkt_bytes: u32,
    pub max_pkt_bytes: u32,
    /// 固定随机种子（复现用）
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let endpoints = Endpoints::default();
        Self {
            terminals: endpoints.iter().map(|(_, n)| n.to_string()).collect(),
            relay: endpoints.relay_name().to_string(),
            frame_ms: DEFAULT_FRAME_MS,
            relay_hold_ms: DEFAULT_RELAY_HOLD_MS,
            progress_step: DEFAULT_PROGRESS_STEP,
            min_pkt_bytes: DEFAULT_MIN_PKT_BYTES,
            max_pkt_bytes: DEFAULT_MAX_PKT_BYTES,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        self.endpoints()?;
        if self.frame_ms == 0 {
            return Err(SimError::InvalidConfig("frame_ms 必须大于 0".into()));
        }
        if !(self.progress_step > 0.0 && self.progress_step <= 1.0) {
            return Err(SimError::InvalidConfig(format!(
                "progress_step 必须在 (0, 1] 内，实际 {}",
                self.progress_step
            )));
        }
        if self.min_pkt_bytes > self.max_pkt_bytes {
            return Err(SimError::InvalidConfig(format!(
                "数据包大小范围为空: {}..={}",
                self.min_pkt_bytes, self.max_pkt_bytes
            )));
        }
        Ok(())
    }

    pub fn endpoints(&self) -> Result<Endpoints, SimError> {
        Endpoints::new(self.terminals.iter().cloned(), self.relay.clone())
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    pub fn relay_hold(&self) -> Duration {
        Duration::from_millis(self.relay_hold_ms)
    }

    pub fn size_range(&self) -> RangeInclusive<u32> {
        self.min_pkt_bytes..=self.max_pkt_bytes
    }
}
