//! 数据包类型
//!
//! 定义模拟数据包及其生命周期状态机：
//! `created -> at_switch -> in_transit -> delivered`，只允许向前推进。

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::id::{EndpointId, PacketId};

/// 到达一跳终点的判定容差（累加 0.02 五十次不一定恰好等于 1.0）
const PROGRESS_EPSILON: f64 = 1e-9;

/// 显示颜色表，按 id 取模
pub const PACKET_PALETTE: [&str; 6] = [
    "#FF5733", "#33FF57", "#3357FF", "#F333FF", "#FF33F3", "#33FFF3",
];

/// 数据包生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketState {
    /// 从源终端前往中继节点
    Created,
    /// 在中继节点排队
    AtSwitch,
    /// 从中继节点前往目的终端
    InTransit,
    /// 终态：只会被上报，不会被存储
    Delivered,
}

impl PacketState {
    /// 状态机中的下一个状态
    pub fn next(self) -> Option<PacketState> {
        match self {
            PacketState::Created => Some(PacketState::AtSwitch),
            PacketState::AtSwitch => Some(PacketState::InTransit),
            PacketState::InTransit => Some(PacketState::Delivered),
            PacketState::Delivered => None,
        }
    }

    /// 该状态下数据包是否在链路上移动
    pub fn is_moving(self) -> bool {
        matches!(self, PacketState::Created | PacketState::InTransit)
    }
}

/// 非法状态迁移
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: PacketState,
    pub to: PacketState,
}

/// 按 id 确定性地取显示颜色
pub fn color_for(id: PacketId) -> &'static str {
    PACKET_PALETTE[(id.0 % PACKET_PALETTE.len() as u64) as usize]
}

/// 模拟数据包
#[derive(Debug, Clone)]
pub struct Packet {
    pub id: PacketId,
    pub src: EndpointId,
    pub dst: EndpointId,
    pub size_bytes: u32,
    pub created_at: Instant,
    state: PacketState,
    progress: f64, // 当前这一跳上的归一化位置 [0, 1]
}

impl Packet {
    /// 创建处于 `created` 状态、进度为 0 的数据包
    pub fn new(
        id: PacketId,
        src: EndpointId,
        dst: EndpointId,
        size_bytes: u32,
        created_at: Instant,
    ) -> Self {
        Self {
            id,
            src,
            dst,
            size_bytes,
            created_at,
            state: PacketState::Created,
            progress: 0.0,
        }
    }

    pub fn state(&self) -> PacketState {
        self.state
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn color(&self) -> &'static str {
        color_for(self.id)
    }

    /// 截至 `now` 的端到端时延；`now` 早于创建时间时为 0
    pub fn delay_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// 沿当前这一跳前进 `step`，返回是否到达这一跳终点。
    ///
    /// 进度被钳制在 [0, 1]；到达时精确置为 1.0。
    pub(crate) fn advance(&mut self, step: f64) -> bool {
        let next = (self.progress + step).clamp(0.0, 1.0);
        if next >= 1.0 - PROGRESS_EPSILON {
            self.progress = 1.0;
            true
        } else {
            self.progress = next;
            false
        }
    }

    /// 迁移到下一个状态；进入新的一跳时进度归零
    pub(crate) fn transition(&mut self, to: PacketState) -> Result<(), InvalidTransition> {
        if self.state.next() != Some(to) {
            return Err(InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        if to != PacketState::Delivered {
            self.progress = 0.0;
        }
        Ok(())
    }
}
