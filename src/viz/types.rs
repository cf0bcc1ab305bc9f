use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::net::{EndpointId, EndpointStatus, Packet, PacketId, PacketState};

/// 后台任务发往展示层的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimEvent {
    /// 人类可读的跟踪行（控制台）
    Log { message: String },
    /// 终端状态变化
    EndpointStatus {
        endpoint: EndpointId,
        status: EndpointStatus,
    },
    /// 交换机缓冲区当前长度
    SwitchActivity { count: usize },
    /// 每个 tick 一次：所有仍在途数据包的快照
    RenderFrame { packets: Vec<PacketSnapshot> },
    /// 本轮运行累计生成的数据包数
    PacketsGenerated { total: u64 },
    /// 数据包送达（统计用）
    Delivered(Delivery),
    /// 仿真启动 / 停止
    RunStateChanged { running: bool },
}

impl SimEvent {
    pub fn log(message: impl Into<String>) -> Self {
        SimEvent::Log {
            message: message.into(),
        }
    }
}

/// 一跳的端点：终端或中继节点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HopEnd {
    Terminal(EndpointId),
    Relay,
}

/// 渲染器绘制一个数据包所需的全部信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketSnapshot {
    pub id: PacketId,
    pub state: PacketState,
    pub src: EndpointId,
    pub dst: EndpointId,
    /// 当前这一跳上的归一化位置 [0, 1]
    pub progress: f64,
    pub color: String,
}

impl PacketSnapshot {
    /// 当前所在的一跳 (起点, 终点)；停在交换机上时不在链路上，返回 None
    pub fn hop(&self) -> Option<(HopEnd, HopEnd)> {
        match self.state {
            PacketState::Created => Some((HopEnd::Terminal(self.src), HopEnd::Relay)),
            PacketState::InTransit => Some((HopEnd::Relay, HopEnd::Terminal(self.dst))),
            PacketState::AtSwitch | PacketState::Delivered => None,
        }
    }

    /// 在两个屏幕坐标之间线性插值
    pub fn position(&self, from: (f64, f64), to: (f64, f64)) -> (f64, f64) {
        let t = self.progress.clamp(0.0, 1.0);
        (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
    }
}

impl From<&Packet> for PacketSnapshot {
    fn from(pkt: &Packet) -> Self {
        Self {
            id: pkt.id,
            state: pkt.state(),
            src: pkt.src,
            dst: pkt.dst,
            progress: pkt.progress(),
            color: pkt.color().to_string(),
        }
    }
}

/// 送达记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub packet: PacketId,
    pub src: EndpointId,
    pub dst: EndpointId,
    pub size_bytes: u32,
    /// 端到端时延（微秒）
    pub delay_us: u64,
}

impl Delivery {
    pub fn delay(&self) -> Duration {
        Duration::from_micros(self.delay_us)
    }
}

/// 一个简单的事件收集器（存内存，运行结束写 JSON 文件）
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<SimEvent>,
}

impl EventLog {
    pub fn push(&mut self, ev: SimEvent) {
        self.events.push(ev);
    }
}
