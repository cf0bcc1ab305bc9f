//! 统计信息
//!
//! 由展示层根据排空的事件累计。

use std::time::Duration;

use super::endpoint::EndpointStatus;
use super::id::EndpointId;
use crate::viz::{Delivery, PacketSnapshot, Renderer};

/// 仿真统计信息
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Stats {
    pub generated_pkts: u64,
    pub delivered_pkts: u64,
    pub delivered_bytes: u64,
    pub total_delay: Duration,
    pub max_delay: Duration,
}

impl Stats {
    /// 平均端到端时延；尚无送达时返回 None
    pub fn mean_delay(&self) -> Option<Duration> {
        if self.delivered_pkts == 0 {
            return None;
        }
        let n = u32::try_from(self.delivered_pkts).unwrap_or(u32::MAX);
        Some(self.total_delay / n)
    }

    /// 记录一次送达
    pub fn record_delivery(&mut self, d: &Delivery) {
        let delay = d.delay();
        self.delivered_pkts = self.delivered_pkts.saturating_add(1);
        self.delivered_bytes = self.delivered_bytes.saturating_add(u64::from(d.size_bytes));
        self.total_delay = self.total_delay.saturating_add(delay);
        self.max_delay = self.max_delay.max(delay);
    }
}

/// 统计只关心计数类事件，其余回调为空操作
impl Renderer for Stats {
    fn on_log(&mut self, _message: &str) {}

    fn on_endpoint_status(&mut self, _endpoint: EndpointId, _status: EndpointStatus) {}

    fn on_switch_activity(&mut self, _count: usize) {}

    fn on_frame(&mut self, _packets: &[PacketSnapshot]) {}

    fn on_packets_generated(&mut self, total: u64) {
        self.generated_pkts = self.generated_pkts.max(total);
    }

    fn on_delivered(&mut self, delivery: &Delivery) {
        self.record_delivery(delivery);
    }

    fn on_run_state(&mut self, running: bool) {
        // 新一轮运行从零开始计数
        if running {
            *self = Stats::default();
        }
    }
}
