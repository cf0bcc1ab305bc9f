//! 动画引擎
//!
//! 后台任务：每个 tick 把所有在途数据包推进一步，驱动状态机并发出事件。
//! 引擎是在途集合与交换机缓冲区的唯一写者；生成器的新包在 tick 开头收取。

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use tracing::{debug, info, trace, warn};

use crate::net::{EndpointStatus, Endpoints, Packet, PacketId, PacketState};
use crate::queue::SwitchBuffer;
use crate::viz::{Delivery, PacketSnapshot, SimEvent, UpdateSender};

/// 单个数据包在一个 tick 内的处理结果
enum Step {
    Keep,
    Delivered,
    Skip(&'static str),
}

/// 一个 tick 的汇总
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickSummary {
    pub admitted: usize,
    pub arrived: usize,
    pub forwarded: usize,
    pub delivered: Vec<PacketId>,
    pub skipped: usize,
}

pub struct AnimationEngine {
    endpoints: Arc<Endpoints>,
    step: f64,
    relay_hold: Duration,
    inbox: Receiver<Packet>,
    in_flight: Vec<Packet>,
    known: HashSet<PacketId>,
    switch: SwitchBuffer,
    updates: UpdateSender,
    ticks: u64,
}

impl AnimationEngine {
    /// 以空的在途集合与空缓冲区开始
    pub fn new(
        endpoints: Arc<Endpoints>,
        step: f64,
        relay_hold: Duration,
        inbox: Receiver<Packet>,
        updates: UpdateSender,
    ) -> Self {
        Self {
            endpoints,
            step,
            relay_hold,
            inbox,
            in_flight: Vec::new(),
            known: HashSet::new(),
            switch: SwitchBuffer::new(),
            updates,
            ticks: 0,
        }
    }

    pub fn in_flight(&self) -> &[Packet] {
        &self.in_flight
    }

    pub fn switch_buffer(&self) -> &SwitchBuffer {
        &self.switch
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// 收取生成器交来的新包；重复 id 或状态不是 `created` 的包被拒绝
    fn admit(&mut self) -> (usize, usize) {
        let mut admitted = 0;
        let mut rejected = 0;
        for pkt in self.inbox.try_iter() {
            if pkt.state() != PacketState::Created || !self.known.insert(pkt.id) {
                warn!(pkt_id = pkt.id.0, state = ?pkt.state(), "拒绝异常的新数据包");
                rejected += 1;
                continue;
            }
            trace!(pkt_id = pkt.id.0, "数据包进入在途集合");
            self.in_flight.push(pkt);
            admitted += 1;
        }
        (admitted, rejected)
    }

    /// 推进一帧：先收取新包，再对每个在途包执行恰好一步状态迁移，
    /// 最后发出一帧快照。
    #[tracing::instrument(skip(self, now), fields(tick = self.ticks))]
    pub fn tick(&mut self, now: Instant) -> TickSummary {
        let (admitted, rejected) = self.admit();
        let mut summary = TickSummary {
            admitted,
            skipped: rejected,
            ..TickSummary::default()
        };

        let packets = std::mem::take(&mut self.in_flight);
        let mut kept = Vec::with_capacity(packets.len());
        for mut pkt in packets {
            let before = pkt.state();
            match self.step_packet(&mut pkt, now) {
                Step::Keep => {
                    match (before, pkt.state()) {
                        (PacketState::Created, PacketState::AtSwitch) => summary.arrived += 1,
                        (PacketState::AtSwitch, PacketState::InTransit) => summary.forwarded += 1,
                        _ => {}
                    }
                    kept.push(pkt);
                }
                Step::Delivered => {
                    self.known.remove(&pkt.id);
                    summary.delivered.push(pkt.id);
                }
                Step::Skip(reason) => {
                    // 无法修复的包直接丢弃，保证动画继续
                    warn!(pkt_id = pkt.id.0, state = ?pkt.state(), reason, "跳过异常数据包");
                    self.known.remove(&pkt.id);
                    self.switch.remove(pkt.id);
                    summary.skipped += 1;
                }
            }
        }
        self.in_flight = kept;

        self.updates.send(SimEvent::RenderFrame {
            packets: self.in_flight.iter().map(PacketSnapshot::from).collect(),
        });
        self.ticks = self.ticks.saturating_add(1);

        debug!(
            in_flight = self.in_flight.len(),
            at_switch = self.switch.len(),
            admitted = summary.admitted,
            delivered = summary.delivered.len(),
            "帧完成"
        );
        summary
    }

    fn step_packet(&mut self, pkt: &mut Packet, now: Instant) -> Step {
        match pkt.state() {
            PacketState::Created => {
                if !pkt.advance(self.step) {
                    return Step::Keep;
                }
                if pkt.transition(PacketState::AtSwitch).is_err() {
                    return Step::Skip("无法进入 at_switch");
                }
                self.switch.push(pkt.id);
                self.updates.send(SimEvent::SwitchActivity {
                    count: self.switch.len(),
                });
                self.updates.log(format!(
                    "数据包 {} 到达 {}",
                    pkt.id,
                    self.endpoints.relay_name()
                ));
                Step::Keep
            }
            PacketState::AtSwitch => {
                if !self.switch.contains(pkt.id) {
                    return Step::Skip("at_switch 但不在交换机缓冲区中");
                }
                // 同步停顿：整帧一起冻结
                if !self.relay_hold.is_zero() {
                    thread::sleep(self.relay_hold);
                }
                if pkt.transition(PacketState::InTransit).is_err() {
                    return Step::Skip("无法进入 in_transit");
                }
                self.switch.remove(pkt.id);
                self.updates.send(SimEvent::SwitchActivity {
                    count: self.switch.len(),
                });
                self.updates.send(SimEvent::EndpointStatus {
                    endpoint: pkt.dst,
                    status: EndpointStatus::Receiving,
                });
                Step::Keep
            }
            PacketState::InTransit => {
                if !pkt.advance(self.step) {
                    return Step::Keep;
                }
                if pkt.transition(PacketState::Delivered).is_err() {
                    return Step::Skip("无法进入 delivered");
                }
                let delay = pkt.delay_at(now);
                self.updates.log(format!(
                    "数据包 {} 已送达 {} (时延: {} ms)",
                    pkt.id,
                    self.endpoints.label(pkt.dst),
                    delay.as_millis()
                ));
                self.updates.send(SimEvent::Delivered(Delivery {
                    packet: pkt.id,
                    src: pkt.src,
                    dst: pkt.dst,
                    size_bytes: pkt.size_bytes,
                    delay_us: u64::try_from(delay.as_micros()).unwrap_or(u64::MAX),
                }));
                for endpoint in [pkt.src, pkt.dst] {
                    self.updates.send(SimEvent::EndpointStatus {
                        endpoint,
                        status: EndpointStatus::Idle,
                    });
                }
                Step::Delivered
            }
            PacketState::Delivered => Step::Skip("delivered 不应留在在途集合中"),
        }
    }

    /// 动画循环：每轮开头检查运行标志，之后休眠一个帧周期
    pub fn run(mut self, running: Arc<AtomicBool>, frame: Duration) {
        info!(frame_ms = frame.as_millis() as u64, "▶️  动画引擎启动");
        while running.load(Ordering::Acquire) {
            self.tick(Instant::now());
            thread::sleep(frame);
        }
        info!(
            ticks = self.ticks,
            in_flight = self.in_flight.len(),
            "⏹️  动画引擎退出"
        );
    }
}
