//! 数据包生成器
//!
//! 后台任务：按固定速率创建数据包，经由专用通道交给动画引擎。
//! 生成器自身从不修改在途集合。

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::net::{EndpointStatus, Endpoints, Packet, PacketId};
use crate::viz::{SimEvent, UpdateSender};

pub struct PacketGenerator {
    endpoints: Arc<Endpoints>,
    rate: u32,
    size_range: RangeInclusive<u32>,
    next_id: u64,
    rng: StdRng,
    handoff: Sender<Packet>,
    updates: UpdateSender,
    generated: Arc<AtomicU64>,
}

impl PacketGenerator {
    /// `rate` 应已校验为正数；id 从 1 开始分配
    pub fn new(
        endpoints: Arc<Endpoints>,
        rate: u32,
        size_range: RangeInclusive<u32>,
        seed: Option<u64>,
        handoff: Sender<Packet>,
        updates: UpdateSender,
    ) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            endpoints,
            rate: rate.max(1),
            size_range,
            next_id: 1,
            rng,
            handoff,
            updates,
            generated: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 本轮累计生成数的共享计数器
    pub fn counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.generated)
    }

    /// 两次生成之间的间隔：1/rate 秒
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.rate))
    }

    /// 生成一个数据包并交给动画引擎。
    ///
    /// 动画引擎一侧已经退出时返回 None。
    pub fn generate(&mut self, now: Instant) -> Option<PacketId> {
        let (src, dst) = self.endpoints.pick_pair(&mut self.rng);
        let size_bytes = self.rng.gen_range(self.size_range.clone());

        let id = PacketId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let pkt = Packet::new(id, src, dst, size_bytes, now);
        if self.handoff.send(pkt).is_err() {
            debug!(pkt_id = id.0, "动画引擎已退出，停止生成");
            return None;
        }
        let total = self.generated.fetch_add(1, Ordering::Relaxed) + 1;

        self.updates.send(SimEvent::EndpointStatus {
            endpoint: src,
            status: EndpointStatus::Sending,
        });
        self.updates.log(format!(
            "数据包 {id}: {} -> {}, 大小: {size_bytes} 字节",
            self.endpoints.label(src),
            self.endpoints.label(dst),
        ));
        self.updates.send(SimEvent::PacketsGenerated { total });

        debug!(pkt_id = id.0, src = ?src, dst = ?dst, size_bytes, total, "📦 生成数据包");
        Some(id)
    }

    /// 生成循环：每轮开头检查运行标志，之后休眠一个周期
    pub fn run(mut self, running: Arc<AtomicBool>) {
        info!(rate = self.rate, "▶️  生成器启动");
        let period = self.period();
        while running.load(Ordering::Acquire) {
            if self.generate(Instant::now()).is_none() {
                break;
            }
            thread::sleep(period);
        }
        info!(
            generated = self.generated.load(Ordering::Relaxed),
            "⏹️  生成器退出"
        );
    }
}
