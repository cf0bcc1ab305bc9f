//! 仿真控制器
//!
//! 管理生成器与动画引擎两个后台线程的生命周期，向 UI 层暴露启动 / 停止。
//! 每轮运行拥有独立的运行标志、发送闸门与状态：`stop` 返回后，
//! 旧线程即使晚退出也不会再向展示层投递事件。

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use super::config::{SimConfig, check_rate};
use super::engine::AnimationEngine;
use super::error::SimError;
use super::generator::PacketGenerator;
use crate::net::Endpoints;
use crate::viz::{RunGate, SimEvent, UpdateReceiver, UpdateSender, update_channel};

/// 启动具名后台线程
pub(crate) type SpawnFn =
    fn(&'static str, Box<dyn FnOnce() + Send + 'static>) -> io::Result<JoinHandle<()>>;

fn spawn_named(
    name: &'static str,
    f: Box<dyn FnOnce() + Send + 'static>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name(name.into()).spawn(f)
}

/// 一轮运行
struct Run {
    rate: u32,
    running: Arc<AtomicBool>,
    gate: Arc<RunGate>,
    generated: Arc<AtomicU64>,
    handles: Vec<JoinHandle<()>>,
}

impl Run {
    /// 关闭闸门并通知线程退出，返回此前是否在运行
    fn halt(&self) -> bool {
        let was_open = self.gate.close();
        self.running.store(false, Ordering::Release);
        was_open
    }
}

pub struct SimulationController {
    config: SimConfig,
    endpoints: Arc<Endpoints>,
    updates: UpdateSender,
    receiver: UpdateReceiver,
    current: Option<Run>,
    retired: Vec<JoinHandle<()>>,
    spawn: SpawnFn,
}

impl SimulationController {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let endpoints = Arc::new(config.endpoints()?);
        let (updates, receiver) = update_channel();
        Ok(Self {
            config,
            endpoints,
            updates,
            receiver,
            current: None,
            retired: Vec::new(),
            spawn: spawn_named,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_spawner(mut self, spawn: SpawnFn) -> Self {
        self.spawn = spawn;
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn endpoints(&self) -> Arc<Endpoints> {
        Arc::clone(&self.endpoints)
    }

    /// 展示层的消费端
    pub fn receiver(&self) -> UpdateReceiver {
        self.receiver.clone()
    }

    pub fn is_running(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|run| run.gate.is_open())
    }

    /// 当前（或最近一轮）运行的速率
    pub fn rate(&self) -> Option<u32> {
        self.current.as_ref().map(|run| run.rate)
    }

    /// 当前（或最近一轮）运行累计生成的数据包数
    pub fn packets_generated(&self) -> u64 {
        self.current
            .as_ref()
            .map_or(0, |run| run.generated.load(Ordering::Relaxed))
    }

    /// 尚未回收的后台线程数（含当前一轮）
    pub fn pending_threads(&self) -> usize {
        self.retired.len() + self.current.as_ref().map_or(0, |run| run.handles.len())
    }

    /// 启动一轮新的仿真，立即返回。
    ///
    /// 速率先于运行状态校验；失败时不启动任何线程。
    #[tracing::instrument(skip(self))]
    pub fn start(&mut self, rate: u32) -> Result<(), SimError> {
        let rate = check_rate(rate)?;
        if self.is_running() {
            return Err(SimError::AlreadyRunning);
        }
        if let Some(prev) = self.current.take() {
            self.retired.extend(prev.handles);
        }
        self.reap_finished();

        let running = Arc::new(AtomicBool::new(true));
        let gate = Arc::new(RunGate::new());
        let run_updates = self.updates.gated(Arc::clone(&gate));
        let (handoff_tx, handoff_rx) = crossbeam_channel::unbounded();

        let generator = PacketGenerator::new(
            Arc::clone(&self.endpoints),
            rate,
            self.config.size_range(),
            self.config.seed,
            handoff_tx,
            run_updates.clone(),
        );
        let generated = generator.counter();
        let engine = AnimationEngine::new(
            Arc::clone(&self.endpoints),
            self.config.progress_step,
            self.config.relay_hold(),
            handoff_rx,
            run_updates,
        );

        self.updates.send(SimEvent::RunStateChanged { running: true });
        self.updates.log("数据包传输已启动");

        let mut run = Run {
            rate,
            running,
            gate,
            generated,
            handles: Vec::with_capacity(2),
        };

        let frame = self.config.frame_period();
        let flag = Arc::clone(&run.running);
        let launched = (self.spawn)("animation-engine", Box::new(move || engine.run(flag, frame)))
            .map_err(|source| ("animation-engine", source))
            .and_then(|h| {
                run.handles.push(h);
                let flag = Arc::clone(&run.running);
                (self.spawn)("packet-generator", Box::new(move || generator.run(flag)))
                    .map_err(|source| ("packet-generator", source))
            });

        match launched {
            Ok(h) => run.handles.push(h),
            Err((name, source)) => {
                warn!(thread = name, error = %source, "后台线程启动失败");
                run.halt();
                self.retired.append(&mut run.handles);
                self.updates.send(SimEvent::RunStateChanged { running: false });
                return Err(SimError::Spawn { name, source });
            }
        }

        info!(rate, "▶️  仿真启动");
        self.current = Some(run);
        Ok(())
    }

    /// 通知两个后台任务在当前迭代后退出；不等待。重复调用无副作用。
    ///
    /// 返回后本轮线程不再向展示层投递任何事件。
    #[tracing::instrument(skip(self))]
    pub fn stop(&mut self) {
        let Some(run) = self.current.as_ref() else {
            return;
        };
        if !run.halt() {
            debug!("仿真未在运行，忽略 stop");
            return;
        }
        let total = run.generated.load(Ordering::Relaxed);
        self.updates.log("数据包传输已停止");
        self.updates.log(format!("共生成数据包: {total}"));
        self.updates.send(SimEvent::RunStateChanged { running: false });
        info!(generated = total, "⏹️  仿真停止");
    }

    /// 等待所有已停止运行的后台线程退出；正在运行的一轮不受影响
    pub fn join(&mut self) {
        if !self.is_running() {
            if let Some(run) = self.current.as_mut() {
                self.retired.append(&mut run.handles);
            }
        }
        for handle in self.retired.drain(..) {
            join_logged(handle);
        }
    }

    /// 回收已经退出的旧线程，避免反复启停时句柄堆积
    fn reap_finished(&mut self) {
        let (done, pending): (Vec<_>, Vec<_>) = self
            .retired
            .drain(..)
            .partition(|h| h.is_finished());
        self.retired = pending;
        for handle in done {
            join_logged(handle);
        }
    }
}

fn join_logged(handle: JoinHandle<()>) {
    let name = handle.thread().name().unwrap_or("?").to_string();
    if handle.join().is_err() {
        warn!(thread = %name, "后台线程异常退出");
    }
}

impl Drop for SimulationController {
    fn drop(&mut self) {
        self.stop();
    }
}
