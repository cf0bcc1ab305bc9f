//! 更新通道
//!
//! 多生产者 / 单消费者、无界、永不阻塞生产者。展示层每个周期以非阻塞方式
//! 排空当前所有事件。单个生产者内部保持 FIFO，跨生产者不保证顺序。

use std::sync::{Arc, PoisonError, RwLock};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::trace;

use super::renderer::{Renderer, dispatch};
use super::types::SimEvent;

/// 创建一对更新通道端点
pub fn update_channel() -> (UpdateSender, UpdateReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (UpdateSender { tx, gate: None }, UpdateReceiver { rx })
}

/// 一轮运行的发送闸门。
///
/// 关闭后，绑定它的发送端不再投递任何事件；`close` 返回时，
/// 所有正在进行的投递都已完成。
#[derive(Debug)]
pub struct RunGate {
    open: RwLock<bool>,
}

impl RunGate {
    pub fn new() -> Self {
        Self {
            open: RwLock::new(true),
        }
    }

    pub fn is_open(&self) -> bool {
        *self.open.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// 关闭闸门，返回关闭前是否打开
    pub fn close(&self) -> bool {
        let mut open = self.open.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *open, false)
    }
}

impl Default for RunGate {
    fn default() -> Self {
        Self::new()
    }
}

/// 生产者端；可随意克隆给后台任务
#[derive(Debug, Clone)]
pub struct UpdateSender {
    tx: Sender<SimEvent>,
    gate: Option<Arc<RunGate>>,
}

impl UpdateSender {
    /// 绑定到某一轮运行的发送端：闸门关闭后发送被静默丢弃
    pub fn gated(&self, gate: Arc<RunGate>) -> UpdateSender {
        UpdateSender {
            tx: self.tx.clone(),
            gate: Some(gate),
        }
    }

    /// 发送事件。通道无界，从不阻塞；展示层已经退出或所属运行已停止时事件被丢弃。
    pub fn send(&self, ev: SimEvent) {
        let Some(gate) = self.gate.as_ref() else {
            self.deliver(ev);
            return;
        };
        // 持有读锁直到投递完成，`close` 拿到写锁后不会再有旧事件进入通道
        let open = gate.open.read().unwrap_or_else(PoisonError::into_inner);
        if !*open {
            trace!("所属运行已停止，丢弃事件");
            return;
        }
        self.deliver(ev);
    }

    fn deliver(&self, ev: SimEvent) {
        if self.tx.send(ev).is_err() {
            trace!("展示层已断开，丢弃事件");
        }
    }

    pub fn log(&self, message: impl Into<String>) {
        self.send(SimEvent::log(message));
    }
}

/// 消费者端（展示层）
#[derive(Debug, Clone)]
pub struct UpdateReceiver {
    rx: Receiver<SimEvent>,
}

impl UpdateReceiver {
    /// 非阻塞地取出当前可用的全部事件
    pub fn drain(&self) -> Vec<SimEvent> {
        self.rx.try_iter().collect()
    }

    /// 排空并把每个事件分派给渲染器，返回处理的事件数
    pub fn drain_into(&self, renderer: &mut dyn Renderer) -> usize {
        let mut n = 0;
        loop {
            match self.rx.try_recv() {
                Ok(ev) => {
                    dispatch(renderer, &ev);
                    n += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        n
    }

    /// 非阻塞地取出一个事件
    pub fn try_next(&self) -> Option<SimEvent> {
        self.rx.try_recv().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }
}
