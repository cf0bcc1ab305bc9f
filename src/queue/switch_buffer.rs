//! 交换机缓冲区
//!
//! 记录当前停留在中继节点、尚未转发的数据包。

use std::collections::VecDeque;

use crate::net::PacketId;

/// 中继节点上的数据包多重集（按到达顺序保存）
#[derive(Debug, Default, Clone)]
pub struct SwitchBuffer {
    q: VecDeque<PacketId>,
}

impl SwitchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 数据包到达中继节点
    pub fn push(&mut self, id: PacketId) {
        self.q.push_back(id);
    }

    /// 数据包被转发离开：移除一次出现，不存在时返回 false
    pub fn remove(&mut self, id: PacketId) -> bool {
        match self.q.iter().position(|&p| p == id) {
            Some(idx) => {
                self.q.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: PacketId) -> bool {
        self.q.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PacketId> + '_ {
        self.q.iter().copied()
    }

    pub fn clear(&mut self) {
        self.q.clear();
    }
}
