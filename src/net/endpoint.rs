//! 终端与中继节点
//!
//! 星型拓扑：若干具名终端，全部经由唯一的中继节点（交换机）转发。
//! 拓扑属于配置，运行期间不变。

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::id::EndpointId;
use crate::sim::SimError;

/// 终端状态（展示层据此着色）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointStatus {
    Idle,
    Sending,
    Receiving,
}

/// 终端集合 + 中继节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    terminals: Vec<String>,
    relay: String,
}

impl Endpoints {
    /// 至少需要两个互不相同的终端才能选出 (源, 目的) 对
    pub fn new<I, S>(terminals: I, relay: impl Into<String>) -> Result<Self, SimError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terminals: Vec<String> = terminals.into_iter().map(Into::into).collect();
        let relay = relay.into();
        if terminals.len() < 2 {
            return Err(SimError::InvalidConfig(format!(
                "至少需要 2 个终端，实际 {}",
                terminals.len()
            )));
        }
        for (i, name) in terminals.iter().enumerate() {
            if terminals[..i].contains(name) || *name == relay {
                return Err(SimError::InvalidConfig(format!("终端名称重复: {name}")));
            }
        }
        Ok(Self { terminals, relay })
    }

    pub fn len(&self) -> usize {
        self.terminals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terminals.is_empty()
    }

    pub fn relay_name(&self) -> &str {
        &self.relay
    }

    /// 终端名称；未知 id 返回 None
    pub fn name(&self, id: EndpointId) -> Option<&str> {
        self.terminals.get(id.0).map(String::as_str)
    }

    /// 按名称查找终端
    pub fn find(&self, name: &str) -> Option<EndpointId> {
        self.terminals.iter().position(|t| t == name).map(EndpointId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EndpointId, &str)> {
        self.terminals
            .iter()
            .enumerate()
            .map(|(i, n)| (EndpointId(i), n.as_str()))
    }

    /// 均匀随机地选出一对不同的 (源, 目的) 终端
    pub fn pick_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> (EndpointId, EndpointId) {
        let n = self.terminals.len();
        let src = rng.gen_range(0..n);
        // 在剩余 n-1 个终端中均匀选取，跳过 src
        let mut dst = rng.gen_range(0..n - 1);
        if dst >= src {
            dst += 1;
        }
        (EndpointId(src), EndpointId(dst))
    }

    /// 用于日志的名称；未知 id 显示为 `?<idx>`
    pub(crate) fn label(&self, id: EndpointId) -> String {
        self.name(id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("?{}", id.0))
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            terminals: ["PC1", "PC2", "PC3", "PC4"].map(String::from).to_vec(),
            relay: "SWITCH".to_string(),
        }
    }
}
