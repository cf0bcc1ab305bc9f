//! 文本控制台渲染器
//!
//! 无窗口环境下的展示层：带时间戳的日志行、终端状态变化和交换机活动。
//! 帧快照不逐帧打印，只记录最近一帧的在途数量。

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use tracing::{trace, warn};

use crate::net::{EndpointId, EndpointStatus, Endpoints};

use super::renderer::Renderer;
use super::types::PacketSnapshot;

pub struct ConsoleRenderer<W: Write> {
    out: W,
    endpoints: Arc<Endpoints>,
    started: Instant,
    statuses: HashMap<EndpointId, EndpointStatus>,
    last_frame_len: usize,
    write_failed: bool,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W, endpoints: Arc<Endpoints>) -> Self {
        Self {
            out,
            endpoints,
            started: Instant::now(),
            statuses: HashMap::new(),
            last_frame_len: 0,
            write_failed: false,
        }
    }

    /// 最近一次画面中的在途数据包数
    pub fn last_frame_len(&self) -> usize {
        self.last_frame_len
    }

    pub fn status(&self, id: EndpointId) -> EndpointStatus {
        self.statuses.get(&id).copied().unwrap_or(EndpointStatus::Idle)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        let t = self.started.elapsed().as_secs_f64();
        if let Err(e) = writeln!(self.out, "[{t:>8.3}s] {text}") {
            if !self.write_failed {
                warn!(error = %e, "控制台输出失败");
                self.write_failed = true;
            }
        }
    }
}

fn status_label(status: EndpointStatus) -> &'static str {
    match status {
        EndpointStatus::Idle => "空闲",
        EndpointStatus::Sending => "发送",
        EndpointStatus::Receiving => "接收",
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn on_log(&mut self, message: &str) {
        self.line(message);
    }

    fn on_endpoint_status(&mut self, endpoint: EndpointId, status: EndpointStatus) {
        // 状态没变就不刷屏
        if self.statuses.insert(endpoint, status) == Some(status) {
            return;
        }
        let name = self.endpoints.label(endpoint);
        self.line(&format!("{name}: {}", status_label(status)));
    }

    fn on_switch_activity(&mut self, count: usize) {
        let relay = self.endpoints.relay_name().to_string();
        self.line(&format!("{relay} 活动: {count} 个数据包"));
    }

    fn on_frame(&mut self, packets: &[PacketSnapshot]) {
        trace!(in_flight = packets.len(), "绘制一帧");
        self.last_frame_len = packets.len();
    }

    fn on_run_state(&mut self, running: bool) {
        if !running {
            self.statuses.clear();
        }
    }
}
