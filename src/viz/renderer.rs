//! 渲染器接口
//!
//! 画布、控制台等具体呈现由外部实现；核心只通过这些回调与之交互。

use crate::net::{EndpointId, EndpointStatus};

use super::types::{Delivery, PacketSnapshot, SimEvent};

/// 展示层回调
pub trait Renderer {
    fn on_log(&mut self, message: &str);
    fn on_endpoint_status(&mut self, endpoint: EndpointId, status: EndpointStatus);
    fn on_switch_activity(&mut self, count: usize);
    fn on_frame(&mut self, packets: &[PacketSnapshot]);

    fn on_packets_generated(&mut self, _total: u64) {}
    fn on_delivered(&mut self, _delivery: &Delivery) {}
    fn on_run_state(&mut self, _running: bool) {}
}

/// 把一个事件分派到对应回调
pub fn dispatch(renderer: &mut dyn Renderer, ev: &SimEvent) {
    match ev {
        SimEvent::Log { message } => renderer.on_log(message),
        SimEvent::EndpointStatus { endpoint, status } => {
            renderer.on_endpoint_status(*endpoint, *status)
        }
        SimEvent::SwitchActivity { count } => renderer.on_switch_activity(*count),
        SimEvent::RenderFrame { packets } => renderer.on_frame(packets),
        SimEvent::PacketsGenerated { total } => renderer.on_packets_generated(*total),
        SimEvent::Delivered(d) => renderer.on_delivered(d),
        SimEvent::RunStateChanged { running } => renderer.on_run_state(*running),
    }
}
