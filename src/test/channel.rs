use std::sync::Arc;
use std::thread;

use crate::net::{EndpointId, EndpointStatus};
use crate::viz::{PacketSnapshot, Renderer, RunGate, SimEvent, update_channel};

#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
}

impl Renderer for Recorder {
    fn on_log(&mut self, message: &str) {
        self.calls.push(format!("log:{message}"));
    }

    fn on_endpoint_status(&mut self, endpoint: EndpointId, status: EndpointStatus) {
        self.calls.push(format!("status:{}:{status:?}", endpoint.0));
    }

    fn on_switch_activity(&mut self, count: usize) {
        self.calls.push(format!("switch:{count}"));
    }

    fn on_frame(&mut self, packets: &[PacketSnapshot]) {
        self.calls.push(format!("frame:{}", packets.len()));
    }
}

#[test]
fn drain_on_empty_channel_returns_immediately() {
    let (_tx, rx) = update_channel();
    assert!(rx.is_empty());
    assert!(rx.drain().is_empty());
    assert_eq!(rx.try_next(), None);
}

#[test]
fn drain_into_dispatches_each_event_kind() {
    let (tx, rx) = update_channel();
    tx.log("hello");
    tx.send(SimEvent::EndpointStatus {
        endpoint: EndpointId(2),
        status: EndpointStatus::Sending,
    });
    tx.send(SimEvent::SwitchActivity { count: 3 });
    tx.send(SimEvent::RenderFrame { packets: Vec::new() });
    tx.send(SimEvent::PacketsGenerated { total: 4 });
    assert_eq!(rx.len(), 5);

    let mut rec = Recorder::default();
    assert_eq!(rx.drain_into(&mut rec), 5);
    assert_eq!(
        rec.calls,
        vec!["log:hello", "status:2:Sending", "switch:3", "frame:0"]
    );
    assert!(rx.is_empty());
}

#[test]
fn events_keep_per_producer_order_across_threads() {
    let (tx, rx) = update_channel();
    let producers: Vec<_> = (0..2u64)
        .map(|p| {
            let tx = tx.clone();
            thread::spawn(move || {
                for i in 0..500u64 {
                    tx.send(SimEvent::PacketsGenerated { total: p * 1_000 + i });
                }
            })
        })
        .collect();
    for h in producers {
        h.join().expect("producer");
    }

    let events = rx.drain();
    assert_eq!(events.len(), 1_000);
    for p in 0..2u64 {
        let seq: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                SimEvent::PacketsGenerated { total } if total / 1_000 == p => Some(total % 1_000),
                _ => None,
            })
            .collect();
        assert_eq!(seq, (0..500).collect::<Vec<_>>());
    }
}

#[test]
fn send_after_consumer_dropped_does_not_panic() {
    let (tx, rx) = update_channel();
    drop(rx);
    tx.log("nobody listening");
}

#[test]
fn events_serialize_with_kind_tag() {
    let ev = SimEvent::SwitchActivity { count: 2 };
    let v = serde_json::to_value(&ev).expect("serialize");
    assert_eq!(v["kind"], "switch_activity");
    assert_eq!(v["count"], 2);

    let ev = SimEvent::EndpointStatus {
        endpoint: EndpointId(1),
        status: EndpointStatus::Receiving,
    };
    let v = serde_json::to_value(&ev).expect("serialize");
    assert_eq!(v["kind"], "endpoint_status");
    assert_eq!(v["status"], "receiving");
}

#[test]
fn gated_sender_goes_quiet_once_its_run_is_closed() {
    let (tx, rx) = update_channel();
    let gate = Arc::new(RunGate::new());
    let run_tx = tx.gated(Arc::clone(&gate));

    run_tx.log("before");
    assert!(gate.close());
    assert!(!gate.close());
    assert!(!gate.is_open());
    run_tx.log("after");
    tx.log("controller");

    let messages: Vec<String> = rx
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            SimEvent::Log { message } => Some(message),
            _ => None,
        })
        .collect();
    assert_eq!(messages, vec!["before", "controller"]);
}
