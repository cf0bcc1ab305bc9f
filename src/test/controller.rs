use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::net::{EndpointStatus, PacketId, PacketState};
use crate::sim::{SimConfig, SimError, SimulationController};
use crate::viz::SimEvent;

fn fast_config() -> SimConfig {
    SimConfig {
        frame_ms: 5,
        relay_hold_ms: 0,
        progress_step: 0.25,
        seed: Some(11),
        ..SimConfig::default()
    }
}

fn run_state_changes(events: &[SimEvent]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|e| match e {
            SimEvent::RunStateChanged { running } => Some(*running),
            _ => None,
        })
        .collect()
}

#[test]
fn start_rejects_rates_outside_supported_range() {
    let mut ctl = SimulationController::new(fast_config()).expect("valid config");
    assert!(matches!(ctl.start(0), Err(SimError::InvalidRate(0))));
    assert!(!ctl.is_running());
    assert!(matches!(ctl.start(11), Err(SimError::InvalidRate(11))));
    assert!(!ctl.is_running());
    assert!(ctl.receiver().drain().is_empty());
}

#[test]
fn start_while_running_fails_without_state_change() {
    let mut ctl = SimulationController::new(fast_config()).expect("valid config");
    ctl.start(5).expect("start");
    assert!(ctl.is_running());
    assert!(matches!(ctl.start(5), Err(SimError::AlreadyRunning)));
    assert!(ctl.is_running());
    assert_eq!(ctl.rate(), Some(5));

    ctl.stop();
    ctl.join();
}

#[test]
fn stop_is_idempotent() {
    let mut ctl = SimulationController::new(fast_config()).expect("valid config");
    ctl.stop();
    assert!(!ctl.is_running());

    ctl.start(10).expect("start");
    thread::sleep(Duration::from_millis(30));
    ctl.stop();
    let generated = ctl.packets_generated();
    ctl.stop();
    assert!(!ctl.is_running());
    ctl.join();
    assert_eq!(ctl.packets_generated(), generated);

    let events = ctl.receiver().drain();
    assert_eq!(run_state_changes(&events), vec![true, false]);
}

#[test]
fn running_simulation_delivers_packets() {
    let mut ctl = SimulationController::new(fast_config()).expect("valid config");
    let rx = ctl.receiver();
    ctl.start(10).expect("start");
    thread::sleep(Duration::from_millis(400));
    ctl.stop();
    ctl.join();

    let events = rx.drain();
    let generated = ctl.packets_generated();
    assert!(generated >= 2, "generated {generated}");

    let delivered: Vec<PacketId> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::Delivered(d) => Some(d.packet),
            _ => None,
        })
        .collect();
    assert!(!delivered.is_empty());
    assert!(delivered.iter().all(|id| id.0 >= 1 && id.0 <= generated));

    for ev in &events {
        if let SimEvent::RenderFrame { packets } = ev {
            assert!(packets.iter().all(|p| (0.0..=1.0).contains(&p.progress)));
        }
    }
}

#[test]
fn restart_after_stop_begins_from_empty_state() {
    let mut ctl = SimulationController::new(fast_config()).expect("valid config");
    let rx = ctl.receiver();

    ctl.start(10).expect("first run");
    thread::sleep(Duration::from_millis(120));
    ctl.stop();
    ctl.join();
    let first = rx.drain();
    assert!(first.iter().any(|e| matches!(e, SimEvent::RenderFrame { packets } if !packets.is_empty())));

    ctl.start(10).expect("second run");
    thread::sleep(Duration::from_millis(20));
    ctl.stop();
    ctl.join();
    let second = rx.drain();

    assert_eq!(second.first(), Some(&SimEvent::RunStateChanged { running: true }));
    let first_total = second.iter().find_map(|e| match e {
        SimEvent::PacketsGenerated { total } => Some(*total),
        _ => None,
    });
    assert_eq!(first_total, Some(1));

    let generated = ctl.packets_generated();
    let first_frame = second
        .iter()
        .find_map(|e| match e {
            SimEvent::RenderFrame { packets } => Some(packets),
            _ => None,
        })
        .expect("at least one frame");
    assert!(first_frame.iter().all(|p| p.id.0 <= generated));
    for ev in &second {
        if let SimEvent::RenderFrame { packets } = ev {
            assert!(packets.iter().all(|p| p.id.0 <= generated));
        }
    }
}

#[test]
fn stop_then_immediate_start_is_allowed() {
    let mut ctl = SimulationController::new(fast_config()).expect("valid config");
    let rx = ctl.receiver();
    ctl.start(3).expect("start");
    thread::sleep(Duration::from_millis(30));
    ctl.stop();
    ctl.start(4).expect("restart without waiting");
    assert!(ctl.is_running());
    assert_eq!(ctl.rate(), Some(4));
    thread::sleep(Duration::from_millis(30));
    ctl.stop();
    ctl.join();
    assert!(!ctl.is_running());

    let events = rx.drain();
    let second_start = events
        .iter()
        .rposition(|e| *e == SimEvent::RunStateChanged { running: true })
        .expect("second start");
    let first_frame = events[second_start..]
        .iter()
        .find_map(|e| match e {
            SimEvent::RenderFrame { packets } => Some(packets),
            _ => None,
        })
        .expect("frame in second run");
    // 新一轮第一帧最多只有刚生成的 #1
    assert!(first_frame.len() <= 1);
    assert!(first_frame.iter().all(|p| p.id == PacketId(1) && p.state == PacketState::Created));
}

#[test]
fn restart_without_join_drops_events_from_previous_run() {
    let cfg = SimConfig {
        frame_ms: 1,
        relay_hold_ms: 300,
        progress_step: 1.0,
        seed: Some(2),
        ..SimConfig::default()
    };
    let mut ctl = SimulationController::new(cfg).expect("valid config");
    let rx = ctl.receiver();

    // 第一轮的 #1 停在交换机上，停顿要到新一轮开始后才结束
    ctl.start(1).expect("first run");
    thread::sleep(Duration::from_millis(100));
    ctl.stop();
    ctl.start(1).expect("second run");
    thread::sleep(Duration::from_millis(250));
    ctl.stop();
    ctl.join();

    let events = rx.drain();
    let second_start = events
        .iter()
        .rposition(|e| *e == SimEvent::RunStateChanged { running: true })
        .expect("second start");
    let window = &events[second_start..];

    // 新一轮的 #1 还在停顿中，不可能已经转发
    let leaked: Vec<&SimEvent> = window
        .iter()
        .filter(|e| match e {
            SimEvent::EndpointStatus { status, .. } => *status == EndpointStatus::Receiving,
            SimEvent::RenderFrame { packets } => {
                packets.iter().any(|p| p.state == PacketState::InTransit || p.id.0 > 1)
            }
            SimEvent::Delivered(_) => true,
            _ => false,
        })
        .collect();
    assert!(leaked.is_empty(), "stale events in second run: {leaked:?}");
    assert_eq!(
        window.last(),
        Some(&SimEvent::RunStateChanged { running: false })
    );
}

fn fail_generator_spawn(
    name: &'static str,
    f: Box<dyn FnOnce() + Send + 'static>,
) -> io::Result<JoinHandle<()>> {
    if name == "packet-generator" {
        return Err(io::Error::other("thread limit reached"));
    }
    thread::Builder::new().name(name.into()).spawn(f)
}

#[test]
fn failed_spawn_reports_stopped_run() {
    let mut ctl = SimulationController::new(fast_config())
        .expect("valid config")
        .with_spawner(fail_generator_spawn);
    let rx = ctl.receiver();

    let err = ctl.start(5).expect_err("generator spawn fails");
    assert!(matches!(err, SimError::Spawn { name: "packet-generator", .. }));
    assert!(!ctl.is_running());

    ctl.join();
    assert_eq!(ctl.pending_threads(), 0);
    let events = rx.drain();
    assert_eq!(run_state_changes(&events), vec![true, false]);
    assert_eq!(events.last(), Some(&SimEvent::RunStateChanged { running: false }));
}

#[test]
fn repeated_restarts_reap_finished_threads() {
    let mut ctl = SimulationController::new(fast_config()).expect("valid config");
    for _ in 0..4 {
        ctl.start(10).expect("start");
        ctl.stop();
        // 生成器最多睡一个 100ms 周期
        thread::sleep(Duration::from_millis(250));
    }
    ctl.start(10).expect("start");
    assert_eq!(ctl.pending_threads(), 2);
    ctl.stop();
    ctl.join();
    assert_eq!(ctl.pending_threads(), 0);
}

#[test]
fn controller_rejects_invalid_config() {
    let cfg = SimConfig {
        terminals: vec!["only".into()],
        ..SimConfig::default()
    };
    assert!(matches!(
        SimulationController::new(cfg),
        Err(SimError::InvalidConfig(_))
    ));
}
