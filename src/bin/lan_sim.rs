//! 局域网数据包动画仿真（无窗口）
//!
//! 在后台线程中生成并推进数据包，主线程周期性排空更新通道，
//! 把事件渲染到标准输出。

use std::fs;
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use lansim_rs::net::Stats;
use lansim_rs::sim::{DEFAULT_RATE, SimConfig, SimulationController};
use lansim_rs::viz::{ConsoleRenderer, EventLog, UpdateReceiver, dispatch};

#[derive(Debug, Parser)]
#[command(name = "lan_sim", about = "星型局域网数据包动画仿真：终端 -> 交换机 -> 终端")]
struct Args {
    /// 每秒生成的数据包数（1-10）
    #[arg(long, default_value_t = DEFAULT_RATE)]
    rate: u32,
    /// 仿真运行多少毫秒后停止
    #[arg(long, default_value_t = 3_000)]
    run_ms: u64,
    /// 展示层排空更新通道的周期（毫秒）
    #[arg(long, default_value_t = 50)]
    poll_ms: u64,
    /// 固定随机种子
    #[arg(long)]
    seed: Option<u64>,
    /// JSON 配置文件（字段缺省时取默认值）
    #[arg(long)]
    config: Option<PathBuf>,
    /// 输出全部事件（JSON）
    #[arg(long)]
    events_json: Option<PathBuf>,
    /// 不打印控制台日志行
    #[arg(long)]
    quiet: bool,
}

struct Presentation {
    console: Option<ConsoleRenderer<io::Stdout>>,
    stats: Stats,
    events: Option<EventLog>,
}

impl Presentation {
    /// 排空当前所有事件，非阻塞
    fn drain(&mut self, rx: &UpdateReceiver) -> usize {
        let evs = rx.drain();
        let n = evs.len();
        for ev in evs {
            if let Some(console) = self.console.as_mut() {
                dispatch(console, &ev);
            }
            dispatch(&mut self.stats, &ev);
            if let Some(log) = self.events.as_mut() {
                log.push(ev);
            }
        }
        n
    }
}

fn main() {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path).expect("read config json");
            serde_json::from_str::<SimConfig>(&raw).expect("parse config json")
        }
        None => SimConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut ctl = match SimulationController::new(config) {
        Ok(ctl) => ctl,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };
    let rx = ctl.receiver();
    let mut view = Presentation {
        console: (!args.quiet).then(|| ConsoleRenderer::new(io::stdout(), ctl.endpoints())),
        stats: Stats::default(),
        events: args.events_json.as_ref().map(|_| EventLog::default()),
    };

    if let Err(e) = ctl.start(args.rate) {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    let poll = Duration::from_millis(args.poll_ms.max(1));
    let deadline = Instant::now() + Duration::from_millis(args.run_ms);
    while Instant::now() < deadline {
        view.drain(&rx);
        thread::sleep(poll);
    }

    ctl.stop();
    ctl.join();
    view.drain(&rx);

    let mean_delay_ms = view
        .stats
        .mean_delay()
        .map_or(0.0, |d| d.as_secs_f64() * 1_000.0);
    println!(
        "done rate={}, generated_pkts={}, delivered_pkts={}, delivered_bytes={}, mean_delay_ms={:.1}",
        args.rate,
        ctl.packets_generated(),
        view.stats.delivered_pkts,
        view.stats.delivered_bytes,
        mean_delay_ms
    );

    if let (Some(path), Some(log)) = (&args.events_json, &view.events) {
        let json = serde_json::to_string_pretty(&log.events).expect("serialize events");
        fs::write(path, json).expect("write events json");
        eprintln!("wrote events to {}", path.display());
    }
}
