//! tabdash-demo - Exercises the dashboard with busy log and monitor tabs.
//!
//! Three log tabs fill at different rates while a monitor tab tracks two
//! synthetic metrics. Switch tabs with the arrow keys, quit with Ctrl-C.
//! Diagnostics go to stderr, so redirect with `2>demo.log` when using -v.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{Level, warn};
use tracing_subscriber::EnvFilter;

use tabdash::engine::{Dashboard, DashboardConfig};
use tabdash::log::{LogLevel, LogTab, Logger};
use tabdash::monitor::MonitorTab;
use tabdash::monitor::watcher::WatcherDisplay;

/// Demo dashboard with self-filling tabs.
#[derive(Parser)]
#[command(name = "tabdash-demo", about = "Tabbed dashboard demo")]
struct Args {
    /// Directory for log files and startup archives.
    #[arg(short, long, default_value = "Logs")]
    logs_dir: String,

    /// Pause between frames in milliseconds.
    #[arg(short, long, default_value = "100")]
    frame_ms: u64,

    /// Stop after this many seconds. 0 runs until Ctrl-C.
    #[arg(short, long, default_value = "0")]
    run_secs: u64,

    /// Increase logging verbosity (-v for info, -vv for debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN, // The dashboard owns stdout, stay quiet by default
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("tabdash={}", level).parse().unwrap())
        .add_directive(format!("tabdash_demo={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Spawns a thread that appends one numbered entry per `pause` to a fresh
/// log tab.
fn start_log_feed(
    dashboard: &Dashboard,
    name: &str,
    level: LogLevel,
    pause: Duration,
    running: Arc<AtomicBool>,
) {
    let tab = LogTab::new(name);
    if let Err(e) = dashboard.register(tab.clone()) {
        warn!("could not register {}: {}", name, e);
        return;
    }
    let log = Logger::new(dashboard, tab);

    thread::spawn(move || {
        thread::sleep(Duration::from_secs(1));
        let mut i: u64 = 0;
        while running.load(Ordering::SeqCst) {
            match level {
                LogLevel::Debug => log.debug(i),
                LogLevel::Info => log.info(i),
                LogLevel::Warning => log.warning(i),
                LogLevel::Error => log.error(i),
                LogLevel::Fatal => log.fatal(i),
            }
            i += 1;
            thread::sleep(pause);
        }
    });
}

/// Spawns a thread that feeds two synthetic metrics to a monitor tab.
fn start_monitor_feed(dashboard: &Dashboard, running: Arc<AtomicBool>) {
    let tab = MonitorTab::new("Metrics");
    if let Err(e) = dashboard.register(tab.clone()) {
        warn!("could not register Metrics: {}", e);
        return;
    }

    let ticks = match tab.num_watcher("ticks", WatcherDisplay::default()) {
        Ok(w) => w,
        Err(e) => {
            warn!("could not add watcher: {}", e);
            return;
        }
    };
    let latency = match tab.num_watcher("latency_ms", WatcherDisplay::all()) {
        Ok(w) => w,
        Err(e) => {
            warn!("could not add watcher: {}", e);
            return;
        }
    };

    thread::spawn(move || {
        let mut i: u64 = 0;
        while running.load(Ordering::SeqCst) {
            ticks.update(i as f64);
            // A wobbly sawtooth, so min, avg and max all differ.
            latency.update(5.0 + (i % 40) as f64 + if i % 7 == 0 { 12.0 } else { 0.0 });
            i += 1;
            thread::sleep(Duration::from_millis(250));
        }
    });
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let config = DashboardConfig {
        frame_interval: Duration::from_millis(args.frame_ms),
        logs_dir: args.logs_dir.into(),
        ..DashboardConfig::default()
    };
    let dashboard = Dashboard::with_config(config);

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    start_log_feed(
        &dashboard,
        "InfoTab",
        LogLevel::Info,
        Duration::from_millis(1000),
        running.clone(),
    );
    start_log_feed(
        &dashboard,
        "DebugTab",
        LogLevel::Debug,
        Duration::from_millis(200),
        running.clone(),
    );
    start_log_feed(
        &dashboard,
        "WarningTab",
        LogLevel::Warning,
        Duration::from_millis(20),
        running.clone(),
    );
    start_monitor_feed(&dashboard, running.clone());

    // Sleep with periodic checks for shutdown, Ctrl-C inside the dashboard
    // or the optional deadline.
    let mut remaining = Duration::from_secs(args.run_secs);
    let timed = args.run_secs > 0;
    while running.load(Ordering::SeqCst) && dashboard.is_running() {
        let sleep_time = if timed {
            if remaining.is_zero() {
                break;
            }
            remaining.min(Duration::from_millis(100))
        } else {
            Duration::from_millis(100)
        };
        thread::sleep(sleep_time);
        if timed {
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    running.store(false, Ordering::SeqCst);
    dashboard.stop();
}
