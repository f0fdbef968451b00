//! Agendalight host simulator.
//!
//! Runs the real tick loop against console adapters so the controller
//! can be exercised without a device.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  ConsolePanel      ScriptedTouch   FetchWorker   SystemClock │
//! │  (LED/BL/Buzz/Rnd) (TouchPort)     (Calendar)    (ClockPort) │
//! │  LogEventSink      MemoryStorage                             │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              TickOrchestrator (pure logic)             │  │
//! │  │  Gestures · Power FSM · Indicator · Alerts · Refresh   │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::thread;
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use log::{info, warn};

use agendalight::adapters::console::{ConsolePanel, ScriptedTouch};
use agendalight::adapters::fetch_worker::FetchWorker;
use agendalight::adapters::log_sink::LogEventSink;
use agendalight::adapters::memory::{InMemoryCalendar, MemoryStorage};
use agendalight::adapters::time::SystemClock;
use agendalight::app::commands::AppCommand;
use agendalight::app::ports::ClockPort;
use agendalight::app::service::TickOrchestrator;
use agendalight::calendar::Event;
use agendalight::config::SystemConfig;
use agendalight::gesture::TouchSample;

#[derive(Parser)]
#[command(name = "agendalight")]
#[command(about = "Ambient desk calendar controller simulator", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON file with a `SystemConfig` (defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of events to serve (a demo agenda when omitted)
    #[arg(long)]
    events: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value = "200")]
    ticks: u64,

    /// Fail every n-th fetch (0 = never)
    #[arg(long, default_value = "0")]
    fail_every: u32,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("========================================");
    info!("  Agendalight simulator v{}", env!("CARGO_PKG_VERSION"));
    info!("========================================");

    // ── Configuration ─────────────────────────────────────────
    let config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<SystemConfig>(&raw)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => SystemConfig::default(),
    };
    let tick = StdDuration::from_millis(u64::from(config.tick_interval_ms));

    // ── Calendar ──────────────────────────────────────────────
    let events = match &cli.events {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<Vec<Event>>(&raw)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => demo_agenda()?,
    };
    let mut source = FetchWorker::spawn(InMemoryCalendar::new(events).failing_every(cli.fail_every))
        .context("spawning fetch worker")?;

    // ── Adapters ──────────────────────────────────────────────
    let clock = SystemClock::new();
    let mut sink = LogEventSink::new();
    let mut panel = ConsolePanel::new();
    let mut storage = MemoryStorage::new();
    // One swipe to page two, then back, half a second apart.
    let mut touch = ScriptedTouch::new([
        TouchSample::press(300, 200, 1000),
        TouchSample::press(200, 205, 1100),
        TouchSample::release(200, 205, 1200),
        TouchSample::press(200, 200, 1700),
        TouchSample::press(300, 200, 1800),
        TouchSample::release(300, 200, 1900),
    ]);

    // ── Core ──────────────────────────────────────────────────
    let mut app = TickOrchestrator::new(config, clock.now())?;
    app.start(&mut sink);

    for n in 0..cli.ticks {
        touch.advance_to(clock.uptime_ms());
        let batch = app.tick(&clock, &mut touch, &mut source, &mut sink);
        app.apply(&batch, &mut panel);

        if n == cli.ticks / 2 {
            app.handle_command(AppCommand::RequestRefresh, clock.uptime_ms(), &mut source, &mut sink);
        }
        thread::sleep(tick);
    }

    if let Err(e) = app.save(&mut storage) {
        warn!("Could not save resume state: {e}");
    }
    info!(
        "Done: {} ticks, {} frames, {} alerts, final {:?}",
        app.tick_count(),
        panel.frames,
        panel.alerts,
        app.power_state()
    );
    Ok(())
}

/// A short agenda relative to now: one meeting in progress, one about to
/// start, one later today and an all-day entry.
fn demo_agenda() -> Result<Vec<Event>> {
    let now = Utc::now();
    let m = Duration::minutes;
    Ok(vec![
        Event::timed("standup", now - m(5), now + m(10), "Standup")?,
        Event::timed("review", now + m(14), now + m(44), "Design review")?,
        Event::timed("retro", now + m(50), now + m(110), "Canceled: Retro")?,
        Event::timed("1on1", now + m(180), now + m(210), "1:1")?,
        Event::all_day("offsite", now - m(60), None, "Team offsite")?,
    ])
}
