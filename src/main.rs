//! airwatch entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  SimulatedHardware   ConfigFileStore   FileHistoryLog        │
//! │  (Gas+Prox+Display)  (BaselinePort)    (HistoryLog)          │
//! │  IqAirClient         AdafruitIo        LogEventSink          │
//! │  (AqiSource)         (TelemetryPort)   (EventSink)           │
//! │                                                              │
//! │  ───────────────── Port Trait Boundary ──────────────────    │
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐    │
//! │  │        MonitorService (tick loop, main thread)       │    │
//! │  │   classify · baseline bookkeeping · alert FSM        │    │
//! │  └──────────────────────────────────────────────────────┘    │
//! │                          │ SharedState                       │
//! │  Runner threads: aqi-poll, telemetry (one each)              │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod args;

use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use chrono::{DateTime, TimeDelta, Utc};
use clap::Parser as _;
use log::{info, warn};

use airwatch::adapters::adafruit::AdafruitIo;
use airwatch::adapters::config_file::ConfigFileStore;
use airwatch::adapters::history::FileHistoryLog;
use airwatch::adapters::iqair::IqAirClient;
use airwatch::adapters::log_sink::LogEventSink;
use airwatch::adapters::sim::SimulatedHardware;
use airwatch::adapters::time::SystemClock;
use airwatch::app::jobs::{AqiPollJob, TelemetryJob};
use airwatch::app::ports::ClockPort;
use airwatch::app::service::MonitorService;
use airwatch::app::shared::SharedState;
use airwatch::config::MonitorConfig;
use airwatch::scheduler::{Job, Runner, Scheduler};

use args::Args;

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    if let Err(e) = run() {
        eprintln!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

fn run() -> Result<()> {
    let args = Args::parse();

    let config = MonitorConfig::load(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;
    let timing = config.timing;
    let http_timeout = Duration::from_secs(timing.http_timeout_secs);

    info!("airwatch v{} starting", env!("CARGO_PKG_VERSION"));

    let clock = SystemClock;
    let shared = Arc::new(SharedState::new());
    let sink = LogEventSink::new();

    let mut service = MonitorService::new(
        SimulatedHardware::new(),
        ConfigFileStore::new(&args.config),
        FileHistoryLog::new(&config.logs),
        sink,
        Arc::clone(&shared),
        secs(timing.candidate_interval_secs)?,
    );

    service.start(clock.now()).context("failed to start the gas sensor")?;
    service.warm_up(&clock, Duration::from_secs(timing.warmup_timeout_secs), thread::sleep);

    // ── Background jobs ───────────────────────────────────────
    // One runner per job: a slow HTTP call in one never delays the other.
    let now = clock.now();
    let mut runners = Vec::new();
    match (&config.iqair, config.location) {
        // First poll right away so advice is available early.
        (Some(iqair), Some(location)) => runners.push(spawn_job(
            Box::new(AqiPollJob::new(
                IqAirClient::new(iqair, location, http_timeout),
                Arc::clone(&shared),
                sink,
            )),
            now,
            secs(timing.aqi_poll_interval_secs)?,
        )?),
        _ => info!("Outdoor AQI poll disabled (no iqair/location section)"),
    }
    match &config.adafruit {
        Some(adafruit) => {
            let interval = secs(timing.telemetry_interval_secs)?;
            runners.push(spawn_job(
                Box::new(TelemetryJob::new(
                    AdafruitIo::new(adafruit, http_timeout),
                    Arc::clone(&shared),
                    sink,
                )),
                now + interval,
                interval,
            )?);
        }
        None => info!("Telemetry upload disabled (no adafruit section)"),
    }

    // ── Tick loop ─────────────────────────────────────────────
    let tick = Duration::from_millis(timing.tick_interval_ms);
    let mut done = 0u64;
    while args.ticks.is_none_or(|limit| done < limit) {
        let started = Instant::now();
        if let Err(e) = service.tick(clock.now()) {
            warn!("Tick skipped: {}", e);
        }
        done += 1;
        thread::sleep(tick.saturating_sub(started.elapsed()));
    }

    info!("Stopping after {} tick(s)", done);
    for runner in runners {
        runner.shutdown();
    }
    Ok(())
}

fn spawn_job(job: Box<dyn Job>, first_fire: DateTime<Utc>, interval: TimeDelta) -> Result<Runner> {
    let label = job.label();
    let mut scheduler = Scheduler::new();
    scheduler.add(job, first_fire, interval);
    Runner::spawn(scheduler, SystemClock).with_context(|| format!("failed to spawn the '{label}' runner"))
}

fn secs(n: u64) -> Result<TimeDelta> {
    TimeDelta::from_std(Duration::from_secs(n)).with_context(|| format!("interval of {n}s is out of range"))
}
