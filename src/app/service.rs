//! Monitor service, the orchestrator.
//!
//! [`MonitorService`] owns the alert state machine, the baseline
//! bookkeeping schedule and the shared reading state.  Hardware, storage,
//! logs and the event sink are injected as port implementations, so the
//! whole control loop runs against mocks in tests.
//!
//! ```text
//!  ProximityPort ─┐                                  ┌──▶ DisplayPort
//!  GasSensorPort ─┼──▶ ┌──────────────────────────┐ ─┤
//!                 │    │      MonitorService      │  └──▶ EventSink
//!   BaselinePort ◀┼────│ classify · baseline · FSM│
//!     HistoryLog ◀┘    └──────────────────────────┘
//! ```
//!
//! Each tick runs strictly in order: proximity → gas + classify →
//! baseline bookkeeping → alert transition → display.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info, warn};

use crate::air_quality::{AirQualityLevel, classify};
use crate::baseline::{
    self, Baseline, EntryKind, LOG_TIME_FORMAT, LogEntry, commit_interval, maturation_window,
    record_candidate,
};
use crate::error::Error;
use crate::fsm::frame::Frame;
use crate::fsm::{AlertFsm, AlertInput, AlertState, DisplayAction};
use crate::readings::{ProximityReading, SensorReading};
use crate::scheduler::{Job, Scheduler};

use super::events::AppEvent;
use super::ports::{BaselinePort, ClockPort, EventSink, HistoryLog, LogTarget, MonitorHardware};
use super::shared::SharedState;

pub const COMMIT_LABEL: &str = "baseline-commit";
pub const CANDIDATE_LABEL: &str = "baseline-candidate";

/// Pause between sensor polls inside the warm-up gate.
const WARMUP_POLL: Duration = Duration::from_secs(1);

// ───────────────────────────────────────────────────────────────
// Baseline bookkeeping jobs
// ───────────────────────────────────────────────────────────────

/// Baseline work that fell due in a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineTask {
    Commit,
    Candidate,
}

/// Marks its task as due; the service performs the I/O afterwards so
/// the jobs never touch hardware.
struct BaselineJob {
    label: &'static str,
    task: BaselineTask,
}

impl Job<Vec<BaselineTask>> for BaselineJob {
    fn label(&self) -> &'static str {
        self.label
    }

    fn run(&mut self, due: &mut Vec<BaselineTask>, _now: DateTime<Utc>) -> Result<(), Error> {
        due.push(self.task);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

/// Result of one tick, for callers and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub reading: SensorReading,
    pub proximity: ProximityReading,
    pub level: AirQualityLevel,
    pub action: DisplayAction,
    /// Baseline tasks executed this tick, in execution order.
    pub baseline_tasks: Vec<BaselineTask>,
}

pub struct MonitorService<H, B, L, E> {
    hw: H,
    store: B,
    logs: L,
    sink: E,
    shared: Arc<SharedState>,
    alert: AlertFsm,
    bookkeeping: Scheduler<Vec<BaselineTask>>,
    candidate_interval: TimeDelta,
}

impl<H, B, L, E> MonitorService<H, B, L, E>
where
    H: MonitorHardware,
    B: BaselinePort,
    L: HistoryLog,
    E: EventSink,
{
    /// Construct the service.  Does **not** touch hardware; call
    /// [`start`](Self::start) next.
    pub fn new(
        hw: H,
        store: B,
        logs: L,
        sink: E,
        shared: Arc<SharedState>,
        candidate_interval: TimeDelta,
    ) -> Self {
        Self {
            hw,
            store,
            logs,
            sink,
            shared,
            alert: AlertFsm::new(false),
            bookkeeping: Scheduler::new(),
            candidate_interval,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// One-time startup: initialise the sensor, show the splash frame,
    /// restore a trusted baseline and arm the baseline schedule.
    ///
    /// Only a sensor init failure is fatal; an unreadable baseline record
    /// just means a cold start.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<Option<Baseline>, Error> {
        self.hw.init()?;

        self.hw.set_backlight(true);
        self.hw.render(&Frame::Splash);
        self.alert = AlertFsm::new(true);

        let persisted = match self.store.load() {
            Ok(p) => p,
            Err(e) => {
                warn!("Stored baseline unreadable ({}), starting cold", e);
                self.sink.emit(&AppEvent::PersistFailed(e.into()));
                None
            }
        };

        let restored = persisted.and_then(|stored| self.apply_stored(&stored, now));
        if let Some(b) = restored {
            self.shared.set_baseline(b);
        }

        let maturation = maturation_window(restored.is_some());
        info!(
            "Valid baseline will be stored in {}h, then every {}h",
            maturation.num_hours(),
            commit_interval().num_hours()
        );

        // Commit registered first: when both fall due in the same tick the
        // valid commit runs before the candidate log.
        self.bookkeeping = Scheduler::new();
        self.bookkeeping.add(
            Box::new(BaselineJob {
                label: COMMIT_LABEL,
                task: BaselineTask::Commit,
            }),
            now + maturation,
            commit_interval(),
        );
        self.bookkeeping.add_periodic(
            Box::new(BaselineJob {
                label: CANDIDATE_LABEL,
                task: BaselineTask::Candidate,
            }),
            now,
            self.candidate_interval,
        );

        self.sink.emit(&AppEvent::Started {
            restored,
            maturation,
        });
        Ok(restored)
    }

    /// Block until the sensor leaves its warm-up floor or `timeout`
    /// passes.  Best effort: returns whether the sensor was ready.
    ///
    /// `pause` is the sleep between polls (injected so tests can drive a
    /// virtual clock).
    pub fn warm_up(
        &mut self,
        clock: &impl ClockPort,
        timeout: Duration,
        mut pause: impl FnMut(Duration),
    ) -> bool {
        let started = clock.now();
        let deadline = TimeDelta::from_std(timeout)
            .ok()
            .and_then(|t| started.checked_add_signed(t))
            .unwrap_or_else(|| {
                warn!("Warm-up timeout {:?} out of range, waiting for the sensor", timeout);
                DateTime::<Utc>::MAX_UTC
            });

        let ready = loop {
            if clock.now() >= deadline {
                break false;
            }
            match self.hw.read_gas() {
                Ok(sample) if sample.is_warm() => break true,
                Ok(_) => {}
                Err(e) => debug!("Warm-up read failed: {}", e),
            }
            pause(WARMUP_POLL);
        };

        let waited_secs = (clock.now() - started).num_seconds().max(0) as u64;
        if ready {
            info!("Sensor warmed up after {}s", waited_secs);
        } else {
            info!("Warm-up gate timed out after {}s, continuing", waited_secs);
        }
        self.sink.emit(&AppEvent::WarmupFinished { waited_secs, ready });
        ready
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one monitor cycle.
    ///
    /// A sensor read failure aborts the tick before any decision is made;
    /// persistence failures inside the tick are logged and absorbed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<TickReport, Error> {
        // 1. Proximity
        let proximity = self.hw.read_proximity()?;

        // 2. Gas + classification
        let sample = self.hw.read_gas()?;
        let reading = SensorReading::new(sample, now);
        let level = classify(Some(sample.eco2), Some(sample.tvoc));
        self.shared.publish_reading(reading);
        self.sink.emit(&AppEvent::Reading { reading, level });

        // 3. Baseline bookkeeping
        let mut baseline_tasks = Vec::new();
        self.bookkeeping.run_due(&mut baseline_tasks, now);
        for task in &baseline_tasks {
            self.run_baseline_task(*task, &reading, now);
        }

        // 4. Alert transition
        let action = self.alert.step(AlertInput {
            proximity: proximity.proximity,
            air_quality: level,
        });

        // 5. Display
        self.apply_display(action, &reading, level);

        Ok(TickReport {
            reading,
            proximity,
            level,
            action,
            baseline_tasks,
        })
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn alert_state(&self) -> AlertState {
        self.alert.state()
    }

    pub fn next_commit(&self) -> Option<DateTime<Utc>> {
        self.bookkeeping.next_fire_of(COMMIT_LABEL)
    }

    pub fn next_candidate(&self) -> Option<DateTime<Utc>> {
        self.bookkeeping.next_fire_of(CANDIDATE_LABEL)
    }

    pub fn shared(&self) -> &Arc<SharedState> {
        &self.shared
    }

    pub fn hw(&self) -> &H {
        &self.hw
    }

    pub fn hw_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    pub fn logs(&self) -> &L {
        &self.logs
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply_stored(&mut self, stored: &Baseline, now: DateTime<Utc>) -> Option<Baseline> {
        let Some(trusted) = baseline::restore(stored, now) else {
            info!("Stored baseline is too old ({}), discarding", stored.captured_at);
            return None;
        };
        match self.hw.set_baseline(trusted.values()) {
            Ok(()) => {
                info!(
                    "Stored baseline is recent enough: 0x{:x} 0x{:x} {}",
                    trusted.eco2_baseline, trusted.tvoc_baseline, trusted.captured_at
                );
                Some(trusted)
            }
            Err(e) => {
                warn!("Could not apply stored baseline: {}", e);
                None
            }
        }
    }

    fn run_baseline_task(&mut self, task: BaselineTask, reading: &SensorReading, now: DateTime<Utc>) {
        let values = match self.hw.baseline() {
            Ok(v) => v,
            Err(e) => {
                warn!("Baseline read failed ({}), skipping {:?}", e, task);
                return;
            }
        };

        match task {
            BaselineTask::Commit => {
                let entry = LogEntry {
                    kind: EntryKind::Valid,
                    values,
                    at: now,
                };
                self.append(LogTarget::Baseline, &entry.to_string());
                match baseline::commit_valid(&mut self.store, values, now) {
                    Ok(committed) => {
                        self.shared.set_baseline(committed);
                        self.sink.emit(&AppEvent::BaselineCommitted(committed));
                    }
                    Err(e) => {
                        warn!("Baseline commit failed ({}); sensor keeps its in-memory baseline", e);
                        self.sink.emit(&AppEvent::PersistFailed(e.into()));
                    }
                }
            }
            BaselineTask::Candidate => {
                let entry = record_candidate(values, now);
                self.append(LogTarget::Baseline, &entry.to_string());
                self.append(LogTarget::Results, &result_line(reading));
                self.sink.emit(&AppEvent::BaselineCandidate(entry));
            }
        }
    }

    fn append(&mut self, target: LogTarget, line: &str) {
        if let Err(e) = self.logs.append(target, line) {
            warn!("Append to {:?} log failed: {}", target, e);
            self.sink.emit(&AppEvent::PersistFailed(e.into()));
        }
    }

    fn apply_display(&mut self, action: DisplayAction, reading: &SensorReading, level: AirQualityLevel) {
        match action {
            DisplayAction::Render { scheme, wake } => {
                if wake {
                    self.hw.set_backlight(true);
                    self.sink.emit(&AppEvent::ScreenChanged { on: true, level });
                }
                self.hw.render(&Frame::reading(scheme, reading));
            }
            DisplayAction::BacklightOff => {
                self.hw.set_backlight(false);
                self.sink.emit(&AppEvent::ScreenChanged { on: false, level });
            }
            DisplayAction::Idle => {}
        }
    }
}

/// One line of the result history log.
pub fn result_line(reading: &SensorReading) -> String {
    format!(
        "CO2: {} ppm, VOC: {} ppb | {}",
        reading.eco2,
        reading.tvoc,
        reading.timestamp.format(LOG_TIME_FORMAT)
    )
}
