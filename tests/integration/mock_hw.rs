//! Mock adapters for integration tests.
//!
//! Records every display call and every log line so tests can assert on
//! the full history without a panel or a filesystem.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use airwatch::app::events::AppEvent;
use airwatch::app::ports::{
    BaselinePort, ClockPort, DisplayPort, EventSink, GasSensorPort, HistoryLog, LogTarget,
    ProximityPort,
};
use airwatch::baseline::{Baseline, BaselineValues};
use airwatch::error::{PersistError, SensorError};
use airwatch::fsm::frame::Frame;
use airwatch::readings::{GasSample, ProximityReading};
use chrono::{DateTime, TimeDelta, Utc};

// ── Display call record ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    Backlight(bool),
    Render(Frame),
}

// ── MockHardware ──────────────────────────────────────────────

/// Scripted sensors plus a recording display.  When a script runs dry the
/// `steady_*` values are returned.
pub struct MockHardware {
    pub gas_script: VecDeque<Result<GasSample, SensorError>>,
    pub steady_gas: GasSample,
    pub proximity_script: VecDeque<u32>,
    pub steady_proximity: u32,
    pub live_baseline: BaselineValues,
    pub applied_baselines: Vec<BaselineValues>,
    pub fail_init: bool,
    pub gas_reads: usize,
    pub calls: Vec<DisplayCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            gas_script: VecDeque::new(),
            steady_gas: GasSample { eco2: 520, tvoc: 20 },
            proximity_script: VecDeque::new(),
            steady_proximity: 0,
            live_baseline: BaselineValues { eco2: 0x8c41, tvoc: 0x8f2e },
            applied_baselines: Vec::new(),
            fail_init: false,
            gas_reads: 0,
            calls: Vec::new(),
        }
    }

    pub fn with_gas(mut self, eco2: u32, tvoc: u32) -> Self {
        self.steady_gas = GasSample { eco2, tvoc };
        self
    }

    pub fn backlight_offs(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == DisplayCall::Backlight(false))
            .count()
    }

    pub fn last_render(&self) -> Option<&Frame> {
        self.calls.iter().rev().find_map(|c| match c {
            DisplayCall::Render(f) => Some(f),
            DisplayCall::Backlight(_) => None,
        })
    }
}

impl GasSensorPort for MockHardware {
    fn init(&mut self) -> Result<(), SensorError> {
        if self.fail_init {
            Err(SensorError::InitFailed)
        } else {
            Ok(())
        }
    }

    fn read_gas(&mut self) -> Result<GasSample, SensorError> {
        self.gas_reads += 1;
        self.gas_script.pop_front().unwrap_or(Ok(self.steady_gas))
    }

    fn baseline(&mut self) -> Result<BaselineValues, SensorError> {
        Ok(self.live_baseline)
    }

    fn set_baseline(&mut self, values: BaselineValues) -> Result<(), SensorError> {
        self.applied_baselines.push(values);
        self.live_baseline = values;
        Ok(())
    }
}

impl ProximityPort for MockHardware {
    fn read_proximity(&mut self) -> Result<ProximityReading, SensorError> {
        Ok(ProximityReading {
            lux: 0.0,
            proximity: self.proximity_script.pop_front().unwrap_or(self.steady_proximity),
        })
    }
}

impl DisplayPort for MockHardware {
    fn set_backlight(&mut self, on: bool) {
        self.calls.push(DisplayCall::Backlight(on));
    }

    fn render(&mut self, frame: &Frame) {
        self.calls.push(DisplayCall::Render(frame.clone()));
    }
}

// ── MockStore ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockStore {
    pub stored: Option<Baseline>,
    pub fail_load: bool,
    pub fail_save: bool,
    pub saves: usize,
}

#[allow(dead_code)]
impl MockStore {
    pub fn holding(baseline: Baseline) -> Self {
        Self {
            stored: Some(baseline),
            ..Self::default()
        }
    }
}

impl BaselinePort for MockStore {
    fn load(&self) -> Result<Option<Baseline>, PersistError> {
        if self.fail_load {
            Err(PersistError::Corrupted)
        } else {
            Ok(self.stored)
        }
    }

    fn save(&mut self, baseline: &Baseline) -> Result<(), PersistError> {
        if self.fail_save {
            return Err(PersistError::Io(std::io::ErrorKind::PermissionDenied));
        }
        self.saves += 1;
        self.stored = Some(*baseline);
        Ok(())
    }
}

// ── MockLogs ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockLogs {
    pub baseline: Vec<String>,
    pub results: Vec<String>,
    /// Every append fails (read-only disk).
    pub fail: bool,
    pub failed_appends: usize,
}

impl HistoryLog for MockLogs {
    fn append(&mut self, target: LogTarget, line: &str) -> Result<(), PersistError> {
        if self.fail {
            self.failed_appends += 1;
            return Err(PersistError::Io(std::io::ErrorKind::PermissionDenied));
        }
        match target {
            LogTarget::Baseline => self.baseline.push(line.to_owned()),
            LogTarget::Results => self.results.push(line.to_owned()),
        }
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Event sink that can be cloned into background jobs; all clones share
/// one event list.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<AppEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ── VirtualClock ──────────────────────────────────────────────

/// Clock that only moves when told to.
#[derive(Clone)]
pub struct VirtualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

#[allow(dead_code)]
impl VirtualClock {
    pub fn at(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.now.lock().unwrap() += by;
    }
}

impl ClockPort for VirtualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
