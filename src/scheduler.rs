//! Self-rescheduling job engine.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 Scheduler (min-heap on next_fire)             │
//! │                                                              │
//! │   (t+30s, telemetry)   (t+30m, aqi-poll)   (t+10m, ...)       │
//! │            │                                                 │
//! │            ▼  run_due(now)                                   │
//! │   pop every entry with next_fire <= now                      │
//! │   run them in registration order                             │
//! │   re-arm each at now + interval, success or failure          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine itself never reads a clock: callers pass `now`, which makes
//! it usable both from the monitor tick (baseline bookkeeping) and from
//! the background [`Runner`] thread, and testable on a virtual clock.
//!
//! Re-arming is drift-tolerant: a job that fired at `t` next fires at
//! `t + interval` however long its body took, and a late pass does not
//! trigger catch-up bursts.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info, warn};

use crate::app::ports::ClockPort;
use crate::error::Error;

// ═══════════════════════════════════════════════════════════════
//  Job trait
// ═══════════════════════════════════════════════════════════════

/// A unit of periodic work.  `C` is whatever context the driver of the
/// scheduler hands to each job (`()` for the background runner).
pub trait Job<C = ()>: Send {
    /// Short name used in logs and lookups.
    fn label(&self) -> &'static str;

    /// Perform the action.  Errors are logged by the scheduler and never
    /// prevent re-arming.
    fn run(&mut self, ctx: &mut C, now: DateTime<Utc>) -> Result<(), Error>;
}

/// Outcome of one job execution within [`Scheduler::run_due`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireReport {
    pub label: &'static str,
    pub fired_at: DateTime<Utc>,
    pub next_fire: DateTime<Utc>,
    pub result: Result<(), Error>,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

struct Entry<C> {
    next_fire: DateTime<Utc>,
    /// Registration order; breaks ties and orders jobs due in one pass.
    seq: u64,
    interval: TimeDelta,
    job: Box<dyn Job<C>>,
}

impl<C> PartialEq for Entry<C> {
    fn eq(&self, other: &Self) -> bool {
        self.next_fire == other.next_fire && self.seq == other.seq
    }
}

impl<C> Eq for Entry<C> {}

impl<C> PartialOrd for Entry<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> Ord for Entry<C> {
    // Reversed so the std max-heap pops the earliest deadline first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .next_fire
            .cmp(&self.next_fire)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue of `(next_fire, job)` pairs.
pub struct Scheduler<C = ()> {
    queue: BinaryHeap<Entry<C>>,
    next_seq: u64,
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Register a job that first fires at `first_fire` and then every
    /// `interval`.
    pub fn add(&mut self, job: Box<dyn Job<C>>, first_fire: DateTime<Utc>, interval: TimeDelta) {
        info!(
            "Scheduler: added '{}' (first {}, every {}s)",
            job.label(),
            first_fire.format("%H:%M:%S"),
            interval.num_seconds()
        );
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry {
            next_fire: first_fire,
            seq,
            interval,
            job,
        });
    }

    /// Register a job whose first firing is one `interval` after `now`.
    pub fn add_periodic(&mut self, job: Box<dyn Job<C>>, now: DateTime<Utc>, interval: TimeDelta) {
        self.add(job, fire_after(now, interval), interval);
    }

    /// Run every job due at `now` and re-arm it at `now + interval`.
    ///
    /// Jobs due in the same pass run in registration order, whatever their
    /// individual deadlines were.
    pub fn run_due(&mut self, ctx: &mut C, now: DateTime<Utc>) -> Vec<FireReport> {
        let mut due = Vec::new();
        while self.queue.peek().is_some_and(|e| e.next_fire <= now) {
            if let Some(entry) = self.queue.pop() {
                due.push(entry);
            }
        }
        due.sort_by_key(|e| e.seq);

        let mut reports = Vec::with_capacity(due.len());
        for mut entry in due {
            let label = entry.job.label();
            let result = entry.job.run(ctx, now);
            match &result {
                Ok(()) => debug!("Scheduler: '{}' ran", label),
                Err(e) => warn!("Scheduler: '{}' failed: {}", label, e),
            }
            entry.next_fire = fire_after(now, entry.interval);
            reports.push(FireReport {
                label,
                fired_at: now,
                next_fire: entry.next_fire,
                result,
            });
            self.queue.push(entry);
        }
        reports
    }

    /// Earliest pending deadline.
    pub fn next_fire(&self) -> Option<DateTime<Utc>> {
        self.queue.peek().map(|e| e.next_fire)
    }

    /// Pending deadline of the job labelled `label`.
    pub fn next_fire_of(&self, label: &str) -> Option<DateTime<Utc>> {
        self.queue
            .iter()
            .find(|e| e.job.label() == label)
            .map(|e| e.next_fire)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// `now + interval`, saturating at the end of representable time so an
/// absurd interval parks the job instead of panicking.
fn fire_after(now: DateTime<Utc>, interval: TimeDelta) -> DateTime<Utc> {
    now.checked_add_signed(interval).unwrap_or_else(|| {
        warn!("Scheduler: interval of {}s overflows, job parked", interval.num_seconds());
        DateTime::<Utc>::MAX_UTC
    })
}

// ═══════════════════════════════════════════════════════════════
//  Background runner
// ═══════════════════════════════════════════════════════════════

/// Longest the runner sleeps between passes; bounds the effect of wall
/// clock jumps.
const MAX_WAIT: Duration = Duration::from_secs(1);

/// Owns the thread that drives a `Scheduler<()>` on the wall clock.
///
/// Dropping the runner (or calling [`shutdown`](Self::shutdown)) signals
/// the thread and joins it; nothing fires after that returns.
pub struct Runner {
    stop: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Runner {
    pub fn spawn<K>(mut scheduler: Scheduler<()>, clock: K) -> io::Result<Self>
    where
        K: ClockPort + Send + 'static,
    {
        let (stop, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("scheduler".into())
            .spawn(move || {
                if scheduler.is_empty() {
                    warn!("Scheduler: runner started with no jobs");
                } else {
                    info!("Scheduler: runner started with {} job(s)", scheduler.len());
                }
                loop {
                    scheduler.run_due(&mut (), clock.now());

                    let now = clock.now();
                    let wait = scheduler
                        .next_fire()
                        .map(|next| (next - now).to_std().unwrap_or(Duration::ZERO))
                        .unwrap_or(MAX_WAIT)
                        .min(MAX_WAIT);

                    match stop_rx.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("Scheduler: runner stopped");
            })?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stop the runner and wait for the in-flight pass to finish.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Scheduler: runner thread panicked");
            }
        }
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
