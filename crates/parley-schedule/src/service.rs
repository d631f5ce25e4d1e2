//! Interval scheduler: a fixed-rate poll that fires a trigger callback.
//!
//! Architecture:
//! - Raw intervals are validated up front; one bad entry rejects the whole set
//! - A tokio task ticks every second and evaluates each entry's predicate
//! - The trigger runs synchronously on the tick, once per firing entry
//! - `terminate()` (or drop) stops the task; no tick fires afterwards

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use parley_core::types::ScheduleInterval;

use crate::types::{should_fire, validate, IntervalSpec, ScheduleError};

/// How often entries are evaluated.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Callback invoked on each firing. Must not block.
pub type TriggerFn = Arc<dyn Fn() + Send + Sync>;

// ─────────────────────────────────────────────
// Clock
// ─────────────────────────────────────────────

/// Source of wall-clock time for the poll loop.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The local system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

// ─────────────────────────────────────────────
// Schedule state
// ─────────────────────────────────────────────

/// One validated interval and when it last fired.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleEntry {
    pub spec: IntervalSpec,
    pub last_fired: Option<DateTime<Local>>,
}

/// Entries plus the trigger; the synchronous half of the scheduler.
pub struct ScheduleState {
    entries: Vec<ScheduleEntry>,
    trigger: TriggerFn,
}

impl ScheduleState {
    /// Validate every interval. Fails on the first malformed one.
    pub fn new(intervals: &[ScheduleInterval], trigger: TriggerFn) -> Result<Self, ScheduleError> {
        let entries = intervals
            .iter()
            .map(|interval| {
                validate(interval).map(|spec| ScheduleEntry {
                    spec,
                    last_fired: None,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries, trigger })
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Evaluate every entry at `now`, firing the trigger once per due entry.
    ///
    /// Returns how many entries fired.
    pub fn tick(&mut self, now: DateTime<Local>) -> usize {
        let mut fired = 0;
        for entry in &mut self.entries {
            if should_fire(&entry.spec, entry.last_fired.as_ref(), &now) {
                debug!(interval = %entry.spec, "schedule interval fired");
                (self.trigger)();
                entry.last_fired = Some(now);
                fired += 1;
            }
        }
        fired
    }
}

// ─────────────────────────────────────────────
// IntervalScheduler
// ─────────────────────────────────────────────

/// Handle to a running poll loop.
pub struct IntervalScheduler {
    shutdown: Arc<Notify>,
    stopped: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl IntervalScheduler {
    /// Validate `intervals` and start polling against the system clock.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        intervals: &[ScheduleInterval],
        trigger: TriggerFn,
    ) -> Result<Self, ScheduleError> {
        Self::start_with_clock(intervals, trigger, Arc::new(SystemClock))
    }

    /// Like [`start`](Self::start) with an explicit time source.
    pub fn start_with_clock(
        intervals: &[ScheduleInterval],
        trigger: TriggerFn,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ScheduleError> {
        let mut state = ScheduleState::new(intervals, trigger)?;

        let shutdown = Arc::new(Notify::new());
        let stopped = Arc::new(AtomicBool::new(false));

        info!(intervals = state.entries().len(), "interval scheduler started");

        let task_shutdown = shutdown.clone();
        let task_stopped = stopped.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(POLL_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = task_shutdown.notified() => break,
                    _ = ticker.tick() => {
                        if task_stopped.load(Ordering::SeqCst) {
                            break;
                        }
                        state.tick(clock.now());
                    }
                }
            }

            debug!("interval scheduler loop exited");
        });

        Ok(Self {
            shutdown,
            stopped,
            handle,
        })
    }

    /// Stop polling. Idempotent.
    pub fn terminate(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            info!("stopping interval scheduler");
            // notify_one stores a permit if the loop is mid-tick
            self.shutdown.notify_one();
        }
    }

    /// Whether the poll loop is still alive.
    pub fn is_running(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst) && !self.handle.is_finished()
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        self.terminate();
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
