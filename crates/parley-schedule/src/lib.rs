//! Parley Schedule: fires a callback on hourly, daily, every-N-hours and
//! minute-change intervals.

pub mod service;
pub mod types;

pub use service::{Clock, IntervalScheduler, ScheduleEntry, ScheduleState, SystemClock, TriggerFn};
pub use types::{from_args, should_fire, validate, IntervalSpec, ScheduleError};
