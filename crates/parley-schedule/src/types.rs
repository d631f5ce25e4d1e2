//! Interval types: validated specs, fire predicates, and errors.
//!
//! Raw [`ScheduleInterval`]s come from config as a tag plus free-form JSON
//! options. [`validate`] turns one into an [`IntervalSpec`] or rejects it;
//! [`should_fire`] is the pure predicate evaluated on every poll tick.

use chrono::{DateTime, Datelike, Local, Timelike};
use serde_json::Value;
use thiserror::Error;

use parley_core::types::{IntervalType, ScheduleInterval};

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    /// `spec` is the offending interval as JSON.
    #[error("Invalid schedule interval: {spec} ({reason})")]
    InvalidInterval { spec: String, reason: String },

    #[error(
        "Invalid arguments for {interval_type} interval. \
         Expected {expected} argument(s), got {got}"
    )]
    ArgumentCount {
        interval_type: IntervalType,
        expected: usize,
        got: usize,
    },
}

// ─────────────────────────────────────────────
// IntervalSpec
// ─────────────────────────────────────────────

/// A validated interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntervalSpec {
    /// Once per hour, at `minute`.
    EveryHourAt { minute: u32 },
    /// Once per day, at `hour:minute` local time.
    DailyAt { hour: u32, minute: u32 },
    /// Whenever at least `n` whole hours have passed since the last fire.
    EveryNHours { n: u64 },
    /// Whenever the wall-clock minute changes.
    EveryMinuteChange,
}

impl std::fmt::Display for IntervalSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntervalSpec::EveryHourAt { minute } => write!(f, "every hour at :{minute:02}"),
            IntervalSpec::DailyAt { hour, minute } => write!(f, "daily at {hour:02}:{minute:02}"),
            IntervalSpec::EveryNHours { n } => write!(f, "every {n} hour(s)"),
            IntervalSpec::EveryMinuteChange => f.write_str("every minute"),
        }
    }
}

const HOURS_AT_LEAST_ONE: &str =
    "`hours` must be at least 1; use a `minute` interval to fire on every change";

/// Check a raw interval's options against its tag.
///
/// The options object must carry exactly the fields its tag names:
/// `hourly` → `{minutes}`, `daily` → `{hours, minutes}`, `hours` → `{hours}`,
/// `minute` → any number. Minutes must be 0–59, hours of day 0–23, and an
/// hour period at least 1.
pub fn validate(interval: &ScheduleInterval) -> Result<IntervalSpec, ScheduleError> {
    let invalid = |reason: String| ScheduleError::InvalidInterval {
        spec: serde_json::to_string(interval).unwrap_or_else(|_| format!("{interval:?}")),
        reason,
    };

    let options = &interval.options;
    match interval.interval_type {
        IntervalType::Minute => {
            if options.is_number() {
                Ok(IntervalSpec::EveryMinuteChange)
            } else {
                Err(invalid("minute options must be a number".into()))
            }
        }
        IntervalType::Hourly => {
            expect_fields(options, &["minutes"]).map_err(invalid)?;
            let minute = field_in_range(options, "minutes", 59).map_err(invalid)?;
            Ok(IntervalSpec::EveryHourAt { minute })
        }
        IntervalType::Daily => {
            expect_fields(options, &["hours", "minutes"]).map_err(invalid)?;
            let hour = field_in_range(options, "hours", 23).map_err(invalid)?;
            let minute = field_in_range(options, "minutes", 59).map_err(invalid)?;
            Ok(IntervalSpec::DailyAt { hour, minute })
        }
        IntervalType::Hours => {
            expect_fields(options, &["hours"]).map_err(invalid)?;
            let n = options
                .get("hours")
                .and_then(Value::as_u64)
                .filter(|n| *n >= 1)
                .ok_or_else(|| invalid(HOURS_AT_LEAST_ONE.into()))?;
            Ok(IntervalSpec::EveryNHours { n })
        }
    }
}

/// `options` must be an object whose keys are exactly `fields`.
fn expect_fields(options: &Value, fields: &[&str]) -> Result<(), String> {
    let Some(map) = options.as_object() else {
        return Err(format!("options must be an object with {}", fields.join(", ")));
    };
    for field in fields {
        if !map.contains_key(*field) {
            return Err(format!("missing field `{field}`"));
        }
    }
    if let Some(extra) = map.keys().find(|k| !fields.contains(&k.as_str())) {
        return Err(format!("unexpected field `{extra}`"));
    }
    Ok(())
}

fn field_in_range(options: &Value, field: &str, max: u32) -> Result<u32, String> {
    options
        .get(field)
        .and_then(Value::as_u64)
        .filter(|v| *v <= u64::from(max))
        .map(|v| v as u32)
        .ok_or_else(|| format!("`{field}` must be an integer between 0 and {max}"))
}

/// Build a raw interval from positional arguments.
///
/// `hourly <minutes>`, `daily <hours> <minutes>`, `hours <n>`,
/// `minute <any>`. Only the argument count is checked here; ranges are
/// checked by [`validate`].
pub fn from_args(
    interval_type: IntervalType,
    args: &[u32],
) -> Result<ScheduleInterval, ScheduleError> {
    let expected = match interval_type {
        IntervalType::Daily => 2,
        _ => 1,
    };
    if args.len() != expected {
        return Err(ScheduleError::ArgumentCount {
            interval_type,
            expected,
            got: args.len(),
        });
    }

    Ok(match interval_type {
        IntervalType::Hourly => ScheduleInterval::hourly(args[0]),
        IntervalType::Daily => ScheduleInterval::daily(args[0], args[1]),
        IntervalType::Hours => ScheduleInterval::hours(args[0]),
        IntervalType::Minute => ScheduleInterval {
            interval_type,
            options: Value::from(args[0]),
        },
    })
}

// ─────────────────────────────────────────────
// Fire predicate
// ─────────────────────────────────────────────

const MS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Whether an entry last fired at `last_fired` should fire at `now`.
///
/// An entry that never fired compares as "different" for every calendar
/// field, and `EveryNHours` measures from the Unix epoch, so it fires on
/// the first tick.
pub fn should_fire(
    spec: &IntervalSpec,
    last_fired: Option<&DateTime<Local>>,
    now: &DateTime<Local>,
) -> bool {
    match *spec {
        IntervalSpec::EveryHourAt { minute } => {
            last_fired.map(|t| t.hour()) != Some(now.hour()) && now.minute() == minute
        }
        IntervalSpec::DailyAt { hour, minute } => {
            last_fired.map(|t| t.day()) != Some(now.day())
                && now.hour() == hour
                && now.minute() == minute
        }
        IntervalSpec::EveryNHours { n } => {
            let since_ms = last_fired.map(|t| t.timestamp_millis()).unwrap_or(0);
            let whole_hours = (now.timestamp_millis() - since_ms).div_euclid(MS_PER_HOUR);
            whole_hours >= 0 && whole_hours as u64 >= n
        }
        IntervalSpec::EveryMinuteChange => last_fired.map(|t| t.minute()) != Some(now.minute()),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
