//! Coarse human-readable durations ("3 days", "1 year").

use chrono::Utc;

/// Seconds in a year of 365.25 days.  Inputs above this are read as
/// absolute unix timestamps.
pub const YEAR: i64 = 31_557_600;

const PERIODS: [&str; 8] = [
    "second", "minute", "hour", "day", "week", "month", "year", "decade",
];
const LENGTHS: [f64; 7] = [60.0, 60.0, 24.0, 7.0, 4.35, 12.0, 10.0];

/// Format `seconds` relative to the current time.
pub fn relative_time(seconds: i64) -> String {
    relative_time_at(seconds, Utc::now().timestamp())
}

/// Format `seconds` as a duration, or as the distance from `now` when it
/// looks like an absolute timestamp.
pub fn relative_time_at(seconds: i64, now: i64) -> String {
    if seconds > YEAR {
        relative_duration(seconds.saturating_sub(now))
    } else {
        relative_duration(seconds)
    }
}

/// Format a value that is already a duration, however long.
pub fn relative_duration(seconds: i64) -> String {
    let mut difference = seconds as f64;

    let mut unit = 0;
    while unit < LENGTHS.len() && difference >= LENGTHS[unit] {
        difference /= LENGTHS[unit];
        unit += 1;
    }

    let rounded = difference.round();
    let suffix = if rounded == 1.0 { "" } else { "s" };
    format!("{rounded} {}{suffix}", PERIODS[unit])
}
