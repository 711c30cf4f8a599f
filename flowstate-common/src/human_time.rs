//! Human-readable time formatting
//!
//! Consistent clock-style display for elapsed and remaining workout time.

/// Durations at or above this many seconds get an hours field
const HOUR_FORMAT_MIN: u64 = 3600;

/// Format milliseconds as a workout clock.
///
/// - Under an hour: `M:SS`
/// - An hour or more: `H:MM:SS`
///
/// Sub-second remainders are truncated, so a countdown shows `0:00` only
/// once the interval is fully over.
///
/// # Examples
///
/// ```
/// use flowstate_common::human_time::format_clock;
///
/// assert_eq!(format_clock(0), "0:00");
/// assert_eq!(format_clock(45_900), "0:45");
/// assert_eq!(format_clock(330_000), "5:30");
/// assert_eq!(format_clock(3_661_000), "1:01:01");
/// ```
pub fn format_clock(millis: u64) -> String {
    let total_seconds = millis / 1000;
    let secs = total_seconds % 60;

    if total_seconds >= HOUR_FORMAT_MIN {
        let hours = total_seconds / 3600;
        let mins = (total_seconds % 3600) / 60;
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", total_seconds / 60, secs)
    }
}

/// Format milliseconds as seconds with one decimal place (`12.5s`)
///
/// Used in log lines where sub-second precision matters (seek targets,
/// lookahead windows).
pub fn format_seconds(millis: u64) -> String {
    format!("{:.1}s", millis as f64 / 1000.0)
}
