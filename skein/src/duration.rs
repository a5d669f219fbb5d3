//! Short human readable durations

use std::time::Duration;

/// Format a duration using only minutes and seconds, e.g. `1m30s`.
///
/// The value is rounded to the nearest whole second first (halves round up), so `59.5s` becomes
/// `1m`. Hours are folded into minutes. Zero components are left out, except that a zero
/// duration renders as `0s`.
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    let secs = (ms + 500) / 1000;
    let (minutes, seconds) = (secs / 60, secs % 60);

    let mut out = String::new();
    if minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if seconds > 0 || minutes == 0 {
        out.push_str(&format!("{}s", seconds));
    }
    out
}

/// As [`format_duration`], from a count of milliseconds
pub fn format_millis(ms: u64) -> String {
    format_duration(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero() {
        assert_eq!(format_millis(0), "0s");
        assert_eq!(format_millis(499), "0s");
    }

    #[test]
    fn rounds_to_nearest_second() {
        assert_eq!(format_millis(500), "1s");
        assert_eq!(format_millis(1_499), "1s");
        assert_eq!(format_millis(1_500), "2s");
        assert_eq!(format_millis(59_499), "59s");
    }

    #[test]
    fn rounding_carries_into_minutes() {
        assert_eq!(format_millis(59_500), "1m");
        assert_eq!(format_millis(59_999), "1m");
        assert_eq!(format_millis(60_000), "1m");
    }

    #[test]
    fn minutes_and_seconds() {
        assert_eq!(format_millis(90_000), "1m30s");
        assert_eq!(format_millis(61_000), "1m1s");
        assert_eq!(format_millis(3_600_000), "60m");
        assert_eq!(format_millis(5_430_400), "90m30s");
    }
}
