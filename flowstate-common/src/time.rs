//! Timestamp utilities
//!
//! The host's coarse wall clock. Playback transitions take these values as
//! explicit arguments so the core never reads a clock on its own.

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current wall-clock time as milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert a millisecond offset to seconds on a precise clock
pub fn ms_to_secs(millis: u64) -> f64 {
    millis as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_now_ms_is_recent() {
        let ms = now_ms();
        // After 2000-01-01 and before 2100-01-01
        assert!(ms > 946_684_800_000);
        assert!(ms < 4_102_444_800_000);
    }

    #[tokio::test]
    async fn test_now_ms_advances() {
        let first = now_ms();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = now_ms();
        assert!(second > first);
    }

    #[test]
    fn test_now_matches_now_ms() {
        let a = now().timestamp_millis();
        let b = now_ms();
        assert!((b - a).abs() < 1000);
    }

    #[test]
    fn test_ms_to_secs() {
        assert_eq!(ms_to_secs(0), 0.0);
        assert_eq!(ms_to_secs(1500), 1.5);
        assert_eq!(ms_to_secs(4999), 4.999);
    }
}
