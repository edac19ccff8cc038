//! Ebbinghaus forgetting-curve retention scoring.
//!
//! A record's retention is `exp(-age_days / half_life_days)`: 1.0 at the
//! moment of creation, decaying towards 0 as the record ages. With the
//! default half-life of 30 days and threshold of 0.1, records untouched
//! for roughly 69 days become cleanup candidates. Records whose timestamp
//! is absent or unparsable score the sentinel 1.0 so that a formatting
//! glitch can never cause deletion.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Default half-life in days.
pub const DEFAULT_HALF_LIFE_DAYS: f64 = 30.0;

/// Default retention threshold below which a record becomes a decay
/// candidate.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Tunable parameters for a decay run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayParams {
    pub half_life_days: f64,
    pub threshold: f64,
}

impl Default for DecayParams {
    fn default() -> Self {
        Self {
            half_life_days: DEFAULT_HALF_LIFE_DAYS,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Parse a stored timestamp into a UTC instant.
///
/// Accepts RFC 3339 (with offset or `Z`) as well as the offset-less
/// `YYYY-MM-DDTHH:MM:SS[.f]` and `YYYY-MM-DD HH:MM:SS[.f]` shapes seen in
/// older records; offset-less values are taken as UTC. Returns `None` for
/// anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Retention of a record created at `created` as observed at `now`.
///
/// Age is clamped to zero, so a timestamp slightly in the future (clock
/// skew between writers) scores exactly 1.0 rather than above it.
pub fn retention_at(created: DateTime<Utc>, now: DateTime<Utc>, half_life_days: f64) -> f64 {
    let age_seconds = (now - created).num_milliseconds() as f64 / 1000.0;
    let age_days = (age_seconds / SECONDS_PER_DAY).max(0.0);
    (-age_days / half_life_days).exp()
}

/// Score a raw stored timestamp.
///
/// Absent or unparsable timestamps score the sentinel 1.0: the scorer
/// refuses to condemn a record it cannot date.
pub fn score(raw_timestamp: Option<&str>, now: DateTime<Utc>, half_life_days: f64) -> f64 {
    match raw_timestamp.and_then(parse_timestamp) {
        Some(created) => retention_at(created, now, half_life_days),
        None => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2026-08-30T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_zero_age_scores_exactly_one() {
        let t = now();
        assert_eq!(retention_at(t, t, 30.0), 1.0);
    }

    #[test]
    fn test_future_timestamp_clamps_to_one() {
        let t = now();
        assert_eq!(retention_at(t + Duration::hours(2), t, 30.0), 1.0);
    }

    #[test]
    fn test_retention_is_strictly_decreasing_with_age() {
        let t = now();
        let mut prev = retention_at(t, t, 30.0);
        for days in [1i64, 5, 15, 30, 60, 120] {
            let r = retention_at(t - Duration::days(days), t, 30.0);
            assert!(r < prev, "retention at {days}d should be below previous");
            prev = r;
        }
    }

    #[test]
    fn test_one_half_life_scores_e_inverse() {
        let t = now();
        let r = retention_at(t - Duration::days(30), t, 30.0);
        // exp(-1) ≈ 0.3679 on the natural curve
        assert!((r - (-1.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_seventy_day_record_falls_below_default_threshold() {
        let t = now();
        let r = retention_at(t - Duration::days(70), t, DEFAULT_HALF_LIFE_DAYS);
        assert!(r < DEFAULT_THRESHOLD, "got {r}");
    }

    #[test]
    fn test_sixty_day_record_stays_above_default_threshold() {
        let t = now();
        let r = retention_at(t - Duration::days(60), t, DEFAULT_HALF_LIFE_DAYS);
        assert!(r > DEFAULT_THRESHOLD, "got {r}");
    }

    #[test]
    fn test_missing_timestamp_scores_sentinel() {
        assert_eq!(score(None, now(), 30.0), 1.0);
    }

    #[test]
    fn test_garbage_timestamp_scores_sentinel() {
        assert_eq!(score(Some("not a date"), now(), 30.0), 1.0);
        assert_eq!(score(Some(""), now(), 30.0), 1.0);
    }

    #[test]
    fn test_parses_rfc3339_and_naive_forms() {
        assert!(parse_timestamp("2026-08-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2026-08-01T10:00:00+02:00").is_some());
        assert!(parse_timestamp("2026-08-01T10:00:00.123456").is_some());
        assert!(parse_timestamp("2026-08-01 10:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_offset_aware_age_is_not_distorted_by_zone() {
        let t = now();
        // Same instant expressed in two zones scores identically.
        let utc = score(Some("2026-08-20T12:00:00Z"), t, 30.0);
        let plus5 = score(Some("2026-08-20T17:00:00+05:00"), t, 30.0);
        assert!((utc - plus5).abs() < 1e-12);
    }
}
