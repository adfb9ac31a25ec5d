//! Display formatting for timestamps and counters
//!
//! Presentation-only helpers; nothing here participates in ranking.

use chrono::{DateTime, Utc};

/// Relative "time ago" label for an activity timestamp.
///
/// Buckets from years down to minutes; anything under a minute (including
/// timestamps slightly in the future, from clock skew between clients)
/// renders as "Just now".
pub fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds();
    if seconds < 60 {
        return "Just now".to_string();
    }

    const INTERVALS: &[(&str, i64)] = &[
        ("year", 31_536_000),
        ("month", 2_592_000),
        ("week", 604_800),
        ("day", 86_400),
        ("hour", 3_600),
        ("minute", 60),
    ];

    for (unit, seconds_in_unit) in INTERVALS {
        let interval = seconds / seconds_in_unit;
        if interval >= 1 {
            let plural = if interval > 1 { "s" } else { "" };
            return format!("{} {}{} ago", interval, unit, plural);
        }
    }

    "Just now".to_string()
}

/// Format a counter with thousands separators (`1250` -> `"1,250"`).
pub fn format_number(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1250), "1,250");
        assert_eq!(format_number(5000000), "5,000,000");
    }

    #[test]
    fn test_time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(format_time_ago(now, now), "Just now");
        assert_eq!(format_time_ago(now - Duration::seconds(59), now), "Just now");
        assert_eq!(format_time_ago(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(format_time_ago(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(format_time_ago(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(format_time_ago(now - Duration::days(2), now), "2 days ago");
        assert_eq!(format_time_ago(now - Duration::weeks(1), now), "1 week ago");
        assert_eq!(format_time_ago(now - Duration::days(400), now), "1 year ago");
    }

    #[test]
    fn test_time_ago_future_timestamp() {
        let now = Utc::now();
        assert_eq!(format_time_ago(now + Duration::minutes(2), now), "Just now");
    }
}
