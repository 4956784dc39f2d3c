//! Timestamp formatting utilities.

use chrono::{DateTime, Local, SecondsFormat, Utc};
use std::fmt::Write;
use std::path::PathBuf;

/// Format a timestamp with a strftime pattern.
///
/// Patterns chrono cannot render fall back to RFC 3339 rather than failing,
/// since a bad `datefmt` must never break delivery.
pub fn format_timestamp(timestamp: &DateTime<Utc>, pattern: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", timestamp.format(pattern)) {
        Ok(()) => out,
        Err(_) => timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}

/// Seconds since the Unix epoch, with fractional milliseconds.
pub fn epoch_seconds(timestamp: &DateTime<Utc>) -> f64 {
    timestamp.timestamp_millis() as f64 / 1000.0
}

/// Expand a log file path template.
///
/// Applies `~` expansion, then strftime substitution against local time,
/// e.g. `~/logs/app-%Y%m%d.log`.
pub fn expand_log_path(template: &str, now: DateTime<Local>) -> PathBuf {
    let expanded = crate::util::expand_path(template);
    let raw = expanded.to_string_lossy();
    if !raw.contains('%') {
        return expanded;
    }

    let mut out = String::new();
    match write!(out, "{}", now.format(&raw)) {
        Ok(()) => PathBuf::from(out),
        Err(_) => expanded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2013, 12, 11, 10, 9, 8).unwrap();
        assert_eq!(format_timestamp(&ts, "%a, %b %d, %Y"), "Wed, Dec 11, 2013");
        assert_eq!(format_timestamp(&ts, "%Y-%m-%dT%H:%M:%S"), "2013-12-11T10:09:08");
        assert_eq!(format_timestamp(&ts, "%p %A %B %w %%"), "AM Wednesday December 3 %");
    }

    #[test]
    fn test_bad_pattern_falls_back() {
        let ts = Utc.with_ymd_and_hms(2013, 12, 11, 10, 9, 8).unwrap();
        assert_eq!(format_timestamp(&ts, "%Q"), "2013-12-11T10:09:08Z");
    }

    #[test]
    fn test_epoch_seconds() {
        let ts = Utc.timestamp_millis_opt(1_500).unwrap();
        assert_eq!(epoch_seconds(&ts), 1.5);
    }

    #[test]
    fn test_expand_log_path() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(
            expand_log_path("/var/log/app-%Y%m%d.log", now),
            PathBuf::from("/var/log/app-20240309.log")
        );
        assert_eq!(expand_log_path("/var/log/app.log", now), PathBuf::from("/var/log/app.log"));
    }
}
