// Rate-limit accounting reported by the API in response headers.
// Every field is optional: a header that is missing, empty or not a number
// is "unknown", which is kept apart from a genuine zero.

use std::fmt;

use chrono::{DateTime, Local, TimeZone, Utc};
use reqwest::header::HeaderMap;

pub const LIMIT_HEADER: &str = "X-Ratelimit-Limit";
pub const REMAINING_HEADER: &str = "X-Ratelimit-Remaining";
pub const RESET_HEADER: &str = "X-Ratelimit-Reset";

/// Layout produced by [`format_reset_time`]. The zone is written as a
/// numeric offset (`+02:00`) rather than an abbreviation such as `EET`:
/// chrono's `Local` carries no zone names, and the offset keeps the output
/// parseable back to the same instant with `DateTime::parse_from_str`.
pub const RESET_TIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S %:z";

/// Shown in place of a value the API did not report.
pub const UNKNOWN: &str = "unknown";

const INVALID_FORMAT_MARKER: &str = "(invalid format)";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests allowed in the current window.
    pub limit: Option<u64>,
    /// Requests left in the current window.
    pub remaining: Option<u64>,
    /// When the window refreshes.
    pub reset_at: Option<DateTime<Utc>>,
    /// The reset header exactly as received, for display.
    pub reset_raw: Option<String>,
}

impl RateLimitInfo {
    /// Extract the three rate-limit headers. Never fails.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let reset_raw = header_text(headers, RESET_HEADER);
        let reset_at = reset_raw
            .as_deref()
            .and_then(|raw| raw.parse::<i64>().ok())
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());

        RateLimitInfo {
            limit: header_text(headers, LIMIT_HEADER).and_then(|v| v.parse().ok()),
            remaining: header_text(headers, REMAINING_HEADER).and_then(|v| v.parse().ok()),
            reset_at,
            reset_raw,
        }
    }

    /// Reset time rendered in the local timezone (see [`format_reset_time`]).
    pub fn reset_display(&self) -> String {
        format_reset_time(self.reset_raw.as_deref())
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Convert a raw UNIX-seconds reset value into `DD.MM.YYYY HH:MM:SS ±HH:MM`
/// in the local timezone of the running process.
///
/// Absent or empty input gives `"unknown"`; a value that is not an integer
/// is echoed back with an `(invalid format)` suffix. Display only, so this
/// never fails.
pub fn format_reset_time(raw: Option<&str>) -> String {
    format_reset_time_in(raw, &Local)
}

/// Same as [`format_reset_time`] but renders in `tz`.
pub fn format_reset_time_in<Tz>(raw: Option<&str>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return UNKNOWN.to_string(),
    };

    let parsed = raw
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| tz.timestamp_opt(secs, 0).single());

    match parsed {
        Some(at) => at.format(RESET_TIME_FORMAT).to_string(),
        None => format!("{raw} {INVALID_FORMAT_MARKER}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use reqwest::header::HeaderValue;

    #[test]
    fn empty_or_missing_reset_is_unknown() {
        assert_eq!(format_reset_time(None), "unknown");
        assert_eq!(format_reset_time(Some("")), "unknown");
        assert_eq!(format_reset_time(Some("   ")), "unknown");
    }

    #[test]
    fn non_numeric_reset_is_echoed_with_marker() {
        let shown = format_reset_time(Some("abc"));
        assert!(shown.contains("abc"));
        assert!(shown.ends_with("(invalid format)"));
    }

    #[test]
    fn renders_fixed_layout_in_given_timezone() {
        assert_eq!(
            format_reset_time_in(Some("1700000000"), &Utc),
            "14.11.2023 22:13:20 +00:00"
        );

        let kyiv = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            format_reset_time_in(Some("1700000000"), &kyiv),
            "15.11.2023 00:13:20 +02:00"
        );
    }

    #[test]
    fn local_rendering_round_trips_to_same_epoch() {
        let shown = format_reset_time(Some("1700000000"));
        let parsed = DateTime::parse_from_str(&shown, RESET_TIME_FORMAT).unwrap();
        assert_eq!(parsed.timestamp(), 1_700_000_000);
    }

    #[test]
    fn out_of_range_timestamp_is_invalid_not_a_panic() {
        let shown = format_reset_time_in(Some("99999999999999999"), &Utc);
        assert_eq!(shown, "99999999999999999 (invalid format)");
    }

    #[test]
    fn missing_headers_are_unknown_not_zero() {
        let info = RateLimitInfo::from_headers(&HeaderMap::new());
        assert_eq!(info, RateLimitInfo::default());
        assert_eq!(info.limit, None);
        assert_eq!(info.remaining, None);
        assert_eq!(info.reset_display(), "unknown");
    }

    #[test]
    fn parses_present_headers_and_keeps_zero() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("25000"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1700000000"));

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.limit, Some(25000));
        assert_eq!(info.remaining, Some(0));
        assert_eq!(info.reset_at.map(|at| at.timestamp()), Some(1_700_000_000));
        assert_eq!(info.reset_raw.as_deref(), Some("1700000000"));
    }

    #[test]
    fn garbage_header_values_become_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("lots"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static(""));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("soon"));

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.limit, None);
        assert_eq!(info.remaining, None);
        assert_eq!(info.reset_at, None);
        assert_eq!(info.reset_display(), "soon (invalid format)");
    }
}
