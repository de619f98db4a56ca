//! Timestamp normalisation for speaker headers.
//!
//! Message timestamps arrive as epoch seconds (integer or float, as in
//! ChatGPT's `create_time`). Anything that cannot be turned into a UTC date
//! renders as [`UNKNOWN_TIME`]; a bad timestamp never fails the export.

use chrono::DateTime;

/// Rendered in place of a missing or unconvertible timestamp.
pub const UNKNOWN_TIME: &str = "Unknown Time";

/// Output format of [`format_timestamp`].
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format epoch seconds as `YYYY-MM-DD HH:MM:SS` (UTC).
///
/// Fractional seconds round down, so pre-1970 values land on the earlier second. `None`, NaN, infinities and values
/// outside chrono's range yield [`UNKNOWN_TIME`].
pub fn format_timestamp(epoch_secs: Option<f64>) -> String {
    epoch_secs
        .filter(|secs| secs.is_finite())
        .filter(|secs| *secs >= i64::MIN as f64 && *secs <= i64::MAX as f64)
        .and_then(|secs| DateTime::from_timestamp(secs.floor() as i64, 0))
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN_TIME.to_string())
}
