//! Month-granularity date helpers shared by the codec, the request builder
//! and the views.
//!
//! All timestamps are milliseconds since the Unix epoch, UTC.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// Format used by the cube for the `p` dimension.
pub const MONTH_FORMAT: &str = "%Y-%m";

const DAY_MILLIS: i64 = 86_400_000;

/// Formats a timestamp as `YYYY-MM`. Returns `None` when the timestamp is
/// outside chrono's representable range.
pub fn format_month(ts: Timestamp) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(ts).map(|dt| dt.format(MONTH_FORMAT).to_string())
}

/// Formats a timestamp as a short human label, e.g. `Jan 2020`.
pub fn month_label(ts: Timestamp) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts)
        .map_or_else(|| ts.to_string(), |dt| dt.format("%b %Y").to_string())
}

/// Parses a `YYYY-MM` key into the timestamp of the first day of that month.
pub fn parse_month(key: &str) -> Option<Timestamp> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", key.trim()), "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

/// Upper bound of a half-open range, pulled back one day so that a range
/// ending exactly on a month boundary does not spill into the next month.
pub const fn inclusive_upper(end: Timestamp) -> Timestamp {
    end - DAY_MILLIS
}

/// Shifts the month containing `ts` by `months` (negative goes back) and
/// returns the first day of the resulting month.
pub fn shift_months(ts: Timestamp, months: i32) -> Option<Timestamp> {
    let dt = DateTime::<Utc>::from_timestamp_millis(ts)?;
    let first = NaiveDate::from_ymd_opt(dt.year(), dt.month(), 1)?;
    let shifted = if months >= 0 {
        first.checked_add_months(Months::new(months.unsigned_abs()))?
    } else {
        first.checked_sub_months(Months::new(months.unsigned_abs()))?
    };
    Some(shifted.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

/// Number of whole calendar months between the months containing `start`
/// and `end`.
pub fn months_between(start: Timestamp, end: Timestamp) -> Option<i32> {
    let a = DateTime::<Utc>::from_timestamp_millis(start)?;
    let b = DateTime::<Utc>::from_timestamp_millis(end)?;
    let months = (b.year() - a.year()) * 12 + i32::try_from(b.month()).ok()?
        - i32::try_from(a.month()).ok()?;
    Some(months)
}
