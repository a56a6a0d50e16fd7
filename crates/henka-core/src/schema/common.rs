use chrono::{DateTime, NaiveDate, NaiveTime};
use tracing::error;

/// Convert a `YYYY-MM-DD` string (the form HTML date inputs submit) to a chrono::NaiveDate.
pub fn convert_date_type(str_date: &str) -> anyhow::Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(str_date.trim(), "%Y-%m-%d").map_err(|e| {
        error!("failed to parse date string; expected form YYYY-MM-DD - received: {str_date}");
        e
    })?;
    Ok(date)
}

/// Transform a `unix timestamp`    -> `naive date`, e.g.,
///             `1704205800`        -> `2024-01-02`
pub fn convert_timestamp(timestamp: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
}

/// Unix timestamp of midnight (UTC) at the start of `date`.
pub fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}
