//! Date range normalization
//!
//! Calendar picks are turned into an inclusive `[start, end]` pair of
//! `YYYY-MM-DD` strings. Dates are floored in the offset they were picked in,
//! never in UTC, so a pick just after local midnight stays on its own day.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone};

use crate::error::{Result, SonarError};

/// Calendar date of a pick in its own offset
pub fn local_calendar_date(date: &DateTime<FixedOffset>) -> NaiveDate {
    date.date_naive()
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Normalize one or two picks into a range pair.
///
/// One date yields a one-day range `[day, day + 1]`. Two dates are floored
/// and returned in the order supplied. Extra entries are ignored.
pub fn normalize_date_range(dates: &[DateTime<FixedOffset>]) -> Option<[String; 2]> {
    match dates {
        [] => None,
        [single] => {
            let day = local_calendar_date(single);
            let next = day.succ_opt()?;
            Some([format_date(day), format_date(next)])
        }
        [start, end, ..] => {
            let range = [
                format_date(local_calendar_date(start)),
                format_date(local_calendar_date(end)),
            ];
            if !is_ordered(&range) {
                tracing::warn!(
                    start = %range[0],
                    end = %range[1],
                    "date range ends before it starts; passing through unchanged"
                );
            }
            Some(range)
        }
    }
}

/// Start does not come after end. `YYYY-MM-DD` compares lexicographically.
pub fn is_ordered(range: &[String; 2]) -> bool {
    range[0] <= range[1]
}

/// Pin an ambient local timestamp to the offset it currently has
pub fn from_local(date: DateTime<Local>) -> DateTime<FixedOffset> {
    date.fixed_offset()
}

/// Parse a CLI/config date: RFC 3339, or a bare `YYYY-MM-DD` taken as local midnight
pub fn parse_date(value: &str) -> Result<DateTime<FixedOffset>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date);
    }

    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| SonarError::InvalidDate {
        value: value.to_string(),
        message: e.to_string(),
    })?;
    let midnight = day.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(from_local)
        .ok_or_else(|| SonarError::InvalidDate {
            value: value.to_string(),
            message: "local midnight does not exist".to_string(),
        })
}
