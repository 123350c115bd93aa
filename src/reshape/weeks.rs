// ISO week labels (`2024-W07`) and gap-free week ranges
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{Result, SonarError};

/// An ISO 8601 week. Week 1 is the week holding the year's first Thursday.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IsoWeek {
    year: i32,
    week: u32,
}

fn week_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-W(\d{2})$").expect("valid week regex"))
}

impl IsoWeek {
    /// Build a week, rejecting week numbers the ISO year does not have
    pub fn new(year: i32, week: u32) -> Option<Self> {
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).map(|_| Self { year, week })
    }

    /// The ISO week containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn monday(&self) -> NaiveDate {
        // constructor guarantees the week exists
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon).unwrap_or_default()
    }

    pub fn next(&self) -> Self {
        Self::from_date(self.monday() + Duration::weeks(1))
    }
}

impl fmt::Display for IsoWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

impl FromStr for IsoWeek {
    type Err = SonarError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SonarError::InvalidWeek {
            label: s.to_string(),
        };
        let caps = week_label_regex().captures(s.trim()).ok_or_else(invalid)?;
        let year: i32 = caps[1].parse().map_err(|_| invalid())?;
        let week: u32 = caps[2].parse().map_err(|_| invalid())?;
        Self::new(year, week).ok_or_else(invalid)
    }
}

impl TryFrom<String> for IsoWeek {
    type Error = SonarError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<IsoWeek> for String {
    fn from(week: IsoWeek) -> Self {
        week.to_string()
    }
}

/// Every week from `start` to `end`, both inclusive. Empty when start is after end.
pub fn weeks_between(start: IsoWeek, end: IsoWeek) -> Vec<IsoWeek> {
    let mut weeks = Vec::new();
    let mut current = start;
    while current <= end {
        weeks.push(current);
        current = current.next();
    }
    weeks
}

/// Label form of [`weeks_between`]; fails on malformed labels
pub fn generate_weeks_between(start: &str, end: &str) -> Result<Vec<String>> {
    let start: IsoWeek = start.parse()?;
    let end: IsoWeek = end.parse()?;
    if start > end {
        tracing::debug!(%start, %end, "week range is empty");
    }
    Ok(weeks_between(start, end)
        .into_iter()
        .map(|w| w.to_string())
        .collect())
}
