// Plot-ready series built from raw statistics responses
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::weeks::{weeks_between, IsoWeek};
use crate::error::{Result, SonarError};

/// Sample count of one week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyCount {
    pub week: String,
    pub count: u64,
}

/// Share of one lineage group within one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageWeekRecord {
    pub week: String,
    pub lineage_group: String,
    pub count: u64,
    pub percentage: f64,
}

impl LineageWeekRecord {
    /// Stand-in for a week without any samples
    pub fn placeholder(week: impl Into<String>) -> Self {
        Self {
            week: week.into(),
            lineage_group: String::new(),
            count: 0,
            percentage: 0.0,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.lineage_group.is_empty() && self.count == 0
    }
}

/// Metadata coverage of one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRow {
    pub property: String,
    pub count: u64,
    pub percentage: f64,
}

/// Counts for every week in `start..=end`; weeks missing from `sparse` get 0.
///
/// Duplicate weeks in the input are summed. Weeks outside the range are dropped.
pub fn fill_weekly_counts(
    sparse: &[WeeklyCount],
    start: &str,
    end: &str,
) -> Result<Vec<WeeklyCount>> {
    let start: IsoWeek = start.parse()?;
    let end: IsoWeek = end.parse()?;

    let mut by_week: AHashMap<&str, u64> = AHashMap::with_capacity(sparse.len());
    for entry in sparse {
        *by_week.entry(entry.week.as_str()).or_insert(0) += entry.count;
    }

    Ok(weeks_between(start, end)
        .into_iter()
        .map(|week| {
            let week = week.to_string();
            let count = by_week.get(week.as_str()).copied().unwrap_or(0);
            WeeklyCount { week, count }
        })
        .collect())
}

/// Gap-free series spanning the earliest to the latest week present
pub fn samples_per_week(sparse: &[WeeklyCount]) -> Result<Vec<WeeklyCount>> {
    match week_bounds(sparse.iter().map(|c| c.week.as_str()))? {
        Some((start, end)) => fill_weekly_counts(sparse, &start.to_string(), &end.to_string()),
        None => Ok(Vec::new()),
    }
}

/// Lineage records for every week in `start..=end`, ordered by week and then
/// by input order. A week with no records gets one placeholder record.
pub fn fill_grouped_lineages(
    records: &[LineageWeekRecord],
    start: &str,
    end: &str,
) -> Result<Vec<LineageWeekRecord>> {
    let start: IsoWeek = start.parse()?;
    let end: IsoWeek = end.parse()?;

    let mut by_week: AHashMap<&str, Vec<&LineageWeekRecord>> = AHashMap::new();
    for record in records {
        by_week.entry(record.week.as_str()).or_default().push(record);
    }

    let mut filled = Vec::with_capacity(records.len());
    for week in weeks_between(start, end) {
        let label = week.to_string();
        match by_week.get(label.as_str()) {
            Some(group) => filled.extend(group.iter().map(|r| (*r).clone())),
            None => filled.push(LineageWeekRecord::placeholder(label)),
        }
    }
    Ok(filled)
}

/// [`fill_grouped_lineages`] over the span of weeks present in `records`
pub fn grouped_lineages_per_week(records: &[LineageWeekRecord]) -> Result<Vec<LineageWeekRecord>> {
    match week_bounds(records.iter().map(|r| r.week.as_str()))? {
        Some((start, end)) => {
            fill_grouped_lineages(records, &start.to_string(), &end.to_string())
        }
        None => Ok(Vec::new()),
    }
}

fn week_bounds<'a>(labels: impl Iterator<Item = &'a str>) -> Result<Option<(IsoWeek, IsoWeek)>> {
    let mut bounds: Option<(IsoWeek, IsoWeek)> = None;
    for label in labels {
        let week: IsoWeek = label.parse()?;
        bounds = Some(match bounds {
            Some((lo, hi)) => (lo.min(week), hi.max(week)),
            None => (week, week),
        });
    }
    Ok(bounds)
}

/// Coverage rows sorted by descending count, then property name.
/// Percentages are of `total`, rounded to two decimals; a zero total gives 0.
pub fn coverage_series(coverage: &BTreeMap<String, u64>, total: u64) -> Vec<CoverageRow> {
    let mut rows: Vec<CoverageRow> = coverage
        .iter()
        .map(|(property, &count)| CoverageRow {
            property: property.clone(),
            count,
            percentage: percentage(count, total),
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.property.cmp(&b.property)));
    rows
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 10_000.0).round() / 100.0
}

/// Parse `[["2024-W01", 3], ...]` as returned by the samples-per-week endpoint
pub fn parse_weekly_pairs(value: &Value) -> Result<Vec<WeeklyCount>> {
    let pairs: Vec<(String, u64)> =
        serde_json::from_value(value.clone()).map_err(|e| SonarError::Json {
            source: e,
            context: "Unexpected samples-per-week response".to_string(),
        })?;
    Ok(pairs
        .into_iter()
        .map(|(week, count)| WeeklyCount { week, count })
        .collect())
}

/// Parse `{"grouped_lineages_per_week": [...]}`. The backend sends an empty
/// object instead of a list when nothing matched.
pub fn parse_grouped_lineages(value: &Value) -> Result<Vec<LineageWeekRecord>> {
    match value.get("grouped_lineages_per_week") {
        Some(Value::Array(_)) => {
            serde_json::from_value(value["grouped_lineages_per_week"].clone()).map_err(|e| {
                SonarError::Json {
                    source: e,
                    context: "Unexpected grouped lineage response".to_string(),
                }
            })
        }
        _ => Ok(Vec::new()),
    }
}

/// Parse a `{key: {category: count}}` object, e.g. metadata coverage or a
/// custom property plot. A missing key yields an empty map.
pub fn parse_category_counts(value: &Value, key: &str) -> Result<BTreeMap<String, u64>> {
    match value.get(key) {
        Some(inner @ Value::Object(_)) => {
            serde_json::from_value(inner.clone()).map_err(|e| SonarError::Json {
                source: e,
                context: format!("Unexpected counts under '{}'", key),
            })
        }
        _ => Ok(BTreeMap::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn count(week: &str, count: u64) -> WeeklyCount {
        WeeklyCount {
            week: week.to_string(),
            count,
        }
    }

    fn lineage(week: &str, group: &str, count: u64, percentage: f64) -> LineageWeekRecord {
        LineageWeekRecord {
            week: week.to_string(),
            lineage_group: group.to_string(),
            count,
            percentage,
        }
    }

    #[test]
    fn test_fill_weekly_counts() {
        let sparse = vec![count("2024-W01", 5), count("2024-W04", 2)];
        let filled = fill_weekly_counts(&sparse, "2024-W01", "2024-W04").unwrap();
        assert_eq!(
            filled,
            vec![
                count("2024-W01", 5),
                count("2024-W02", 0),
                count("2024-W03", 0),
                count("2024-W04", 2),
            ]
        );
    }

    #[test]
    fn test_fill_weekly_counts_without_data() {
        let filled = fill_weekly_counts(&[], "2024-W01", "2024-W04").unwrap();
        assert_eq!(filled.len(), 4);
        assert!(filled.iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_samples_per_week_derives_bounds() {
        let sparse = vec![count("2021-W01", 1), count("2020-W52", 4)];
        let filled = samples_per_week(&sparse).unwrap();
        let weeks: Vec<&str> = filled.iter().map(|c| c.week.as_str()).collect();
        assert_eq!(weeks, vec!["2020-W52", "2020-W53", "2021-W01"]);
        assert_eq!(filled[0].count, 4);
        assert!(samples_per_week(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_fill_grouped_lineages_inserts_placeholders() {
        let records = vec![
            lineage("2024-W03", "BA.2", 3, 75.0),
            lineage("2024-W01", "BA.5", 2, 100.0),
            lineage("2024-W03", "XBB.1", 1, 25.0),
        ];
        let filled = fill_grouped_lineages(&records, "2024-W01", "2024-W03").unwrap();
        assert_eq!(
            filled,
            vec![
                lineage("2024-W01", "BA.5", 2, 100.0),
                LineageWeekRecord::placeholder("2024-W02"),
                lineage("2024-W03", "BA.2", 3, 75.0),
                lineage("2024-W03", "XBB.1", 1, 25.0),
            ]
        );
        assert!(filled[1].is_placeholder());
    }

    #[test]
    fn test_coverage_series_sorting_and_rounding() {
        let coverage = BTreeMap::from([
            ("lab".to_string(), 2),
            ("lineage".to_string(), 3),
            ("host".to_string(), 2),
        ]);
        let rows = coverage_series(&coverage, 3);
        let names: Vec<&str> = rows.iter().map(|r| r.property.as_str()).collect();
        assert_eq!(names, vec!["lineage", "host", "lab"]);
        assert_eq!(rows[0].percentage, 100.0);
        assert_eq!(rows[1].percentage, 66.67);
        assert!(coverage_series(&coverage, 0).iter().all(|r| r.percentage == 0.0));
    }

    #[test]
    fn test_parse_responses() {
        let weekly = parse_weekly_pairs(&json!([["2024-W01", 3], ["2024-W03", 1]])).unwrap();
        assert_eq!(weekly, vec![count("2024-W01", 3), count("2024-W03", 1)]);

        let grouped = parse_grouped_lineages(&json!({"grouped_lineages_per_week": [
            {"week": "2024-W01", "lineage_group": "BA.2", "count": 4, "percentage": 100.0}
        ]}))
        .unwrap();
        assert_eq!(grouped, vec![lineage("2024-W01", "BA.2", 4, 100.0)]);

        let empty = parse_grouped_lineages(&json!({"grouped_lineages_per_week": {}})).unwrap();
        assert!(empty.is_empty());

        let coverage = parse_category_counts(
            &json!({"metadata_coverage": {"lab": 10, "host": 0}}),
            "metadata_coverage",
        )
        .unwrap();
        assert_eq!(coverage.get("lab"), Some(&10));
        assert!(parse_category_counts(&json!({}), "lab").unwrap().is_empty());
    }
}
