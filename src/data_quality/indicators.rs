//! Column and row indicators over a [`Table`].
//!
//! Every function here is pure: the same table gives the same numbers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::table::{Cell, Table};
use crate::scoring::{round_to, COMPLIANCE_DECIMALS, SCORE_DECIMALS};

/// Outlier rule: population standard deviations from the mean.
pub const OUTLIER_SIGMA: f64 = 3.0;

/// Naive date formats tried after RFC 3339.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
pub const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

// ---------------------------------------------------------------------------
// Completeness
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnCompleteness {
    pub column: String,
    pub non_null: usize,
    pub total: usize,
    /// `non_null / total`, 0 for an empty table.
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completeness {
    /// Mean of the column ratios.
    pub overall: f64,
    pub columns: Vec<ColumnCompleteness>,
}

pub fn completeness(table: &Table) -> Completeness {
    let total = table.row_count();
    let columns: Vec<ColumnCompleteness> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let non_null = table.column(i).filter(|c| !c.is_null()).count();
            ColumnCompleteness {
                column: name.clone(),
                non_null,
                total,
                ratio: ratio(non_null, total),
            }
        })
        .collect();

    let overall = if columns.is_empty() {
        0.0
    } else {
        columns.iter().map(|c| c.ratio).sum::<f64>() / columns.len() as f64
    };
    Completeness { overall, columns }
}

// ---------------------------------------------------------------------------
// Duplicates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Duplicates {
    /// Rows beyond the first of each group of identical rows.
    pub duplicated_records: usize,
    /// Groups of identical rows with more than one member.
    pub duplicate_groups: usize,
    pub distinct_records: usize,
}

/// Full-row equality on canonical cell values.
pub fn duplicates(table: &Table) -> Duplicates {
    let mut groups: BTreeMap<Vec<String>, usize> = BTreeMap::new();
    for row in table.rows() {
        let key = row.iter().map(Cell::canonical).collect();
        *groups.entry(key).or_default() += 1;
    }
    Duplicates {
        duplicated_records: table.row_count() - groups.len(),
        duplicate_groups: groups.values().filter(|&&n| n > 1).count(),
        distinct_records: groups.len(),
    }
}

// ---------------------------------------------------------------------------
// Type consistency
// ---------------------------------------------------------------------------

/// Kind of a non-null cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Number,
    Boolean,
    Date,
    Text,
}

impl ValueKind {
    pub fn of(cell: &Cell) -> Option<Self> {
        if cell.is_null() {
            None
        } else if cell.as_number().is_some() {
            Some(ValueKind::Number)
        } else if cell.as_bool().is_some() {
            Some(ValueKind::Boolean)
        } else if cell.as_text().and_then(parse_timestamp).is_some() {
            Some(ValueKind::Date)
        } else {
            Some(ValueKind::Text)
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Date => "date",
            ValueKind::Text => "text",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConsistency {
    pub column: String,
    /// Most frequent kind; `None` for an all-null column.
    pub kind: Option<ValueKind>,
    pub matching: usize,
    pub non_null: usize,
    /// `matching / non_null`.
    pub ratio: f64,
}

impl ColumnConsistency {
    /// Every non-null cell has the column's kind.
    pub fn is_uniform(&self, kind: ValueKind) -> bool {
        self.kind == Some(kind) && self.matching == self.non_null
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consistency {
    /// Mean ratio over columns with at least one value.
    pub overall: f64,
    pub columns: Vec<ColumnConsistency>,
}

/// Share of each column's values that have the column's dominant kind.
/// Ties between kinds go to the one declared first in [`ValueKind`].
pub fn consistency(table: &Table) -> Consistency {
    let columns: Vec<ColumnConsistency> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut counts: BTreeMap<ValueKind, usize> = BTreeMap::new();
            for kind in table.column(i).filter_map(ValueKind::of) {
                *counts.entry(kind).or_default() += 1;
            }
            let non_null = counts.values().sum();
            let dominant = counts
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
                .map(|(k, n)| (*k, *n));
            ColumnConsistency {
                column: name.clone(),
                kind: dominant.map(|(k, _)| k),
                matching: dominant.map_or(0, |(_, n)| n),
                non_null,
                ratio: dominant.map_or(0.0, |(_, n)| ratio(n, non_null)),
            }
        })
        .collect();

    let populated: Vec<f64> = columns
        .iter()
        .filter(|c| c.non_null > 0)
        .map(|c| c.ratio)
        .collect();
    let overall = if populated.is_empty() {
        0.0
    } else {
        populated.iter().sum::<f64>() / populated.len() as f64
    };
    Consistency { overall, columns }
}

// ---------------------------------------------------------------------------
// Outliers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnOutliers {
    pub column: String,
    pub values: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub outliers: usize,
}

/// Outliers per numeric column: `|x - mean| > 3σ` with the population
/// standard deviation. A column is numeric when all of its non-null cells
/// are finite numbers. Zero spread yields no outliers.
///
/// Values are divided by the column's largest magnitude before summing, so
/// columns near `f64::MAX` keep finite statistics.
pub fn outliers(table: &Table) -> Vec<ColumnOutliers> {
    let mut result = Vec::new();
    for (i, name) in table.columns().iter().enumerate() {
        let cells: Vec<&Cell> = table.column(i).filter(|c| !c.is_null()).collect();
        let values: Vec<f64> = cells.iter().filter_map(|c| c.as_number()).collect();
        if values.is_empty() || values.len() != cells.len() {
            continue;
        }
        let Some(stats) = Spread::of(&values) else {
            continue;
        };

        let count = if stats.std_dev == 0.0 {
            0
        } else {
            values
                .iter()
                .filter(|v| (*v / stats.scale - stats.mean).abs() > OUTLIER_SIGMA * stats.std_dev)
                .count()
        };

        result.push(ColumnOutliers {
            column: name.clone(),
            values: values.len(),
            mean: round_to(stats.mean * stats.scale, SCORE_DECIMALS),
            std_dev: round_to(stats.std_dev * stats.scale, SCORE_DECIMALS),
            outliers: count,
        });
    }
    result
}

/// Mean and population deviation of `values / scale`.
struct Spread {
    scale: f64,
    mean: f64,
    std_dev: f64,
}

impl Spread {
    fn of(values: &[f64]) -> Option<Self> {
        let largest = values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        let scale = if largest > 0.0 { largest } else { 1.0 };
        let n = values.len() as f64;
        let mean = values.iter().map(|v| v / scale).sum::<f64>() / n;
        let variance = values
            .iter()
            .map(|v| (v / scale - mean).powi(2))
            .sum::<f64>()
            / n;
        let spread = Self {
            scale,
            mean,
            std_dev: variance.sqrt(),
        };
        let representable = [spread.mean * scale, spread.std_dev * scale]
            .iter()
            .all(|x| x.is_finite());
        representable.then_some(spread)
    }
}

// ---------------------------------------------------------------------------
// Temporal coverage
// ---------------------------------------------------------------------------

/// Parse a date or timestamp under the fixed format list.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalCoverage {
    /// Columns whose non-null values all parse as dates.
    pub columns: Vec<String>,
    pub earliest: String,
    pub latest: String,
    pub span_days: i64,
}

/// Earliest and latest date across all date columns, or `None` when the
/// table has none.
pub fn temporal_coverage(table: &Table) -> Option<TemporalCoverage> {
    let mut columns = Vec::new();
    let mut range: Option<(NaiveDateTime, NaiveDateTime)> = None;

    for (i, name) in table.columns().iter().enumerate() {
        let parsed: Option<Vec<NaiveDateTime>> = table
            .column(i)
            .filter(|c| !c.is_null())
            .map(|c| c.as_text().and_then(parse_timestamp))
            .collect();
        let Some(dates) = parsed.filter(|d| !d.is_empty()) else {
            continue;
        };

        columns.push(name.clone());
        for date in dates {
            range = Some(match range {
                None => (date, date),
                Some((lo, hi)) => (lo.min(date), hi.max(date)),
            });
        }
    }

    let (earliest, latest) = range?;
    Some(TemporalCoverage {
        columns,
        earliest: earliest.format("%Y-%m-%dT%H:%M:%S").to_string(),
        latest: latest.format("%Y-%m-%dT%H:%M:%S").to_string(),
        span_days: (latest - earliest).num_days(),
    })
}

/// Round every ratio for presentation.
pub(super) fn round_completeness(mut c: Completeness) -> Completeness {
    c.overall = round_to(c.overall, COMPLIANCE_DECIMALS);
    for column in &mut c.columns {
        column.ratio = round_to(column.ratio, COMPLIANCE_DECIMALS);
    }
    c
}

pub(super) fn round_consistency(mut c: Consistency) -> Consistency {
    c.overall = round_to(c.overall, COMPLIANCE_DECIMALS);
    for column in &mut c.columns {
        column.ratio = round_to(column.ratio, COMPLIANCE_DECIMALS);
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(records: serde_json::Value) -> Table {
        Table::from_records(records.as_array().unwrap()).unwrap()
    }

    // =========================================================================
    // COMPLETENESS
    // =========================================================================

    #[test]
    fn test_completeness_hundred_rows_ten_nulls() {
        let records: Vec<_> = (0..100)
            .map(|i| {
                if i % 10 == 0 {
                    json!({"id": i, "date": null})
                } else {
                    json!({"id": i, "date": "2024-01-15"})
                }
            })
            .collect();
        let c = completeness(&Table::from_records(&records).unwrap());
        let date = c.columns.iter().find(|c| c.column == "date").unwrap();
        assert_eq!(date.non_null, 90);
        assert_eq!(date.ratio, 0.90);
        assert!((c.overall - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_completeness_null_tokens() {
        let c = completeness(&table(json!([{"a": "n/a"}, {"a": " "}, {"a": "x"}, {"a": "NULL"}])));
        assert_eq!(c.columns[0].non_null, 1);
        assert_eq!(c.columns[0].ratio, 0.25);
    }

    #[test]
    fn test_completeness_empty_table() {
        let c = completeness(&Table::default());
        assert_eq!(c.overall, 0.0);
        assert!(c.columns.is_empty());
    }

    // =========================================================================
    // DUPLICATES
    // =========================================================================

    #[test]
    fn test_duplicates_two_identical_of_five() {
        let t = table(json!([
            {"a": 1, "b": "x"},
            {"a": 1, "b": "x"},
            {"a": 2, "b": "y"},
            {"a": 3, "b": "z"},
            {"a": 4, "b": "w"}
        ]));
        let d = duplicates(&t);
        // One extra row, one group: the two readings agree here.
        assert_eq!(d.duplicated_records, 1);
        assert_eq!(d.duplicate_groups, 1);
        assert_eq!(d.distinct_records, 4);
    }

    #[test]
    fn test_duplicates_counts_rows_not_pairs() {
        // Three identical rows form three pairs, but only two rows are redundant.
        let t = table(json!([{"a": 1}, {"a": 1}, {"a": 1}, {"a": 2}]));
        let d = duplicates(&t);
        assert_eq!(d.duplicated_records, 2);
        assert_eq!(d.duplicate_groups, 1);
    }

    #[test]
    fn test_duplicates_normalization() {
        let t = table(json!([
            {"a": "1.0", "b": " Madrid "},
            {"a": 1, "b": "Madrid"},
            {"a": 1, "b": "madrid"},
            {"a": "NA", "b": null},
            {"a": null, "b": ""}
        ]));
        let d = duplicates(&t);
        assert_eq!(d.duplicated_records, 2);
        assert_eq!(d.duplicate_groups, 2);
    }

    // =========================================================================
    // CONSISTENCY
    // =========================================================================

    #[test]
    fn test_consistency_dominant_kind() {
        let t = table(json!([
            {"n": 1, "d": "2024-01-01", "t": "a"},
            {"n": "2", "d": "2024-02-01", "t": "b"},
            {"n": "three", "d": null, "t": "c"},
            {"n": 4, "d": "01/03/2024", "t": null}
        ]));
        let c = consistency(&t);
        let column = |name: &str| c.columns.iter().find(|c| c.column == name).unwrap();
        let n = column("n");
        assert_eq!(n.kind, Some(ValueKind::Number));
        assert_eq!((n.matching, n.non_null), (3, 4));
        assert_eq!(n.ratio, 0.75);
        assert!(column("d").is_uniform(ValueKind::Date));
        assert!(column("t").is_uniform(ValueKind::Text));
    }

    #[test]
    fn test_consistency_ignores_empty_columns() {
        let t = table(json!([{"a": 1, "b": null}, {"a": 2, "b": null}]));
        let c = consistency(&t);
        assert_eq!(c.columns.iter().find(|c| c.column == "b").unwrap().kind, None);
        assert_eq!(c.overall, 1.0);
    }

    // =========================================================================
    // OUTLIERS
    // =========================================================================

    #[test]
    fn test_outliers_three_sigma() {
        let mut records: Vec<_> = (0..20).map(|_| json!({"v": 10})).collect();
        records.push(json!({"v": 1000}));
        let o = outliers(&Table::from_records(&records).unwrap());
        assert_eq!(o.len(), 1);
        assert_eq!(o[0].values, 21);
        assert_eq!(o[0].outliers, 1);
    }

    #[test]
    fn test_outliers_small_sample_has_none() {
        // With n values the largest possible z-score is (n-1)/sqrt(n).
        let t = table(json!([{"v": 1}, {"v": 1}, {"v": 1}, {"v": 100}]));
        assert_eq!(outliers(&t)[0].outliers, 0);
    }

    #[test]
    fn test_outliers_constant_and_mixed_columns() {
        let t = table(json!([{"c": 5, "m": 1}, {"c": 5, "m": "x"}]));
        let o = outliers(&t);
        assert_eq!(o.len(), 1);
        assert_eq!(o[0].column, "c");
        assert_eq!(o[0].std_dev, 0.0);
        assert_eq!(o[0].outliers, 0);
    }

    #[test]
    #[allow(overflowing_literals)]
    fn test_outliers_near_float_limit_stay_finite() {
        let t = table(json!([{"v": 1e308}, {"v": 1e308}, {"v": 1.0}]));
        let o = outliers(&t);
        assert_eq!(o.len(), 1);
        assert!(o[0].mean.is_finite());
        assert!(o[0].std_dev.is_finite());
        assert!((o[0].mean - 2e308 / 3.0).abs() < 1e294);
        assert_eq!(o[0].outliers, 0);

        let json = serde_json::to_string(&o[0]).unwrap();
        assert!(!json.contains("null"));
        let back: ColumnOutliers = serde_json::from_str(&json).unwrap();
        assert_eq!(back, o[0]);
    }

    #[test]
    fn test_outliers_detected_at_large_magnitude() {
        let mut records: Vec<_> = (0..20).map(|_| json!({"v": 1e300})).collect();
        records.push(json!({"v": 1e307}));
        let o = outliers(&Table::from_records(&records).unwrap());
        assert_eq!(o[0].outliers, 1);
        assert!(o[0].std_dev.is_finite());
    }

    // =========================================================================
    // TEMPORAL COVERAGE
    // =========================================================================

    #[test]
    fn test_parse_timestamp_formats() {
        for value in [
            "2024-03-01T10:00:00Z",
            "2024-03-01T10:00:00+02:00",
            "2024-03-01",
            "2024-03-01 10:00:00",
            "2024-03-01T10:00:00",
            "01/03/2024",
            "2024/03/01",
        ] {
            assert!(parse_timestamp(value).is_some(), "{}", value);
        }
        assert!(parse_timestamp("March 2024").is_none());
        assert!(parse_timestamp("2024-13-01").is_none());
    }

    #[test]
    fn test_temporal_coverage_span() {
        let t = table(json!([
            {"date": "2024-01-01", "other": "x"},
            {"date": "31/12/2024", "other": "y"},
            {"date": null, "other": "z"}
        ]));
        let cov = temporal_coverage(&t).unwrap();
        assert_eq!(cov.columns, vec!["date".to_string()]);
        assert_eq!(cov.earliest, "2024-01-01T00:00:00");
        assert_eq!(cov.latest, "2024-12-31T00:00:00");
        assert_eq!(cov.span_days, 365);
    }

    #[test]
    fn test_temporal_coverage_requires_all_dates() {
        let t = table(json!([{"d": "2024-01-01"}, {"d": "soon"}]));
        assert!(temporal_coverage(&t).is_none());
    }
}
