//! Data-file quality analysis.
//!
//! The tabular counterpart of metadata assessment: a decoded row set is
//! measured on completeness, uniqueness, type consistency, accuracy
//! (outliers), temporal coverage, portability and accessibility. Each
//! indicator is a ratio in `[0, 1]` carrying a fixed weight; indicators
//! that cannot be measured are excluded from both sides of the total, the
//! same way metadata metrics are.
//!
//! The only I/O is a single reachability check of the source URL, made
//! through the caller's [`UrlChecker`].

pub mod indicators;
pub mod portability;
pub mod table;

pub use indicators::{
    ColumnCompleteness, ColumnConsistency, ColumnOutliers, Completeness, Consistency, Duplicates,
    TemporalCoverage, ValueKind,
};
pub use portability::Portability;
pub use table::{Cell, Table};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::reachability::{Reachability, UrlChecker};
use crate::score::rating::{classify, Rating};
use crate::scoring::{round_to, COMPLIANCE_DECIMALS, SCORE_DECIMALS};

/// Indicator weights, summing to 100.
pub const COMPLETENESS_WEIGHT: f64 = 30.0;
pub const UNIQUENESS_WEIGHT: f64 = 20.0;
pub const CONSISTENCY_WEIGHT: f64 = 20.0;
pub const ACCURACY_WEIGHT: f64 = 10.0;
pub const ACCESSIBILITY_WEIGHT: f64 = 10.0;
pub const PORTABILITY_WEIGHT: f64 = 10.0;

/// Where the row set came from.
#[derive(Debug, Clone, Default)]
pub struct DataSource {
    pub url: Option<String>,
    /// Declared format (extension, name or media type).
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Completeness,
    Uniqueness,
    Consistency,
    Accuracy,
    Accessibility,
    Portability,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 6] = [
        IndicatorKind::Completeness,
        IndicatorKind::Uniqueness,
        IndicatorKind::Consistency,
        IndicatorKind::Accuracy,
        IndicatorKind::Accessibility,
        IndicatorKind::Portability,
    ];

    pub fn weight(self) -> f64 {
        match self {
            IndicatorKind::Completeness => COMPLETENESS_WEIGHT,
            IndicatorKind::Uniqueness => UNIQUENESS_WEIGHT,
            IndicatorKind::Consistency => CONSISTENCY_WEIGHT,
            IndicatorKind::Accuracy => ACCURACY_WEIGHT,
            IndicatorKind::Accessibility => ACCESSIBILITY_WEIGHT,
            IndicatorKind::Portability => PORTABILITY_WEIGHT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IndicatorKind::Completeness => "completeness",
            IndicatorKind::Uniqueness => "uniqueness",
            IndicatorKind::Consistency => "consistency",
            IndicatorKind::Accuracy => "accuracy",
            IndicatorKind::Accessibility => "accessibility",
            IndicatorKind::Portability => "portability",
        }
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One weighted indicator. `value` is `None` when it could not be measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    pub kind: IndicatorKind,
    pub weight: f64,
    pub value: Option<f64>,
    pub score: f64,
}

impl Indicator {
    fn new(kind: IndicatorKind, value: Option<f64>) -> Self {
        let weight = kind.weight();
        Self {
            kind,
            weight,
            value: value.map(|v| round_to(v, COMPLIANCE_DECIMALS)),
            score: round_to(value.map_or(0.0, |v| weight * v), SCORE_DECIMALS),
        }
    }

    pub fn is_scored(&self) -> bool {
        self.value.is_some()
    }
}

/// Complete data-file quality report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityReport {
    pub rows: usize,
    pub columns: usize,
    pub completeness: Completeness,
    pub duplicates: Duplicates,
    pub consistency: Consistency,
    pub outliers: Vec<ColumnOutliers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_coverage: Option<TemporalCoverage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<Reachability>,
    pub portability: Portability,
    /// In [`IndicatorKind::ALL`] order.
    pub indicators: Vec<Indicator>,
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub rating: Rating,
}

impl DataQualityReport {
    pub fn indicator(&self, kind: IndicatorKind) -> Option<&Indicator> {
        self.indicators.iter().find(|i| i.kind == kind)
    }

    pub fn total_outliers(&self) -> usize {
        self.outliers.iter().map(|o| o.outliers).sum()
    }
}

/// Single delegated reachability check; failures degrade to unreachable.
fn check_source(url: &str, checker: &dyn UrlChecker) -> Reachability {
    match checker.check(url.trim()) {
        Ok(result) => result,
        Err(e) => {
            warn!(url, error = %e, "source reachability check failed");
            Reachability::unreachable()
        }
    }
}

/// Analyze a row set. `checker` is `None` when reachability checks are
/// disabled, which excludes the accessibility indicator.
pub fn analyze(
    table: &Table,
    source: &DataSource,
    checker: Option<&dyn UrlChecker>,
) -> DataQualityReport {
    let rows = table.row_count();
    let has_cells = rows > 0 && table.column_count() > 0;

    let completeness = indicators::completeness(table);
    let duplicates = indicators::duplicates(table);
    let consistency = indicators::consistency(table);
    let outliers = indicators::outliers(table);
    let temporal_coverage = indicators::temporal_coverage(table);
    let portability = Portability::detect(source.format.as_deref(), source.url.as_deref());
    let accessibility = match (source.url.as_deref(), checker) {
        (Some(url), Some(checker)) => Some(check_source(url, checker)),
        _ => None,
    };

    let numeric_values: usize = outliers.iter().map(|o| o.values).sum();
    let outlier_count: usize = outliers.iter().map(|o| o.outliers).sum();
    let populated = consistency.columns.iter().any(|c| c.non_null > 0);

    let value = |kind: IndicatorKind| -> Option<f64> {
        match kind {
            IndicatorKind::Completeness => has_cells.then_some(completeness.overall),
            IndicatorKind::Uniqueness => {
                has_cells.then(|| 1.0 - duplicates.duplicated_records as f64 / rows as f64)
            }
            IndicatorKind::Consistency => populated.then_some(consistency.overall),
            IndicatorKind::Accuracy => (numeric_values > 0)
                .then(|| 1.0 - outlier_count as f64 / numeric_values as f64),
            IndicatorKind::Accessibility => accessibility
                .as_ref()
                .map(|r| if r.accessible { 1.0 } else { 0.0 }),
            IndicatorKind::Portability => portability.value(),
        }
    };

    // Accumulate at full precision before rounding for presentation.
    let mut score = 0.0;
    let mut max_score = 0.0;
    let mut indicator_list = Vec::with_capacity(IndicatorKind::ALL.len());
    for kind in IndicatorKind::ALL {
        let v = value(kind);
        if let Some(v) = v {
            score += kind.weight() * v;
            max_score += kind.weight();
        }
        indicator_list.push(Indicator::new(kind, v));
    }
    let percentage = if max_score > 0.0 {
        score / max_score * 100.0
    } else {
        0.0
    };
    let rating = classify(score, max_score);

    debug!(rows, columns = table.column_count(), score, max_score, "analyzed data file");

    DataQualityReport {
        rows,
        columns: table.column_count(),
        completeness: indicators::round_completeness(completeness),
        duplicates,
        consistency: indicators::round_consistency(consistency),
        outliers,
        temporal_coverage,
        accessibility,
        portability,
        indicators: indicator_list,
        score: round_to(score, SCORE_DECIMALS),
        max_score: round_to(max_score, SCORE_DECIMALS),
        percentage: round_to(percentage, SCORE_DECIMALS),
        rating,
    }
}
