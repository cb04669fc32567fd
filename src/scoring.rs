//! Metric results and the proportional compliance calculator.
//!
//! Per-metric values are kept at full precision while they are produced.
//! [`QualityResult::calculate_exact`] sums them in metric-id order, keeps the
//! unrounded sums in [`ExactTotals`] and rounds only the figures it hands out:
//!
//! - scores, maximums and percentages: 3 decimal places
//! - compliance ratios: 4 decimal places
//!
//! Rounding is half away from zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::metric::{Dimension, EntityType};

pub const SCORE_DECIMALS: i32 = 3;
pub const COMPLIANCE_DECIMALS: i32 = 4;

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    // Magnitudes this large carry no fractional digits to round.
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / factor;
    // Avoid handing out -0.0.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Why a metric does not count towards the totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Exclusion {
    /// No entity of the metric's type is present.
    NoEntities,
    /// Fewer entities than the configured minimum.
    BelowThreshold { minimum: usize },
    /// The metric could not be evaluated (bad path, unknown vocabulary).
    Failed { message: String },
    /// Shape-conformance metric without a validation report.
    ShapeReportUnavailable,
    /// Status metric while reachability checks are disabled.
    ReachabilityUnavailable,
}

impl Exclusion {
    /// Exclusions that still count in non-proportional mode.
    pub fn is_scoreable(&self) -> bool {
        matches!(self, Exclusion::NoEntities | Exclusion::BelowThreshold { .. })
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEntities => write!(f, "no entities"),
            Self::BelowThreshold { minimum } => write!(f, "fewer than {} entities", minimum),
            Self::Failed { message } => write!(f, "failed: {}", message),
            Self::ShapeReportUnavailable => write!(f, "no shape report"),
            Self::ReachabilityUnavailable => write!(f, "reachability checks disabled"),
        }
    }
}

/// Compliant out of total for one entity group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceCount {
    pub compliant: usize,
    pub total: usize,
}

/// Per-type split of a `Multi` metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiBreakdown {
    pub dataset_entities: ComplianceCount,
    pub distribution_entities: ComplianceCount,
}

/// Outcome of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricResult {
    pub metric_id: String,
    pub entity_type: EntityType,
    pub category: Dimension,
    pub total_entities: usize,
    pub compliant_entities: usize,
    /// Ratio in `[0, 1]`.
    pub compliance_percentage: f64,
    /// The metric applies to this graph.
    pub found: bool,
    /// The metric's weight counts in `maxScore`.
    pub scored: bool,
    pub score: f64,
    pub max_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<MultiBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusion: Option<Exclusion>,
}

impl MetricResult {
    /// Result for a metric that was evaluated against `total` entities.
    pub fn evaluated(
        metric_id: &str,
        entity_type: EntityType,
        category: Dimension,
        weight: f64,
        count: ComplianceCount,
    ) -> Self {
        let compliance = if count.total == 0 {
            0.0
        } else {
            count.compliant as f64 / count.total as f64
        };
        Self {
            metric_id: metric_id.to_string(),
            entity_type,
            category,
            total_entities: count.total,
            compliant_entities: count.compliant,
            compliance_percentage: compliance,
            found: count.total > 0,
            scored: count.total > 0,
            score: weight * compliance,
            max_score: weight,
            breakdown: None,
            exclusion: None,
        }
    }

    /// Result for a metric that could not be evaluated at all.
    pub fn failed(
        metric_id: &str,
        entity_type: EntityType,
        category: Dimension,
        weight: f64,
        total: usize,
        exclusion: Exclusion,
    ) -> Self {
        Self {
            metric_id: metric_id.to_string(),
            entity_type,
            category,
            total_entities: total,
            compliant_entities: 0,
            compliance_percentage: 0.0,
            found: false,
            scored: false,
            score: 0.0,
            max_score: weight,
            breakdown: None,
            exclusion: Some(exclusion),
        }
    }

    pub fn with_breakdown(mut self, breakdown: MultiBreakdown) -> Self {
        self.breakdown = Some(breakdown);
        self
    }

    /// Mark the metric as excluded. Under proportional evaluation the weight
    /// no longer counts; `scored` is decided by the caller.
    pub fn excluded(mut self, exclusion: Exclusion, scored: bool) -> Self {
        self.found = false;
        self.scored = scored;
        self.exclusion = Some(exclusion);
        self
    }

    fn rounded(&self) -> Self {
        Self {
            compliance_percentage: round_to(self.compliance_percentage, COMPLIANCE_DECIMALS),
            score: round_to(self.score, SCORE_DECIMALS),
            max_score: round_to(self.max_score, SCORE_DECIMALS),
            ..self.clone()
        }
    }
}

/// Aggregate of one dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScore {
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub scored_metrics: usize,
    pub total_metrics: usize,
}

/// Profile-level quality figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityResult {
    pub total_score: f64,
    pub max_score: f64,
    pub percentage: f64,
    /// Every dimension, including those without scored metrics.
    pub by_category: BTreeMap<Dimension, DimensionScore>,
    /// Sorted by metric id.
    pub metrics: Vec<MetricResult>,
}

/// Unrounded sums for one dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DimensionTotals {
    pub score: f64,
    pub max_score: f64,
    pub scored_metrics: usize,
    pub total_metrics: usize,
}

impl DimensionTotals {
    pub fn percentage(&self) -> f64 {
        percentage(self.score, self.max_score)
    }
}

/// Full-precision totals behind a [`QualityResult`].
///
/// Ratings and the profile score are computed from these; the rounded
/// figures in [`QualityResult`] are for display only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExactTotals {
    pub score: f64,
    pub max_score: f64,
    pub by_category: BTreeMap<Dimension, DimensionTotals>,
}

impl ExactTotals {
    pub fn percentage(&self) -> f64 {
        percentage(self.score, self.max_score)
    }

    pub fn dimension(&self, dimension: Dimension) -> DimensionTotals {
        self.by_category
            .get(&dimension)
            .copied()
            .unwrap_or_default()
    }
}

fn percentage(score: f64, max_score: f64) -> f64 {
    if max_score > 0.0 {
        score / max_score * 100.0
    } else {
        0.0
    }
}

impl QualityResult {
    /// Roll metric results up into dimension and overall totals.
    ///
    /// Only metrics with `scored == true` contribute, to both the achieved
    /// score and the maximum.
    pub fn calculate(metrics: Vec<MetricResult>) -> Self {
        Self::calculate_exact(metrics).0
    }

    /// Like [`QualityResult::calculate`], also returning the unrounded sums.
    pub fn calculate_exact(mut metrics: Vec<MetricResult>) -> (Self, ExactTotals) {
        metrics.sort_by(|a, b| a.metric_id.cmp(&b.metric_id));

        let mut totals = ExactTotals {
            by_category: Dimension::ALL
                .iter()
                .map(|d| (*d, DimensionTotals::default()))
                .collect(),
            ..ExactTotals::default()
        };

        for metric in &metrics {
            let entry = totals.by_category.entry(metric.category).or_default();
            entry.total_metrics += 1;
            if metric.scored {
                entry.score += metric.score;
                entry.max_score += metric.max_score;
                entry.scored_metrics += 1;
            }
        }

        let mut by_category = BTreeMap::new();
        for (dimension, sums) in &totals.by_category {
            by_category.insert(
                *dimension,
                DimensionScore {
                    score: round_to(sums.score, SCORE_DECIMALS),
                    max_score: round_to(sums.max_score, SCORE_DECIMALS),
                    percentage: round_to(sums.percentage(), SCORE_DECIMALS),
                    scored_metrics: sums.scored_metrics,
                    total_metrics: sums.total_metrics,
                },
            );
        }
        totals.score = totals.by_category.values().map(|d| d.score).sum();
        totals.max_score = totals.by_category.values().map(|d| d.max_score).sum();

        let quality = Self {
            total_score: round_to(totals.score, SCORE_DECIMALS),
            max_score: round_to(totals.max_score, SCORE_DECIMALS),
            percentage: round_to(totals.percentage(), SCORE_DECIMALS),
            by_category,
            metrics: metrics.iter().map(MetricResult::rounded).collect(),
        };
        (quality, totals)
    }

    pub fn metric(&self, id: &str) -> Option<&MetricResult> {
        self.metrics
            .binary_search_by(|m| m.metric_id.as_str().cmp(id))
            .ok()
            .map(|i| &self.metrics[i])
    }

    pub fn dimension(&self, dimension: Dimension) -> DimensionScore {
        self.by_category
            .get(&dimension)
            .copied()
            .unwrap_or_default()
    }
}
