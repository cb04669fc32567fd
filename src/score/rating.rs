//! Rating classification and improvement suggestions.
//!
//! Bands are fractions of the profile's maximum score, so the same
//! breakpoints work for a 405-point and a 250-point profile:
//!
//! - Excellent: at least 86.7%
//! - Good: at least 54.6%
//! - Sufficient: at least 29.9%
//! - Poor: anything below
//!
//! A score sitting exactly on a breakpoint gets the higher rating.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metric::Dimension;
use crate::profile::{EvaluationSettings, Profile};
use crate::scoring::{ExactTotals, QualityResult};

pub const EXCELLENT_THRESHOLD: f64 = 86.7;
pub const GOOD_THRESHOLD: f64 = 54.6;
pub const SUFFICIENT_THRESHOLD: f64 = 29.9;

/// Slack for percentages that land on a breakpoint after float division.
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Ordinal quality rating, `Poor < Sufficient < Good < Excellent`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Poor,
    Sufficient,
    Good,
    Excellent,
}

impl Rating {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Poor => "poor",
            Self::Sufficient => "sufficient",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }

    /// Lower bound of the band, in percent.
    pub fn threshold(self) -> f64 {
        match self {
            Self::Poor => 0.0,
            Self::Sufficient => SUFFICIENT_THRESHOLD,
            Self::Good => GOOD_THRESHOLD,
            Self::Excellent => EXCELLENT_THRESHOLD,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excellent => write!(f, "🟢 Excellent"),
            Self::Good => write!(f, "🔵 Good"),
            Self::Sufficient => write!(f, "🟡 Sufficient"),
            Self::Poor => write!(f, "🔴 Poor"),
        }
    }
}

/// Rating of a percentage in `[0, 100]`.
pub fn classify_percentage(percentage: f64) -> Rating {
    if !percentage.is_finite() {
        return Rating::Poor;
    }
    let p = percentage + BOUNDARY_EPSILON;
    if p >= EXCELLENT_THRESHOLD {
        Rating::Excellent
    } else if p >= GOOD_THRESHOLD {
        Rating::Good
    } else if p >= SUFFICIENT_THRESHOLD {
        Rating::Sufficient
    } else {
        Rating::Poor
    }
}

/// Rating of `score` against a point budget. A zero budget rates poor.
pub fn classify(score: f64, max_score: f64) -> Rating {
    if max_score <= 0.0 {
        return Rating::Poor;
    }
    classify_percentage(score / max_score * 100.0)
}

/// Score as measured against the profile's full budget, unrounded.
///
/// Under proportional evaluation the achieved share of the applicable
/// metrics is scaled up to the profile maximum; otherwise the raw total is
/// used.
pub fn profile_score(totals: &ExactTotals, profile: &Profile, settings: EvaluationSettings) -> f64 {
    if settings.use_proportional_evaluation {
        totals.percentage() / 100.0 * profile.max_score
    } else {
        totals.score
    }
}

/// Rate the unrounded totals of an assessment for its profile.
pub fn rate(totals: &ExactTotals, profile: &Profile, settings: EvaluationSettings) -> Rating {
    classify(profile_score(totals, profile, settings), profile.max_score)
}

fn dimension_hint(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Findability => {
            "Describe datasets with keywords, themes and coverage so they can be found"
        }
        Dimension::Accessibility => "Make access and download URLs resolve to live resources",
        Dimension::Interoperability => {
            "Declare formats and media types from the controlled vocabularies"
        }
        Dimension::Reusability => "State licences, access rights, publisher and contact point",
        Dimension::Contextuality => "Add issue and modification dates, rights and byte sizes",
    }
}

/// Suggestions for every dimension rated below good, plus one line per
/// partially compliant metric in those dimensions.
///
/// Dimensions are rated on `totals`; `quality` supplies the metric lines.
pub fn generate_suggestions(quality: &QualityResult, totals: &ExactTotals) -> Vec<String> {
    let mut suggestions = Vec::new();

    for (dimension, sums) in &totals.by_category {
        if sums.scored_metrics == 0 || classify_percentage(sums.percentage()) >= Rating::Good {
            continue;
        }
        suggestions.push(format!("{}: {}", dimension, dimension_hint(*dimension)));

        for metric in quality
            .metrics
            .iter()
            .filter(|m| m.category == *dimension && m.scored)
            .filter(|m| m.compliant_entities < m.total_entities)
        {
            suggestions.push(format!(
                "{}: {} complies for {}/{} {} entities",
                dimension,
                metric.metric_id,
                metric.compliant_entities,
                metric.total_entities,
                metric.entity_type
            ));
        }
    }

    suggestions.sort();
    suggestions.dedup();
    suggestions
}
