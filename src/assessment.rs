//! End-to-end metadata assessment.
//!
//! Ties the pipeline together: resolve the profile, extract entities,
//! batch-check URLs, evaluate metrics, aggregate, merge the shape report,
//! and rate. Configuration problems fail before any evaluation; everything
//! after that either completes or was degraded locally.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::error::{AssessmentError, Result};
use crate::evaluate::{evaluate_profile, status_urls, EvaluationContext};
use crate::extract::Extraction;
use crate::graph::Graph;
use crate::metric::EntityType;
use crate::profile::ProfileCatalog;
use crate::reachability::{check_all, ReachabilityTable, UrlChecker, DEFAULT_CONCURRENCY};
use crate::score::rating::{generate_suggestions, profile_score, rate, Rating};
use crate::scoring::{round_to, QualityResult, SCORE_DECIMALS};
use crate::shapes::{merge, MergedShapeReport, ShapeReport, ShapeValidator};
use crate::vocabulary::VocabularyLookup;

/// External services an assessment may call.
pub struct Collaborators<'a> {
    pub vocabularies: &'a dyn VocabularyLookup,
    /// `None` disables reachability checks; status metrics are then excluded.
    pub urls: Option<&'a dyn UrlChecker>,
    /// `None` means no shape report; shape-conformance metrics are excluded.
    pub shapes: Option<&'a dyn ShapeValidator>,
    /// Maximum in-flight URL checks.
    pub concurrency: usize,
}

impl<'a> Collaborators<'a> {
    /// Vocabulary lookups only.
    pub fn offline(vocabularies: &'a dyn VocabularyLookup) -> Self {
        Self {
            vocabularies,
            urls: None,
            shapes: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_urls(mut self, checker: &'a dyn UrlChecker) -> Self {
        self.urls = Some(checker);
        self
    }

    pub fn with_shapes(mut self, validator: &'a dyn ShapeValidator) -> Self {
        self.shapes = Some(validator);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Everything one assessment run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentReport {
    pub profile: String,
    pub version: String,
    pub profile_name: String,
    /// The profile's full point budget.
    pub profile_max_score: f64,
    /// Achieved score measured against `profile_max_score`.
    pub profile_score: f64,
    pub rating: Rating,
    pub quality: QualityResult,
    pub entity_counts: BTreeMap<EntityType, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shapes: Option<MergedShapeReport>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Assess a parsed graph against a profile of `catalog`.
pub fn assess_graph(
    graph: &Graph,
    catalog: &ProfileCatalog,
    profile: &str,
    version: Option<&str>,
    collaborators: &Collaborators<'_>,
) -> Result<AssessmentReport> {
    let profile = catalog.resolve(profile, version)?;
    if graph.is_empty() {
        return Err(AssessmentError::InvalidInput("graph contains no triples".to_string()));
    }
    let settings = catalog.settings();

    let extraction = Extraction::from_graph(graph);

    let reachability: Option<ReachabilityTable> = collaborators.urls.map(|checker| {
        let urls = status_urls(&profile, &extraction);
        check_all(checker, urls, collaborators.concurrency)
    });

    let shape_report: Option<ShapeReport> = collaborators.shapes.and_then(|validator| {
        match validator.validate(graph, &profile.shape_files) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(profile = %profile.id, error = %e, "shape validation unavailable");
                None
            }
        }
    });

    let ctx = EvaluationContext {
        extraction: &extraction,
        vocabularies: collaborators.vocabularies,
        reachability: reachability.as_ref(),
        shapes: shape_report.as_ref(),
        settings,
    };
    let (quality, totals) = QualityResult::calculate_exact(evaluate_profile(&profile, &ctx));
    let rating = rate(&totals, &profile, settings);
    let achieved = profile_score(&totals, &profile, settings);
    let suggestions = generate_suggestions(&quality, &totals);

    info!(
        profile = %profile.id,
        version = %profile.version,
        score = quality.total_score,
        max = quality.max_score,
        %rating,
        "assessment complete"
    );

    Ok(AssessmentReport {
        profile: profile.id.clone(),
        version: profile.version.clone(),
        profile_name: profile.name.clone(),
        profile_max_score: profile.max_score,
        profile_score: round_to(achieved, SCORE_DECIMALS),
        rating,
        quality,
        entity_counts: extraction.counts(),
        shapes: shape_report.as_ref().map(merge),
        suggestions,
    })
}
