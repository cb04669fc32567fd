//! Metric evaluation.
//!
//! Each metric kind has one test function that decides compliance for a
//! single entity. The evaluator counts compliant entities per metric and
//! applies the exclusion rules; it performs no I/O of its own. URL status
//! comes from a pre-computed [`ReachabilityTable`], vocabulary membership
//! from a [`VocabularyLookup`].
//!
//! Failures stay local to the metric: a malformed path or an unknown
//! vocabulary produces an excluded result and evaluation moves on.

use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::error::{CollaboratorError, MetricError};
use crate::extract::{BoundValue, EntityBinding, Extraction};
use crate::metric::{EntityType, MetricDefinition, MetricKind, PropertyPath};
use crate::profile::{EvaluationSettings, Profile};
use crate::reachability::{is_http_url, ReachabilityTable};
use crate::scoring::{ComplianceCount, Exclusion, MetricResult, MultiBreakdown};
use crate::shapes::ShapeReport;
use crate::vocabulary::VocabularyLookup;

/// Everything a metric may consult. Shared read-only across metrics.
pub struct EvaluationContext<'a> {
    pub extraction: &'a Extraction,
    pub vocabularies: &'a dyn VocabularyLookup,
    /// `None` when reachability checks are disabled.
    pub reachability: Option<&'a ReachabilityTable>,
    /// `None` when no shape validation report is available.
    pub shapes: Option<&'a ShapeReport>,
    pub settings: EvaluationSettings,
}

/// Entity types a metric is evaluated against.
fn parts(entity_type: EntityType) -> Vec<EntityType> {
    match entity_type {
        EntityType::Multi => vec![EntityType::Dataset, EntityType::Distribution],
        other => vec![other],
    }
}

/// Per-metric state resolved once before looping over entities.
enum Test<'a> {
    Presence(PropertyPath),
    Vocabulary { path: PropertyPath, name: &'a str },
    Status { path: PropertyPath, table: &'a ReachabilityTable },
    Shape { violating: BTreeSet<&'a str> },
}

impl<'a> Test<'a> {
    fn prepare(
        metric: &'a MetricDefinition,
        ctx: &EvaluationContext<'a>,
    ) -> Result<Self, Exclusion> {
        let path = || {
            metric.path().map_err(|e| Exclusion::Failed {
                message: e.to_string(),
            })
        };
        match &metric.kind {
            MetricKind::Presence => Ok(Test::Presence(path()?)),
            MetricKind::Vocabulary { vocabulary } => Ok(Test::Vocabulary {
                path: path()?,
                name: vocabulary,
            }),
            MetricKind::Status => {
                let path = path()?;
                let table = ctx.reachability.ok_or(Exclusion::ReachabilityUnavailable)?;
                Ok(Test::Status { path, table })
            }
            MetricKind::ShapeConformance => {
                let report = ctx.shapes.ok_or(Exclusion::ShapeReportUnavailable)?;
                Ok(Test::Shape {
                    violating: report.violating_focus_nodes(),
                })
            }
        }
    }

    fn complies(
        &self,
        entity: &EntityBinding,
        ctx: &EvaluationContext<'_>,
    ) -> Result<bool, MetricError> {
        match self {
            Test::Presence(path) => Ok(ctx
                .extraction
                .resolve(entity, path)
                .iter()
                .any(BoundValue::is_present)),
            Test::Vocabulary { path, name } => {
                let values = ctx.extraction.resolve(entity, path);
                vocabulary_match(&values, name, ctx.vocabularies, &entity.entity_id)
            }
            Test::Status { path, table } => Ok(ctx
                .extraction
                .resolve(entity, path)
                .iter()
                .filter_map(BoundValue::match_text)
                .map(str::trim)
                .any(|url| is_http_url(url) && table.is_accessible(url))),
            Test::Shape { violating } => Ok(!violating.contains(entity.entity_id.as_str())),
        }
    }
}

fn vocabulary_match(
    values: &[BoundValue],
    vocabulary: &str,
    lookup: &dyn VocabularyLookup,
    entity_id: &str,
) -> Result<bool, MetricError> {
    for text in values.iter().filter_map(BoundValue::match_text) {
        match lookup.lookup(vocabulary, text) {
            Ok(true) => return Ok(true),
            Ok(false) => {}
            Err(CollaboratorError::UnknownVocabulary(name)) => {
                return Err(MetricError::UnknownVocabulary(name));
            }
            Err(e) => {
                warn!(entity = entity_id, vocabulary, error = %e, "vocabulary lookup failed");
            }
        }
    }
    Ok(false)
}

/// Evaluate one metric against the extracted entities.
pub fn evaluate_metric(metric: &MetricDefinition, ctx: &EvaluationContext<'_>) -> MetricResult {
    let parts = parts(metric.entity_type);
    let total: usize = parts.iter().map(|t| ctx.extraction.count(*t)).sum();

    let failed = |exclusion: Exclusion| {
        MetricResult::failed(
            &metric.id,
            metric.entity_type,
            metric.category,
            metric.weight,
            total,
            exclusion,
        )
    };

    let test = match Test::prepare(metric, ctx) {
        Ok(test) => test,
        Err(exclusion) => {
            if let Exclusion::Failed { message } = &exclusion {
                warn!(metric = %metric.id, %message, "metric could not be evaluated");
            } else {
                debug!(metric = %metric.id, %exclusion, "metric skipped");
            }
            return failed(exclusion);
        }
    };

    let mut counts = Vec::with_capacity(parts.len());
    for entity_type in &parts {
        let mut count = ComplianceCount::default();
        for entity in ctx.extraction.entities(*entity_type) {
            count.total += 1;
            match test.complies(entity, ctx) {
                Ok(true) => count.compliant += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        metric = %metric.id,
                        entity = %entity.entity_id,
                        error = %e,
                        "metric failed"
                    );
                    return failed(Exclusion::Failed {
                        message: e.to_string(),
                    });
                }
            }
        }
        counts.push(count);
    }

    let combined = ComplianceCount {
        compliant: counts.iter().map(|c| c.compliant).sum(),
        total: counts.iter().map(|c| c.total).sum(),
    };
    let mut result = MetricResult::evaluated(
        &metric.id,
        metric.entity_type,
        metric.category,
        metric.weight,
        combined,
    );

    if let [dataset, distribution] = counts[..] {
        result = result.with_breakdown(MultiBreakdown {
            dataset_entities: dataset,
            distribution_entities: distribution,
        });
    }

    let proportional = ctx.settings.use_proportional_evaluation;
    let minimum = ctx.settings.minimum_entity_threshold;
    if combined.total == 0 {
        result = result.excluded(Exclusion::NoEntities, !proportional);
    } else if combined.total < minimum {
        result = result.excluded(Exclusion::BelowThreshold { minimum }, !proportional);
    } else {
        result.scored = true;
    }

    debug!(
        metric = %metric.id,
        compliant = result.compliant_entities,
        total = result.total_entities,
        found = result.found,
        "evaluated metric"
    );
    result
}

/// Evaluate every metric of a profile, in metric-id order.
pub fn evaluate_profile(profile: &Profile, ctx: &EvaluationContext<'_>) -> Vec<MetricResult> {
    let mut metrics: Vec<&MetricDefinition> = profile.metrics.iter().collect();
    metrics.sort_by(|a, b| a.id.cmp(&b.id));
    metrics.into_iter().map(|m| evaluate_metric(m, ctx)).collect()
}

/// URLs that the profile's status metrics will look up, for batch checking
/// ahead of evaluation. Metrics with malformed paths are skipped here and
/// reported by the evaluator.
pub fn status_urls(profile: &Profile, extraction: &Extraction) -> BTreeSet<String> {
    let mut urls = BTreeSet::new();
    for metric in profile
        .metrics
        .iter()
        .filter(|m| m.kind == MetricKind::Status)
    {
        let Ok(path) = metric.path() else {
            continue;
        };
        for entity_type in parts(metric.entity_type) {
            for entity in extraction.entities(entity_type) {
                urls.extend(
                    extraction
                        .resolve(entity, &path)
                        .iter()
                        .filter_map(BoundValue::match_text)
                        .map(str::trim)
                        .filter(|u| is_http_url(u))
                        .map(str::to_string),
                );
            }
        }
    }
    urls
}
