//! Property-based tests for scoring and rating.

use proptest::prelude::*;

use mqa::assessment::{assess_graph, Collaborators};
use mqa::graph::{Graph, Term, Triple};
use mqa::namespaces::{dcat, dct, rdf};
use mqa::profile::{EvaluationSettings, Profile, ProfileCatalog};
use mqa::score::rating::{classify, classify_percentage, rate, Rating};
use mqa::scoring::{ComplianceCount, ExactTotals, MetricResult, QualityResult};
use mqa::vocabulary::VocabularySet;

const LICENSE: &str = "http://publications.europa.eu/resource/authority/licence/CC0";

/// Datasets and distributions, each with or without a licence and a title.
fn catalog(datasets: &[(bool, bool)], distributions: &[bool]) -> Graph {
    let mut graph = Graph::default();
    for (i, (licensed, titled)) in datasets.iter().enumerate() {
        let ds = Term::iri(format!("http://ex.org/ds/{}", i));
        graph.push(Triple::new(ds.clone(), rdf::TYPE, Term::iri(dcat::DATASET)));
        if *licensed {
            graph.push(Triple::new(ds.clone(), dct::LICENSE, Term::iri(LICENSE)));
        }
        if *titled {
            graph.push(Triple::new(ds, dct::TITLE, Term::literal(format!("Dataset {}", i))));
        }
    }
    for (i, licensed) in distributions.iter().enumerate() {
        let dist = Term::iri(format!("http://ex.org/dist/{}", i));
        graph.push(Triple::new(dist.clone(), rdf::TYPE, Term::iri(dcat::DISTRIBUTION)));
        if *licensed {
            graph.push(Triple::new(dist, dct::LICENSE, Term::iri(LICENSE)));
        }
    }
    graph
}

// =============================================================================
// Rating Properties
// =============================================================================

proptest! {
    /// A higher percentage never rates lower.
    #[test]
    fn prop_rating_is_monotonic(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(classify_percentage(low) <= classify_percentage(high));
    }

    /// Rating a score against a budget matches rating its percentage.
    #[test]
    fn prop_classify_matches_percentage(score in 0.0f64..=405.0) {
        prop_assert_eq!(classify(score, 405.0), classify_percentage(score / 405.0 * 100.0));
    }
}

// =============================================================================
// Rating Boundaries
// =============================================================================

/// Every metric of `profile` complying for `compliant` of `total` entities.
fn uniform_quality(
    profile: &Profile,
    compliant: usize,
    total: usize,
) -> (QualityResult, ExactTotals) {
    QualityResult::calculate_exact(
        profile
            .metrics
            .iter()
            .map(|m| {
                MetricResult::evaluated(
                    &m.id,
                    m.entity_type,
                    m.category,
                    m.weight,
                    ComplianceCount { compliant, total },
                )
            })
            .collect(),
    )
}

fn builtin_profile(name: &str) -> Profile {
    ProfileCatalog::builtin().unwrap().resolve(name, None).unwrap().as_ref().clone()
}

#[test]
fn test_rating_boundaries_for_both_budgets() {
    const TOTAL: usize = 1_000_000;
    let cases = [
        (867_000, Rating::Excellent),
        (866_999, Rating::Good),
        (866_996, Rating::Good),
        (546_000, Rating::Good),
        (545_999, Rating::Sufficient),
        (299_000, Rating::Sufficient),
        (298_999, Rating::Poor),
    ];

    for name in ["dcat_ap_es", "nti_risp"] {
        let profile = builtin_profile(name);
        for (compliant, expected) in cases {
            let (quality, exact) = uniform_quality(&profile, compliant, TOTAL);
            let rating = rate(&exact, &profile, EvaluationSettings::default());
            assert_eq!(rating, expected, "{} at {}/{}", name, compliant, TOTAL);
            assert_eq!(
                rating,
                classify_percentage(compliant as f64 / TOTAL as f64 * 100.0),
                "{} at {}/{}",
                name,
                compliant,
                TOTAL
            );
            assert_eq!(quality.max_score, profile.max_score);
        }
    }
}

#[test]
fn test_budgets_are_405_and_250() {
    assert_eq!(builtin_profile("dcat_ap_es").max_score, 405.0);
    assert_eq!(builtin_profile("nti_risp").max_score, 250.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Rating the calculated totals matches rating the raw compliance ratio.
    #[test]
    fn prop_rate_matches_unrounded_ratio(
        total in 1usize..=1_000_000,
        share in 0.0f64..=1.0,
        budget in prop::sample::select(vec!["dcat_ap_es", "nti_risp"]),
    ) {
        let compliant = ((total as f64) * share).floor() as usize;
        let profile = builtin_profile(budget);
        let (_, exact) = uniform_quality(&profile, compliant, total);
        prop_assert_eq!(
            rate(&exact, &profile, EvaluationSettings::default()),
            classify_percentage(compliant as f64 / total as f64 * 100.0)
        );
    }
}

// =============================================================================
// Assessment Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Multi-entity metrics add dataset and distribution counts.
    #[test]
    fn prop_multi_metric_is_additive(
        datasets in prop::collection::vec((any::<bool>(), any::<bool>()), 1..6),
        distributions in prop::collection::vec(any::<bool>(), 0..6),
    ) {
        let vocabularies = VocabularySet::builtin();
        let report = assess_graph(
            &catalog(&datasets, &distributions),
            &ProfileCatalog::builtin().unwrap(),
            "dcat_ap_es",
            None,
            &Collaborators::offline(&vocabularies),
        ).unwrap();

        let license = report.quality.metric("dct_license").unwrap();
        let breakdown = license.breakdown.unwrap();
        let licensed = datasets.iter().filter(|(l, _)| *l).count()
            + distributions.iter().filter(|l| **l).count();

        prop_assert_eq!(license.total_entities, datasets.len() + distributions.len());
        prop_assert_eq!(license.compliant_entities, licensed);
        prop_assert_eq!(
            breakdown.dataset_entities.total + breakdown.distribution_entities.total,
            license.total_entities
        );
        prop_assert_eq!(
            breakdown.dataset_entities.compliant + breakdown.distribution_entities.compliant,
            license.compliant_entities
        );
    }

    /// Scores stay within their budgets.
    #[test]
    fn prop_scores_are_bounded(
        datasets in prop::collection::vec((any::<bool>(), any::<bool>()), 1..6),
        distributions in prop::collection::vec(any::<bool>(), 0..6),
    ) {
        let vocabularies = VocabularySet::builtin();
        let report = assess_graph(
            &catalog(&datasets, &distributions),
            &ProfileCatalog::builtin().unwrap(),
            "dcat_ap_es",
            None,
            &Collaborators::offline(&vocabularies),
        ).unwrap();

        let quality = &report.quality;
        prop_assert!(quality.percentage >= 0.0 && quality.percentage <= 100.0);
        prop_assert!(quality.total_score <= quality.max_score);
        prop_assert!(report.profile_score <= report.profile_max_score);
        for metric in &quality.metrics {
            prop_assert!(metric.score >= 0.0 && metric.score <= metric.max_score);
            prop_assert!(metric.compliant_entities <= metric.total_entities);
            if !metric.found {
                prop_assert!(!metric.scored);
            }
        }
    }
}
