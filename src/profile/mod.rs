//! Profile catalog: named, versioned sets of weighted metrics with
//! per-dimension budgets.
//!
//! A catalog is loaded from JSON (the built-in one ships with the crate),
//! validated once, and then shared read-only between assessments. See
//! [`ProfileLoader`] for caching.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::error::{AssessmentError, Result};
use crate::metric::{Dimension, MetricDefinition};

pub mod loader;

pub use loader::{ProfileLoader, ProfileSource};

const BUILTIN_CATALOG: &str = include_str!("builtin.json");

/// Tolerance when comparing weight sums against budgets.
const BUDGET_EPSILON: f64 = 1e-9;

/// Maximum attainable score of one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionBudget {
    pub max_score: f64,
}

/// Global switches that change how metrics are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSettings {
    /// Count only metrics whose property was found towards the denominator.
    #[serde(default = "default_proportional")]
    pub use_proportional_evaluation: bool,
    /// Minimum entities of a metric's type for the metric to count as found.
    #[serde(default = "default_minimum_entity_threshold")]
    pub minimum_entity_threshold: usize,
}

fn default_proportional() -> bool {
    true
}

fn default_minimum_entity_threshold() -> usize {
    1
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            use_proportional_evaluation: default_proportional(),
            minimum_entity_threshold: default_minimum_entity_threshold(),
        }
    }
}

/// Field-wise override of [`EvaluationSettings`], as set in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsOverride {
    #[serde(default)]
    pub use_proportional_evaluation: Option<bool>,
    #[serde(default)]
    pub minimum_entity_threshold: Option<usize>,
}

impl SettingsOverride {
    pub fn is_empty(&self) -> bool {
        self.use_proportional_evaluation.is_none() && self.minimum_entity_threshold.is_none()
    }

    /// `base` with every set field replaced.
    pub fn apply(&self, base: EvaluationSettings) -> EvaluationSettings {
        EvaluationSettings {
            use_proportional_evaluation: self
                .use_proportional_evaluation
                .unwrap_or(base.use_proportional_evaluation),
            minimum_entity_threshold: self
                .minimum_entity_threshold
                .unwrap_or(base.minimum_entity_threshold),
        }
    }
}

/// One resolved profile version.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Catalog key (`dcat_ap_es`).
    pub id: String,
    pub version: String,
    /// Human label (`DCAT-AP-ES 1.0.0`).
    pub name: String,
    pub max_score: f64,
    pub shape_files: Vec<String>,
    pub dimensions: BTreeMap<Dimension, DimensionBudget>,
    pub metrics: Vec<MetricDefinition>,
}

impl Profile {
    pub fn dimension_max(&self, dimension: Dimension) -> f64 {
        self.dimensions
            .get(&dimension)
            .map(|b| b.max_score)
            .unwrap_or(0.0)
    }

    pub fn metric(&self, id: &str) -> Option<&MetricDefinition> {
        self.metrics.iter().find(|m| m.id == id)
    }

    /// Check the catalog invariants: unique ids, non-negative weights, and
    /// weights adding up to each dimension budget and to the profile maximum.
    pub fn validate(&self) -> Result<()> {
        let label = format!("{} {}", self.id, self.version);
        let invalid = |msg: String| AssessmentError::InvalidCatalog(format!("{}: {}", label, msg));

        let mut seen = BTreeSet::new();
        for metric in &self.metrics {
            if !seen.insert(metric.id.as_str()) {
                return Err(invalid(format!("duplicate metric id '{}'", metric.id)));
            }
            if !metric.weight.is_finite() || metric.weight < 0.0 {
                return Err(invalid(format!(
                    "metric '{}' has invalid weight {}",
                    metric.id, metric.weight
                )));
            }
            if !self.dimensions.contains_key(&metric.category) {
                return Err(invalid(format!(
                    "metric '{}' belongs to '{}' which has no budget",
                    metric.id, metric.category
                )));
            }
        }

        for (dimension, budget) in &self.dimensions {
            let sum: f64 = self
                .metrics
                .iter()
                .filter(|m| m.category == *dimension)
                .map(|m| m.weight)
                .sum();
            if (sum - budget.max_score).abs() > BUDGET_EPSILON {
                return Err(invalid(format!(
                    "weights in '{}' sum to {} but the budget is {}",
                    dimension, sum, budget.max_score
                )));
            }
        }

        let budgets: f64 = self.dimensions.values().map(|b| b.max_score).sum();
        if (budgets - self.max_score).abs() > BUDGET_EPSILON {
            return Err(invalid(format!(
                "dimension budgets sum to {} but maxScore is {}",
                budgets, self.max_score
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
struct ProfileFamily {
    default_version: String,
    versions: BTreeMap<String, Arc<Profile>>,
}

/// All known profiles plus the evaluation settings that ship with them.
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    families: BTreeMap<String, ProfileFamily>,
    settings: EvaluationSettings,
}

// ---------------------------------------------------------------------------
// Catalog file format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    profiles: BTreeMap<String, FamilyEntry>,
    #[serde(rename = "profile_metrics", default)]
    profile_metrics: BTreeMap<String, BTreeMap<Dimension, Vec<MetricDefinition>>>,
    #[serde(default)]
    evaluation_settings: EvaluationSettings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FamilyEntry {
    default_version: String,
    versions: BTreeMap<String, VersionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionEntry {
    name: String,
    max_score: f64,
    #[serde(default)]
    shape_files: Vec<String>,
    dimensions: BTreeMap<Dimension, DimensionBudget>,
}

impl ProfileCatalog {
    /// The catalog compiled into the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse and validate a catalog document.
    ///
    /// Metrics are keyed by profile name; a `name@version` key overrides
    /// them for one version.
    pub fn from_json(content: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(content)
            .map_err(|e| AssessmentError::InvalidCatalog(e.to_string()))?;

        let mut families = BTreeMap::new();
        for (id, family) in file.profiles {
            if !family.versions.contains_key(&family.default_version) {
                return Err(AssessmentError::InvalidCatalog(format!(
                    "{}: default version '{}' is not defined",
                    id, family.default_version
                )));
            }

            let mut versions = BTreeMap::new();
            for (version, entry) in family.versions {
                let grouped = file
                    .profile_metrics
                    .get(&format!("{}@{}", id, version))
                    .or_else(|| file.profile_metrics.get(&id))
                    .ok_or_else(|| {
                        AssessmentError::InvalidCatalog(format!("{}: no metrics defined", id))
                    })?;

                // The enclosing group decides the dimension.
                let metrics = grouped
                    .iter()
                    .flat_map(|(dimension, metrics)| {
                        metrics.iter().cloned().map(move |mut m| {
                            m.category = *dimension;
                            m
                        })
                    })
                    .collect();

                let profile = Profile {
                    id: id.clone(),
                    version: version.clone(),
                    name: entry.name,
                    max_score: entry.max_score,
                    shape_files: entry.shape_files,
                    dimensions: entry.dimensions,
                    metrics,
                };
                profile.validate()?;
                versions.insert(version, Arc::new(profile));
            }

            families.insert(
                id,
                ProfileFamily {
                    default_version: family.default_version,
                    versions,
                },
            );
        }

        Ok(Self {
            families,
            settings: file.evaluation_settings,
        })
    }

    pub fn settings(&self) -> EvaluationSettings {
        self.settings
    }

    /// Catalog with the evaluation settings replaced.
    pub fn with_settings(mut self, settings: EvaluationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Profile names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.families.keys().map(String::as_str).collect()
    }

    /// Versions of one profile, sorted.
    pub fn versions(&self, name: &str) -> Vec<&str> {
        self.families
            .get(name)
            .map(|f| f.versions.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn default_version(&self, name: &str) -> Option<&str> {
        self.families.get(name).map(|f| f.default_version.as_str())
    }

    /// Look up a profile. `None` selects the profile's default version.
    pub fn resolve(&self, name: &str, version: Option<&str>) -> Result<Arc<Profile>> {
        let family = self
            .families
            .get(name)
            .ok_or_else(|| AssessmentError::UnknownProfile {
                name: name.to_string(),
                available: self.names().join(", "),
            })?;

        let version = version.unwrap_or(&family.default_version);
        family
            .versions
            .get(version)
            .cloned()
            .ok_or_else(|| AssessmentError::UnknownVersion {
                profile: name.to_string(),
                version: version.to_string(),
                available: family
                    .versions
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Every profile version, ordered by name then version.
    pub fn all(&self) -> impl Iterator<Item = &Arc<Profile>> {
        self.families.values().flat_map(|f| f.versions.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{EntityType, MetricKind};

    fn minimal_catalog(weight_a: f64, budget: f64) -> String {
        format!(
            r#"{{
  "profiles": {{
    "tiny": {{
      "defaultVersion": "1",
      "versions": {{
        "1": {{ "name": "Tiny 1", "maxScore": {budget},
               "dimensions": {{ "findability": {{ "maxScore": {budget} }} }} }}
      }}
    }}
  }},
  "profile_metrics": {{
    "tiny": {{
      "findability": [
        {{ "id": "a", "weight": {weight_a}, "property": "dct:title" }},
        {{ "id": "b", "weight": 10, "property": "dct:description" }}
      ]
    }}
  }}
}}"#
        )
    }

    // =========================================================================
    // BUILT-IN CATALOG
    // =========================================================================

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = ProfileCatalog::builtin().unwrap();
        assert_eq!(catalog.names(), vec!["dcat_ap", "dcat_ap_es", "nti_risp"]);
        for profile in catalog.all() {
            profile.validate().unwrap();
        }
    }

    #[test]
    fn test_builtin_dcat_ap_es_budgets() {
        let catalog = ProfileCatalog::builtin().unwrap();
        let profile = catalog.resolve("dcat_ap_es", None).unwrap();
        assert_eq!(profile.version, "1.0.0");
        assert_eq!(profile.max_score, 405.0);
        assert_eq!(profile.dimension_max(Dimension::Findability), 100.0);

        let title = profile.metric("dct_title").unwrap();
        assert_eq!(title.category, Dimension::Findability);
        assert_eq!(title.weight, 15.0);

        let license = profile.metric("dct_license").unwrap();
        assert_eq!(license.entity_type, EntityType::Multi);

        let compliance = profile.metric("dcat_ap_es_compliance").unwrap();
        assert_eq!(compliance.kind, MetricKind::ShapeConformance);
    }

    #[test]
    fn test_builtin_settings_default_to_proportional() {
        let catalog = ProfileCatalog::builtin().unwrap();
        assert!(catalog.settings().use_proportional_evaluation);
        assert_eq!(catalog.settings().minimum_entity_threshold, 1);
    }

    // =========================================================================
    // RESOLUTION
    // =========================================================================

    #[test]
    fn test_unknown_profile() {
        let catalog = ProfileCatalog::builtin().unwrap();
        let err = catalog.resolve("nope", None).unwrap_err();
        match err {
            AssessmentError::UnknownProfile { name, available } => {
                assert_eq!(name, "nope");
                assert!(available.contains("dcat_ap_es"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_version() {
        let catalog = ProfileCatalog::builtin().unwrap();
        let err = catalog.resolve("dcat_ap", Some("9.9")).unwrap_err();
        assert!(matches!(err, AssessmentError::UnknownVersion { .. }));
    }

    #[test]
    fn test_explicit_version_resolves() {
        let catalog = ProfileCatalog::builtin().unwrap();
        let profile = catalog.resolve("nti_risp", Some("2013")).unwrap();
        assert_eq!(profile.max_score, 250.0);
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    #[test]
    fn test_minimal_catalog_loads() {
        let catalog = ProfileCatalog::from_json(&minimal_catalog(5.0, 15.0)).unwrap();
        let profile = catalog.resolve("tiny", None).unwrap();
        assert_eq!(profile.metrics.len(), 2);
    }

    #[test]
    fn test_budget_mismatch_rejected() {
        let err = ProfileCatalog::from_json(&minimal_catalog(5.0, 20.0)).unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidCatalog(_)));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = ProfileCatalog::from_json(&minimal_catalog(-5.0, 5.0)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("invalid weight"), "{}", message);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = minimal_catalog(5.0, 15.0).replace("\"id\": \"b\"", "\"id\": \"a\"");
        let err = ProfileCatalog::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("duplicate metric id"));
    }

    #[test]
    fn test_missing_default_version_rejected() {
        let json = minimal_catalog(5.0, 15.0)
            .replace("\"defaultVersion\": \"1\"", "\"defaultVersion\": \"2\"");
        assert!(ProfileCatalog::from_json(&json).is_err());
    }

    #[test]
    fn test_malformed_json_is_invalid_catalog() {
        let err = ProfileCatalog::from_json("{ not json").unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidCatalog(_)));
    }
}
