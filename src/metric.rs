//! Metric definitions: dimensions, entity scopes, metric kinds and property paths.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::error::MetricError;
use crate::namespaces::{dcat, expand_curie};

/// FAIR+C quality dimension. Every metric belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Findability,
    Accessibility,
    Interoperability,
    Reusability,
    Contextuality,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Findability,
        Dimension::Accessibility,
        Dimension::Interoperability,
        Dimension::Reusability,
        Dimension::Contextuality,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Findability => "findability",
            Dimension::Accessibility => "accessibility",
            Dimension::Interoperability => "interoperability",
            Dimension::Reusability => "reusability",
            Dimension::Contextuality => "contextuality",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity type a metric applies to. `Multi` spans datasets and distributions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum EntityType {
    Catalog,
    #[default]
    Dataset,
    Distribution,
    DataService,
    Multi,
}

impl EntityType {
    /// Entity types the extractor produces, in report order.
    pub const EXTRACTED: [EntityType; 4] = [
        EntityType::Catalog,
        EntityType::Dataset,
        EntityType::Distribution,
        EntityType::DataService,
    ];

    /// The `rdf:type` class that marks membership, or `None` for `Multi`.
    pub fn class_iri(self) -> Option<&'static str> {
        match self {
            EntityType::Catalog => Some(dcat::CATALOG),
            EntityType::Dataset => Some(dcat::DATASET),
            EntityType::Distribution => Some(dcat::DISTRIBUTION),
            EntityType::DataService => Some(dcat::DATA_SERVICE),
            EntityType::Multi => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityType::Catalog => "Catalog",
            EntityType::Dataset => "Dataset",
            EntityType::Distribution => "Distribution",
            EntityType::DataService => "DataService",
            EntityType::Multi => "Multi",
        };
        f.write_str(name)
    }
}

/// How a metric decides that an entity complies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricKind {
    /// The property path yields at least one non-empty value.
    #[default]
    Presence,
    /// At least one value matches an entry of the named vocabulary.
    Vocabulary { vocabulary: String },
    /// At least one value is a URL that answers with HTTP 2xx/3xx.
    Status,
    /// No `Violation`-severity shape result has the entity as focus node.
    ShapeConformance,
}

/// One weighted metric of a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawMetricDefinition")]
pub struct MetricDefinition {
    pub id: String,
    pub weight: f64,
    /// Property path; empty for shape-conformance metrics.
    pub property: String,
    /// Overwritten by the enclosing dimension group when loaded from a catalog file.
    pub category: Dimension,
    pub entity_type: EntityType,
    #[serde(flatten)]
    pub kind: MetricKind,
}

/// Wire form of [`MetricDefinition`]; `kind` is optional and defaults to presence.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetricDefinition {
    id: String,
    weight: f64,
    #[serde(default)]
    property: String,
    #[serde(default = "default_category")]
    category: Dimension,
    #[serde(default)]
    entity_type: EntityType,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    vocabulary: Option<String>,
}

fn default_category() -> Dimension {
    Dimension::Findability
}

impl TryFrom<RawMetricDefinition> for MetricDefinition {
    type Error = String;

    fn try_from(raw: RawMetricDefinition) -> Result<Self, Self::Error> {
        let kind = match raw.kind.as_deref().unwrap_or("presence") {
            "presence" => MetricKind::Presence,
            "status" => MetricKind::Status,
            "shape_conformance" => MetricKind::ShapeConformance,
            "vocabulary" => MetricKind::Vocabulary {
                vocabulary: raw
                    .vocabulary
                    .ok_or_else(|| format!("metric '{}' needs a vocabulary name", raw.id))?,
            },
            other => return Err(format!("metric '{}' has unknown kind '{}'", raw.id, other)),
        };

        Ok(Self {
            id: raw.id,
            weight: raw.weight,
            property: raw.property,
            category: raw.category,
            entity_type: raw.entity_type,
            kind,
        })
    }
}

impl MetricDefinition {
    /// Parse this metric's property path.
    pub fn path(&self) -> Result<PropertyPath, MetricError> {
        PropertyPath::parse(&self.property)
    }
}

/// `prefix:local`, with no whitespace or angle brackets in either part.
const CURIE_PATTERN: &str = r"^[A-Za-z][\w.-]*:[^\s<>/:]+$";

fn curie_regex() -> Option<&'static Regex> {
    static CURIE: OnceLock<Option<Regex>> = OnceLock::new();
    CURIE.get_or_init(|| Regex::new(CURIE_PATTERN).ok()).as_ref()
}

/// A sequence of predicate IRIs (`dcat:distribution/dcat:accessURL`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    steps: Vec<String>,
}

impl PropertyPath {
    /// Parse a `/`-separated sequence of CURIEs or `<IRI>` steps.
    pub fn parse(input: &str) -> Result<Self, MetricError> {
        let malformed = |reason: &str| MetricError::MalformedPath {
            path: input.to_string(),
            reason: reason.to_string(),
        };

        let mut steps = Vec::new();
        let mut rest = input.trim();
        if rest.is_empty() {
            return Err(malformed("empty path"));
        }

        while !rest.is_empty() {
            let (step, remainder) = if let Some(after) = rest.strip_prefix('<') {
                let end = after.find('>').ok_or_else(|| malformed("unterminated '<'"))?;
                let iri = &after[..end];
                if iri.is_empty() {
                    return Err(malformed("empty IRI"));
                }
                (iri.to_string(), after[end + 1..].trim_start())
            } else {
                let end = rest.find('/').unwrap_or(rest.len());
                let curie = rest[..end].trim();
                if curie.is_empty() {
                    return Err(malformed("empty step"));
                }
                if !curie_regex().is_some_and(|re| re.is_match(curie)) {
                    return Err(malformed(&format!("'{}' is not a CURIE", curie)));
                }
                let iri = expand_curie(curie)
                    .ok_or_else(|| malformed(&format!("unknown prefix in '{}'", curie)))?;
                (iri, &rest[end..])
            };
            steps.push(step);

            rest = match remainder.strip_prefix('/') {
                Some(next) => {
                    let next = next.trim_start();
                    if next.is_empty() {
                        return Err(malformed("trailing '/'"));
                    }
                    next
                }
                None if remainder.is_empty() => remainder,
                None => return Err(malformed("expected '/' between steps")),
            };
        }

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }
}
