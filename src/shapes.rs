//! Shape-validation reports and the conformance report merger.
//!
//! SHACL evaluation happens outside this crate. A report arrives either as
//! JSON (`{conforms, violations: [...]}`) or as a SHACL validation report
//! graph, and [`merge`] turns it into the partitioned, sorted form that
//! goes into the final assessment.

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{AssessmentError, CollaboratorError};
use crate::graph::{parse_graph, Graph, GraphFormat, Term};
use crate::namespaces::sh;

/// Severity of a validation result, as assigned by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ShapeSeverity {
    Violation,
    Warning,
    Info,
}

impl FromStr for ShapeSeverity {
    type Err = String;

    /// Accepts `Violation`, `sh:Violation` or the full SHACL IRI.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let local = s
            .trim()
            .rsplit(['#', ':'])
            .next()
            .unwrap_or_default();
        match local.to_ascii_lowercase().as_str() {
            "violation" => Ok(Self::Violation),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            _ => Err(format!("unknown severity '{}'", s)),
        }
    }
}

impl TryFrom<String> for ShapeSeverity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ShapeSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Violation => write!(f, "Violation"),
            Self::Warning => write!(f, "Warning"),
            Self::Info => write!(f, "Info"),
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
        None => Vec::new(),
    })
}

/// One validation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeViolation {
    pub focus_node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub message: Vec<String>,
    pub severity: ShapeSeverity,
    #[serde(default, alias = "sourceConstraintComponent")]
    pub source_constraint: String,
    #[serde(default)]
    pub source_shape: String,
}

impl ShapeViolation {
    fn report_order(&self, other: &Self) -> Ordering {
        (
            &self.focus_node,
            &self.source_shape,
            &self.path,
            &self.source_constraint,
            &self.message,
            &self.value,
        )
            .cmp(&(
                &other.focus_node,
                &other.source_shape,
                &other.path,
                &other.source_constraint,
                &other.message,
                &other.value,
            ))
    }
}

/// Raw validator output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeReport {
    pub conforms: bool,
    #[serde(default)]
    pub violations: Vec<ShapeViolation>,
}

impl ShapeReport {
    pub fn from_json(content: &str) -> Result<Self, AssessmentError> {
        serde_json::from_str(content)
            .map_err(|e| AssessmentError::InvalidInput(format!("Invalid shape report: {}", e)))
    }

    /// Read `sh:ValidationResult` nodes from a SHACL validation report graph.
    /// Results without a focus node or a recognizable severity are skipped.
    pub fn from_graph(graph: &Graph) -> Self {
        let index = graph.index();

        let reports = index.instances_of(sh::VALIDATION_REPORT);
        let mut nodes: BTreeSet<&Term> = index
            .instances_of(sh::VALIDATION_RESULT)
            .into_iter()
            .collect();
        for report in &reports {
            nodes.extend(index.objects(report, sh::RESULT));
        }

        let first =
            |node: &Term, predicate: &str| index.objects(node, predicate).first().map(Term::key);

        let mut violations = Vec::new();
        for node in nodes {
            let Some(focus_node) = first(node, sh::FOCUS_NODE) else {
                tracing::debug!(node = %node, "validation result without focus node");
                continue;
            };
            let severity = first(node, sh::RESULT_SEVERITY)
                .and_then(|s| s.parse::<ShapeSeverity>().ok());
            let Some(severity) = severity else {
                tracing::debug!(node = %node, "validation result without severity");
                continue;
            };
            violations.push(ShapeViolation {
                focus_node,
                path: first(node, sh::RESULT_PATH),
                value: first(node, sh::VALUE),
                message: index
                    .objects(node, sh::RESULT_MESSAGE)
                    .iter()
                    .map(Term::key)
                    .collect(),
                severity,
                source_constraint: first(node, sh::SOURCE_CONSTRAINT_COMPONENT).unwrap_or_default(),
                source_shape: first(node, sh::SOURCE_SHAPE).unwrap_or_default(),
            });
        }

        let declared = reports
            .iter()
            .flat_map(|r| index.objects(r, sh::CONFORMS))
            .find_map(|t| match t {
                Term::Literal(lit) => Some(lit.lexical.trim() == "true"),
                _ => None,
            });
        let conforms = declared.unwrap_or_else(|| {
            !violations
                .iter()
                .any(|v| v.severity == ShapeSeverity::Violation)
        });

        Self {
            conforms,
            violations,
        }
    }

    /// Load a report file: `.json` as JSON, anything else as an RDF report graph.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read shape report {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let report = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_graph(&parse_graph(&content, GraphFormat::from_path(path))?)
        };
        Ok(report)
    }

    /// Focus nodes with at least one `Violation`-severity result.
    pub fn violating_focus_nodes(&self) -> BTreeSet<&str> {
        self.violations
            .iter()
            .filter(|v| v.severity == ShapeSeverity::Violation)
            .map(|v| v.focus_node.as_str())
            .collect()
    }
}

/// External shape validator.
pub trait ShapeValidator: Send + Sync {
    fn validate(
        &self,
        graph: &Graph,
        shape_files: &[String],
    ) -> Result<ShapeReport, CollaboratorError>;
}

/// Validator that returns a report produced ahead of time.
#[derive(Debug, Clone)]
pub struct PrecomputedReport(pub ShapeReport);

impl ShapeValidator for PrecomputedReport {
    fn validate(
        &self,
        _graph: &Graph,
        _shape_files: &[String],
    ) -> Result<ShapeReport, CollaboratorError> {
        Ok(self.0.clone())
    }
}

// ---------------------------------------------------------------------------
// Merged report
// ---------------------------------------------------------------------------

/// Human-readable guidance attached to a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guidance {
    /// Translation key, when the constraint component is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub text: String,
}

/// A validation result with its guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedViolation {
    #[serde(flatten)]
    pub violation: ShapeViolation,
    pub guidance: Guidance,
}

/// Validator output partitioned by severity, sorted by
/// `(focusNode, sourceShape)` with exact duplicates removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedShapeReport {
    pub conforms: bool,
    pub total_violations: usize,
    pub total_warnings: usize,
    pub total_infos: usize,
    pub duplicates_removed: usize,
    pub violations: Vec<ReportedViolation>,
    pub warnings: Vec<ReportedViolation>,
    pub infos: Vec<ReportedViolation>,
}

/// (constraint component local name, translation key, text)
const GUIDANCE: &[(&str, &str, &str)] = &[
    (
        "ClassConstraintComponent",
        "shacl.class",
        "The value is not an instance of the expected class",
    ),
    (
        "DatatypeConstraintComponent",
        "shacl.datatype",
        "The literal does not have the expected datatype",
    ),
    ("HasValueConstraintComponent", "shacl.hasValue", "A required value is missing"),
    ("InConstraintComponent", "shacl.in", "The value is not one of the allowed values"),
    (
        "LanguageInConstraintComponent",
        "shacl.languageIn",
        "The literal uses a language that is not allowed",
    ),
    ("MaxCountConstraintComponent", "shacl.maxCount", "The property has more values than allowed"),
    ("MaxLengthConstraintComponent", "shacl.maxLength", "The value is longer than allowed"),
    ("MinCountConstraintComponent", "shacl.minCount", "A mandatory property is missing"),
    ("MinLengthConstraintComponent", "shacl.minLength", "The value is shorter than allowed"),
    ("NodeConstraintComponent", "shacl.node", "The value does not conform to the nested shape"),
    ("NodeKindConstraintComponent", "shacl.nodeKind", "The value is not of the expected node kind"),
    ("OrConstraintComponent", "shacl.or", "The value matches none of the alternative shapes"),
    (
        "PatternConstraintComponent",
        "shacl.pattern",
        "The value does not match the required pattern",
    ),
    (
        "UniqueLangConstraintComponent",
        "shacl.uniqueLang",
        "More than one value uses the same language",
    ),
];

fn constraint_local_name(constraint: &str) -> &str {
    constraint
        .rsplit(['#', ':', '/'])
        .next()
        .unwrap_or(constraint)
}

/// Guidance for a violation: the table entry for its constraint component,
/// or the validator's own message.
pub fn guidance_for(violation: &ShapeViolation) -> Guidance {
    let local = constraint_local_name(&violation.source_constraint);
    match GUIDANCE.iter().find(|(name, _, _)| *name == local) {
        Some((_, key, text)) => Guidance {
            key: Some((*key).to_string()),
            text: (*text).to_string(),
        },
        None => Guidance {
            key: None,
            text: if violation.message.is_empty() {
                violation.source_constraint.clone()
            } else {
                violation.message.join("; ")
            },
        },
    }
}

fn partition(report: &ShapeReport, severity: ShapeSeverity) -> (Vec<ReportedViolation>, usize) {
    let mut items: Vec<&ShapeViolation> = report
        .violations
        .iter()
        .filter(|v| v.severity == severity)
        .collect();
    items.sort_by(|a, b| a.report_order(b));

    let before = items.len();
    items.dedup();
    let removed = before - items.len();

    let reported = items
        .into_iter()
        .map(|v| ReportedViolation {
            violation: v.clone(),
            guidance: guidance_for(v),
        })
        .collect();
    (reported, removed)
}

/// Partition, sort and de-duplicate a validator report. Severities and
/// messages are passed through unchanged.
pub fn merge(report: &ShapeReport) -> MergedShapeReport {
    let (violations, dup_violations) = partition(report, ShapeSeverity::Violation);
    let (warnings, dup_warnings) = partition(report, ShapeSeverity::Warning);
    let (infos, dup_infos) = partition(report, ShapeSeverity::Info);

    MergedShapeReport {
        conforms: report.conforms,
        total_violations: violations.len(),
        total_warnings: warnings.len(),
        total_infos: infos.len(),
        duplicates_removed: dup_violations + dup_warnings + dup_infos,
        violations,
        warnings,
        infos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Triple;
    use crate::namespaces::rdf;

    const MIN_COUNT: &str = "sh:MinCountConstraintComponent";
    const CLASS: &str = "sh:ClassConstraintComponent";
    const PATTERN: &str = "sh:PatternConstraintComponent";
    const IN: &str = "sh:InConstraintComponent";

    fn violation(
        focus: &str,
        shape: &str,
        severity: ShapeSeverity,
        constraint: &str,
    ) -> ShapeViolation {
        ShapeViolation {
            focus_node: focus.to_string(),
            path: Some("http://purl.org/dc/terms/title".to_string()),
            value: None,
            message: vec![format!("{} failed", constraint)],
            severity,
            source_constraint: constraint.to_string(),
            source_shape: shape.to_string(),
        }
    }

    #[test]
    fn test_severity_parsing() {
        assert_eq!("Violation".parse::<ShapeSeverity>(), Ok(ShapeSeverity::Violation));
        assert_eq!("sh:Warning".parse::<ShapeSeverity>(), Ok(ShapeSeverity::Warning));
        assert_eq!(sh::INFO.parse::<ShapeSeverity>(), Ok(ShapeSeverity::Info));
        assert!("Fatal".parse::<ShapeSeverity>().is_err());
    }

    #[test]
    fn test_from_json_accepts_single_message_and_alias() {
        let json = r#"{"conforms": false, "violations": [
            {"focusNode": "http://ex.org/ds", "message": "Missing title",
             "severity": "sh:Violation",
             "sourceConstraintComponent": "sh:MinCountConstraintComponent",
             "sourceShape": "http://ex.org/DatasetShape"}]}"#;
        let report = ShapeReport::from_json(json).unwrap();
        let v = &report.violations[0];
        assert_eq!(v.message, vec!["Missing title".to_string()]);
        assert_eq!(v.source_constraint, "sh:MinCountConstraintComponent");
        assert_eq!(v.severity, ShapeSeverity::Violation);
    }

    #[test]
    fn test_from_json_rejects_bad_severity() {
        let json = r#"{"conforms": true, "violations": [{"focusNode": "x", "severity": "Oops"}]}"#;
        assert!(matches!(
            ShapeReport::from_json(json),
            Err(AssessmentError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_merge_partitions_and_sorts() {
        let report = ShapeReport {
            conforms: false,
            violations: vec![
                violation("http://ex.org/b", "S1", ShapeSeverity::Violation, MIN_COUNT),
                violation("http://ex.org/a", "S2", ShapeSeverity::Violation, CLASS),
                violation("http://ex.org/a", "S1", ShapeSeverity::Violation, CLASS),
                violation("http://ex.org/a", "S1", ShapeSeverity::Warning, PATTERN),
                violation("http://ex.org/c", "S1", ShapeSeverity::Info, "ex:Custom"),
            ],
        };
        let merged = merge(&report);
        assert_eq!(merged.total_violations, 3);
        assert_eq!(merged.total_warnings, 1);
        assert_eq!(merged.total_infos, 1);

        let order: Vec<(&str, &str)> = merged
            .violations
            .iter()
            .map(|r| (r.violation.focus_node.as_str(), r.violation.source_shape.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![("http://ex.org/a", "S1"), ("http://ex.org/a", "S2"), ("http://ex.org/b", "S1")]
        );
    }

    #[test]
    fn test_merge_removes_exact_duplicates_only() {
        let v = violation("http://ex.org/a", "S1", ShapeSeverity::Violation, MIN_COUNT);
        let mut other_message = v.clone();
        other_message.message = vec!["different".to_string()];
        let report = ShapeReport {
            conforms: false,
            violations: vec![v.clone(), v.clone(), v, other_message],
        };
        let merged = merge(&report);
        assert_eq!(merged.total_violations, 2);
        assert_eq!(merged.duplicates_removed, 2);
    }

    #[test]
    fn test_guidance_lookup_and_fallback() {
        let full_iri = format!("{}MinCountConstraintComponent", sh::NS);
        let known = violation("x", "S", ShapeSeverity::Violation, &full_iri);
        let g = guidance_for(&known);
        assert_eq!(g.key.as_deref(), Some("shacl.minCount"));

        let unknown = violation("x", "S", ShapeSeverity::Violation, "ex:Custom");
        let g = guidance_for(&unknown);
        assert_eq!(g.key, None);
        assert_eq!(g.text, "ex:Custom failed");
    }

    #[test]
    fn test_merge_is_idempotent_on_order() {
        let a = violation("http://ex.org/a", "S1", ShapeSeverity::Violation, IN);
        let b = violation("http://ex.org/b", "S1", ShapeSeverity::Violation, IN);
        let forward = merge(&ShapeReport {
            conforms: false,
            violations: vec![a.clone(), b.clone()],
        });
        let backward = merge(&ShapeReport {
            conforms: false,
            violations: vec![b, a],
        });
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_from_graph() {
        let report = Term::bnode("r");
        let result = Term::bnode("v1");
        let graph: Graph = vec![
            Triple::new(report.clone(), rdf::TYPE, Term::iri(sh::VALIDATION_REPORT)),
            Triple::new(
                report.clone(),
                sh::CONFORMS,
                Term::Literal(crate::graph::Literal {
                    lexical: "false".to_string(),
                    datatype: Some("http://www.w3.org/2001/XMLSchema#boolean".to_string()),
                    language: None,
                }),
            ),
            Triple::new(report, sh::RESULT, result.clone()),
            Triple::new(result.clone(), sh::FOCUS_NODE, Term::iri("http://ex.org/ds")),
            Triple::new(result.clone(), sh::RESULT_SEVERITY, Term::iri(sh::VIOLATION)),
            Triple::new(result.clone(), sh::RESULT_MESSAGE, Term::literal("Less than 1 values")),
            Triple::new(
                result.clone(),
                sh::SOURCE_CONSTRAINT_COMPONENT,
                Term::iri(format!("{}MinCountConstraintComponent", sh::NS)),
            ),
            Triple::new(result, sh::RESULT_PATH, Term::iri("http://purl.org/dc/terms/title")),
        ]
        .into_iter()
        .collect();

        let parsed = ShapeReport::from_graph(&graph);
        assert!(!parsed.conforms);
        assert_eq!(parsed.violations.len(), 1);
        let v = &parsed.violations[0];
        assert_eq!(v.focus_node, "http://ex.org/ds");
        assert_eq!(v.path.as_deref(), Some("http://purl.org/dc/terms/title"));
        assert_eq!(v.message, vec!["Less than 1 values".to_string()]);
        let focus_nodes: Vec<_> = parsed.violating_focus_nodes().into_iter().collect();
        assert_eq!(focus_nodes, vec!["http://ex.org/ds"]);
    }

    #[test]
    fn test_merged_report_json_shape() {
        let report = ShapeReport {
            conforms: false,
            violations: vec![violation(
                "http://ex.org/a",
                "S1",
                ShapeSeverity::Violation,
                MIN_COUNT,
            )],
        };
        let value = serde_json::to_value(merge(&report)).unwrap();
        assert_eq!(value["totalViolations"], 1);
        assert_eq!(value["violations"][0]["focusNode"], "http://ex.org/a");
        assert_eq!(value["violations"][0]["guidance"]["key"], "shacl.minCount");
    }
}
