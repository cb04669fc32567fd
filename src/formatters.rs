//! Output formatters for assessment reports
//!
//! Turn the serializable reports into multi-section terminal text.

use colored::Colorize;

use crate::assessment::AssessmentReport;
use crate::data_quality::DataQualityReport;
use crate::metric::Dimension;
use crate::namespaces::compact_iri;
use crate::profile::{Profile, ProfileCatalog};
use crate::scoring::{MetricResult, QualityResult};
use crate::shapes::{MergedShapeReport, ReportedViolation};
use crate::ui::{self, colors, format};

const BAR_WIDTH: usize = 20;

fn section(output: &mut Vec<String>, title: &str) {
    output.push(title.bold().to_string());
    output.push(format::underline(title));
}

/// Format a metadata assessment as regular multi-section text output
pub fn format_assessment(report: &AssessmentReport, show_metrics: bool) -> String {
    let title = format!("Metadata Quality: {}", report.profile_name);
    let mut output = vec![
        title.bold().to_string(),
        format::underline(&title),
        String::new(),
        format!(
            "  {:<14} {} / {} ({}%)",
            "Score:",
            format::score(report.quality.total_score),
            format::score(report.quality.max_score),
            format::score(report.quality.percentage)
        ),
        format!(
            "  {:<14} {} / {}",
            "Profile score:",
            format::score(report.profile_score),
            format::score(report.profile_max_score)
        ),
        format!("  {:<14} {}", "Rating:", ui::rating_label(report.rating)),
        format!(
            "  {:<14} {}",
            "Entities:",
            report
                .entity_counts
                .iter()
                .map(|(t, n)| format!("{} {}", n, t))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        String::new(),
    ];

    section(&mut output, "Dimensions");
    output.push(format_dimensions(&report.quality));
    output.push(String::new());

    if show_metrics {
        section(&mut output, "Metrics");
        for metric in &report.quality.metrics {
            output.push(format_metric(metric));
        }
        output.push(String::new());
    }

    if let Some(shapes) = &report.shapes {
        section(&mut output, "Shape validation");
        output.push(format_shape_summary(shapes));
        output.push(String::new());
    }

    if !report.suggestions.is_empty() {
        section(&mut output, "Suggestions");
        for suggestion in &report.suggestions {
            output.push(format!("  • {}", suggestion));
        }
        output.push(String::new());
    }

    output.join("\n").trim_end().to_string()
}

/// Per-dimension table with bars.
pub fn format_dimensions(quality: &QualityResult) -> String {
    Dimension::ALL
        .iter()
        .map(|d| {
            let score = quality.dimension(*d);
            if score.scored_metrics == 0 {
                return format!(
                    "  {:<17} {}",
                    d.as_str(),
                    colors::secondary("not applicable")
                );
            }
            format!(
                "  {:<17} {} {:>7} / {:<7} {:>3}/{} metrics",
                d.as_str(),
                format::bar(score.percentage / 100.0, BAR_WIDTH),
                format::score(score.score),
                format::score(score.max_score),
                score.scored_metrics,
                score.total_metrics
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One metric line with its compliance and exclusion reason.
pub fn format_metric(metric: &MetricResult) -> String {
    let icon = ui::compliance_icon(metric.compliant_entities, metric.total_entities, metric.scored);
    let detail = match &metric.exclusion {
        Some(exclusion) if !metric.scored => {
            colors::secondary(&format!("({})", exclusion)).to_string()
        }
        _ => format!(
            "{}/{} {}",
            metric.compliant_entities, metric.total_entities, metric.entity_type
        ),
    };
    format!(
        "  {} {:<34} {:>7} / {:<4} {}",
        icon,
        colors::identifier(&metric.metric_id),
        format::score(metric.score),
        format::score(metric.max_score),
        detail
    )
}

/// Counts only.
pub fn format_shape_summary(report: &MergedShapeReport) -> String {
    let status = if report.conforms {
        colors::success("conforms").to_string()
    } else {
        colors::error("does not conform").to_string()
    };
    let mut line = format!(
        "  {} · {} violations, {} warnings, {} infos",
        status, report.total_violations, report.total_warnings, report.total_infos
    );
    if report.duplicates_removed > 0 {
        line.push_str(&format!(" ({} duplicates removed)", report.duplicates_removed));
    }
    line
}

fn format_violation(v: &ReportedViolation) -> String {
    let mut line = format!(
        "  {} {}",
        ui::severity_icon(v.violation.severity),
        colors::identifier(&compact_iri(&v.violation.focus_node))
    );
    if let Some(path) = &v.violation.path {
        line.push_str(&format!(" {}", colors::secondary(&compact_iri(path))));
    }
    line.push_str(&format!("\n      {}", v.guidance.text));
    if let Some(value) = &v.violation.value {
        line.push_str(&format!(" {}", colors::secondary(&format!("[{}]", value))));
    }
    line
}

/// Full shape report grouped by severity.
pub fn format_shape_report(report: &MergedShapeReport) -> String {
    let mut output = Vec::new();
    section(&mut output, "Shape validation");
    output.push(format_shape_summary(report));

    for (title, items) in [
        ("Violations", &report.violations),
        ("Warnings", &report.warnings),
        ("Infos", &report.infos),
    ] {
        if items.is_empty() {
            continue;
        }
        output.push(String::new());
        section(&mut output, &format!("{} ({})", title, items.len()));
        output.extend(items.iter().map(format_violation));
    }
    output.join("\n")
}

/// Format a data-file analysis.
pub fn format_data_report(report: &DataQualityReport) -> String {
    let title = "Data File Quality";
    let mut output = vec![
        title.bold().to_string(),
        format::underline(title),
        String::new(),
        format!("  {:<14} {} rows × {} columns", "Size:", report.rows, report.columns),
        format!(
            "  {:<14} {} / {} ({}%)",
            "Score:",
            format::score(report.score),
            format::score(report.max_score),
            format::score(report.percentage)
        ),
        format!("  {:<14} {}", "Rating:", ui::rating_label(report.rating)),
        String::new(),
    ];

    section(&mut output, "Indicators");
    for indicator in &report.indicators {
        let line = match indicator.value {
            Some(value) => format!(
                "  {:<14} {} {:>6} / {}",
                indicator.kind.as_str(),
                format::bar(value, BAR_WIDTH),
                format::score(indicator.score),
                format::score(indicator.weight)
            ),
            None => format!(
                "  {:<14} {}",
                indicator.kind.as_str(),
                colors::secondary("not measured")
            ),
        };
        output.push(line);
    }
    output.push(String::new());

    section(&mut output, "Details");
    output.push(format!(
        "  {:<22} {}",
        "Duplicated records:", report.duplicates.duplicated_records
    ));
    output.push(format!("  {:<22} {}", "Outliers (3σ):", report.total_outliers()));
    let incomplete: Vec<String> = report
        .completeness
        .columns
        .iter()
        .filter(|c| c.ratio < 1.0)
        .map(|c| format!("{} {}", c.column, format::score(c.ratio * 100.0) + "%"))
        .collect();
    if !incomplete.is_empty() {
        output.push(format!("  {:<22} {}", "Incomplete columns:", incomplete.join(", ")));
    }
    if let Some(coverage) = &report.temporal_coverage {
        output.push(format!(
            "  {:<22} {} → {} ({} days)",
            "Temporal coverage:", coverage.earliest, coverage.latest, coverage.span_days
        ));
    }
    let portability = match &report.portability.format {
        Some(format) => format!(
            "{} (machine readable: {}, open: {})",
            format, report.portability.machine_readable, report.portability.open_format
        ),
        None => "unknown format".to_string(),
    };
    output.push(format!("  {:<22} {}", "Format:", portability));
    if let Some(access) = &report.accessibility {
        let status = access
            .status
            .map_or_else(|| "no response".to_string(), |s| format!("HTTP {}", s));
        let label = if access.accessible {
            colors::success(&status)
        } else {
            colors::error(&status)
        };
        output.push(format!("  {:<22} {}", "Source:", label));
    }

    output.join("\n")
}

/// One line per profile version, default versions marked.
pub fn format_profiles(catalog: &ProfileCatalog) -> String {
    let mut output = Vec::new();
    section(&mut output, "Profiles");
    for profile in catalog.all() {
        let is_default = catalog.default_version(&profile.id) == Some(profile.version.as_str());
        output.push(format!(
            "  {:<12} {:<8} {:>4} pts  {:>2} metrics  {}{}",
            colors::identifier(&profile.id),
            profile.version,
            format::score(profile.max_score),
            profile.metrics.len(),
            profile.name,
            if is_default {
                colors::secondary(" (default)").to_string()
            } else {
                String::new()
            }
        ));
    }
    output.join("\n")
}

/// Metrics of one profile grouped by dimension.
pub fn format_profile(profile: &Profile) -> String {
    let title = format!("{} ({} pts)", profile.name, format::score(profile.max_score));
    let mut output = vec![title.bold().to_string(), format::underline(&title)];
    for dimension in Dimension::ALL {
        let metrics: Vec<_> = profile
            .metrics
            .iter()
            .filter(|m| m.category == dimension)
            .collect();
        if metrics.is_empty() {
            continue;
        }
        output.push(String::new());
        output.push(format!(
            "{} ({})",
            colors::heading(dimension.as_str()),
            format::score(profile.dimension_max(dimension))
        ));
        for m in metrics {
            output.push(format!(
                "  {:<34} {:>4}  {:<12} {}",
                colors::identifier(&m.id),
                format::score(m.weight),
                m.entity_type.to_string(),
                if m.property.is_empty() {
                    colors::secondary("shape conformance").to_string()
                } else {
                    m.property.clone()
                }
            ));
        }
    }
    output.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_quality::{analyze, DataSource, Table};
    use crate::metric::EntityType;
    use crate::scoring::{ComplianceCount, Exclusion};
    use crate::shapes::{merge, ShapeReport, ShapeSeverity, ShapeViolation};

    fn quality() -> QualityResult {
        QualityResult::calculate(vec![
            MetricResult::evaluated(
                "dct_title",
                EntityType::Dataset,
                Dimension::Findability,
                10.0,
                ComplianceCount { compliant: 1, total: 2 },
            ),
            MetricResult::failed(
                "dcat_endpoint_url",
                EntityType::DataService,
                Dimension::Accessibility,
                10.0,
                0,
                Exclusion::NoEntities,
            ),
        ])
    }

    #[test]
    fn test_format_dimensions() {
        let text = format_dimensions(&quality());
        assert!(text.contains("findability"));
        assert!(text.contains("1/1 metrics"));
        assert!(text.contains("not applicable"));
    }

    #[test]
    fn test_format_metric_shows_exclusion() {
        let q = quality();
        let excluded = format_metric(q.metric("dcat_endpoint_url").unwrap());
        assert!(excluded.contains("no entities"));
        let scored = format_metric(q.metric("dct_title").unwrap());
        assert!(scored.contains("1/2 Dataset"));
    }

    #[test]
    fn test_format_shape_report() {
        let merged = merge(&ShapeReport {
            conforms: false,
            violations: vec![ShapeViolation {
                focus_node: "http://ex.org/ds".to_string(),
                path: Some("dct:title".to_string()),
                value: None,
                message: vec!["Missing title".to_string()],
                severity: ShapeSeverity::Violation,
                source_constraint: "sh:MinCountConstraintComponent".to_string(),
                source_shape: "ex:DatasetShape".to_string(),
            }],
        });
        let text = format_shape_report(&merged);
        assert!(text.contains("1 violations"));
        assert!(text.contains("http://ex.org/ds"));
        assert!(text.contains("Violations (1)"));
    }

    #[test]
    fn test_format_violation_compacts_iris() {
        let merged = merge(&ShapeReport {
            conforms: false,
            violations: vec![ShapeViolation {
                focus_node: "http://www.w3.org/ns/dcat#Dataset".to_string(),
                path: Some("http://purl.org/dc/terms/license".to_string()),
                value: None,
                message: vec!["Missing licence".to_string()],
                severity: ShapeSeverity::Warning,
                source_constraint: String::new(),
                source_shape: String::new(),
            }],
        });
        let text = format_violation(&merged.warnings[0]);
        assert!(text.contains("dcat:Dataset"), "{}", text);
        assert!(text.contains("dct:license"), "{}", text);
        assert!(!text.contains("http://purl.org"), "{}", text);
    }

    #[test]
    fn test_format_data_report() {
        let table = Table::from_json(r#"[{"a": 1, "b": null}, {"a": 2, "b": "x"}]"#).unwrap();
        let report = analyze(&table, &DataSource::default(), None);
        let text = format_data_report(&report);
        assert!(text.contains("2 rows × 2 columns"));
        assert!(text.contains("not measured"));
        assert!(text.contains("b 50%"));
        assert!(text.contains("unknown format"));
    }

    #[test]
    fn test_format_profiles_marks_defaults() {
        let catalog = ProfileCatalog::builtin().unwrap();
        let text = format_profiles(&catalog);
        assert!(text.contains("dcat_ap_es"));
        assert!(text.contains("(default)"));
        let profile = catalog.resolve("nti_risp", None).unwrap();
        let detail = format_profile(&profile);
        assert!(detail.contains("findability"));
        assert!(detail.contains("dct_title"));
    }
}
