//! `mqa assess`: score an RDF catalog.

use anyhow::Result;
use std::path::PathBuf;

use mqa::assessment::{assess_graph, Collaborators};
use mqa::formatters;
use mqa::graph::{load_graph, GraphFormat};
use mqa::reachability::HttpChecker;
use mqa::score::Rating;
use mqa::shapes::{PrecomputedReport, ShapeReport};
use mqa::ui;

use super::{check_fail_below, load_config, load_vocabularies, profile_loader};

/// Arguments of `mqa assess`.
pub struct AssessArgs {
    pub input: PathBuf,
    pub profile: Option<String>,
    pub profile_version: Option<String>,
    pub format: Option<GraphFormat>,
    pub shapes: Option<PathBuf>,
    pub no_reachability: bool,
    pub vocabularies: Option<PathBuf>,
    pub profiles: Option<PathBuf>,
    pub metrics: bool,
    pub json: bool,
    pub fail_below: Option<Rating>,
}

pub fn cmd_assess(args: AssessArgs) -> Result<()> {
    let config = load_config()?;
    let catalog = profile_loader(&config, args.profiles.as_deref()).load()?;

    let profile = args.profile.unwrap_or_else(|| config.defaults.profile.clone());
    let version = args.profile_version.or_else(|| config.defaults.version.clone());
    // Configuration errors surface before any input is read.
    catalog.resolve(&profile, version.as_deref())?;

    let graph = load_graph(&args.input, args.format)?;
    let vocabularies = load_vocabularies(&config, args.vocabularies.as_deref())?;

    let shape_report = args
        .shapes
        .as_deref()
        .map(ShapeReport::load)
        .transpose()?
        .map(PrecomputedReport);

    let checker = HttpChecker::new(config.reachability.timeout());
    let mut collaborators =
        Collaborators::offline(&vocabularies).with_concurrency(config.reachability.concurrency);
    if config.reachability.enabled && !args.no_reachability {
        collaborators = collaborators.with_urls(&checker);
    }
    if let Some(report) = &shape_report {
        collaborators = collaborators.with_shapes(report);
    }

    let report = assess_graph(&graph, &catalog, &profile, version.as_deref(), &collaborators)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if ui::is_quiet() {
        println!(
            "{} {}",
            ui::format::score(report.profile_score),
            report.rating.as_str()
        );
    } else {
        println!("{}", formatters::format_assessment(&report, args.metrics));
    }

    check_fail_below(report.rating, args.fail_below)
}
