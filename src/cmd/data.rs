//! `mqa data`: analyze a tabular data file.

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use mqa::data_quality::{analyze, DataSource, Table};
use mqa::formatters;
use mqa::reachability::{HttpChecker, UrlChecker};
use mqa::score::Rating;
use mqa::ui;

use super::{check_fail_below, load_config};

/// Arguments of `mqa data`.
pub struct DataArgs {
    pub input: PathBuf,
    pub url: Option<String>,
    pub format: Option<String>,
    pub no_reachability: bool,
    pub json: bool,
    pub fail_below: Option<Rating>,
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read data from stdin")?;
        return Ok(content);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read data from {}", path.display()))
}

pub fn cmd_data(args: DataArgs) -> Result<()> {
    let config = load_config()?;
    let content = read_input(&args.input)?;
    let table = Table::from_json(&content)
        .with_context(|| format!("Failed to decode {}", args.input.display()))?;

    // The local file name stands in for a format when nothing else says.
    let format = args.format.or_else(|| {
        args.input
            .extension()
            .and_then(|e| e.to_str())
            .filter(|_| args.url.is_none())
            .map(str::to_string)
    });
    let source = DataSource {
        url: args.url,
        format,
    };

    let checker = HttpChecker::new(config.reachability.timeout());
    let checker: Option<&dyn UrlChecker> = if config.reachability.enabled && !args.no_reachability {
        Some(&checker)
    } else {
        None
    };

    let report = analyze(&table, &source, checker);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if ui::is_quiet() {
        println!("{} {}", ui::format::score(report.percentage), report.rating.as_str());
    } else {
        println!("{}", formatters::format_data_report(&report));
    }

    check_fail_below(report.rating, args.fail_below)
}
