//! `mqa shapes`: merge and print a shape validation report.

use anyhow::Result;
use std::path::Path;

use mqa::formatters;
use mqa::shapes::{merge, ShapeReport};
use mqa::ui;

pub fn cmd_shapes(report: &Path, json: bool) -> Result<()> {
    let merged = merge(&ShapeReport::load(report)?);

    if json {
        println!("{}", serde_json::to_string_pretty(&merged)?);
    } else if ui::is_quiet() {
        println!("{}", merged.total_violations);
    } else {
        println!("{}", formatters::format_shape_report(&merged));
    }
    Ok(())
}
