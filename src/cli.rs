//! CLI argument definitions for mqa.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use mqa::graph::GraphFormat;
use mqa::score::Rating;

#[derive(Parser)]
#[command(name = "mqa")]
#[command(version)]
#[command(about = "Metadata quality assessment for DCAT-AP catalogs", long_about = None)]
#[command(
    after_help = concat!(
        "GETTING STARTED:\n",
        "    mqa assess catalog.ttl              Score a catalog with the default profile\n",
        "    mqa assess catalog.ttl --metrics    Include every metric in the report\n",
        "    mqa profiles                        List the available profiles\n",
        "\n",
        "    Project settings are read from .mqa/config.md when present.",
    )
)]
pub struct Cli {
    /// Suppress all non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score an RDF catalog against a metadata profile
    Assess {
        /// RDF file (Turtle, N-Triples, or a JSON array of triples)
        input: PathBuf,
        /// Profile name (overrides config)
        #[arg(long, short)]
        profile: Option<String>,
        /// Profile version (defaults to the profile's default version)
        #[arg(long = "profile-version", value_name = "VERSION")]
        profile_version: Option<String>,
        /// Input serialization (detected from the extension when omitted)
        #[arg(long, value_enum)]
        format: Option<GraphFormat>,
        /// Shape validation report (JSON, or a SHACL report graph)
        #[arg(long, value_name = "REPORT")]
        shapes: Option<PathBuf>,
        /// Skip URL reachability checks
        #[arg(long)]
        no_reachability: bool,
        /// Directory of extra vocabulary files (overrides config)
        #[arg(long, value_name = "DIR")]
        vocabularies: Option<PathBuf>,
        /// External metric catalog (overrides config)
        #[arg(long, value_name = "FILE")]
        profiles: Option<PathBuf>,
        /// List every metric in the report
        #[arg(long)]
        metrics: bool,
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
        /// Exit with an error when the rating is below this level
        #[arg(long, value_enum, value_name = "RATING")]
        fail_below: Option<Rating>,
    },
    /// Analyze a tabular data file (JSON records or NDJSON)
    Data {
        /// Data file, or '-' for stdin
        input: PathBuf,
        /// URL the file is published at (checked once for accessibility)
        #[arg(long)]
        url: Option<String>,
        /// Declared format of the distribution (csv, xlsx, text/csv, ...)
        #[arg(long)]
        format: Option<String>,
        /// Skip the source URL reachability check
        #[arg(long)]
        no_reachability: bool,
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
        /// Exit with an error when the rating is below this level
        #[arg(long, value_enum, value_name = "RATING")]
        fail_below: Option<Rating>,
    },
    /// Summarize a shape validation report
    Shapes {
        /// Report file (JSON, or a SHACL report graph)
        report: PathBuf,
        /// Output the merged report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List profiles, or show the metrics of one
    Profiles {
        /// Profile name
        name: Option<String>,
        /// Profile version (defaults to the profile's default version)
        #[arg(long = "profile-version", value_name = "VERSION")]
        profile_version: Option<String>,
        /// External metric catalog (overrides config)
        #[arg(long, value_name = "FILE")]
        profiles: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show version information
    Version {
        /// Show additional build information
        #[arg(long, short)]
        verbose: bool,
    },
    /// Generate shell completion script
    Completion {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Generate man page
    #[command(hide = true)]
    Man {
        /// Output directory for the man page (defaults to current directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assess() {
        let cli = Cli::try_parse_from([
            "mqa",
            "assess",
            "catalog.ttl",
            "--profile",
            "dcat_ap",
            "--fail-below",
            "good",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Assess {
                profile,
                fail_below,
                json,
                ..
            } => {
                assert_eq!(profile.as_deref(), Some("dcat_ap"));
                assert_eq!(fail_below, Some(Rating::Good));
                assert!(json);
            }
            _ => panic!("expected assess"),
        }
    }

    #[test]
    fn test_quiet_is_global() {
        let cli = Cli::try_parse_from(["mqa", "profiles", "--quiet"]).unwrap();
        assert!(cli.quiet);
    }
}
