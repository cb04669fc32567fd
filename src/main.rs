//! CLI entry point for mqa.

mod cli;
mod cmd;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use cmd::assess::AssessArgs;
use cmd::data::DataArgs;

/// Log filter variable, e.g. `MQA_LOG=mqa=debug`.
const LOG_ENV: &str = "MQA_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    // Spawn the real work on a thread with a larger stack size.
    // Windows defaults to a 1MB stack; 8MB matches the Linux default.
    const STACK_SIZE: usize = 8 * 1024 * 1024; // 8 MB

    let result = std::thread::Builder::new()
        .stack_size(STACK_SIZE)
        .spawn(run)
        .context("failed to spawn main thread")
        .and_then(|thread| match thread.join() {
            Ok(result) => result,
            Err(payload) => std::panic::resume_unwind(payload),
        });

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    if cli.quiet {
        std::env::set_var(mqa::ui::QUIET_ENV, "1");
    }

    match cli.command {
        Commands::Assess {
            input,
            profile,
            profile_version,
            format,
            shapes,
            no_reachability,
            vocabularies,
            profiles,
            metrics,
            json,
            fail_below,
        } => cmd::assess::cmd_assess(AssessArgs {
            input,
            profile,
            profile_version,
            format,
            shapes,
            no_reachability,
            vocabularies,
            profiles,
            metrics,
            json,
            fail_below,
        }),
        Commands::Data {
            input,
            url,
            format,
            no_reachability,
            json,
            fail_below,
        } => cmd::data::cmd_data(DataArgs {
            input,
            url,
            format,
            no_reachability,
            json,
            fail_below,
        }),
        Commands::Shapes { report, json } => cmd::shapes::cmd_shapes(&report, json),
        Commands::Profiles {
            name,
            profile_version,
            profiles,
            json,
        } => cmd::profiles::cmd_profiles(
            name.as_deref(),
            profile_version.as_deref(),
            profiles.as_deref(),
            json,
        ),
        Commands::Version { verbose } => cmd::util::cmd_version(verbose),
        Commands::Completion { shell } => cmd::util::cmd_completion(shell),
        Commands::Man { out_dir } => cmd::util::cmd_man(out_dir.as_ref()),
    }
}
