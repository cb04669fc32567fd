//! `mqa version`, `mqa completion` and the hidden `mqa man`.

use anyhow::{Context, Result};
use clap::{Command, CommandFactory};
use clap_complete::Shell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mqa::profile::ProfileCatalog;

use super::{load_config, profile_loader};
use crate::cli::Cli;

const BIN_NAME: &str = "mqa";

/// One line per profile: `name default (versions)`.
fn profile_lines(catalog: &ProfileCatalog) -> Vec<String> {
    catalog
        .names()
        .into_iter()
        .map(|name| {
            format!(
                "  {} {} ({})",
                name,
                catalog.default_version(name).unwrap_or("-"),
                catalog.versions(name).join(", ")
            )
        })
        .collect()
}

/// Print the version. `verbose` adds build data and the profiles in effect,
/// including any configured `profiles_file`.
pub fn cmd_version(verbose: bool) -> Result<()> {
    println!("{} {}", BIN_NAME, env!("CARGO_PKG_VERSION"));
    if !verbose {
        return Ok(());
    }

    println!("commit: {}", env!("GIT_SHA"));
    println!("built: {}", env!("BUILD_DATE"));

    let config = load_config()?;
    let catalog = profile_loader(&config, None).load()?;
    println!("default profile: {}", config.defaults.profile);
    println!("profiles:");
    for line in profile_lines(&catalog) {
        println!("{}", line);
    }
    Ok(())
}

fn write_page(cmd: Command, title: &str, path: &Path) -> Result<()> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd).title(title).render(&mut buffer)?;
    fs::write(path, buffer).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write `mqa.1` plus one `mqa-<command>.1` page per visible subcommand.
pub fn cmd_man(out_dir: Option<&PathBuf>) -> Result<()> {
    let dir = out_dir.map(PathBuf::as_path).unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let root = Cli::command();
    let mut written = vec![dir.join(format!("{}.1", BIN_NAME))];
    write_page(root.clone(), BIN_NAME, &written[0])?;

    for sub in root.get_subcommands().filter(|s| !s.is_hide_set()) {
        let name = format!("{}-{}", BIN_NAME, sub.get_name());
        let path = dir.join(format!("{}.1", name));
        write_page(sub.clone(), &name, &path)?;
        written.push(path);
    }

    for path in &written {
        println!("{}", path.display());
    }
    Ok(())
}

pub fn cmd_completion(shell: Shell) -> Result<()> {
    clap_complete::generate(shell, &mut Cli::command(), BIN_NAME, &mut io::stdout());
    Ok(())
}
