//! `mqa profiles`: list profiles or show one.

use anyhow::Result;
use serde_json::json;
use std::path::Path;

use mqa::formatters;

use super::{load_config, profile_loader};

pub fn cmd_profiles(
    name: Option<&str>,
    version: Option<&str>,
    profiles: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = load_config()?;
    let catalog = profile_loader(&config, profiles).load()?;

    match name {
        Some(name) => {
            let profile = catalog.resolve(name, version)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&*profile)?);
            } else {
                println!("{}", formatters::format_profile(&profile));
            }
        }
        None => {
            if json {
                let listing: Vec<_> = catalog
                    .names()
                    .into_iter()
                    .map(|name| {
                        json!({
                            "name": name,
                            "defaultVersion": catalog.default_version(name),
                            "versions": catalog.versions(name),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                println!("{}", formatters::format_profiles(&catalog));
            }
        }
    }
    Ok(())
}
