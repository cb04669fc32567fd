//! Configuration for mqa.
//!
//! Configuration lives in markdown files with YAML frontmatter: an optional
//! global file at `~/.config/mqa/config.md` and a project file at
//! `.mqa/config.md`. Project values override global ones field by field.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::profile::{ProfileLoader, SettingsOverride};

pub mod defaults;
pub mod validation;

pub use defaults::*;

/// Project configuration file.
pub const PROJECT_CONFIG: &str = ".mqa/config.md";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Overrides for the catalog's `evaluationSettings`.
    #[serde(default)]
    pub evaluation: SettingsOverride,
    #[serde(default)]
    pub reachability: ReachabilityConfig,
    #[serde(default)]
    pub vocabularies: VocabulariesConfig,
    /// External metric catalog replacing the built-in one.
    #[serde(default)]
    pub profiles_file: Option<String>,
}

impl Config {
    /// Load configuration with full merge semantics.
    /// Merge order (later overrides earlier):
    /// 1. Global config (~/.config/mqa/config.md)
    /// 2. Project config (.mqa/config.md)
    ///
    /// Missing files are skipped; with neither present the defaults apply.
    pub fn load() -> Result<Self> {
        Self::load_merged_from(global_config_path().as_deref(), Path::new(PROJECT_CONFIG))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        PartialConfig::parse(content)?.merge_with(PartialConfig::default())
    }

    /// Load merged configuration from the given global and project paths.
    pub fn load_merged_from(global_path: Option<&Path>, project_path: &Path) -> Result<Self> {
        let global_config = global_path
            .filter(|p| p.exists())
            .map(PartialConfig::load_from)
            .transpose()?
            .unwrap_or_default();

        let project_config = Some(project_path)
            .filter(|p| p.exists())
            .map(PartialConfig::load_from)
            .transpose()?
            .unwrap_or_default();

        global_config.merge_with(project_config)
    }

    /// Profile catalog loader for this configuration.
    pub fn profile_loader(&self) -> ProfileLoader {
        let loader = match self.profiles_path() {
            Some(path) => ProfileLoader::from_path(path),
            None => ProfileLoader::builtin(),
        };
        loader.with_settings(self.evaluation)
    }

    /// `profiles_file` with a leading `~` expanded.
    pub fn profiles_path(&self) -> Option<PathBuf> {
        self.profiles_file
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned()))
    }
}

/// Returns the path to the global config file at ~/.config/mqa/config.md
pub fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config/mqa/config.md"))
}

/// Split `---`-delimited YAML frontmatter from the markdown body.
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let content = content.trim();
    let Some(rest) = content.strip_prefix("---") else {
        return (None, content);
    };
    match rest.find("\n---") {
        Some(end) => {
            let body = rest[end + 4..].trim_start();
            (Some(&rest[..end]), body)
        }
        None => (None, content),
    }
}

/// Partial config for merging - all fields optional
#[derive(Debug, Deserialize, Default)]
struct PartialConfig {
    pub defaults: Option<PartialDefaultsConfig>,
    pub evaluation: Option<SettingsOverride>,
    pub reachability: Option<PartialReachabilityConfig>,
    pub vocabularies: Option<VocabulariesConfig>,
    pub profiles_file: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct PartialDefaultsConfig {
    pub profile: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct PartialReachabilityConfig {
    pub enabled: Option<bool>,
    pub concurrency: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl PartialConfig {
    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        let (frontmatter, _body) = split_frontmatter(content);
        let frontmatter = frontmatter.context("Failed to extract frontmatter from config")?;
        if frontmatter.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(frontmatter).context("Failed to parse config frontmatter")
    }

    /// Merge this global config with a project config, returning the
    /// validated result. Values from the project config take precedence.
    fn merge_with(self, project: PartialConfig) -> Result<Config> {
        let global_defaults = self.defaults.unwrap_or_default();
        let project_defaults = project.defaults.unwrap_or_default();
        let global_reach = self.reachability.unwrap_or_default();
        let project_reach = project.reachability.unwrap_or_default();
        let global_eval = self.evaluation.unwrap_or_default();
        let project_eval = project.evaluation.unwrap_or_default();

        let config = Config {
            defaults: DefaultsConfig {
                // Project value > global value > default
                profile: project_defaults
                    .profile
                    .or(global_defaults.profile)
                    .unwrap_or_else(defaults::default_profile),
                version: project_defaults.version.or(global_defaults.version),
            },
            evaluation: SettingsOverride {
                use_proportional_evaluation: project_eval
                    .use_proportional_evaluation
                    .or(global_eval.use_proportional_evaluation),
                minimum_entity_threshold: project_eval
                    .minimum_entity_threshold
                    .or(global_eval.minimum_entity_threshold),
            },
            reachability: ReachabilityConfig {
                enabled: project_reach
                    .enabled
                    .or(global_reach.enabled)
                    .unwrap_or_else(defaults::default_true),
                concurrency: project_reach
                    .concurrency
                    .or(global_reach.concurrency)
                    .unwrap_or_else(defaults::default_concurrency),
                timeout_ms: project_reach
                    .timeout_ms
                    .or(global_reach.timeout_ms)
                    .unwrap_or_else(defaults::default_timeout_ms),
            },
            vocabularies: project.vocabularies.or(self.vocabularies).unwrap_or_default(),
            profiles_file: project.profiles_file.or(self.profiles_file),
        };

        config.validate()?;
        Ok(config)
    }
}
