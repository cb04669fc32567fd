//! Command module structure for mqa CLI

use anyhow::{Context, Result};
use std::path::Path;

use mqa::config::Config;
use mqa::profile::ProfileLoader;
use mqa::score::Rating;
use mqa::vocabulary::VocabularySet;

pub mod assess;
pub mod data;
pub mod profiles;
pub mod shapes;
pub mod util;

/// Load the merged configuration, falling back to defaults when no file exists.
pub fn load_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

/// Profile loader, with an explicit catalog file taking precedence over config.
pub fn profile_loader(config: &Config, profiles: Option<&Path>) -> ProfileLoader {
    match profiles {
        Some(path) => ProfileLoader::from_path(path).with_settings(config.evaluation),
        None => config.profile_loader(),
    }
}

/// Built-in vocabularies plus any files from `dir` or the configured directory.
pub fn load_vocabularies(config: &Config, dir: Option<&Path>) -> Result<VocabularySet> {
    let mut vocabularies = VocabularySet::builtin();
    let dir = dir
        .map(Path::to_path_buf)
        .or_else(|| config.vocabularies.resolved_dir());
    if let Some(dir) = dir {
        if !dir.is_dir() {
            anyhow::bail!("Vocabulary directory {} does not exist", dir.display());
        }
        let loaded = vocabularies
            .load_dir(&dir)
            .with_context(|| format!("Failed to load vocabularies from {}", dir.display()))?;
        tracing::info!(dir = %dir.display(), files = loaded, "loaded vocabularies");
    }
    Ok(vocabularies)
}

/// Fail when `rating` is below the `--fail-below` level.
pub fn check_fail_below(rating: Rating, fail_below: Option<Rating>) -> Result<()> {
    match fail_below {
        Some(minimum) if rating < minimum => anyhow::bail!(
            "Rating {} is below the required {}",
            rating.as_str(),
            minimum.as_str()
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_fail_below() {
        assert!(check_fail_below(Rating::Good, None).is_ok());
        assert!(check_fail_below(Rating::Good, Some(Rating::Good)).is_ok());
        assert!(check_fail_below(Rating::Excellent, Some(Rating::Good)).is_ok());
        let err = check_fail_below(Rating::Sufficient, Some(Rating::Good)).unwrap_err();
        assert!(err.to_string().contains("below the required good"));
    }

    #[test]
    fn test_missing_vocabulary_dir() {
        let err = load_vocabularies(&Config::default(), Some(Path::new("/nonexistent/vocabs")))
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_builtin_vocabularies_without_dir() {
        let set = load_vocabularies(&Config::default(), None).unwrap();
        assert!(set.get("file_types").is_some());
    }
}
