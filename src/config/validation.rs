//! Validation of parsed configuration.

use anyhow::Result;

use super::defaults::ReachabilityConfig;
use super::Config;
use crate::profile::SettingsOverride;

impl ReachabilityConfig {
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            anyhow::bail!("reachability.concurrency must be greater than 0");
        }
        if self.timeout_ms == 0 {
            anyhow::bail!("reachability.timeout_ms must be greater than 0");
        }
        Ok(())
    }
}

impl SettingsOverride {
    pub fn validate(&self) -> Result<()> {
        if self.minimum_entity_threshold == Some(0) {
            anyhow::bail!("evaluation.minimum_entity_threshold must be at least 1");
        }
        Ok(())
    }
}

impl Config {
    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        if self.defaults.profile.trim().is_empty() {
            anyhow::bail!("defaults.profile must not be empty");
        }
        self.evaluation.validate()?;
        self.reachability.validate()
    }
}
