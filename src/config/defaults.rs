//! Default values and configuration sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::reachability::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_MS};

/// Macro to generate default functions for serde attributes
macro_rules! default_fn {
    ($name:ident, $type:ty, $value:expr) => {
        pub(crate) fn $name() -> $type {
            $value
        }
    };
}

// =========================================================================
// DEFAULT VALUE FUNCTIONS
// =========================================================================

default_fn!(default_profile, String, "dcat_ap_es".to_string());
default_fn!(default_true, bool, true);
default_fn!(default_concurrency, usize, DEFAULT_CONCURRENCY);
default_fn!(default_timeout_ms, u64, DEFAULT_TIMEOUT_MS); // 10 seconds

// =========================================================================
// CONFIG SECTIONS
// =========================================================================

/// Profile used when the command line names none.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    /// `None` picks the profile's default version.
    #[serde(default)]
    pub version: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            version: None,
        }
    }
}

/// URL reachability checks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReachabilityConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum checks in flight (default: 10)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-check timeout in milliseconds (default: 10000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            concurrency: default_concurrency(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ReachabilityConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Extra vocabulary files, loaded over the built-in entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct VocabulariesConfig {
    #[serde(default)]
    pub dir: Option<String>,
}

impl VocabulariesConfig {
    /// `dir` with a leading `~` expanded.
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        self.dir
            .as_deref()
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).into_owned()))
    }
}
