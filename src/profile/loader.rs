//! Loading and caching of the profile catalog.
//!
//! The loader owns the only copy of the parsed catalog. Assessments receive
//! an `Arc<ProfileCatalog>` and never see the loader, so a reload cannot
//! change a catalog that an in-flight run is reading.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::{ProfileCatalog, SettingsOverride};

/// Where the catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSource {
    Builtin,
    File(PathBuf),
}

/// Lazily loads the catalog once and hands out shared snapshots.
#[derive(Debug)]
pub struct ProfileLoader {
    source: ProfileSource,
    settings_override: SettingsOverride,
    cached: RwLock<Option<Arc<ProfileCatalog>>>,
}

impl ProfileLoader {
    pub fn new(source: ProfileSource) -> Self {
        Self {
            source,
            settings_override: SettingsOverride::default(),
            cached: RwLock::new(None),
        }
    }

    pub fn builtin() -> Self {
        Self::new(ProfileSource::Builtin)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::new(ProfileSource::File(path.as_ref().to_path_buf()))
    }

    /// Override fields of the catalog's evaluation settings on every load.
    pub fn with_settings(mut self, settings: SettingsOverride) -> Self {
        self.settings_override = settings;
        self
    }

    pub fn source(&self) -> &ProfileSource {
        &self.source
    }

    /// Return the cached catalog, loading it on first use.
    pub fn load(&self) -> Result<Arc<ProfileCatalog>> {
        if let Some(catalog) = self
            .cached
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
        {
            return Ok(Arc::clone(catalog));
        }

        let mut slot = self.cached.write().unwrap_or_else(|e| e.into_inner());
        // Another caller may have filled the slot while we waited.
        if let Some(catalog) = slot.as_ref() {
            return Ok(Arc::clone(catalog));
        }

        let catalog = Arc::new(self.read_catalog()?);
        tracing::debug!(source = ?self.source, "loaded profile catalog");
        *slot = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    /// Drop the cached catalog. The next [`load`](Self::load) reads the
    /// source again; snapshots already handed out are unaffected.
    pub fn invalidate(&self) {
        let mut slot = self.cached.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.cached
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn read_catalog(&self) -> Result<ProfileCatalog> {
        let catalog = match &self.source {
            ProfileSource::Builtin => ProfileCatalog::builtin()?,
            ProfileSource::File(path) => {
                let content = fs::read_to_string(path).with_context(|| {
                    format!("Failed to read profile catalog from {}", path.display())
                })?;
                ProfileCatalog::from_json(&content)
                    .with_context(|| format!("Failed to load {}", path.display()))?
            }
        };

        let settings = self.settings_override.apply(catalog.settings());
        Ok(catalog.with_settings(settings))
    }
}

impl Default for ProfileLoader {
    fn default() -> Self {
        Self::builtin()
    }
}
