use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use crate::error::{Result, StandardsError};
use crate::registry::FacilityRegistry;

/// Caller-owned cache of loaded facility registries.
///
/// Entries are keyed by the canonicalized reference path and sheet name, so
/// pipelines using different reference files each keep their own registry.
#[derive(Debug, Default)]
pub struct RegistryCache {
    entries: BTreeMap<(PathBuf, String), FacilityRegistry>,
}

impl RegistryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the registry for `path`, loading it on first use.
    pub fn get_or_load(&mut self, path: &Path, sheet: &str) -> Result<&FacilityRegistry> {
        let resolved = std::fs::canonicalize(path).map_err(|e| StandardsError::io(path, e))?;
        match self.entries.entry((resolved, sheet.to_string())) {
            Entry::Occupied(entry) => {
                tracing::debug!(path = %path.display(), "PHIX reference cache hit");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let registry = FacilityRegistry::load(&entry.key().0, sheet)?;
                Ok(entry.insert(registry))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
