use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single plug-in candidate found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginRecord {
    /// Name reported by the loader, or the file/bundle name on disk.
    pub name: String,
    pub path: PathBuf,
}

impl PluginRecord {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// The outcome of one full walk over every scan root.
///
/// Inventories are never edited in place; each rescan builds a new one and
/// swaps it in whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub records: Vec<PluginRecord>,
    pub scanned_at: DateTime<Utc>,
}

impl Inventory {
    /// An inventory that has never been populated. Its timestamp is the Unix
    /// epoch so it always reads as stale.
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            scanned_at: DateTime::<Utc>::default(),
        }
    }

    pub fn new(records: Vec<PluginRecord>, scanned_at: DateTime<Utc>) -> Self {
        Self {
            records,
            scanned_at,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::empty()
    }
}
