use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::InventoryCache;
use crate::record::PluginRecord;

/// Plug-in format guessed from a path's suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginFormat {
    #[serde(rename = "VST3")]
    Vst3,
    #[serde(rename = "VST")]
    Vst,
    #[serde(rename = "AU")]
    AudioUnit,
    #[serde(rename = "CLAP")]
    Clap,
    /// A bare shared library of undetermined format.
    #[serde(rename = "VST/Other")]
    SharedLibrary,
    Unknown,
}

impl PluginFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "vst3" => Self::Vst3,
            "vst" | "dll" => Self::Vst,
            "component" | "au" => Self::AudioUnit,
            "clap" => Self::Clap,
            "so" | "dylib" => Self::SharedLibrary,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Vst3 => "VST3",
            Self::Vst => "VST",
            Self::AudioUnit => "AU",
            Self::Clap => "CLAP",
            Self::SharedLibrary => "VST/Other",
            Self::Unknown => "Unknown",
        }
    }
}

const CATEGORY_MARKERS: [&str; 5] = ["plug-ins", "plugins", "vst3", "vst", "components"];

/// Loose category taken from the folder layout: the segment right after the
/// deepest well-known plug-in folder, unless that segment is the plug-in
/// itself.
pub fn infer_category(path: &Path) -> Option<String> {
    let parts: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let last = parts.len().checked_sub(1)?;
    parts[..last]
        .iter()
        .enumerate()
        .rev()
        .find(|(index, part)| {
            *index + 1 < last && CATEGORY_MARKERS.contains(&part.to_ascii_lowercase().as_str())
        })
        .map(|(index, _)| parts[index + 1].clone())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedPlugin {
    pub name: String,
    pub path: PathBuf,
    pub format: PluginFormat,
    pub category: Option<String>,
}

impl From<PluginRecord> for ListedPlugin {
    fn from(record: PluginRecord) -> Self {
        let format = PluginFormat::from_path(&record.path);
        let category = infer_category(&record.path);
        Self {
            name: record.name,
            path: record.path,
            format,
            category,
        }
    }
}

/// The inventory as handed to tool callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginListing {
    pub count: usize,
    pub records: Vec<ListedPlugin>,
}

/// List installed plug-ins, forcing a rescan when `force_refresh` is set.
///
/// `limit` caps the number of records returned; `count` always matches the
/// length of `records`.
pub fn list_inventory(
    cache: &InventoryCache,
    force_refresh: bool,
    limit: Option<usize>,
) -> PluginListing {
    let inventory = if force_refresh {
        cache.force_scan()
    } else {
        cache.get_inventory()
    };
    let records: Vec<ListedPlugin> = inventory
        .records
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(ListedPlugin::from)
        .collect();
    debug!(
        count = records.len(),
        sample = ?&records[..records.len().min(3)],
        "listed installed plugins"
    );
    PluginListing {
        count: records.len(),
        records,
    }
}
