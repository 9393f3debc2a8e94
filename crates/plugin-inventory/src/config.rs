use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::roots::{absolute_root, default_roots};

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Settings fixed for the lifetime of an [`InventoryCache`](crate::InventoryCache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Directories walked on every rescan, in order.
    pub roots: Vec<PathBuf>,
    /// How long an inventory stays fresh.
    pub ttl: Duration,
    /// Load every candidate before recording it. Slow, but filters out
    /// broken plug-ins.
    pub validate: bool,
    /// Deepest directory level visited below each root.
    pub max_depth: usize,
}

impl ScanConfig {
    /// Relative roots are resolved against the current directory.
    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().map(absolute_root).collect(),
            ..Self::default()
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            ttl: DEFAULT_TTL,
            validate: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// On-disk form of [`ScanConfig`]. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub roots: Option<Vec<PathBuf>>,
    pub ttl_secs: Option<u64>,
    pub validate: Option<bool>,
    pub max_depth: Option<usize>,
}

impl ConfigFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Load `path` if it exists, otherwise fall back to an empty config.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push("plugin-inventory");
        path.push("config.json");
        Ok(path)
    }

    pub fn into_scan_config(self) -> ScanConfig {
        // Only probe the platform folders when the file names no roots.
        let roots = match self.roots {
            Some(roots) => roots.into_iter().map(absolute_root).collect(),
            None => default_roots(),
        };
        ScanConfig {
            roots,
            ttl: self.ttl_secs.map(Duration::from_secs).unwrap_or(DEFAULT_TTL),
            validate: self.validate.unwrap_or(false),
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        }
    }
}
