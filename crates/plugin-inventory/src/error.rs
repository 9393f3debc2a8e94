use std::path::PathBuf;

use thiserror::Error;

/// Reasons a candidate fails load validation.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("plugin binary not found inside {0}")]
    MissingBinary(PathBuf),
    #[error("failed to load plugin library: {0}")]
    Library(#[from] libloading::Error),
    #[error("{path} exports none of the known plugin entry points")]
    MissingEntry { path: PathBuf },
}

/// A scan root that could not be traversed.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot read scan root {root}: {source}")]
    RootUnreachable {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no config directory available")]
    NoConfigDir,
}
