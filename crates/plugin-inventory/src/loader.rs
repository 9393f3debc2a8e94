use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use libloading::Library;
use serde::Deserialize;

use crate::error::LoadError;

/// What a successful load tells us about a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedPlugin {
    /// Human readable name, when the plug-in exposes one.
    pub name: Option<String>,
}

impl LoadedPlugin {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { name: None }
    }
}

/// Attempts to load a candidate to prove it is a working plug-in.
pub trait PluginLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<LoadedPlugin, LoadError>;
}

/// Entry points exported by the formats we know how to host.
const ENTRY_SYMBOLS: [&[u8]; 4] = [
    b"GetPluginFactory\0",
    b"VSTPluginMain\0",
    b"clap_entry\0",
    b"main\0",
];

/// Validates candidates by opening their binary with the system dynamic
/// loader and looking for a plug-in entry point.
///
/// Opening a library runs its initialisers, so only point this at
/// directories whose contents you are prepared to execute.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryLoader;

impl PluginLoader for LibraryLoader {
    fn load(&self, path: &Path) -> Result<LoadedPlugin, LoadError> {
        let binary = resolve_binary(path)?;
        let library = unsafe { Library::new(&binary) }?;

        if !is_audio_unit(path) {
            let exported = ENTRY_SYMBOLS
                .iter()
                .any(|symbol| unsafe { library.get::<unsafe extern "C" fn()>(symbol) }.is_ok());
            if !exported {
                return Err(LoadError::MissingEntry { path: binary });
            }
        }

        Ok(match module_name(path) {
            Some(name) => LoadedPlugin::named(name),
            None => LoadedPlugin::anonymous(),
        })
    }
}

/// Locate the loadable binary for a file or bundle.
pub fn resolve_binary(path: &Path) -> Result<PathBuf, LoadError> {
    if !path.is_dir() {
        return if path.exists() {
            Ok(path.to_path_buf())
        } else {
            Err(LoadError::MissingBinary(path.to_path_buf()))
        };
    }

    let stem = path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or_default();
    let contents = path.join("Contents");
    let arch = std::env::consts::ARCH;
    let win_arch = if arch == "aarch64" { "arm64" } else { arch };
    let candidates = [
        contents.join("MacOS").join(stem),
        contents.join(format!("{arch}-linux")).join(format!("{stem}.so")),
        contents.join(format!("{win_arch}-win")).join(format!("{stem}.vst3")),
        contents.join("x86_64-win").join(format!("{stem}.vst3")),
    ];
    candidates
        .into_iter()
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| LoadError::MissingBinary(path.to_path_buf()))
}

fn is_audio_unit(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case("component") || ext.eq_ignore_ascii_case("au"))
        .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
struct ModuleInfo {
    #[serde(rename = "Name")]
    name: Option<String>,
}

/// Name declared in a VST3 bundle's `moduleinfo.json`, if any.
pub fn module_name(path: &Path) -> Option<String> {
    if !path.is_dir() {
        return None;
    }
    let raw = fs::read_to_string(path.join("Contents/Resources/moduleinfo.json")).ok()?;
    let info: ModuleInfo = serde_json::from_str(&raw).ok()?;
    info.name.filter(|name| !name.trim().is_empty())
}
