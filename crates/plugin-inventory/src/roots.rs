use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

/// Conventional plug-in folders for the host platform, whether or not they
/// exist.
pub fn candidate_roots() -> Vec<PathBuf> {
    platform_candidates(dirs::home_dir().as_deref())
}

/// The platform plug-in folders that currently exist on disk.
///
/// Missing folders are dropped silently; an empty result just means there is
/// nothing to scan.
pub fn default_roots() -> Vec<PathBuf> {
    existing_roots(candidate_roots())
}

/// Keep the directories that exist, dropping duplicates but preserving order.
pub fn existing_roots(candidates: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|path| path.is_dir())
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

/// Anchor a relative root to the current working directory so recorded
/// paths stay meaningful to callers running elsewhere.
pub fn absolute_root(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(err) => {
            tracing::warn!(root = %path.display(), %err, "cannot resolve relative root");
            path
        }
    }
}

#[cfg(target_os = "macos")]
fn platform_candidates(home: Option<&Path>) -> Vec<PathBuf> {
    const SUBDIRS: [&str; 3] = ["VST3", "VST", "Components"];
    let system = Path::new("/Library/Audio/Plug-Ins");
    let mut roots: Vec<PathBuf> = SUBDIRS.iter().map(|sub| system.join(sub)).collect();
    if let Some(home) = home {
        let user = home.join("Library/Audio/Plug-Ins");
        roots.extend(SUBDIRS.iter().map(|sub| user.join(sub)));
    }
    roots
}

#[cfg(target_os = "windows")]
fn platform_candidates(_home: Option<&Path>) -> Vec<PathBuf> {
    vec![
        PathBuf::from(r"C:\Program Files\VSTPlugins"),
        PathBuf::from(r"C:\Program Files\Steinberg\VSTPlugins"),
        PathBuf::from(r"C:\Program Files\Common Files\VST3"),
        PathBuf::from(r"C:\Program Files\Common Files\CLAP"),
    ]
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn platform_candidates(home: Option<&Path>) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(home) = home {
        roots.push(home.join(".vst3"));
        roots.push(home.join(".vst"));
        roots.push(home.join(".clap"));
    }
    for prefix in ["/usr/lib", "/usr/local/lib"] {
        for format in ["vst3", "vst", "clap"] {
            roots.push(Path::new(prefix).join(format));
        }
    }
    roots
}
