use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::loader::PluginLoader;
use crate::record::PluginRecord;

/// Directory suffixes that mark a packaged plug-in. Such directories are
/// recorded as one unit and never descended into.
pub const BUNDLE_SUFFIXES: [&str; 3] = ["vst3", "component", "vst"];

/// Suffixes of plug-ins that can also appear as plain files or links.
///
/// A directory carrying one of these suffixes but not a bundle suffix, such
/// as a macOS `.clap` bundle, is descended into like any other folder.
pub const FILE_SUFFIXES: [&str; 8] = [
    "vst3",
    "vst",
    "component",
    "au",
    "clap",
    "so",
    "dylib",
    "dll",
];

pub fn is_bundle_name(name: &str) -> bool {
    has_suffix(name, &BUNDLE_SUFFIXES)
}

pub fn is_plugin_file_name(name: &str) -> bool {
    has_suffix(name, &FILE_SUFFIXES)
}

fn has_suffix(name: &str, suffixes: &[&str]) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| suffixes.iter().any(|suffix| ext.eq_ignore_ascii_case(suffix)))
        .unwrap_or(false)
}

/// Walk one root and collect the plug-ins beneath it.
///
/// Only a failure to read the root itself is reported. Unreadable
/// subdirectories and candidates that fail validation are skipped.
pub fn scan_root(
    root: &Path,
    config: &ScanConfig,
    loader: &dyn PluginLoader,
) -> Result<Vec<PluginRecord>, ScanError> {
    debug!(root = %root.display(), "scanning plugin root");
    let mut records = Vec::new();
    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .max_depth(config.max_depth)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(ScanError::RootUnreachable {
                    root: root.to_path_buf(),
                    source,
                });
            }
            Err(err) => {
                debug!(root = %root.display(), %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() {
            if is_bundle_name(&name) {
                walker.skip_current_dir();
                records.extend(admit(&name, entry.path(), config.validate, loader));
            } else if is_plugin_file_name(&name) {
                debug!(dir = %entry.path().display(), "not a bundle format, descending");
            } else {
                debug!(dir = %entry.path().display(), "descending");
            }
            continue;
        }

        if is_plugin_file_name(&name) {
            records.extend(admit(&name, entry.path(), config.validate, loader));
        }
    }

    debug!(root = %root.display(), count = records.len(), "finished plugin root");
    Ok(records)
}

fn admit(
    entry_name: &str,
    path: &Path,
    validate: bool,
    loader: &dyn PluginLoader,
) -> Option<PluginRecord> {
    if !validate {
        return Some(PluginRecord::new(entry_name, path));
    }
    match loader.load(path) {
        Ok(loaded) => {
            let name = loaded.name.unwrap_or_else(|| entry_name.to_string());
            Some(PluginRecord::new(name, path))
        }
        Err(err) => {
            debug!(path = %path.display(), %err, "plugin failed validation");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{create_dir_all, write};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::testing::ScriptedLoader;

    fn config(validate: bool) -> ScanConfig {
        ScanConfig {
            validate,
            ..ScanConfig::with_roots(Vec::new())
        }
    }

    fn sample_tree(root: &Path) {
        create_dir_all(root.join("SynthA.vst3/Contents/MacOS")).unwrap();
        write(root.join("SynthA.vst3/Contents/MacOS/SynthA"), b"").unwrap();
        write(root.join("EffectB.dylib"), b"").unwrap();
    }

    #[test]
    fn fast_path_records_bundles_and_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        sample_tree(root);

        let records = scan_root(root, &config(false), &ScriptedLoader::default()).unwrap();
        assert_eq!(
            records,
            vec![
                PluginRecord::new("EffectB.dylib", root.join("EffectB.dylib")),
                PluginRecord::new("SynthA.vst3", root.join("SynthA.vst3")),
            ]
        );
    }

    #[test]
    fn validation_drops_failures_and_uses_loaded_name() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        sample_tree(root);
        let loader = ScriptedLoader::default().succeed(root.join("SynthA.vst3"), Some("Synth A"));

        let records = scan_root(root, &config(true), &loader).unwrap();
        assert_eq!(
            records,
            vec![PluginRecord::new("Synth A", root.join("SynthA.vst3"))]
        );
    }

    #[test]
    fn anonymous_load_keeps_entry_name() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root.join("Delay.clap"), b"").unwrap();
        let loader = ScriptedLoader::default().succeed(root.join("Delay.clap"), None);

        let records = scan_root(root, &config(true), &loader).unwrap();
        assert_eq!(records, vec![PluginRecord::new("Delay.clap", root.join("Delay.clap"))]);
    }

    #[test]
    fn bundle_contents_are_never_visited() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let inner = root.join("Suite.vst3/Contents/x86_64-linux");
        create_dir_all(&inner).unwrap();
        write(inner.join("Suite.so"), b"").unwrap();
        create_dir_all(root.join("Suite.vst3/Contents/PlugIns/Nested.vst3")).unwrap();

        let records = scan_root(root, &config(false), &ScriptedLoader::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, root.join("Suite.vst3"));
    }

    #[test]
    fn bundles_inside_folders_are_found() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        create_dir_all(root.join("Vendor/Reverb.component")).unwrap();
        create_dir_all(root.join("Vendor/docs")).unwrap();
        write(root.join("Vendor/docs/manual.pdf"), b"").unwrap();
        write(root.join("Vendor/LOUD.VST3"), b"").unwrap();

        let records = scan_root(root, &config(false), &ScriptedLoader::default()).unwrap();
        let paths: Vec<_> = records.iter().map(|record| record.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                root.join("Vendor/LOUD.VST3"),
                root.join("Vendor/Reverb.component"),
            ]
        );
    }

    #[test]
    fn unrecognised_directories_are_not_bundles() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        create_dir_all(root.join("Thing.clap")).unwrap();
        create_dir_all(root.join("presets.d")).unwrap();

        let records = scan_root(root, &config(false), &ScriptedLoader::default()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone");
        let err = scan_root(&missing, &config(false), &ScriptedLoader::default()).unwrap_err();
        assert!(matches!(err, ScanError::RootUnreachable { root, .. } if root == missing));
    }

    #[test]
    fn depth_limit_bounds_the_walk() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        create_dir_all(root.join("a/b")).unwrap();
        write(root.join("a/Shallow.so"), b"").unwrap();
        write(root.join("a/b/Deep.so"), b"").unwrap();
        let mut shallow = config(false);
        shallow.max_depth = 2;

        let records = scan_root(root, &shallow, &ScriptedLoader::default()).unwrap();
        assert_eq!(records, vec![PluginRecord::new("Shallow.so", root.join("a/Shallow.so"))]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_bundles_are_recorded_not_followed() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("store");
        let root = dir.path().join("root");
        create_dir_all(store.join("Linked.vst3/Contents")).unwrap();
        write(store.join("Linked.vst3/Contents/inner.so"), b"").unwrap();
        create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(store.join("Linked.vst3"), root.join("Linked.vst3")).unwrap();
        std::os::unix::fs::symlink(&root, root.join("loop")).unwrap();

        let records = scan_root(&root, &config(false), &ScriptedLoader::default()).unwrap();
        assert_eq!(
            records,
            vec![PluginRecord::new("Linked.vst3", root.join("Linked.vst3"))]
        );
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let root = dir.path();
        let locked = root.join("Locked");
        create_dir_all(&locked).unwrap();
        write(locked.join("Hidden.clap"), b"").unwrap();
        write(root.join("Open.clap"), b"").unwrap();
        write(root.join("Zed.vst3"), b"").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        // Privileged users read through the mode bits.
        if std::fs::read_dir(&locked).is_ok() {
            std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let records = scan_root(root, &config(false), &ScriptedLoader::default());
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        let names: Vec<_> = records
            .unwrap()
            .into_iter()
            .map(|record| record.name)
            .collect();
        assert_eq!(names, vec!["Open.clap", "Zed.vst3"]);
    }

    #[test]
    fn suffix_matching_ignores_case() {
        assert!(is_bundle_name("Synth.VST3"));
        assert!(is_bundle_name("Filter.Component"));
        assert!(!is_bundle_name("Synth.clap"));
        assert!(is_plugin_file_name("Synth.CLAP"));
        assert!(is_plugin_file_name("libdelay.so"));
        assert!(!is_plugin_file_name("readme.txt"));
        assert!(!is_plugin_file_name("vst3"));
    }
}
