//! Deterministic stand-ins for the loader and clock used by unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use crate::cache::Clock;
use crate::error::LoadError;
use crate::loader::{LoadedPlugin, PluginLoader};

/// Loader that succeeds only for paths it was told about.
#[derive(Debug, Default)]
pub struct ScriptedLoader {
    outcomes: HashMap<PathBuf, Option<String>>,
    calls: CallCounter,
}

impl ScriptedLoader {
    pub fn succeed(mut self, path: impl Into<PathBuf>, name: Option<&str>) -> Self {
        self.outcomes.insert(path.into(), name.map(str::to_string));
        self
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

impl PluginLoader for ScriptedLoader {
    fn load(&self, path: &Path) -> Result<LoadedPlugin, LoadError> {
        self.calls.0.fetch_add(1, Ordering::SeqCst);
        match self.outcomes.get(path) {
            Some(Some(name)) => Ok(LoadedPlugin::named(name.as_str())),
            Some(None) => Ok(LoadedPlugin::anonymous()),
            None => Err(LoadError::MissingBinary(path.to_path_buf())),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        Self(Arc::new(Mutex::new(start)))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock()
    }
}
