use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::loader::{LibraryLoader, PluginLoader};
use crate::record::Inventory;
use crate::walk::scan_root;

/// Source of the timestamps stamped on each inventory.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Holds the latest plug-in inventory and rescans when it goes stale.
///
/// Walks run on the caller's thread without holding the lock; only the final
/// swap of the inventory is done under it. Two callers that both see a stale
/// inventory will each walk, and whichever finishes last is kept.
pub struct InventoryCache {
    config: ScanConfig,
    loader: Box<dyn PluginLoader>,
    clock: Box<dyn Clock>,
    inventory: Mutex<Inventory>,
}

impl InventoryCache {
    /// A cache that validates through the system dynamic loader and stamps
    /// inventories with wall-clock time.
    pub fn new(config: ScanConfig) -> Self {
        Self::with_parts(config, LibraryLoader, SystemClock)
    }

    pub fn with_parts(
        config: ScanConfig,
        loader: impl PluginLoader + 'static,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            config,
            loader: Box::new(loader),
            clock: Box::new(clock),
            inventory: Mutex::new(Inventory::empty()),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Return the cached inventory, rescanning first if it is empty or older
    /// than the configured TTL.
    pub fn get_inventory(&self) -> Inventory {
        {
            let inventory = self.inventory.lock();
            if !self.is_stale(&inventory) {
                return inventory.clone();
            }
        }
        self.rescan()
    }

    /// Rescan every root regardless of age and return the fresh inventory.
    pub fn force_scan(&self) -> Inventory {
        self.rescan()
    }

    /// The current inventory as-is, without checking freshness.
    pub fn cached(&self) -> Inventory {
        self.inventory.lock().clone()
    }

    /// Start a background rescan so the first real caller finds a warm cache.
    ///
    /// The thread is detached. Callers that arrive before it finishes simply
    /// scan for themselves.
    pub fn warm_up(self: &Arc<Self>) {
        let cache = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("plugin-inventory-warmup".into())
            .spawn(move || {
                let inventory = cache.force_scan();
                info!(count = inventory.len(), "initial plugin scan complete");
            });
        if let Err(err) = spawned {
            warn!(%err, "failed to start plugin warm-up scan");
        }
    }

    fn is_stale(&self, inventory: &Inventory) -> bool {
        if inventory.is_empty() {
            return true;
        }
        // A clock that went backwards leaves the inventory fresh.
        match (self.clock.now() - inventory.scanned_at).to_std() {
            Ok(age) => age > self.config.ttl,
            Err(_) => false,
        }
    }

    fn rescan(&self) -> Inventory {
        let started = Instant::now();
        let mut records = Vec::new();
        // Overlapping roots would otherwise record the same plug-in twice.
        let mut seen = HashSet::new();
        for root in &self.config.roots {
            match scan_root(root, &self.config, self.loader.as_ref()) {
                Ok(found) => records.extend(
                    found
                        .into_iter()
                        .filter(|record| seen.insert(record.path.clone())),
                ),
                Err(err) => warn!(%err, "skipping plugin root"),
            }
        }

        let fresh = Inventory::new(records, self.clock.now());
        *self.inventory.lock() = fresh.clone();
        debug!(
            roots = self.config.roots.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "plugin rescan finished"
        );
        info!(count = fresh.len(), "plugin inventory refreshed");
        fresh
    }
}

impl std::fmt::Debug for InventoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
