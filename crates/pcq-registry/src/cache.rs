//! Explicit package cache.
//!
//! Caches parsed packages by id for the life of one client. The cache is
//! an explicit object: resolving the same query under different settings
//! (static after shared, changed overrides) requires a `clear()` between
//! passes, since cached packages bake in the expansion results of the
//! settings they were loaded under.

use indexmap::IndexMap;
use tracing::trace;

use pcq_core::PackageRef;

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Id-keyed cache of shared package handles, preserving insertion order.
#[derive(Debug, Default)]
pub struct PackageCache {
    entries: IndexMap<String, PackageRef>,
    hits: u64,
    misses: u64,
}

impl PackageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&mut self, id: &str) -> Option<PackageRef> {
        match self.entries.get(id) {
            Some(package) => {
                self.hits += 1;
                trace!(id, "cache hit");
                Some(package.clone())
            },
            None => {
                self.misses += 1;
                None
            },
        }
    }

    pub fn insert(&mut self, package: PackageRef) {
        self.entries.insert(package.id.clone(), package);
    }

    /// Iterate cached packages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PackageRef> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Outstanding references stay alive; later lookups
    /// reload from disk.
    pub fn clear(&mut self) {
        trace!(entries = self.entries.len(), "clearing package cache");
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}
