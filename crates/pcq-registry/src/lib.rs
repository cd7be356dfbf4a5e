//! Package registry for pcq
//!
//! Resolves package names to parsed packages through the configured search
//! path, with the uninstalled overlay, direct file loading, provider
//! scanning and an explicit cache.

pub mod cache;
pub mod search;

pub use cache::{CacheStats, PackageCache};
pub use search::{is_direct_path, search_dirs, split_path_list};

use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::WalkDir;

use pcq_core::diag::DiagnosticSink;
use pcq_core::error::{PcqError, PcqResult};
use pcq_core::types::dependency::Dependency;
use pcq_core::{PackageRef, ResolveConfig, RECORD_SUFFIX};

/// Name-to-package resolution over the search path.
pub struct Registry {
    config: ResolveConfig,
    dirs: Vec<PathBuf>,
    cache: PackageCache,
}

impl Registry {
    pub fn new(config: ResolveConfig) -> Self {
        let dirs = search_dirs(&config);
        debug!(?dirs, "registry search path");
        Self {
            config,
            dirs,
            cache: PackageCache::new(),
        }
    }

    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop all cached packages. Required between solve passes whose
    /// settings differ, since cached packages bake in expansion results.
    pub fn cache_clear(&mut self) {
        self.cache.clear();
    }

    /// Resolve a package name or record path to a package.
    ///
    /// A token with a path separator or record suffix loads that file
    /// directly. Otherwise each search directory is tried in order, with
    /// the uninstalled overlay taking priority inside each directory.
    pub fn find(&mut self, name: &str, sink: &dyn DiagnosticSink) -> PcqResult<PackageRef> {
        if is_direct_path(name) {
            return self.load(Path::new(name), sink);
        }

        if !self.config.no_cache {
            if let Some(package) = self.cache.lookup(name) {
                return Ok(package);
            }
        }

        for dir in self.dirs.clone() {
            for candidate in
                search::candidate_files(&dir, name, self.config.disable_uninstalled)
            {
                if candidate.is_file() {
                    trace!(name, path = %candidate.display(), "record found");
                    return self.load(&candidate, sink);
                }
            }
        }

        Err(PcqError::NotFound {
            name: name.to_string(),
        })
    }

    /// Find a package whose `Provides` list satisfies the dependency.
    ///
    /// Cached packages are consulted first, then every record on the
    /// search path is scanned.
    pub fn find_provider(
        &mut self,
        dependency: &Dependency,
        sink: &dyn DiagnosticSink,
    ) -> Option<PackageRef> {
        let cached = self
            .cache
            .iter()
            .find(|p| p.provides.iter().any(|prov| dependency.matches_provide(prov)))
            .cloned();
        if cached.is_some() {
            return cached;
        }

        for path in self.scan_records() {
            let Ok(package) = self.load(&path, sink) else {
                continue;
            };
            if package
                .provides
                .iter()
                .any(|prov| dependency.matches_provide(prov))
            {
                debug!(provider = %package.id, dependency = %dependency, "provider match");
                return Some(package);
            }
        }
        None
    }

    /// Enumerate every package visible on the search path, earliest
    /// directory winning for duplicate ids.
    pub fn list_all(&mut self, sink: &dyn DiagnosticSink) -> Vec<PackageRef> {
        let mut seen = Vec::new();
        let mut result = Vec::new();
        for path in self.scan_records() {
            let Ok(package) = self.load(&path, sink) else {
                continue;
            };
            if seen.contains(&package.id) {
                continue;
            }
            seen.push(package.id.clone());
            result.push(package);
        }
        result.sort_by(|a, b| a.id.cmp(&b.id));
        result
    }

    /// All record files on the search path in directory priority order.
    fn scan_records(&self) -> Vec<PathBuf> {
        let mut records = Vec::new();
        for dir in &self.dirs {
            if !dir.is_dir() {
                continue;
            }
            let mut in_dir: Vec<PathBuf> = WalkDir::new(dir)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| {
                    path.extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext == &RECORD_SUFFIX[1..])
                })
                .collect();
            in_dir.sort();
            records.extend(in_dir);
        }
        records
    }

    fn load(&mut self, path: &Path, sink: &dyn DiagnosticSink) -> PcqResult<PackageRef> {
        let package = pcq_metadata::load_package(path, &self.config, sink)?.into_ref();
        if !self.config.no_cache {
            self.cache.insert(package.clone());
        }
        Ok(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    use pcq_core::diag::NullSink;

    fn write_record(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn basic_record(name: &str, version: &str) -> String {
        format!("Name: {name}\nDescription: test\nVersion: {version}\n")
    }

    fn registry_for(dir: &Path) -> Registry {
        let config = ResolveConfig::builder()
            .extra_path(dir)
            .env_only(true)
            .build();
        Registry::new(config)
    }

    #[test]
    fn test_find_by_name() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), "foo.pc", &basic_record("foo", "1.2.3"));
        let mut registry = registry_for(tmp.path());
        let pkg = registry.find("foo", &NullSink).unwrap();
        assert_eq!(pkg.id, "foo");
        assert_eq!(pkg.version, "1.2.3");
    }

    #[test]
    fn test_find_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let mut registry = registry_for(tmp.path());
        let err = registry.find("ghost", &NullSink).unwrap_err();
        assert!(matches!(err, PcqError::NotFound { ref name } if name == "ghost"));
    }

    #[test]
    fn test_uninstalled_overlay_preferred() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), "foo.pc", &basic_record("foo", "1.0"));
        write_record(
            tmp.path(),
            "foo-uninstalled.pc",
            &basic_record("foo", "2.0"),
        );
        let mut registry = registry_for(tmp.path());
        let pkg = registry.find("foo", &NullSink).unwrap();
        assert!(pkg.uninstalled);
        assert_eq!(pkg.version, "2.0");
    }

    #[test]
    fn test_uninstalled_overlay_disabled() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), "foo.pc", &basic_record("foo", "1.0"));
        write_record(
            tmp.path(),
            "foo-uninstalled.pc",
            &basic_record("foo", "2.0"),
        );
        let config = ResolveConfig::builder()
            .extra_path(tmp.path())
            .env_only(true)
            .disable_uninstalled(true)
            .build();
        let mut registry = Registry::new(config);
        let pkg = registry.find("foo", &NullSink).unwrap();
        assert!(!pkg.uninstalled);
        assert_eq!(pkg.version, "1.0");
    }

    #[test]
    fn test_directory_priority() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_record(first.path(), "foo.pc", &basic_record("foo", "9.9"));
        write_record(second.path(), "foo.pc", &basic_record("foo", "1.1"));
        let config = ResolveConfig::builder()
            .extra_path(first.path())
            .env_path(second.path())
            .env_only(true)
            .build();
        let mut registry = Registry::new(config);
        let pkg = registry.find("foo", &NullSink).unwrap();
        assert_eq!(pkg.version, "9.9");
    }

    #[test]
    fn test_direct_path_load() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), "odd-name.pc", &basic_record("odd", "3.0"));
        let mut registry = registry_for(tmp.path());
        let path = tmp.path().join("odd-name.pc").display().to_string();
        let pkg = registry.find(&path, &NullSink).unwrap();
        assert_eq!(pkg.version, "3.0");
    }

    #[test]
    fn test_cache_hit_and_clear() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), "foo.pc", &basic_record("foo", "1.0"));
        let mut registry = registry_for(tmp.path());
        registry.find("foo", &NullSink).unwrap();
        registry.find("foo", &NullSink).unwrap();
        assert_eq!(registry.cache_stats().hits, 1);

        registry.cache_clear();
        assert_eq!(registry.cache_stats().entries, 0);
        registry.find("foo", &NullSink).unwrap();
        assert_eq!(registry.cache_stats().entries, 1);
    }

    #[test]
    fn test_no_cache_bypasses() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), "foo.pc", &basic_record("foo", "1.0"));
        let config = ResolveConfig::builder()
            .extra_path(tmp.path())
            .env_only(true)
            .no_cache(true)
            .build();
        let mut registry = Registry::new(config);
        registry.find("foo", &NullSink).unwrap();
        registry.find("foo", &NullSink).unwrap();
        assert_eq!(registry.cache_stats().entries, 0);
        assert_eq!(registry.cache_stats().hits, 0);
    }

    #[test]
    fn test_find_provider() {
        let tmp = TempDir::new().unwrap();
        write_record(
            tmp.path(),
            "modern.pc",
            "Name: modern\nDescription: d\nVersion: 3.1\nProvides: legacy = 2.5\n",
        );
        let mut registry = registry_for(tmp.path());
        let dep = Dependency::new(
            "legacy",
            pcq_core::types::dependency::DependencyOrigin::Requires,
        );
        let provider = registry.find_provider(&dep, &NullSink).unwrap();
        assert_eq!(provider.id, "modern");
    }

    #[test]
    fn test_list_all_dedupes_by_priority() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_record(first.path(), "foo.pc", &basic_record("foo", "2.0"));
        write_record(second.path(), "foo.pc", &basic_record("foo", "1.0"));
        write_record(second.path(), "bar.pc", &basic_record("bar", "1.0"));
        let config = ResolveConfig::builder()
            .extra_path(first.path())
            .env_path(second.path())
            .env_only(true)
            .build();
        let mut registry = Registry::new(config);
        let all = registry.list_all(&NullSink);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "bar");
        assert_eq!(all[1].id, "foo");
        assert_eq!(all[1].version, "2.0");
    }
}
