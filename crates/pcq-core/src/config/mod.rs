//! Per-query resolution configuration.
//!
//! A `ResolveConfig` is built once, then treated as immutable for the life
//! of a query. Running the same query with different settings (for example
//! a shared solve followed by a static one) means building a second config
//! rather than mutating shared state.

use std::path::PathBuf;

use crate::{DEFAULT_MAX_TRAVERSAL_DEPTH, DEFAULT_SYSTEM_INCLUDEDIRS, DEFAULT_SYSTEM_LIBDIRS};

/// Immutable settings for one resolution query.
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    /// Resolve private requirements and merge private fragments.
    pub static_link: bool,
    /// Never merge private fragments, even for static linking.
    pub pure: bool,
    /// Search only explicitly configured directories, skipping defaults.
    pub env_only: bool,
    /// Bypass cache lookups; every request re-reads the record.
    pub no_cache: bool,
    /// Skip conflict checking after the solve.
    pub ignore_conflicts: bool,
    /// Ignore `-uninstalled` overlay records.
    pub disable_uninstalled: bool,
    /// Always prepend the sysroot, even to paths already under it.
    pub fdo_sysroot_rules: bool,
    /// Render fragments in MSVC toolchain syntax.
    pub msvc_syntax: bool,
    /// Keep `-I` flags pointing into system include directories.
    pub keep_system_cflags: bool,
    /// Keep `-L` flags pointing into system library directories.
    pub keep_system_libs: bool,

    /// Ceiling on dependency graph depth.
    pub max_depth: u32,
    /// Sysroot prepended to absolute `-I`/`-L` paths.
    pub sysroot_dir: Option<String>,
    /// Value of the `pc_top_builddir` builtin for uninstalled records.
    pub buildroot_dir: Option<String>,
    /// Extra search directories, consulted before everything else.
    pub extra_paths: Vec<PathBuf>,
    /// Environment-provided search directories, consulted after
    /// `extra_paths` and before the defaults.
    pub env_paths: Vec<PathBuf>,
    /// Directories treated as system library dirs for `-L` filtering.
    pub system_libdirs: Vec<String>,
    /// Directories treated as system include dirs for `-I` filtering.
    pub system_includedirs: Vec<String>,
    /// Global variable overrides, applied over every record.
    pub defines: Vec<(String, String)>,
    /// Restrict rendered fragments to these type characters.
    pub fragment_filter: Option<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            static_link: false,
            pure: false,
            env_only: false,
            no_cache: false,
            ignore_conflicts: false,
            disable_uninstalled: false,
            fdo_sysroot_rules: false,
            msvc_syntax: false,
            keep_system_cflags: false,
            keep_system_libs: false,
            max_depth: DEFAULT_MAX_TRAVERSAL_DEPTH,
            sysroot_dir: None,
            buildroot_dir: None,
            extra_paths: Vec::new(),
            env_paths: Vec::new(),
            system_libdirs: DEFAULT_SYSTEM_LIBDIRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            system_includedirs: DEFAULT_SYSTEM_INCLUDEDIRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            defines: Vec::new(),
            fragment_filter: None,
        }
    }
}

impl ResolveConfig {
    pub fn builder() -> ResolveConfigBuilder {
        ResolveConfigBuilder::default()
    }

    /// Whether private fragments merge into the output.
    pub fn merges_private_fragments(&self) -> bool {
        self.static_link && !self.pure
    }

    /// Whether private requirements join the dependency graph.
    pub fn traverses_private(&self) -> bool {
        self.static_link
    }

    /// Derive the same configuration with a different linking mode.
    pub fn with_static_link(&self, static_link: bool) -> Self {
        Self {
            static_link,
            ..self.clone()
        }
    }
}

/// Builder for [`ResolveConfig`].
#[derive(Debug, Default)]
pub struct ResolveConfigBuilder {
    config: ResolveConfig,
}

impl ResolveConfigBuilder {
    pub fn static_link(mut self, value: bool) -> Self {
        self.config.static_link = value;
        self
    }

    pub fn pure(mut self, value: bool) -> Self {
        self.config.pure = value;
        self
    }

    pub fn env_only(mut self, value: bool) -> Self {
        self.config.env_only = value;
        self
    }

    pub fn no_cache(mut self, value: bool) -> Self {
        self.config.no_cache = value;
        self
    }

    pub fn ignore_conflicts(mut self, value: bool) -> Self {
        self.config.ignore_conflicts = value;
        self
    }

    pub fn disable_uninstalled(mut self, value: bool) -> Self {
        self.config.disable_uninstalled = value;
        self
    }

    pub fn fdo_sysroot_rules(mut self, value: bool) -> Self {
        self.config.fdo_sysroot_rules = value;
        self
    }

    pub fn msvc_syntax(mut self, value: bool) -> Self {
        self.config.msvc_syntax = value;
        self
    }

    pub fn keep_system_cflags(mut self, value: bool) -> Self {
        self.config.keep_system_cflags = value;
        self
    }

    pub fn keep_system_libs(mut self, value: bool) -> Self {
        self.config.keep_system_libs = value;
        self
    }

    pub fn max_depth(mut self, value: u32) -> Self {
        self.config.max_depth = value;
        self
    }

    pub fn sysroot_dir(mut self, value: impl Into<String>) -> Self {
        self.config.sysroot_dir = Some(value.into());
        self
    }

    pub fn buildroot_dir(mut self, value: impl Into<String>) -> Self {
        self.config.buildroot_dir = Some(value.into());
        self
    }

    pub fn extra_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.extra_paths.push(path.into());
        self
    }

    pub fn env_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.env_paths.push(path.into());
        self
    }

    pub fn system_libdirs(mut self, dirs: Vec<String>) -> Self {
        self.config.system_libdirs = dirs;
        self
    }

    pub fn system_includedirs(mut self, dirs: Vec<String>) -> Self {
        self.config.system_includedirs = dirs;
        self
    }

    pub fn define(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.defines.push((name.into(), value.into()));
        self
    }

    pub fn fragment_filter(mut self, types: impl Into<String>) -> Self {
        self.config.fragment_filter = Some(types.into());
        self
    }

    pub fn build(self) -> ResolveConfig {
        self.config
    }
}
