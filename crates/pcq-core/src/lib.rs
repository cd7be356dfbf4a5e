//! # pcq-core
//!
//! Core types shared across all pcq crates.
//!
//! This crate provides:
//! - The rpm-style version comparator and constraint operators
//! - Fragment and FragmentList types for compiler/linker flags
//! - Dependency and Package descriptors
//! - The ordered VariableStore
//! - PcqError for unified error handling and the DiagnosticSink trait
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Fragment, Package, Dependency, ...)
//! - `error`: Error types and result aliases
//! - `diag`: Warning-level diagnostics routed to the caller
//! - `config`: The immutable per-query resolution configuration

pub mod config;
pub mod diag;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{ResolveConfig, ResolveConfigBuilder};
pub use diag::{CollectSink, Diagnostic, DiagnosticSink, NullSink};
pub use error::{PcqError, PcqResult};
pub use types::{
    Dependency, DependencyList, DependencyOrigin, Fragment, FragmentList, Package, PackageRef,
    VariableStore, VersionOp,
};

/// Default ceiling on dependency graph traversal depth.
pub const DEFAULT_MAX_TRAVERSAL_DEPTH: u32 = 2000;

/// Filename suffix for metadata records.
pub const RECORD_SUFFIX: &str = ".pc";

/// Suffix distinguishing uninstalled overlay records.
pub const UNINSTALLED_SUFFIX: &str = "-uninstalled";

/// Library directories filtered from -L output by default.
pub const DEFAULT_SYSTEM_LIBDIRS: &[&str] = &["/usr/lib", "/lib"];

/// Include directories filtered from -I output by default.
pub const DEFAULT_SYSTEM_INCLUDEDIRS: &[&str] = &["/usr/include"];

/// Default search directories consulted after explicit and environment paths.
pub const DEFAULT_SEARCH_DIRS: &[&str] = &[
    "/usr/local/lib/pkgconfig",
    "/usr/local/share/pkgconfig",
    "/usr/lib/pkgconfig",
    "/usr/share/pkgconfig",
];
