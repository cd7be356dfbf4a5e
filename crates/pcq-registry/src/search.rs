//! Search path assembly.
//!
//! The effective search path is built per query from three tiers:
//! caller-supplied directories first, then environment-provided
//! directories, then the built-in defaults. Setting `env_only` drops the
//! defaults tier.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use pcq_core::{ResolveConfig, DEFAULT_SEARCH_DIRS, RECORD_SUFFIX};

static DEFAULT_DIRS: Lazy<Vec<PathBuf>> =
    Lazy::new(|| DEFAULT_SEARCH_DIRS.iter().map(PathBuf::from).collect());

/// Assemble the ordered list of directories to search, with duplicates
/// removed while keeping first occurrence priority.
pub fn search_dirs(config: &ResolveConfig) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    let mut add = |dir: PathBuf| {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    };

    for dir in &config.extra_paths {
        add(dir.clone());
    }
    for dir in &config.env_paths {
        add(dir.clone());
    }
    if !config.env_only {
        for dir in DEFAULT_DIRS.iter() {
            add(dir.clone());
        }
    }

    dirs
}

/// Split a colon-separated path list into directories, skipping empty
/// segments. Used for environment-style path variables.
pub fn split_path_list(list: &str) -> Vec<PathBuf> {
    list.split(':')
        .filter(|segment| !segment.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Whether a query token addresses a record file directly rather than a
/// package name: it contains a path separator or carries the record
/// suffix.
pub fn is_direct_path(token: &str) -> bool {
    token.contains(std::path::MAIN_SEPARATOR) || token.ends_with(RECORD_SUFFIX)
}

/// Candidate record filenames for a package name within one directory:
/// the uninstalled overlay first unless disabled, then the plain record.
pub fn candidate_files(dir: &Path, name: &str, disable_uninstalled: bool) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if !disable_uninstalled {
        candidates.push(dir.join(format!("{name}-uninstalled{RECORD_SUFFIX}")));
    }
    candidates.push(dir.join(format!("{name}{RECORD_SUFFIX}")));
    candidates
}
