//! Metadata record parsing for pcq
//!
//! This crate turns `.pc`-style metadata records into [`Package`]
//! descriptors: logical-line assembly, field and variable extraction,
//! guarded `${variable}` expansion and package construction.

pub mod expand;
pub mod lines;
pub mod package;
pub mod record;

pub use expand::Expander;
pub use lines::logical_lines;
pub use package::build_package;
pub use record::RawRecord;

use std::path::Path;

use pcq_core::diag::DiagnosticSink;
use pcq_core::error::{PcqError, PcqResult};
use pcq_core::{Package, ResolveConfig};

/// Load and parse one record file into a package.
pub fn load_package(
    path: &Path,
    config: &ResolveConfig,
    sink: &dyn DiagnosticSink,
) -> PcqResult<Package> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| PcqError::io(path.display().to_string(), source))?;
    let record = RawRecord::parse(path, &content, sink)?;
    build_package(record, config, sink)
}
