//! Package construction from raw records.
//!
//! Expands the field values of a parsed record and assembles the final
//! [`Package`]: identity from the filename, fragments from the flag
//! fields, dependency lists from the requirement fields.

use std::path::Path;

use tracing::trace;

use pcq_core::diag::DiagnosticSink;
use pcq_core::error::{PcqError, PcqResult};
use pcq_core::types::dependency::{DependencyList, DependencyOrigin};
use pcq_core::{FragmentList, Package, ResolveConfig, UNINSTALLED_SUFFIX};

use crate::expand::Expander;
use crate::record::RawRecord;

/// Build a package from a raw record.
///
/// Injects the built-in `pcfiledir` and `pc_sysrootdir` variables, applies
/// the caller's global variable overrides, expands every field and parses
/// the flag and dependency fields. `Name`, `Version` and `Description` are
/// required.
pub fn build_package(
    record: RawRecord,
    config: &ResolveConfig,
    sink: &dyn DiagnosticSink,
) -> PcqResult<Package> {
    let path_text = record.path.display().to_string();
    let (id, uninstalled) = identity_from_path(&record.path);

    let mut vars = pcq_core::VariableStore::new();
    vars.push("pcfiledir", record_dir(&record.path));
    vars.push(
        "pc_sysrootdir",
        config.sysroot_dir.clone().unwrap_or_else(|| "/".to_string()),
    );
    vars.push(
        "pc_top_builddir",
        config
            .buildroot_dir
            .clone()
            .unwrap_or_else(|| "$(top_builddir)".to_string()),
    );
    for (name, value) in record.variables.iter() {
        vars.push(name, value);
    }
    // Global overrides win over anything the record defines.
    for (name, value) in &config.defines {
        vars.define(name, value.clone());
    }

    let expander = Expander::new(&vars, &path_text, sink);
    let expand_field = |name: &str| record.field(name).map(|value| expander.expand(value));

    let realname = require_field(&record, "Name", &path_text)?;
    let version = require_field(&record, "Version", &path_text)?;
    let description = require_field(&record, "Description", &path_text)?;

    let deps = |field: &str, origin| -> PcqResult<DependencyList> {
        match expand_field(field) {
            Some(value) => DependencyList::parse(&value, origin),
            None => Ok(DependencyList::new()),
        }
    };
    let flags = |field: &str| -> FragmentList {
        match expand_field(field) {
            Some(value) => FragmentList::parse(&value),
            None => FragmentList::new(),
        }
    };

    trace!(id = %id, path = %path_text, "building package");

    let realname = expander.expand(&realname);
    let version = expander.expand(&version);
    let description = expander.expand(&description);
    let license = expand_field("License");
    let cflags = flags("Cflags");
    let cflags_private = flags("Cflags.private");
    let libs = flags("Libs");
    let libs_private = flags("Libs.private");
    let requires = deps("Requires", DependencyOrigin::Requires)?;
    let requires_private = deps("Requires.private", DependencyOrigin::RequiresPrivate)?;
    let conflicts = deps("Conflicts", DependencyOrigin::Conflicts)?;
    let provides = deps("Provides", DependencyOrigin::Provides)?;

    Ok(Package {
        id,
        filename: Some(record.path.clone()),
        realname,
        version,
        description,
        license,
        cflags,
        cflags_private,
        libs,
        libs_private,
        requires,
        requires_private,
        conflicts,
        provides,
        vars,
        uninstalled,
        synthetic: false,
    })
}

fn require_field(record: &RawRecord, name: &str, path: &str) -> PcqResult<String> {
    record
        .field(name)
        .map(str::to_string)
        .ok_or_else(|| PcqError::MissingField {
            path: path.to_string(),
            field: name.to_string(),
        })
}

/// Package id and uninstalled flag from the record filename. The suffix
/// and any `-uninstalled` marker are stripped from the id so overlay
/// records answer for the base name.
fn identity_from_path(path: &Path) -> (String, bool) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.strip_suffix(UNINSTALLED_SUFFIX) {
        Some(base) => (base.to_string(), true),
        None => (stem, false),
    }
}

fn record_dir(path: &Path) -> String {
    path.parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcq_core::diag::NullSink;
    use pcq_core::types::version::VersionOp;

    fn build(content: &str) -> PcqResult<Package> {
        build_with(content, &ResolveConfig::default())
    }

    fn build_with(content: &str, config: &ResolveConfig) -> PcqResult<Package> {
        let record =
            RawRecord::parse(Path::new("/test/pkgconfig/foo.pc"), content, &NullSink)?;
        build_package(record, config, &NullSink)
    }

    const BASIC: &str = "\
prefix=/test
Name: foo
Description: A test library
Version: 1.2.3
Cflags: -I${prefix}/include/foo -fPIC
Libs: -L${prefix}/lib -lfoo
";

    #[test]
    fn test_basic_package() {
        let pkg = build(BASIC).unwrap();
        assert_eq!(pkg.id, "foo");
        assert_eq!(pkg.realname, "foo");
        assert_eq!(pkg.version, "1.2.3");
        assert_eq!(pkg.cflags.render(), "-I/test/include/foo -fPIC");
        assert_eq!(pkg.libs.render(), "-L/test/lib -lfoo");
        assert!(!pkg.uninstalled);
        assert!(!pkg.synthetic);
    }

    #[test]
    fn test_missing_required_field() {
        let err = build("Name: foo\nVersion: 1.0\n").unwrap_err();
        assert!(matches!(err, PcqError::MissingField { ref field, .. } if field == "Description"));
    }

    #[test]
    fn test_dependency_fields() {
        let pkg = build(
            "Name: foo\nDescription: d\nVersion: 1\n\
             Requires: bar >= 2.0\nRequires.private: baz\nConflicts: qux != 3\n\
             Provides: foo-compat = 1\n",
        )
        .unwrap();
        assert_eq!(pkg.requires.entries()[0].name, "bar");
        assert_eq!(
            pkg.requires.entries()[0].constraint,
            Some((VersionOp::GreaterThanEqual, "2.0".to_string()))
        );
        assert_eq!(pkg.requires_private.entries()[0].name, "baz");
        assert_eq!(pkg.conflicts.entries()[0].name, "qux");
        assert_eq!(pkg.provides.entries()[0].name, "foo-compat");
    }

    #[test]
    fn test_pcfiledir_builtin() {
        let pkg = build(
            "Name: foo\nDescription: d\nVersion: 1\nCflags: -I${pcfiledir}/include\n",
        )
        .unwrap();
        assert_eq!(pkg.cflags.render(), "-I/test/pkgconfig/include");
    }

    #[test]
    fn test_global_override_wins() {
        let config = ResolveConfig::builder().define("prefix", "/custom").build();
        let pkg = build_with(BASIC, &config).unwrap();
        assert_eq!(pkg.cflags.render(), "-I/custom/include/foo -fPIC");
        assert_eq!(pkg.vars.get("prefix"), Some("/custom"));
    }

    #[test]
    fn test_uninstalled_identity() {
        let record = RawRecord::parse(
            Path::new("/src/foo-uninstalled.pc"),
            "Name: foo\nDescription: d\nVersion: 1\n",
            &NullSink,
        )
        .unwrap();
        let pkg = build_package(record, &ResolveConfig::default(), &NullSink).unwrap();
        assert_eq!(pkg.id, "foo");
        assert!(pkg.uninstalled);
    }

    #[test]
    fn test_vars_remain_inspectable() {
        let pkg = build(BASIC).unwrap();
        assert_eq!(pkg.vars.get("prefix"), Some("/test"));
        assert_eq!(pkg.vars.get("pc_sysrootdir"), Some("/"));
        assert_eq!(pkg.vars.get("pc_top_builddir"), Some("$(top_builddir)"));
    }

    #[test]
    fn test_repeated_fields_build_combined_package() {
        let pkg = build(
            "Name: foo\nDescription: d\nVersion: 1\nVersion: 2\n\
             Cflags: -DA\nCflags: -DB\n",
        )
        .unwrap();
        assert_eq!(pkg.version, "2");
        assert_eq!(pkg.cflags.render(), "-DA -DB");
    }

    #[test]
    fn test_buildroot_builtin() {
        let config = ResolveConfig::builder().buildroot_dir("/build").build();
        let pkg = build_with(
            "Name: foo\nDescription: d\nVersion: 1\nCflags: -I${pc_top_builddir}/include\n",
            &config,
        )
        .unwrap();
        assert_eq!(pkg.cflags.render(), "-I/build/include");
    }
}
