//! Package descriptors.
//!
//! A `Package` is the fully parsed form of one metadata record: identity,
//! flag fragments, dependency lists and the variables used to expand them.
//! Solved graphs and the registry cache share packages by reference count.

use std::path::PathBuf;
use std::sync::Arc;

use crate::types::dependency::DependencyList;
use crate::types::fragment::FragmentList;
use crate::types::vars::VariableStore;

/// Shared handle to an immutable package.
pub type PackageRef = Arc<Package>;

/// A parsed metadata record or a synthetic root.
#[derive(Debug, Clone, Default)]
pub struct Package {
    /// Identity used for lookups: the record filename without its suffix.
    pub id: String,
    /// Absolute path of the record this package was read from, or `None`
    /// for synthetic packages.
    pub filename: Option<PathBuf>,
    /// Human-readable name from the `Name` field.
    pub realname: String,
    pub version: String,
    pub description: String,
    /// SPDX license expression from the `License` field.
    pub license: Option<String>,

    pub cflags: FragmentList,
    pub cflags_private: FragmentList,
    pub libs: FragmentList,
    pub libs_private: FragmentList,

    pub requires: DependencyList,
    pub requires_private: DependencyList,
    pub conflicts: DependencyList,
    pub provides: DependencyList,

    pub vars: VariableStore,

    /// Came from an `-uninstalled` overlay record.
    pub uninstalled: bool,
    /// Synthesized by the solver rather than read from disk.
    pub synthetic: bool,
}

impl Package {
    /// Create a synthetic package, used for the query root.
    pub fn synthetic(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            realname: id.clone(),
            id,
            version: String::new(),
            synthetic: true,
            ..Self::default()
        }
    }

    /// Display identity: `virtual:<id>` for synthetic packages, otherwise
    /// the record id.
    pub fn display_id(&self) -> String {
        if self.synthetic {
            format!("virtual:{}", self.id)
        } else {
            self.id.clone()
        }
    }

    pub fn into_ref(self) -> PackageRef {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_package() {
        let world = Package::synthetic("world");
        assert!(world.synthetic);
        assert_eq!(world.id, "world");
        assert_eq!(world.display_id(), "virtual:world");
        assert!(world.filename.is_none());
    }

    #[test]
    fn test_display_id_for_real_package() {
        let pkg = Package {
            id: "foo".to_string(),
            ..Package::default()
        };
        assert_eq!(pkg.display_id(), "foo");
    }
}
