//! Core data types for the pcq query engine.

pub mod dependency;
pub mod fragment;
pub mod package;
pub mod vars;
pub mod version;

pub use dependency::{Dependency, DependencyList, DependencyOrigin};
pub use fragment::{Fragment, FragmentList};
pub use package::{Package, PackageRef};
pub use vars::VariableStore;
pub use version::VersionOp;
