//! Error types and result aliases for pcq operations.
//!
//! Provides a unified error type covering parse failures, lookup misses and
//! constraint violations across the query pipeline, with actionable messages.

use thiserror::Error;

use crate::types::VersionOp;

/// Unified error type for all pcq operations
#[derive(Error, Debug)]
pub enum PcqError {
    // Metadata errors
    #[error("Failed to parse '{path}': {message} at line {line}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Required field '{field}' missing in '{path}'")]
    MissingField { path: String, field: String },

    // Registry errors
    #[error("Package '{name}' was not found on the search path")]
    NotFound { name: String },

    // Resolution errors
    #[error("Package '{name}' has version {found}, but {required_by} requires {op} {required}")]
    VersionMismatch {
        name: String,
        found: String,
        required_by: String,
        op: VersionOp,
        required: String,
    },

    #[error("Package '{name}' conflicts with '{conflict}' ({reason})")]
    Conflict {
        name: String,
        conflict: String,
        reason: String,
    },

    #[error("Malformed version constraint '{constraint}' in query for '{name}'")]
    InvalidConstraint { name: String, constraint: String },

    #[error("Query '{query}' names no resolvable packages")]
    UnsatisfiableQuery { query: String },

    // IO errors
    #[error("IO error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for pcq operations
pub type PcqResult<T> = Result<T, PcqError>;

impl PcqError {
    /// Create an IO error carrying the offending path
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this error came from user input rather than the environment
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            PcqError::NotFound { .. }
                | PcqError::VersionMismatch { .. }
                | PcqError::InvalidConstraint { .. }
                | PcqError::UnsatisfiableQuery { .. }
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            PcqError::NotFound { .. } => {
                Some("Check the package name spelling or extend the search path")
            },
            PcqError::VersionMismatch { .. } => {
                Some("Install a matching version or relax the constraint")
            },
            PcqError::Conflict { .. } => {
                Some("Remove one of the conflicting packages from the query")
            },
            PcqError::InvalidConstraint { .. } => {
                Some("Constraints take the form 'name OP version', e.g. 'foo >= 1.2'")
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = PcqError::NotFound {
            name: "foo".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Package 'foo' was not found on the search path"
        );
        assert!(err.is_query_error());
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_version_mismatch_message() {
        let err = PcqError::VersionMismatch {
            name: "foo".to_string(),
            found: "1.2.3".to_string(),
            required_by: "world".to_string(),
            op: VersionOp::NotEqual,
            required: "1.2.3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Package 'foo' has version 1.2.3, but world requires != 1.2.3"
        );
    }

    #[test]
    fn test_io_error_keeps_path() {
        let err = PcqError::io(
            "/tmp/foo.pc",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/foo.pc"));
        assert!(!err.is_query_error());
    }
}
