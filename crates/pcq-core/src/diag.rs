//! Warning-level diagnostics.
//!
//! The engine never writes to a fixed output stream. Conditions that are
//! recoverable but worth surfacing (broken dependency cycles, truncated
//! variable expansions, duplicate variable definitions) are reported through
//! a caller-owned [`DiagnosticSink`].

use std::fmt;
use std::sync::Mutex;

/// A recoverable condition observed during parsing or resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A dependency cycle was broken by dropping the closing edge.
    CircularReference { chain: String },
    /// Variable expansion exceeded its depth or length ceiling and was
    /// truncated.
    ExpansionOverflow { path: String, variable: String },
    /// A record defined the same variable twice; the later value wins.
    DuplicateVariable { path: String, variable: String },
    /// A scalar record field appeared more than once; the later value wins.
    DuplicateField { path: String, field: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::CircularReference { chain } => {
                write!(f, "breaking circular reference ({chain})")
            },
            Diagnostic::ExpansionOverflow { path, variable } => {
                write!(
                    f,
                    "{path}: expansion of '${{{variable}}}' exceeded its ceiling, truncating"
                )
            },
            Diagnostic::DuplicateVariable { path, variable } => {
                write!(f, "{path}: duplicate definition of variable '{variable}'")
            },
            Diagnostic::DuplicateField { path, field } => {
                write!(f, "{path}: duplicate field '{field}', using the latest value")
            },
        }
    }
}

/// Receiver for warning-level diagnostics.
///
/// Implementations must tolerate being called from multiple queries in
/// sequence; the engine emits each diagnostic exactly once.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

/// Sink that discards every diagnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Sink that accumulates diagnostics for later inspection. Used by tests and
/// by callers that want to render warnings after the query completes.
#[derive(Debug, Default)]
pub struct CollectSink {
    collected: Mutex<Vec<Diagnostic>>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything reported so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        match self.collected.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl DiagnosticSink for CollectSink {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut guard) = self.collected.lock() {
            guard.push(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_reference_rendering() {
        let diag = Diagnostic::CircularReference {
            chain: "a -> b -> a".to_string(),
        };
        assert_eq!(diag.to_string(), "breaking circular reference (a -> b -> a)");
    }

    #[test]
    fn test_collect_sink_drains() {
        let sink = CollectSink::new();
        sink.report(Diagnostic::DuplicateVariable {
            path: "x.pc".to_string(),
            variable: "prefix".to_string(),
        });
        assert_eq!(sink.take().len(), 1);
        assert!(sink.take().is_empty());
    }
}
