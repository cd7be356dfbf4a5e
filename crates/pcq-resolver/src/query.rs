//! Depth-1 introspection over a solved graph.
//!
//! These projections answer questions about the packages the query named
//! directly; transitive dependencies are not consulted.

use pcq_core::diag::DiagnosticSink;
use pcq_metadata::Expander;

use crate::graph::SolvedGraph;

/// Version of each query package, in query order.
pub fn modversions(graph: &SolvedGraph) -> Vec<String> {
    graph
        .query_roots()
        .iter()
        .map(|p| p.version.clone())
        .collect()
}

/// Record path of each query package. Synthetic packages yield nothing.
pub fn paths(graph: &SolvedGraph) -> Vec<String> {
    graph
        .query_roots()
        .iter()
        .filter_map(|p| p.filename.as_ref())
        .map(|p| p.display().to_string())
        .collect()
}

/// Expanded value of one variable per query package. Packages without the
/// variable contribute an empty string.
pub fn variable(graph: &SolvedGraph, name: &str, sink: &dyn DiagnosticSink) -> Vec<String> {
    graph
        .query_roots()
        .iter()
        .map(|p| {
            let path = p
                .filename
                .as_ref()
                .map(|f| f.display().to_string())
                .unwrap_or_default();
            let expander = Expander::new(&p.vars, &path, sink);
            p.vars
                .get(name)
                .map(|value| expander.expand(value))
                .unwrap_or_default()
        })
        .collect()
}

/// Variable names defined by each query package, in record order.
pub fn variable_names(graph: &SolvedGraph) -> Vec<Vec<String>> {
    graph
        .query_roots()
        .iter()
        .map(|p| p.vars.iter().map(|(n, _)| n.to_string()).collect())
        .collect()
}

/// `Requires` entries of the query packages, rendered `name OP version`.
pub fn requires(graph: &SolvedGraph) -> Vec<String> {
    graph
        .query_roots()
        .iter()
        .flat_map(|p| p.requires.iter().map(|d| d.to_string()))
        .collect()
}

/// `Requires.private` entries of the query packages.
pub fn requires_private(graph: &SolvedGraph) -> Vec<String> {
    graph
        .query_roots()
        .iter()
        .flat_map(|p| p.requires_private.iter().map(|d| d.to_string()))
        .collect()
}

/// `License` of each query package, rendered `id: expression`. Packages
/// without a declared license report `NOASSERTION`.
pub fn licenses(graph: &SolvedGraph) -> Vec<String> {
    graph
        .query_roots()
        .iter()
        .map(|p| {
            let license = p.license.as_deref().unwrap_or("NOASSERTION");
            format!("{}: {}", p.id, license)
        })
        .collect()
}

/// `Provides` entries of the query packages.
pub fn provides(graph: &SolvedGraph) -> Vec<String> {
    graph
        .query_roots()
        .iter()
        .flat_map(|p| p.provides.iter().map(|d| d.to_string()))
        .collect()
}
