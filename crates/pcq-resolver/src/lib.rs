//! # pcq-resolver
//!
//! Dependency graph solving and flag collection for pcq.
//!
//! The entry point is [`Client`]: it owns the registry for one
//! configuration and exposes the query operations, from flag rendering to
//! depth-1 introspection. Solving expands the query breadth-first from a
//! synthetic `world` root, then collection walks the solved graph in
//! resolution order.

pub mod collect;
pub mod graph;
pub mod query;
pub mod solve;

pub use graph::{EdgeKind, SolvedGraph};
pub use solve::Solver;

use std::sync::Arc;

use pcq_core::diag::{DiagnosticSink, NullSink};
use pcq_core::error::PcqResult;
use pcq_core::{PackageRef, ResolveConfig};
use pcq_registry::Registry;

/// Query client: one registry, one immutable configuration, one sink.
pub struct Client {
    registry: Registry,
    sink: Arc<dyn DiagnosticSink>,
}

impl Client {
    pub fn new(config: ResolveConfig) -> Self {
        Self::with_sink(config, Arc::new(NullSink))
    }

    pub fn with_sink(config: ResolveConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            registry: Registry::new(config),
            sink,
        }
    }

    pub fn config(&self) -> &ResolveConfig {
        self.registry.config()
    }

    /// Swap in a new configuration. The package cache is discarded, since
    /// cached packages bake in the expansion results of the old settings.
    pub fn reconfigure(&mut self, config: ResolveConfig) {
        let sink = self.sink.clone();
        *self = Self::with_sink(config, sink);
    }

    pub fn cache_clear(&mut self) {
        self.registry.cache_clear();
    }

    /// Solve a query into a dependency graph.
    pub fn solve(&mut self, query: &str) -> PcqResult<SolvedGraph> {
        Solver::new(&mut self.registry, &*self.sink).solve(query)
    }

    /// Whether every package in the query resolves.
    pub fn exists(&mut self, query: &str) -> bool {
        self.solve(query).is_ok()
    }

    /// Rendered compiler flags for a query.
    pub fn cflags(&mut self, query: &str) -> PcqResult<Vec<String>> {
        let graph = self.solve(query)?;
        let config = self.config();
        let list = collect::collect_cflags(&graph, config);
        Ok(collect::render_cflags(&list, config))
    }

    /// Rendered linker flags for a query.
    pub fn libs(&mut self, query: &str) -> PcqResult<Vec<String>> {
        let graph = self.solve(query)?;
        let config = self.config();
        let list = collect::collect_libs(&graph, config);
        Ok(collect::render_libs(&list, config))
    }

    /// Compiler flags followed by linker flags, the combined query form.
    pub fn cflags_and_libs(&mut self, query: &str) -> PcqResult<Vec<String>> {
        let graph = self.solve(query)?;
        let config = self.config();
        let cflags = collect::collect_cflags(&graph, config);
        let libs = collect::collect_libs(&graph, config);
        let mut tokens = collect::render_cflags(&cflags, config);
        tokens.extend(collect::render_libs(&libs, config));
        Ok(tokens)
    }

    /// Version of each query package.
    pub fn modversions(&mut self, query: &str) -> PcqResult<Vec<String>> {
        Ok(query::modversions(&self.solve(query)?))
    }

    /// Record path of each query package.
    pub fn paths(&mut self, query: &str) -> PcqResult<Vec<String>> {
        Ok(query::paths(&self.solve(query)?))
    }

    /// Expanded variable value per query package.
    pub fn variable(&mut self, query: &str, name: &str) -> PcqResult<Vec<String>> {
        let graph = self.solve(query)?;
        Ok(query::variable(&graph, name, &*self.sink))
    }

    /// Variable names defined by each query package.
    pub fn variable_names(&mut self, query: &str) -> PcqResult<Vec<Vec<String>>> {
        Ok(query::variable_names(&self.solve(query)?))
    }

    /// Direct public requirements of the query packages.
    pub fn requires(&mut self, query: &str) -> PcqResult<Vec<String>> {
        Ok(query::requires(&self.solve(query)?))
    }

    /// Direct private requirements of the query packages.
    pub fn requires_private(&mut self, query: &str) -> PcqResult<Vec<String>> {
        Ok(query::requires_private(&self.solve(query)?))
    }

    /// Provides entries of the query packages.
    pub fn provides(&mut self, query: &str) -> PcqResult<Vec<String>> {
        Ok(query::provides(&self.solve(query)?))
    }

    /// License of each query package, `NOASSERTION` when undeclared.
    pub fn licenses(&mut self, query: &str) -> PcqResult<Vec<String>> {
        Ok(query::licenses(&self.solve(query)?))
    }

    /// Every package visible on the search path.
    pub fn list_all(&mut self) -> Vec<PackageRef> {
        self.registry.list_all(&*self.sink)
    }
}
