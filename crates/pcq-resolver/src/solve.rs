//! Dependency graph solving.
//!
//! Expands a query breadth-first from a synthetic `world` root: each
//! package's requirements resolve through the registry, with provides
//! substitution for missing names, version verification on every edge and
//! cycle breaking with a diagnostic. Private requirements join the graph
//! only when the configuration traverses them.

use std::collections::VecDeque;

use petgraph::graph::NodeIndex;
use tracing::{debug, trace};

use pcq_core::diag::{Diagnostic, DiagnosticSink};
use pcq_core::error::{PcqError, PcqResult};
use pcq_core::types::dependency::{Dependency, DependencyList, DependencyOrigin};
use pcq_core::{Package, PackageRef};
use pcq_registry::Registry;

use crate::graph::{EdgeKind, SolvedGraph};

/// One-shot solver borrowing the registry for the duration of a query.
pub struct Solver<'a> {
    registry: &'a mut Registry,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> Solver<'a> {
    pub fn new(registry: &'a mut Registry, sink: &'a dyn DiagnosticSink) -> Self {
        Self { registry, sink }
    }

    /// Solve a query string such as `foo bar >= 1.2` into a dependency
    /// graph.
    pub fn solve(&mut self, query: &str) -> PcqResult<SolvedGraph> {
        let requires = DependencyList::parse(query, DependencyOrigin::Requires)?;
        if requires.is_empty() {
            return Err(PcqError::UnsatisfiableQuery {
                query: query.to_string(),
            });
        }

        let mut world = Package::synthetic("world");
        world.requires = requires;
        let mut graph = SolvedGraph::new(world.into_ref());

        let max_depth = self.registry.config().max_depth;
        let traverse_private = self.registry.config().traverses_private();

        let mut queue: VecDeque<(NodeIndex, u32)> = VecDeque::new();
        queue.push_back((graph.root(), 0));

        while let Some((index, depth)) = queue.pop_front() {
            // The depth ceiling truncates the walk: a node at the limit
            // keeps its requirement fields but contributes no edges.
            if depth + 1 > max_depth {
                trace!(id = %graph.package(index).id, depth, "depth limit reached");
                continue;
            }

            let package = graph.package(index).clone();
            let mut deps: Vec<Dependency> = package.requires.iter().cloned().collect();
            if traverse_private {
                deps.extend(package.requires_private.iter().cloned());
            }

            for dep in deps {
                self.resolve_edge(&mut graph, index, &package, &dep, depth + 1, &mut queue)?;
            }
        }

        if !self.registry.config().ignore_conflicts {
            check_conflicts(&graph)?;
        }

        debug!(packages = graph.len(), "solve complete");
        Ok(graph)
    }

    fn resolve_edge(
        &mut self,
        graph: &mut SolvedGraph,
        parent: NodeIndex,
        parent_pkg: &PackageRef,
        dep: &Dependency,
        depth: u32,
        queue: &mut VecDeque<(NodeIndex, u32)>,
    ) -> PcqResult<()> {
        let kind = EdgeKind::from_origin(dep.origin);

        if let Some(existing) = graph.lookup(&dep.name) {
            verify_version(graph.package(existing), dep, parent_pkg)?;
            if let Some(chain) = graph.cycle_chain(parent, existing) {
                self.sink.report(Diagnostic::CircularReference {
                    chain: chain.join(" -> "),
                });
                return Ok(());
            }
            graph.add_edge(parent, existing, kind);
            return Ok(());
        }

        let package = self.locate(dep, parent_pkg)?;

        // A provider resolves under its own id; it may already be present.
        if let Some(existing) = graph.lookup(&package.id) {
            if let Some(chain) = graph.cycle_chain(parent, existing) {
                self.sink.report(Diagnostic::CircularReference {
                    chain: chain.join(" -> "),
                });
                return Ok(());
            }
            graph.add_edge(parent, existing, kind);
            return Ok(());
        }

        trace!(id = %package.id, depth, "resolved");
        let index = graph.add_package(package);
        graph.add_edge(parent, index, kind);
        queue.push_back((index, depth));
        Ok(())
    }

    /// Locate the package answering a dependency: direct lookup first,
    /// provides substitution second.
    fn locate(&mut self, dep: &Dependency, parent: &PackageRef) -> PcqResult<PackageRef> {
        match self.registry.find(&dep.name, self.sink) {
            Ok(package) => {
                if !dep.matches_version(&package.version) {
                    // A provider may still satisfy the constraint.
                    if let Some(provider) = self.registry.find_provider(dep, self.sink) {
                        if provider.id != package.id {
                            return Ok(provider);
                        }
                    }
                    return verify_version(&package, dep, parent).map(|_| package);
                }
                Ok(package)
            },
            Err(PcqError::NotFound { .. }) => self
                .registry
                .find_provider(dep, self.sink)
                .ok_or_else(|| PcqError::NotFound {
                    name: dep.name.clone(),
                }),
            Err(other) => Err(other),
        }
    }
}

fn verify_version(
    package: &PackageRef,
    dep: &Dependency,
    parent: &PackageRef,
) -> PcqResult<()> {
    if dep.matches_version(&package.version) {
        return Ok(());
    }
    let (op, required) = dep
        .constraint
        .clone()
        .unwrap_or((pcq_core::VersionOp::Equal, String::new()));
    Err(PcqError::VersionMismatch {
        name: dep.name.clone(),
        found: package.version.clone(),
        required_by: parent.display_id(),
        op,
        required,
    })
}

/// Pairwise conflict check across the solved graph. A conflict entry
/// matches when another resolved package has the conflicting name (or
/// provides it) and its version satisfies the constraint.
fn check_conflicts(graph: &SolvedGraph) -> PcqResult<()> {
    for package in graph.packages_in_order() {
        for conflict in &package.conflicts {
            for other in graph.packages_in_order() {
                if other.id == package.id {
                    continue;
                }
                let direct = other.id == conflict.name
                    && conflict.matches_version(&other.version);
                let provided = other
                    .provides
                    .iter()
                    .any(|prov| conflict.matches_provide(prov));
                if direct || provided {
                    return Err(PcqError::Conflict {
                        name: package.id.clone(),
                        conflict: other.id.clone(),
                        reason: conflict.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}
