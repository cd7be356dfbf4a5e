//! Solved dependency graph.
//!
//! A directed graph of shared package handles rooted at the synthetic
//! query package. Nodes are added in resolution order and that order is
//! preserved for fragment collection.

use indexmap::IndexMap;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use pcq_core::types::dependency::DependencyOrigin;
use pcq_core::PackageRef;

/// Edge classification in the solved graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Public,
    Private,
}

impl EdgeKind {
    pub fn from_origin(origin: DependencyOrigin) -> Self {
        match origin {
            DependencyOrigin::RequiresPrivate => EdgeKind::Private,
            _ => EdgeKind::Public,
        }
    }
}

/// Dependency graph produced by one solve pass.
#[derive(Debug)]
pub struct SolvedGraph {
    graph: DiGraph<PackageRef, EdgeKind>,
    indices: IndexMap<String, NodeIndex>,
    root: NodeIndex,
    order: Vec<NodeIndex>,
}

impl SolvedGraph {
    /// Create a graph holding only the synthetic root.
    pub fn new(root: PackageRef) -> Self {
        let mut graph = DiGraph::new();
        let id = root.id.clone();
        let root_index = graph.add_node(root);
        let mut indices = IndexMap::new();
        indices.insert(id, root_index);
        Self {
            graph,
            indices,
            root: root_index,
            order: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn package(&self, index: NodeIndex) -> &PackageRef {
        &self.graph[index]
    }

    pub fn lookup(&self, id: &str) -> Option<NodeIndex> {
        self.indices.get(id).copied()
    }

    /// Add a resolved package. Resolution order is recorded for later
    /// collection.
    pub fn add_package(&mut self, package: PackageRef) -> NodeIndex {
        let id = package.id.clone();
        let index = self.graph.add_node(package);
        self.indices.insert(id, index);
        self.order.push(index);
        index
    }

    /// Add an edge unless an identical one already exists.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, kind: EdgeKind) {
        let exists = self
            .graph
            .edges_connecting(from, to)
            .any(|edge| *edge.weight() == kind);
        if !exists {
            self.graph.add_edge(from, to, kind);
        }
    }

    /// If adding `from -> to` would close a cycle, return the chain of
    /// package ids walking the existing path from `to` back around,
    /// e.g. `["a", "b", "a"]`.
    pub fn cycle_chain(&self, from: NodeIndex, to: NodeIndex) -> Option<Vec<String>> {
        if !has_path_connecting(&self.graph, to, from, None) {
            return None;
        }
        let mut chain: Vec<String> = self
            .path_between(to, from)
            .into_iter()
            .map(|index| self.graph[index].id.clone())
            .collect();
        chain.push(self.graph[to].id.clone());
        Some(chain)
    }

    /// Packages in resolution order, root excluded.
    pub fn packages_in_order(&self) -> impl Iterator<Item = &PackageRef> {
        self.order.iter().map(|&index| &self.graph[index])
    }

    /// Direct dependencies of a node in edge insertion order.
    pub fn direct_deps(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut deps: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .collect();
        // petgraph iterates newest edge first
        deps.reverse();
        deps
    }

    /// The packages the query named, in query order.
    pub fn query_roots(&self) -> Vec<&PackageRef> {
        self.direct_deps(self.root)
            .into_iter()
            .map(|index| &self.graph[index])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn path_between(&self, from: NodeIndex, to: NodeIndex) -> Vec<NodeIndex> {
        // depth-first search keeping the current path
        let mut stack = vec![(from, vec![from])];
        let mut visited = vec![false; self.graph.node_count()];
        while let Some((node, path)) = stack.pop() {
            if node == to {
                return path;
            }
            if visited[node.index()] {
                continue;
            }
            visited[node.index()] = true;
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                let mut next_path = path.clone();
                next_path.push(next);
                stack.push((next, next_path));
            }
        }
        Vec::new()
    }
}
