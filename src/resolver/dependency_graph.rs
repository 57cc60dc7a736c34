//! Dependency graph between pending components.
//!
//! This module provides the graph data structure and algorithms the resolver
//! needs to order component construction: cycle detection with the offending
//! chain, and a deterministic topological order where dependencies always
//! come before their dependents.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};

use crate::core::{ComponentKey, RegistryError};

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is currently being visited (in the DFS stack).
    Gray,
    /// Node has been fully visited.
    Black,
}

/// Dependency graph over component keys.
///
/// An edge `from → to` means `from` references `to`, so `to` must be built
/// first. Every node remembers its declaration position, which breaks ties
/// between components that could be built in either order.
pub struct DependencyGraph {
    /// The underlying directed graph.
    graph: DiGraph<ComponentKey, ()>,
    /// Map from component keys to their graph indices.
    node_map: HashMap<ComponentKey, NodeIndex>,
    /// Declaration position per node index.
    positions: Vec<usize>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
            positions: Vec::new(),
        }
    }

    /// Add a component declared at `position`, if not already present.
    ///
    /// Returns the node index in the graph.
    pub fn add_node(&mut self, key: ComponentKey, position: usize) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&key) {
            index
        } else {
            let index = self.graph.add_node(key.clone());
            self.node_map.insert(key, index);
            self.positions.push(position);
            index
        }
    }

    /// Whether `key` is a node of the graph.
    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.node_map.contains_key(key)
    }

    /// Record that `from` depends on `to`.
    ///
    /// Both nodes must have been added; unknown keys are ignored.
    pub fn add_dependency(&mut self, from: &ComponentKey, to: &ComponentKey) {
        let (Some(&from_idx), Some(&to_idx)) = (self.node_map.get(from), self.node_map.get(to))
        else {
            return;
        };

        // Check if edge already exists to avoid duplicates
        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Detect cycles in the dependency graph using DFS with colors.
    ///
    /// Returns [`RegistryError::CyclicDependency`] containing the cycle path.
    pub fn detect_cycles(&self) -> Result<(), RegistryError> {
        let mut colors: HashMap<NodeIndex, Color> = HashMap::new();
        let mut path: Vec<NodeIndex> = Vec::new();

        for node in self.graph.node_indices() {
            colors.insert(node, Color::White);
        }

        // Visit in declaration order so the reported cycle is stable
        let mut roots: Vec<NodeIndex> = self.graph.node_indices().collect();
        roots.sort_by_key(|idx| self.positions[idx.index()]);

        for node in roots {
            if matches!(colors.get(&node), Some(Color::White)) {
                if let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path) {
                    let chain = cycle
                        .iter()
                        .map(|idx| self.graph[*idx].path())
                        .collect::<Vec<_>>()
                        .join(" → ");
                    return Err(RegistryError::CyclicDependency {
                        chain,
                    });
                }
            }
        }

        Ok(())
    }

    /// DFS visit for cycle detection.
    ///
    /// Returns `Some(cycle_path)` if a cycle is detected, None otherwise.
    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        for neighbor in self.sorted_neighbors(node, Direction::Outgoing) {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    let cycle_start = path.iter().position(|n| *n == neighbor).unwrap_or(0);
                    let mut cycle = path[cycle_start..].to_vec();
                    // Close the loop
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Some(Color::White) => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    fn sorted_neighbors(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> =
            self.graph.neighbors_directed(node, direction).collect();
        neighbors.sort_by_key(|idx| self.positions[idx.index()]);
        neighbors
    }

    /// Get the build order.
    ///
    /// Dependencies come before their dependents. Among components whose
    /// dependencies are all satisfied, lower tiers go first, then earlier
    /// declarations, so the order is fully deterministic.
    pub fn build_order(&self) -> Result<Vec<ComponentKey>, RegistryError> {
        self.detect_cycles()?;

        let mut pending: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| self.graph.neighbors_directed(idx, Direction::Outgoing).count())
            .collect();

        let rank = |idx: NodeIndex| {
            (self.graph[idx].kind.tier(), self.positions[idx.index()], idx.index())
        };

        let mut ready: BTreeSet<(u8, usize, usize)> = self
            .graph
            .node_indices()
            .filter(|idx| pending[idx.index()] == 0)
            .map(rank)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(next) = ready.pop_first() {
            let idx = NodeIndex::new(next.2);
            order.push(self.graph[idx].clone());

            for dependent in self.graph.neighbors_directed(idx, Direction::Incoming) {
                pending[dependent.index()] -= 1;
                if pending[dependent.index()] == 0 {
                    ready.insert(rank(dependent));
                }
            }
        }

        if order.len() != self.graph.node_count() {
            // Unreachable once detect_cycles passed
            return Err(RegistryError::CyclicDependency {
                chain: "unresolvable build order".to_string(),
            });
        }

        Ok(order)
    }

    /// Get direct dependencies of a component, in declaration order.
    pub fn direct_dependencies(&self, key: &ComponentKey) -> Vec<ComponentKey> {
        if let Some(&node_idx) = self.node_map.get(key) {
            self.sorted_neighbors(node_idx, Direction::Outgoing)
                .into_iter()
                .map(|idx| self.graph[idx].clone())
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Get the total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the total number of edges (dependencies) in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
