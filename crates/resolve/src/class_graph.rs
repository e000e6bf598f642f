//! Dependency graphs between elements
//!
//! Two relations need cycle detection: the supertype relation between
//! classes and the single-redirect relation between constructors of one
//! class. Both are small directed graphs over element ids, analysed with
//! strongly connected components.

use indexmap::IndexMap;
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tern_ast::ElementId;

use crate::store::ElementStore;

/// Directed graph over element ids
#[derive(Debug, Clone, Default)]
pub struct ElementGraph {
    graph: DiGraph<ElementId, ()>,
    nodes: IndexMap<ElementId, NodeIndex>,
}

impl ElementGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supertype graph reachable from `class`
    pub fn supertypes(store: &ElementStore<'_>, class: ElementId) -> Self {
        let mut graph = Self::new();
        graph.node(class);
        let mut queue = VecDeque::from([class]);
        let mut visited = FxHashSet::default();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            for supertype in store.direct_supertypes(current) {
                graph.add_edge(current, supertype);
                queue.push_back(supertype);
            }
        }
        graph
    }

    pub fn node(&mut self, element: ElementId) -> NodeIndex {
        if let Some(&index) = self.nodes.get(&element) {
            return index;
        }
        let index = self.graph.add_node(element);
        self.nodes.insert(element, index);
        index
    }

    pub fn add_edge(&mut self, from: ElementId, to: ElementId) {
        let from = self.node(from);
        let to = self.node(to);
        self.graph.update_edge(from, to, ());
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_cyclic(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Elements that lie on a cycle: members of a strongly connected
    /// component with more than one node, or nodes with a self edge
    pub fn cyclic_elements(&self) -> FxHashSet<ElementId> {
        let mut cyclic = FxHashSet::default();
        for component in tarjan_scc(&self.graph) {
            let on_cycle = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&node| self.graph.contains_edge(node, node));
            if on_cycle {
                cyclic.extend(component.iter().filter_map(|&node| self.graph.node_weight(node)));
            }
        }
        cyclic
    }

    pub fn is_on_cycle(&self, element: ElementId) -> bool {
        self.cyclic_elements().contains(&element)
    }

    fn successor(&self, element: ElementId) -> Option<ElementId> {
        let index = *self.nodes.get(&element)?;
        self.graph
            .neighbors(index)
            .next()
            .and_then(|next| self.graph.node_weight(next).copied())
    }

    /// Of `elements`, in order, those whose chain of single successors runs
    /// into a cycle. Each element appears at most once.
    pub fn chains_into_cycle(&self, elements: &[ElementId]) -> Vec<ElementId> {
        let cyclic = self.cyclic_elements();
        let limit = self.node_count();
        elements
            .iter()
            .copied()
            .filter(|&start| {
                let mut cursor = Some(start);
                for _ in 0..=limit {
                    match cursor {
                        Some(current) if cyclic.contains(&current) => return true,
                        Some(current) => cursor = self.successor(current),
                        None => return false,
                    }
                }
                false
            })
            .collect()
    }
}
