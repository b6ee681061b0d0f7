// SPDX-License-Identifier: MIT OR Apache-2.0
//! The graph store: the single owner and mutator of nodes and edges.
//!
//! Every mutation leaves the graph structurally valid and recomputes ranks
//! before returning, so ranks read from the store are never stale.

use crate::connection::{Edge, EdgeId};
use crate::graph::Graph;
use crate::node::{Node, NodeData, NodeId};
use crate::ordering::{compute_ranks, RankResult};
use crate::port::{PortRef, Ports};
use crate::validation::{validate, ValidationFailure};
use serde::Serialize;

/// Per-node data exposed for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    /// Node ID
    pub id: NodeId,
    /// Display name
    pub label: String,
    /// Ordered input names
    pub inputs: Vec<String>,
    /// Ordered output names
    pub outputs: Vec<String>,
    /// Load error, if degraded
    pub error: Option<String>,
    /// Execution rank
    pub rank: RankResult,
}

impl From<&Node> for NodeView {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            label: node.label.clone(),
            inputs: node.inputs().to_vec(),
            outputs: node.outputs().to_vec(),
            error: node.load_error.clone(),
            rank: node.rank(),
        }
    }
}

/// Owner of the model graph
#[derive(Debug, Default)]
pub struct GraphStore {
    graph: Graph,
}

impl GraphStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the current graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Take an owned, immutable copy of the graph
    pub fn snapshot(&self) -> Graph {
        self.graph.clone()
    }

    /// Add a node; degraded if `data` carries a load error
    pub fn add_node(&mut self, data: NodeData) -> NodeId {
        let id = self.graph.insert_node(Node::new(data));
        tracing::debug!(node = %id, "added node");
        self.recompute();
        id
    }

    /// Replace a node's ports and load error, pruning edges whose
    /// endpoint no longer exists. No-op for unknown nodes.
    pub fn update_node_data(
        &mut self,
        node_id: NodeId,
        inputs: Vec<String>,
        outputs: Vec<String>,
        load_error: Option<String>,
    ) {
        let Some(node) = self.graph.node_mut(node_id) else {
            tracing::debug!(node = %node_id, "ignoring update for missing node");
            return;
        };
        node.ports = Ports::new(inputs, outputs);
        node.load_error = load_error;
        let ports = node.ports.clone();

        let pruned = self.graph.retain_edges(|edge| {
            let stale_source = edge.source.node == node_id && !ports.contains(&edge.source);
            let stale_target = edge.target.node == node_id && !ports.contains(&edge.target);
            !(stale_source || stale_target)
        });
        for edge in &pruned {
            tracing::debug!(edge = %edge.id, "pruned stale edge");
        }

        self.recompute();
    }

    /// Replace a node's label and data wholesale, as when a new file is
    /// dropped onto an existing node. No-op for unknown nodes.
    pub fn replace_node_data(&mut self, node_id: NodeId, data: NodeData) {
        let Some(node) = self.graph.node_mut(node_id) else {
            return;
        };
        let NodeData {
            label,
            ports,
            load_error,
        } = data;
        node.label = label;
        let (inputs, outputs) = ports.into_parts();
        self.update_node_data(node_id, inputs, outputs, load_error);
    }

    /// Clear a node's load error, keeping its ports
    pub fn clear_load_error(&mut self, node_id: NodeId) {
        let Some(node) = self.graph.node_mut(node_id) else {
            return;
        };
        if node.load_error.take().is_some() {
            tracing::debug!(node = %node_id, "cleared load error");
            self.recompute();
        }
    }

    /// Change a node's display name
    pub fn rename_node(&mut self, node_id: NodeId, label: impl Into<String>) {
        if let Some(node) = self.graph.node_mut(node_id) {
            node.label = label.into();
        }
    }

    /// Remove a node and every edge touching it. No-op if absent.
    pub fn remove_node(&mut self, node_id: NodeId) {
        if self.graph.remove_node(node_id).is_some() {
            tracing::debug!(node = %node_id, "removed node");
            self.recompute();
        }
    }

    /// Connect an output to an input.
    ///
    /// An input accepts one edge; an existing edge into `target` is replaced.
    pub fn add_edge(&mut self, source: PortRef, target: PortRef) -> Result<EdgeId, ValidationFailure> {
        if let Err(failure) = validate(&self.graph, &source, &target) {
            tracing::debug!(%failure, "rejected edge");
            return Err(failure);
        }

        if let Some(previous) = self.graph.edge_into(&target).map(|e| e.id) {
            self.graph.remove_edge(previous);
            tracing::debug!(edge = %previous, "replaced edge into {}", target);
        }

        let id = self.graph.insert_edge(Edge::new(source, target));
        tracing::debug!(edge = %id, "added edge");
        self.recompute();
        Ok(id)
    }

    /// Remove an edge. No-op if absent.
    pub fn remove_edge(&mut self, edge_id: EdgeId) {
        if self.graph.remove_edge(edge_id).is_some() {
            tracing::debug!(edge = %edge_id, "removed edge");
            self.recompute();
        }
    }

    /// Current rank of a node
    pub fn rank(&self, node_id: NodeId) -> Option<RankResult> {
        self.graph.node(node_id).map(Node::rank)
    }

    /// Presentation data for every node, in insertion order
    pub fn views(&self) -> Vec<NodeView> {
        self.graph.nodes().map(NodeView::from).collect()
    }

    fn recompute(&mut self) {
        let ranks = compute_ranks(&self.graph);
        for node in self.graph.nodes_mut() {
            if let Some(&rank) = ranks.get(&node.id) {
                node.rank = rank;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::Unorderable;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_add_node_ranks_immediately() {
        let mut store = GraphStore::new();
        let a = store.add_node(NodeData::loaded("a.xlsx", vec![], names(&["x"])));
        let bad = store.add_node(NodeData::failed("bad.xlsx", "boom"));
        assert_eq!(store.rank(a), Some(RankResult::Ranked(0)));
        assert_eq!(
            store.rank(bad),
            Some(RankResult::Unorderable(Unorderable::DegradedInput))
        );
    }

    #[test]
    fn test_remove_node_cascades_edges() {
        let mut store = GraphStore::new();
        let a = store.add_node(NodeData::loaded("a", vec![], names(&["x"])));
        let b = store.add_node(NodeData::loaded("b", names(&["x"]), vec![]));
        store.add_edge(PortRef::output(a, "x"), PortRef::input(b, "x")).unwrap();
        assert_eq!(store.rank(b), Some(RankResult::Ranked(1)));

        store.remove_node(a);
        assert_eq!(store.graph().edge_count(), 0);
        assert_eq!(store.rank(b), Some(RankResult::Ranked(0)));
        assert_eq!(store.rank(a), None);

        // Removing again is harmless
        store.remove_node(a);
        assert_eq!(store.graph().node_count(), 1);
    }

    #[test]
    fn test_update_prunes_stale_edges() {
        let mut store = GraphStore::new();
        let a = store.add_node(NodeData::loaded("a", vec![], names(&["x", "y"])));
        let b = store.add_node(NodeData::loaded("b", names(&["x", "y"]), vec![]));
        let ex = store.add_edge(PortRef::output(a, "x"), PortRef::input(b, "x")).unwrap();
        let ey = store.add_edge(PortRef::output(a, "y"), PortRef::input(b, "y")).unwrap();

        store.update_node_data(a, vec![], names(&["y"]), None);
        assert!(store.graph().edge(ex).is_none());
        assert!(store.graph().edge(ey).is_some());
        assert_eq!(store.rank(b), Some(RankResult::Ranked(1)));
    }

    #[test]
    fn test_update_prunes_missing_duplicate_occurrence() {
        let mut store = GraphStore::new();
        let a = store.add_node(NodeData::loaded("a", vec![], names(&["x"])));
        let b = store.add_node(NodeData::loaded("b", names(&["x", "x"]), vec![]));
        let first = store.add_edge(PortRef::output(a, "x"), PortRef::input(b, "x")).unwrap();
        let second = store
            .add_edge(PortRef::output(a, "x"), PortRef::input(b, "x").nth(1))
            .unwrap();
        assert_eq!(store.graph().edge_count(), 2);

        store.update_node_data(b, names(&["x"]), vec![], None);
        assert!(store.graph().edge(first).is_some());
        assert!(store.graph().edge(second).is_none());
    }

    #[test]
    fn test_update_unknown_node_is_noop() {
        let mut store = GraphStore::new();
        store.update_node_data(NodeId::new(), names(&["x"]), vec![], None);
        assert_eq!(store.graph().node_count(), 0);
    }

    #[test]
    fn test_update_keeps_ports_on_error() {
        let mut store = GraphStore::new();
        let a = store.add_node(NodeData::loaded("a", vec![], names(&["x"])));
        let b = store.add_node(NodeData::loaded("b", names(&["x"]), vec![]));
        store.add_edge(PortRef::output(a, "x"), PortRef::input(b, "x")).unwrap();

        // A failed reload that keeps the prior ports keeps the wiring too
        let outputs = store.graph().node(a).unwrap().outputs().to_vec();
        store.update_node_data(a, vec![], outputs, Some("Could not parse file: bad".into()));
        assert_eq!(store.graph().edge_count(), 1);
        let degraded = Some(RankResult::Unorderable(Unorderable::DegradedInput));
        assert_eq!(store.rank(a), degraded);
        assert_eq!(store.rank(b), degraded);

        store.clear_load_error(a);
        assert_eq!(store.rank(a), Some(RankResult::Ranked(0)));
        assert_eq!(store.rank(b), Some(RankResult::Ranked(1)));
        assert_eq!(store.graph().node(a).unwrap().outputs(), ["x".to_string()]);
    }

    #[test]
    fn test_replace_node_data_relabels() {
        let mut store = GraphStore::new();
        let a = store.add_node(NodeData::placeholder("Untitled"));
        store.replace_node_data(a, NodeData::loaded("loan.xlsx", names(&["rate"]), vec![]));
        let node = store.graph().node(a).unwrap();
        assert_eq!(node.label, "loan.xlsx");
        assert_eq!(node.inputs(), ["rate".to_string()]);
    }

    #[test]
    fn test_rejected_edge_leaves_graph_unchanged() {
        let mut store = GraphStore::new();
        let a = store.add_node(NodeData::loaded("a", vec![], names(&["x"])));
        let b = store.add_node(NodeData::loaded("b", names(&["x"]), vec![]));
        let result = store.add_edge(PortRef::output(b, "x"), PortRef::input(a, "x"));
        assert!(matches!(result, Err(ValidationFailure::PortNotFound(_))));
        assert_eq!(store.graph().edge_count(), 0);
    }

    #[test]
    fn test_views_expose_presentation_fields() {
        let mut store = GraphStore::new();
        store.add_node(NodeData::loaded("a.xlsx", names(&["i"]), names(&["o"])));
        let views = store.views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].label, "a.xlsx");
        assert_eq!(views[0].inputs, names(&["i"]));
        assert_eq!(views[0].outputs, names(&["o"]));
        assert_eq!(views[0].error, None);
        assert_eq!(views[0].rank, RankResult::Ranked(0));
    }
}
