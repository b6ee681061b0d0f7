// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and edges.
//!
//! `Graph` is the read-only view handed to the validator, the order engine and
//! presentation. Only [`GraphStore`](crate::store::GraphStore) mutates it.

use crate::connection::{Edge, EdgeId};
use crate::node::{Node, NodeId};
use crate::port::PortRef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A model graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Edges between nodes
    edges: IndexMap<EdgeId, Edge>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Whether a node exists
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Get all nodes, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edges.get(&edge_id)
    }

    /// Get all edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The edge currently feeding an input port, if any
    pub fn edge_into(&self, target: &PortRef) -> Option<&Edge> {
        self.edges.values().find(|e| e.target == *target)
    }

    /// Get edges involving a node
    pub fn edges_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.involves_node(node_id))
    }

    /// Nodes feeding this node directly (may repeat)
    pub fn dependencies_of(&self, node_id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges
            .values()
            .filter(move |e| e.target.node == node_id)
            .map(|e| e.source.node)
    }

    /// Nodes fed by this node directly (may repeat)
    pub fn dependents_of(&self, node_id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges
            .values()
            .filter(move |e| e.source.node == node_id)
            .map(|e| e.target.node)
    }

    pub(crate) fn insert_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    /// Remove a node and every edge touching it
    pub(crate) fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.edges.retain(|_, e| !e.involves_node(node_id));
        self.nodes.shift_remove(&node_id)
    }

    pub(crate) fn insert_edge(&mut self, edge: Edge) -> EdgeId {
        let id = edge.id;
        self.edges.insert(id, edge);
        id
    }

    pub(crate) fn remove_edge(&mut self, edge_id: EdgeId) -> Option<Edge> {
        self.edges.shift_remove(&edge_id)
    }

    /// Drop edges for which `keep` returns false, returning the removed ones
    pub(crate) fn retain_edges(&mut self, mut keep: impl FnMut(&Edge) -> bool) -> Vec<Edge> {
        let mut removed = Vec::new();
        self.edges.retain(|_, e| {
            if keep(e) {
                true
            } else {
                removed.push(e.clone());
                false
            }
        });
        removed
    }
}
