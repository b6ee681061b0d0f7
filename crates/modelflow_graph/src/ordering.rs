// SPDX-License-Identifier: MIT OR Apache-2.0
//! Execution ordering.
//!
//! Ranks are assigned with a layered Kahn's algorithm: every node with no
//! pending dependencies joins the current layer, then its outgoing edges are
//! released. Nodes that share a rank are independent of each other. The
//! computation is total and stateless; it always starts from the full graph.

use crate::graph::Graph;
use crate::node::NodeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Why a node cannot be scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unorderable {
    /// The node, or something it depends on, failed to load
    DegradedInput,
    /// The node sits on a cycle or depends on one
    Cyclic,
}

/// Execution rank of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankResult {
    /// Execution layer, starting at 0
    Ranked(u32),
    /// Not schedulable
    Unorderable(Unorderable),
}

impl RankResult {
    /// The layer number, if the node is schedulable
    pub fn layer(self) -> Option<u32> {
        match self {
            Self::Ranked(n) => Some(n),
            Self::Unorderable(_) => None,
        }
    }

    /// Whether the node is schedulable
    pub fn is_ranked(self) -> bool {
        matches!(self, Self::Ranked(_))
    }
}

impl fmt::Display for RankResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ranked(n) => write!(f, "{n}"),
            Self::Unorderable(Unorderable::DegradedInput) => f.write_str("unorderable (error)"),
            Self::Unorderable(Unorderable::Cyclic) => f.write_str("unorderable (cycle)"),
        }
    }
}

/// Compute the rank of every node in the graph.
///
/// The result lists nodes in the graph's insertion order.
pub fn compute_ranks(graph: &Graph) -> IndexMap<NodeId, RankResult> {
    let mut ranks: IndexMap<NodeId, RankResult> = IndexMap::with_capacity(graph.node_count());

    // Degraded nodes and everything downstream of them
    let mut degraded: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<NodeId> = graph
        .nodes()
        .filter(|n| n.is_degraded())
        .map(|n| n.id)
        .collect();
    while let Some(node_id) = queue.pop_front() {
        if !degraded.insert(node_id) {
            continue;
        }
        queue.extend(graph.dependents_of(node_id).filter(|d| !degraded.contains(d)));
    }

    // In-degree over edges among the remaining nodes
    let mut in_degree: HashMap<NodeId, usize> = graph
        .node_ids()
        .filter(|id| !degraded.contains(id))
        .map(|id| (id, 0))
        .collect();
    for edge in graph.edges() {
        if in_degree.contains_key(&edge.source.node) {
            if let Some(deg) = in_degree.get_mut(&edge.target.node) {
                *deg += 1;
            }
        }
    }

    let mut layer: Vec<NodeId> = graph
        .node_ids()
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();
    let mut assigned: HashMap<NodeId, u32> = HashMap::new();
    let mut rank = 0u32;
    while !layer.is_empty() {
        let mut next = Vec::new();
        for &node_id in &layer {
            assigned.insert(node_id, rank);
        }
        for &node_id in &layer {
            for dependent in graph.dependents_of(node_id) {
                if let Some(deg) = in_degree.get_mut(&dependent) {
                    *deg -= 1;
                    if *deg == 0 {
                        next.push(dependent);
                    }
                }
            }
        }
        layer = next;
        rank += 1;
    }

    for node_id in graph.node_ids() {
        let result = if degraded.contains(&node_id) {
            RankResult::Unorderable(Unorderable::DegradedInput)
        } else if let Some(&n) = assigned.get(&node_id) {
            RankResult::Ranked(n)
        } else {
            RankResult::Unorderable(Unorderable::Cyclic)
        };
        ranks.insert(node_id, result);
    }

    ranks
}

/// Group ranked nodes into execution layers.
///
/// Layer `k` holds every node of rank `k`; nodes within a layer may run in
/// parallel. Unorderable nodes are left out.
pub fn execution_layers(ranks: &IndexMap<NodeId, RankResult>) -> Vec<Vec<NodeId>> {
    let mut layers: Vec<Vec<NodeId>> = Vec::new();
    for (&node_id, rank) in ranks {
        if let Some(n) = rank.layer() {
            let n = n as usize;
            if layers.len() <= n {
                layers.resize_with(n + 1, Vec::new);
            }
            layers[n].push(node_id);
        }
    }
    layers
}
