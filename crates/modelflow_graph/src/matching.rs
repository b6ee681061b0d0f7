// SPDX-License-Identifier: MIT OR Apache-2.0
//! Same-name wiring suggestions.
//!
//! Spreadsheets authored independently share variables only by naming
//! convention, so matching names is offered as a convenience. The validator
//! accepts any output-to-input pair regardless.

use crate::connection::EdgeId;
use crate::graph::Graph;
use crate::node::NodeId;
use crate::port::{PortDirection, PortRef};
use crate::store::GraphStore;

/// Pair each output of `source` with a same-named, unconnected input of `target`.
///
/// Duplicate input names are matched in declaration order, one output each.
/// Returns nothing if either node is missing or they are the same node.
pub fn suggest_connections(graph: &Graph, source: NodeId, target: NodeId) -> Vec<(PortRef, PortRef)> {
    if source == target {
        return Vec::new();
    }
    let (Some(source_node), Some(target_node)) = (graph.node(source), graph.node(target)) else {
        return Vec::new();
    };

    let mut open_inputs: Vec<PortRef> = target_node
        .ports
        .refs(target, PortDirection::Input)
        .into_iter()
        .filter(|input| graph.edge_into(input).is_none())
        .collect();

    let mut suggestions = Vec::new();
    for output in source_node.ports.refs(source, PortDirection::Output) {
        if let Some(pos) = open_inputs.iter().position(|input| input.name == output.name) {
            let input = open_inputs.remove(pos);
            suggestions.push((output, input));
        }
    }
    suggestions
}

impl GraphStore {
    /// Apply [`suggest_connections`] between two nodes
    pub fn connect_matching(&mut self, source: NodeId, target: NodeId) -> Vec<EdgeId> {
        suggest_connections(self.graph(), source, target)
            .into_iter()
            .filter_map(|(output, input)| self.add_edge(output, input).ok())
            .collect()
    }
}
