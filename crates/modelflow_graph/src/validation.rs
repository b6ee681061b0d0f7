// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection validation.
//!
//! Decides whether a proposed edge is admissible. Variable names on the two
//! ends do not have to match: same-name wiring is a suggestion offered by
//! [`matching`](crate::matching), not a rule enforced here.

use crate::graph::Graph;
use crate::node::NodeId;
use crate::port::{PortDirection, PortRef};

/// Reason a proposed edge was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    /// Source is not an output or target is not an input
    #[error("Edges must run from an output port to an input port")]
    WrongDirection,

    /// One of the endpoints names a node that does not exist
    #[error("Node not found: {0}")]
    UnknownNode(NodeId),

    /// Source and target are the same node
    #[error("A model cannot feed itself")]
    SelfLoop,

    /// The variable is not declared on the referenced node
    #[error("Port not found: {0}")]
    PortNotFound(PortRef),
}

/// Check a proposed edge against the graph. The first failing check wins.
pub fn validate(graph: &Graph, source: &PortRef, target: &PortRef) -> Result<(), ValidationFailure> {
    if source.direction != PortDirection::Output || target.direction != PortDirection::Input {
        return Err(ValidationFailure::WrongDirection);
    }

    let source_node = graph
        .node(source.node)
        .ok_or(ValidationFailure::UnknownNode(source.node))?;
    let target_node = graph
        .node(target.node)
        .ok_or(ValidationFailure::UnknownNode(target.node))?;

    if source.node == target.node {
        return Err(ValidationFailure::SelfLoop);
    }

    if !source_node.ports.contains(source) {
        return Err(ValidationFailure::PortNotFound(source.clone()));
    }
    if !target_node.ports.contains(target) {
        return Err(ValidationFailure::PortNotFound(target.clone()));
    }

    Ok(())
}
