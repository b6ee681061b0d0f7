// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for model inputs/outputs.
//!
//! A model exposes the variable names declared in its spreadsheet. Names are
//! kept in declaration order and duplicates are preserved: every row is its own
//! connectable point, addressed by name plus occurrence index.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// The input and output variable names exposed by one node.
///
/// Built once from ingestion data and never edited in place; a reload swaps
/// in a whole new `Ports`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ports {
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl Ports {
    /// Create a port list from ordered input and output names
    pub fn new(inputs: Vec<String>, outputs: Vec<String>) -> Self {
        Self { inputs, outputs }
    }

    /// Ordered input names
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Ordered output names
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Names on one side of the node
    pub fn names(&self, direction: PortDirection) -> &[String] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    /// How many times `name` is declared on one side
    pub fn occurrences(&self, direction: PortDirection, name: &str) -> usize {
        self.names(direction).iter().filter(|n| n.as_str() == name).count()
    }

    /// Whether the referenced occurrence exists in this port list
    pub fn contains(&self, port: &PortRef) -> bool {
        self.occurrences(port.direction, &port.name) > port.occurrence
    }

    /// Split into `(inputs, outputs)`
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.inputs, self.outputs)
    }

    /// Whether the node declares no ports at all
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }

    /// Every connectable point on one side, duplicates numbered in order
    pub fn refs(&self, node: NodeId, direction: PortDirection) -> Vec<PortRef> {
        let names = self.names(direction);
        names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let occurrence = names[..index].iter().filter(|n| *n == name).count();
                PortRef {
                    node,
                    direction,
                    name: name.clone(),
                    occurrence,
                }
            })
            .collect()
    }
}

/// Reference to one connectable point on a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    /// Owning node
    pub node: NodeId,
    /// Which side of the node
    pub direction: PortDirection,
    /// Variable name
    pub name: String,
    /// Which declaration of `name` (0 for the first)
    pub occurrence: usize,
}

impl PortRef {
    /// Create a reference to the first occurrence of a port
    pub fn new(node: NodeId, direction: PortDirection, name: impl Into<String>) -> Self {
        Self {
            node,
            direction,
            name: name.into(),
            occurrence: 0,
        }
    }

    /// Reference an output port
    pub fn output(node: NodeId, name: impl Into<String>) -> Self {
        Self::new(node, PortDirection::Output, name)
    }

    /// Reference an input port
    pub fn input(node: NodeId, name: impl Into<String>) -> Self {
        Self::new(node, PortDirection::Input, name)
    }

    /// Select the n-th declaration of a duplicated name
    pub fn nth(mut self, occurrence: usize) -> Self {
        self.occurrence = occurrence;
        self
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.direction, self.node, self.name)?;
        if self.occurrence > 0 {
            write!(f, "#{}", self.occurrence)?;
        }
        Ok(())
    }
}
