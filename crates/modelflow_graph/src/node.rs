// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the model graph.

use crate::ordering::RankResult;
use crate::port::Ports;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Data describing a model, as produced by ingestion.
///
/// Used both to create a node and to replace a node's contents on reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    /// Display name, usually the source file name
    pub label: String,
    /// Declared ports
    pub ports: Ports,
    /// Error from the most recent load attempt
    pub load_error: Option<String>,
}

impl NodeData {
    /// An empty placeholder with no ports
    pub fn placeholder(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ports: Ports::default(),
            load_error: None,
        }
    }

    /// A successfully loaded model
    pub fn loaded(label: impl Into<String>, inputs: Vec<String>, outputs: Vec<String>) -> Self {
        Self {
            label: label.into(),
            ports: Ports::new(inputs, outputs),
            load_error: None,
        }
    }

    /// A model whose load failed
    pub fn failed(label: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ports: Ports::default(),
            load_error: Some(error.into()),
        }
    }
}

/// A model instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Display name
    pub label: String,
    /// Declared ports
    pub ports: Ports,
    /// Error from the most recent load attempt
    pub load_error: Option<String>,
    pub(crate) rank: RankResult,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            id: NodeId::new(),
            label: data.label,
            ports: data.ports,
            load_error: data.load_error,
            rank: RankResult::Ranked(0),
        }
    }

    /// Ordered input names
    pub fn inputs(&self) -> &[String] {
        self.ports.inputs()
    }

    /// Ordered output names
    pub fn outputs(&self) -> &[String] {
        self.ports.outputs()
    }

    /// Whether the last load attempt failed
    pub fn is_degraded(&self) -> bool {
        self.load_error.is_some()
    }

    /// Execution rank as of the last mutation
    pub fn rank(&self) -> RankResult {
        self.rank
    }
}
