// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dependency graph and execution ordering for spreadsheet models.
//!
//! Each node is a model loaded from a spreadsheet, exposing named input and
//! output variables. Edges wire one model's output to another model's input,
//! and the order engine assigns every node an execution layer.
//!
//! ## Architecture
//!
//! - [`port`]: per-node registry of variable names
//! - [`store`]: the single owner of nodes and edges; recomputes ranks after every mutation
//! - [`validation`]: decides whether a proposed edge is admissible
//! - [`ordering`]: layered topological ranking with cycle and error detection
//! - [`matching`]: same-name wiring suggestions

pub mod connection;
pub mod graph;
pub mod matching;
pub mod node;
pub mod ordering;
pub mod port;
pub mod store;
pub mod validation;

pub use connection::{Edge, EdgeId};
pub use graph::Graph;
pub use matching::suggest_connections;
pub use node::{Node, NodeData, NodeId};
pub use ordering::{compute_ranks, execution_layers, RankResult, Unorderable};
pub use port::{PortDirection, PortRef, Ports};
pub use store::{GraphStore, NodeView};
pub use validation::{validate, ValidationFailure};
