// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interactive session state.
//!
//! The session owns the graph store and is its only writer. Spreadsheet
//! ingestion runs on blocking worker threads; finished results come back over
//! a channel and are applied on the session's own task, so the store never
//! sees concurrent mutation.

use crate::commands::{Command, Endpoint, HELP};
use crate::config::SessionConfig;
use crate::report;
use modelflow_graph::{EdgeId, GraphStore, NodeData, NodeId, PortDirection, PortRef, ValidationFailure};
use modelflow_ingest::{ingest_path, IngestResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;

/// A finished ingestion for a node
#[derive(Debug)]
pub struct Loaded {
    /// Node the file was loaded for
    pub node: NodeId,
    /// Request number; only the latest request for a node is applied
    pub generation: u64,
    /// Ingestion outcome
    pub result: IngestResult,
}

/// Errors executing a console command
#[derive(Debug, Error)]
pub enum SessionError {
    /// No model has this handle
    #[error("no model #{0}")]
    UnknownHandle(u32),

    /// No wire id starts with this prefix
    #[error("no wire matches `{0}`")]
    UnknownEdge(String),

    /// Several wire ids start with this prefix
    #[error("`{0}` matches more than one wire")]
    AmbiguousEdge(String),

    /// The graph refused the wire
    #[error(transparent)]
    Rejected(#[from] ValidationFailure),

    /// The report could not be serialized
    #[error("failed to serialize graph: {0}")]
    Json(#[from] serde_json::Error),
}

/// What the console should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print this text and keep going
    Message(String),
    /// Nothing to print
    Silent,
    /// Leave the session
    Quit,
}

/// An interactive wiring session
pub struct Session {
    store: GraphStore,
    config: SessionConfig,
    /// Console handles, in creation order
    handles: BTreeMap<u32, NodeId>,
    next_handle: u32,
    /// File each node was last loaded from
    sources: HashMap<NodeId, PathBuf>,
    /// Latest ingestion requested for each node still waiting on one
    loading: HashMap<NodeId, u64>,
    next_generation: u64,
    result_tx: mpsc::UnboundedSender<Loaded>,
    result_rx: mpsc::UnboundedReceiver<Loaded>,
}

impl Session {
    /// Create an empty session
    pub fn new(config: SessionConfig) -> Self {
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        Self {
            store: GraphStore::new(),
            config,
            handles: BTreeMap::new(),
            next_handle: 1,
            sources: HashMap::new(),
            loading: HashMap::new(),
            next_generation: 0,
            result_tx,
            result_rx,
        }
    }

    /// The graph store
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Console handles and their nodes, in creation order
    pub fn handles(&self) -> impl Iterator<Item = (u32, NodeId)> + '_ {
        self.handles.iter().map(|(&h, &id)| (h, id))
    }

    /// Handle of a node, if it is still in the session
    pub fn handle_of(&self, node_id: NodeId) -> Option<u32> {
        self.handles.iter().find(|(_, &id)| id == node_id).map(|(&h, _)| h)
    }

    /// Node behind a handle
    pub fn node_of(&self, handle: u32) -> Result<NodeId, SessionError> {
        self.handles
            .get(&handle)
            .copied()
            .ok_or(SessionError::UnknownHandle(handle))
    }

    /// Whether a node is waiting on ingestion
    pub fn is_loading(&self, node_id: NodeId) -> bool {
        self.loading.contains_key(&node_id)
    }

    /// Number of ingestions in flight
    pub fn pending(&self) -> usize {
        self.loading.len()
    }

    /// Files currently backing nodes
    pub fn source_paths(&self) -> impl Iterator<Item = &Path> {
        self.sources.values().map(PathBuf::as_path)
    }

    fn register(&mut self, node_id: NodeId) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(handle, node_id);
        handle
    }

    /// Add an empty model
    pub fn add_placeholder(&mut self, label: impl Into<String>) -> u32 {
        let node_id = self.store.add_node(NodeData::placeholder(label));
        self.register(node_id)
    }

    /// Add a model for a file; its ports arrive once ingestion finishes
    pub fn load(&mut self, path: &Path) -> u32 {
        let path = canonical(path);
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let node_id = self.store.add_node(NodeData::placeholder(label));
        let handle = self.register(node_id);
        tracing::info!("Loading #{handle} from {}", path.display());
        self.spawn_ingest(node_id, path);
        handle
    }

    /// Replace a model's contents from a (possibly different) file
    pub fn reload(&mut self, handle: u32, path: &Path) -> Result<(), SessionError> {
        let node_id = self.node_of(handle)?;
        tracing::info!("Reloading #{handle} from {}", path.display());
        self.spawn_ingest(node_id, canonical(path));
        Ok(())
    }

    /// Re-ingest every node loaded from `path`; returns how many were queued
    pub fn reload_changed(&mut self, path: &Path) -> usize {
        let path = canonical(path);
        let nodes: Vec<NodeId> = self
            .sources
            .iter()
            .filter(|(_, source)| **source == path)
            .map(|(&node, _)| node)
            .collect();
        for &node_id in &nodes {
            tracing::info!("{} changed, reloading", path.display());
            self.spawn_ingest(node_id, path.clone());
        }
        nodes.len()
    }

    fn spawn_ingest(&mut self, node_id: NodeId, path: PathBuf) {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.sources.insert(node_id, path.clone());
        self.loading.insert(node_id, generation);
        let tx = self.result_tx.clone();
        tokio::task::spawn_blocking(move || {
            let result = ingest_path(&path);
            // The session may already be gone; nothing to do then
            let _ = tx.send(Loaded {
                node: node_id,
                generation,
                result,
            });
        });
    }

    /// Wait for the next finished ingestion
    pub async fn next_loaded(&mut self) -> Option<Loaded> {
        self.result_rx.recv().await
    }

    /// Apply a finished ingestion to the graph.
    ///
    /// Results superseded by a later request, and results for nodes removed
    /// in the meantime, are dropped. A failed load keeps the node's previous
    /// ports.
    pub fn apply(&mut self, loaded: Loaded) {
        let Loaded {
            node,
            generation,
            result,
        } = loaded;
        if self.loading.get(&node) != Some(&generation) {
            tracing::debug!(%node, generation, "dropping superseded ingestion result");
            return;
        }
        self.loading.remove(&node);
        let Some(current) = self.store.graph().node(node) else {
            tracing::debug!(%node, "dropping ingestion result for removed node");
            return;
        };

        match result.error {
            None => {
                self.store.replace_node_data(
                    node,
                    NodeData::loaded(result.filename, result.inputs, result.outputs),
                );
                if self.config.auto_wire {
                    self.auto_wire(node);
                }
            }
            Some(error) => {
                let inputs = current.inputs().to_vec();
                let outputs = current.outputs().to_vec();
                tracing::warn!("{}: {error}", result.filename);
                self.store.rename_node(node, result.filename);
                self.store.update_node_data(node, inputs, outputs, Some(error));
            }
        }
    }

    /// Apply results until no ingestion is in flight
    pub async fn wait_idle(&mut self) {
        while !self.loading.is_empty() {
            match self.result_rx.recv().await {
                Some(loaded) => self.apply(loaded),
                None => break,
            }
        }
    }

    fn auto_wire(&mut self, node: NodeId) {
        let others: Vec<NodeId> = self.store.graph().node_ids().filter(|&id| id != node).collect();
        let wired: usize = others
            .into_iter()
            .map(|other| {
                self.store.connect_matching(other, node).len()
                    + self.store.connect_matching(node, other).len()
            })
            .sum();
        if wired > 0 {
            tracing::info!("Auto-wired {wired} input(s)");
        }
    }

    /// Remove a model and its wires
    pub fn remove(&mut self, handle: u32) -> Result<(), SessionError> {
        let node_id = self.node_of(handle)?;
        self.handles.remove(&handle);
        self.sources.remove(&node_id);
        self.store.remove_node(node_id);
        Ok(())
    }

    fn port(&self, endpoint: &Endpoint, direction: PortDirection) -> Result<PortRef, SessionError> {
        let node = self.node_of(endpoint.handle)?;
        Ok(PortRef::new(node, direction, endpoint.name.clone()).nth(endpoint.occurrence))
    }

    /// Wire an output to an input
    pub fn connect(&mut self, source: &Endpoint, target: &Endpoint) -> Result<EdgeId, SessionError> {
        let source = self.port(source, PortDirection::Output)?;
        let target = self.port(target, PortDirection::Input)?;
        Ok(self.store.add_edge(source, target)?)
    }

    /// Remove the wire whose id starts with `prefix`
    pub fn disconnect(&mut self, prefix: &str) -> Result<EdgeId, SessionError> {
        let matches: Vec<EdgeId> = self
            .store
            .graph()
            .edges()
            .map(|e| e.id)
            .filter(|id| id.to_string().starts_with(prefix))
            .collect();
        match matches.as_slice() {
            [] => Err(SessionError::UnknownEdge(prefix.to_string())),
            [id] => {
                self.store.remove_edge(*id);
                Ok(*id)
            }
            _ => Err(SessionError::AmbiguousEdge(prefix.to_string())),
        }
    }

    /// Wire same-named outputs of one model into another
    pub fn wire(&mut self, source: u32, target: u32) -> Result<Vec<EdgeId>, SessionError> {
        let source = self.node_of(source)?;
        let target = self.node_of(target)?;
        Ok(self.store.connect_matching(source, target))
    }

    /// Clear a model's load error
    pub fn clear_error(&mut self, handle: u32) -> Result<(), SessionError> {
        let node_id = self.node_of(handle)?;
        self.store.clear_load_error(node_id);
        Ok(())
    }

    /// Run one console command
    pub async fn execute(&mut self, command: Command) -> Result<Reply, SessionError> {
        let reply = match command {
            Command::Load(path) => {
                let handle = self.load(&path);
                Reply::Message(format!("#{handle} loading {}", path.display()))
            }
            Command::Reload(handle, path) => {
                self.reload(handle, &path)?;
                Reply::Message(format!("#{handle} reloading {}", path.display()))
            }
            Command::Placeholder(label) => {
                let handle = self.add_placeholder(label);
                Reply::Message(format!("#{handle} created"))
            }
            Command::Remove(handle) => {
                self.remove(handle)?;
                Reply::Message(format!("#{handle} removed"))
            }
            Command::Connect { source, target } => {
                let id = self.connect(&source, &target)?;
                Reply::Message(format!("wired {}", report::short_id(id)))
            }
            Command::Disconnect(prefix) => {
                let id = self.disconnect(&prefix)?;
                Reply::Message(format!("removed {}", report::short_id(id)))
            }
            Command::Wire(source, target) => {
                let edges = self.wire(source, target)?;
                Reply::Message(format!("wired {} variable(s)", edges.len()))
            }
            Command::Clear(handle) => {
                self.clear_error(handle)?;
                Reply::Message(format!("#{handle} error cleared"))
            }
            Command::Wait => {
                self.wait_idle().await;
                Reply::Silent
            }
            Command::Show => Reply::Message(report::table(self)),
            Command::Layers => Reply::Message(report::layers(self)),
            Command::Json => Reply::Message(report::json(self)?),
            Command::Help => Reply::Message(HELP.to_string()),
            Command::Quit => Reply::Quit,
        };
        Ok(reply)
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
