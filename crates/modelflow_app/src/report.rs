// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rendering the session for the console.

use crate::session::Session;
use modelflow_graph::{compute_ranks, execution_layers, EdgeId, NodeId, NodeView, PortRef, RankResult};
use serde::Serialize;
use std::fmt::Write;

/// First eight characters of an edge id, enough to address it
pub fn short_id(id: EdgeId) -> String {
    id.to_string().chars().take(8).collect()
}

fn badge(session: &Session, view: &NodeView) -> String {
    if session.is_loading(view.id) {
        return "loading".to_string();
    }
    match view.rank {
        RankResult::Ranked(n) => format!("rank {n}"),
        other => other.to_string(),
    }
}

fn port_label(session: &Session, port: &PortRef) -> String {
    let handle = session
        .handle_of(port.node)
        .map_or_else(|| "?".to_string(), |h| h.to_string());
    if port.occurrence > 0 {
        format!("#{handle}.{}#{}", port.name, port.occurrence)
    } else {
        format!("#{handle}.{}", port.name)
    }
}

/// One line announcing a finished ingestion, or `None` if the node is gone
pub fn loaded_message(session: &Session, node_id: NodeId) -> Option<String> {
    let handle = session.handle_of(node_id)?;
    let node = session.store().graph().node(node_id)?;
    let line = match &node.load_error {
        Some(error) => format!("#{handle} {} failed: {error}", node.label),
        None if node.rank().is_ranked() => format!("#{handle} {} loaded (rank {})", node.label, node.rank()),
        None => format!("#{handle} {} loaded ({})", node.label, node.rank()),
    };
    Some(line)
}

/// Node table followed by the wire list
pub fn table(session: &Session) -> String {
    let mut out = String::new();
    let graph = session.store().graph();
    if graph.node_count() == 0 {
        return "no models loaded".to_string();
    }

    for (handle, node_id) in session.handles() {
        let Some(node) = graph.node(node_id) else {
            continue;
        };
        let view = NodeView::from(node);
        let _ = writeln!(out, "#{handle:<3} {:<28} {}", view.label, badge(session, &view));
        if let Some(error) = &view.error {
            let _ = writeln!(out, "     error:   {error}");
        }
        let _ = writeln!(out, "     inputs:  {}", view.inputs.join(", "));
        let _ = writeln!(out, "     outputs: {}", view.outputs.join(", "));
    }

    if graph.edge_count() > 0 {
        let _ = writeln!(out, "wires:");
        for edge in graph.edges() {
            let _ = writeln!(
                out,
                "  {}  {} -> {}",
                short_id(edge.id),
                port_label(session, &edge.source),
                port_label(session, &edge.target)
            );
        }
    }
    out.trim_end().to_string()
}

/// Execution layers, then anything that cannot be scheduled
pub fn layers(session: &Session) -> String {
    let graph = session.store().graph();
    let ranks = compute_ranks(graph);
    let name = |id: NodeId| {
        let label = graph.node(id).map(|n| n.label.as_str()).unwrap_or("?");
        match session.handle_of(id) {
            Some(h) => format!("#{h} {label}"),
            None => label.to_string(),
        }
    };

    let mut out = String::new();
    for (k, layer) in execution_layers(&ranks).iter().enumerate() {
        let names: Vec<String> = layer.iter().map(|&id| name(id)).collect();
        let _ = writeln!(out, "layer {k}: {}", names.join(", "));
    }
    let blocked: Vec<String> = graph
        .nodes()
        .filter(|n| !n.rank().is_ranked())
        .map(|n| format!("{} ({})", name(n.id), n.rank()))
        .collect();
    if !blocked.is_empty() {
        let _ = writeln!(out, "not schedulable: {}", blocked.join(", "));
    }
    if out.is_empty() {
        return "no models loaded".to_string();
    }
    out.trim_end().to_string()
}

#[derive(Serialize)]
struct NodeReport {
    handle: Option<u32>,
    loading: bool,
    #[serde(flatten)]
    view: NodeView,
}

#[derive(Serialize)]
struct EdgeReport {
    id: EdgeId,
    source: PortRef,
    target: PortRef,
}

#[derive(Serialize)]
struct GraphReport {
    nodes: Vec<NodeReport>,
    edges: Vec<EdgeReport>,
}

/// The presentation data as pretty JSON
pub fn json(session: &Session) -> Result<String, serde_json::Error> {
    let graph = session.store().graph();
    let report = GraphReport {
        nodes: session
            .store()
            .views()
            .into_iter()
            .map(|view| NodeReport {
                handle: session.handle_of(view.id),
                loading: session.is_loading(view.id),
                view,
            })
            .collect(),
        edges: graph
            .edges()
            .map(|e| EdgeReport {
                id: e.id,
                source: e.source.clone(),
                target: e.target.clone(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;

    fn sample() -> Session {
        let mut session = Session::new(SessionConfig::default());
        session.add_placeholder("a");
        session.add_placeholder("b");
        session
    }

    #[test]
    fn test_empty_session() {
        let session = Session::new(SessionConfig::default());
        assert_eq!(table(&session), "no models loaded");
        assert_eq!(layers(&session), "no models loaded");
    }

    #[test]
    fn test_table_lists_handles_and_ranks() {
        let session = sample();
        let text = table(&session);
        assert!(text.contains("#1"));
        assert!(text.contains("#2"));
        assert!(text.contains("rank 0"));
        assert!(!text.contains("wires:"));
    }

    #[test]
    fn test_layers_group_independent_models() {
        let session = sample();
        assert_eq!(layers(&session), "layer 0: #1 a, #2 b");
    }

    #[test]
    fn test_loaded_message() {
        let mut session = sample();
        let a = session.node_of(1).unwrap();
        assert_eq!(loaded_message(&session, a).as_deref(), Some("#1 a loaded (rank 0)"));

        let b = session.node_of(2).unwrap();
        session.remove(2).unwrap();
        assert_eq!(loaded_message(&session, b), None);
    }

    #[tokio::test]
    async fn test_loaded_message_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.xlsx");
        std::fs::write(&broken, b"not a workbook").unwrap();

        let mut session = Session::new(SessionConfig::default());
        let handle = session.load(&broken);
        session.wait_idle().await;

        let message = loaded_message(&session, session.node_of(handle).unwrap()).unwrap();
        assert!(
            message.starts_with("#1 broken.xlsx failed: Could not parse file: "),
            "{message}"
        );
    }

    #[test]
    fn test_json_shape() {
        let session = sample();
        let value: serde_json::Value = serde_json::from_str(&json(&session).unwrap()).unwrap();
        let nodes = value["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0]["handle"], 1);
        assert_eq!(nodes[0]["label"], "a");
        assert_eq!(nodes[0]["rank"]["ranked"], 0);
        assert_eq!(nodes[0]["loading"], false);
        assert!(value["edges"].as_array().unwrap().is_empty());
    }
}
