// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end wiring scenarios against the public store API.

use modelflow_graph::{
    GraphStore, NodeData, NodeId, PortRef, RankResult, Unorderable, ValidationFailure,
};

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// A(outputs: x) -> B(inputs: x, outputs: y)
fn chain() -> (GraphStore, NodeId, NodeId) {
    let mut store = GraphStore::new();
    let a = store.add_node(NodeData::loaded("A.xlsx", vec![], names(&["x"])));
    let b = store.add_node(NodeData::loaded("B.xlsx", names(&["x"]), names(&["y"])));
    store
        .add_edge(PortRef::output(a, "x"), PortRef::input(b, "x"))
        .expect("valid edge");
    (store, a, b)
}

#[test]
fn chain_ranks_in_order() {
    let (store, a, b) = chain();
    assert_eq!(store.rank(a), Some(RankResult::Ranked(0)));
    assert_eq!(store.rank(b), Some(RankResult::Ranked(1)));
}

#[test]
fn closing_a_cycle_makes_both_unorderable() {
    let (mut store, a, b) = chain();
    // A has no input "x" yet; give it one so the back edge is admissible
    store.update_node_data(a, names(&["x"]), names(&["x"]), None);
    store
        .add_edge(PortRef::output(b, "y"), PortRef::input(a, "x"))
        .expect("valid edge");

    let cyclic = Some(RankResult::Unorderable(Unorderable::Cyclic));
    assert_eq!(store.rank(a), cyclic);
    assert_eq!(store.rank(b), cyclic);
}

#[test]
fn graph_stays_usable_while_cyclic() {
    let mut store = GraphStore::new();
    let a = store.add_node(NodeData::loaded("A", names(&["y"]), names(&["x"])));
    let b = store.add_node(NodeData::loaded("B", names(&["x"]), names(&["y"])));
    store.add_edge(PortRef::output(a, "x"), PortRef::input(b, "x")).unwrap();
    let back = store.add_edge(PortRef::output(b, "y"), PortRef::input(a, "y")).unwrap();
    assert_eq!(store.rank(a), Some(RankResult::Unorderable(Unorderable::Cyclic)));

    store.remove_edge(back);
    assert_eq!(store.rank(a), Some(RankResult::Ranked(0)));
    assert_eq!(store.rank(b), Some(RankResult::Ranked(1)));
}

#[test]
fn downstream_of_cycle_is_cyclic_but_unrelated_nodes_rank() {
    let mut store = GraphStore::new();
    let a = store.add_node(NodeData::loaded("A", names(&["y"]), names(&["x"])));
    let b = store.add_node(NodeData::loaded("B", names(&["x"]), names(&["y"])));
    let c = store.add_node(NodeData::loaded("C", names(&["y"]), vec![]));
    let d = store.add_node(NodeData::loaded("D", vec![], names(&["q"])));
    store.add_edge(PortRef::output(a, "x"), PortRef::input(b, "x")).unwrap();
    store.add_edge(PortRef::output(b, "y"), PortRef::input(a, "y")).unwrap();
    store.add_edge(PortRef::output(b, "y"), PortRef::input(c, "y")).unwrap();

    assert_eq!(store.rank(c), Some(RankResult::Unorderable(Unorderable::Cyclic)));
    assert_eq!(store.rank(d), Some(RankResult::Ranked(0)));
}

#[test]
fn unknown_output_port_is_rejected() {
    let (mut store, a, b) = chain();
    let before = store.snapshot();

    let missing = PortRef::output(a, "not_there");
    let result = store.add_edge(missing.clone(), PortRef::input(b, "x"));
    assert_eq!(result, Err(ValidationFailure::PortNotFound(missing)));

    let after = store.snapshot();
    assert_eq!(after.edge_count(), before.edge_count());
    let before_edges: Vec<_> = before.edges().cloned().collect();
    let after_edges: Vec<_> = after.edges().cloned().collect();
    assert_eq!(before_edges, after_edges);
}

#[test]
fn reconnecting_an_input_replaces_the_old_edge() {
    let mut store = GraphStore::new();
    let a = store.add_node(NodeData::loaded("A", vec![], names(&["x"])));
    let c = store.add_node(NodeData::loaded("C", vec![], names(&["x"])));
    let b = store.add_node(NodeData::loaded("B", names(&["x"]), vec![]));

    let first = store.add_edge(PortRef::output(a, "x"), PortRef::input(b, "x")).unwrap();
    let second = store.add_edge(PortRef::output(c, "x"), PortRef::input(b, "x")).unwrap();

    assert!(store.graph().edge(first).is_none());
    let edge = store.graph().edge(second).expect("new edge present");
    assert_eq!(edge.source.node, c);
    assert_eq!(store.graph().edge_count(), 1);
}

#[test]
fn outputs_fan_out() {
    let mut store = GraphStore::new();
    let a = store.add_node(NodeData::loaded("A", vec![], names(&["x"])));
    let b = store.add_node(NodeData::loaded("B", names(&["x"]), vec![]));
    let c = store.add_node(NodeData::loaded("C", names(&["x"]), vec![]));
    store.add_edge(PortRef::output(a, "x"), PortRef::input(b, "x")).unwrap();
    store.add_edge(PortRef::output(a, "x"), PortRef::input(c, "x")).unwrap();

    assert_eq!(store.graph().edge_count(), 2);
    assert_eq!(store.rank(b), Some(RankResult::Ranked(1)));
    assert_eq!(store.rank(c), Some(RankResult::Ranked(1)));
}

#[test]
fn late_update_for_removed_node_is_ignored() {
    let (mut store, a, b) = chain();
    store.remove_node(a);
    store.update_node_data(a, vec![], names(&["x"]), None);

    assert!(store.graph().node(a).is_none());
    assert_eq!(store.graph().node_count(), 1);
    assert_eq!(store.rank(b), Some(RankResult::Ranked(0)));
}

#[test]
fn snapshot_is_detached_from_later_mutations() {
    let (mut store, a, _) = chain();
    let snapshot = store.snapshot();
    store.remove_node(a);

    assert_eq!(snapshot.node_count(), 2);
    assert_eq!(snapshot.edge_count(), 1);
    assert_eq!(store.graph().node_count(), 1);
}

#[test]
fn snapshot_can_be_ranked_on_another_thread() {
    let (store, a, b) = chain();
    let snapshot = store.snapshot();
    let ranks = std::thread::spawn(move || modelflow_graph::compute_ranks(&snapshot))
        .join()
        .expect("ranking thread");
    assert_eq!(ranks[&a], RankResult::Ranked(0));
    assert_eq!(ranks[&b], RankResult::Ranked(1));
}
