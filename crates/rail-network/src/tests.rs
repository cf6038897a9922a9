//! Unit tests for `rail-network`.

use crate::{RailNetworkBuilder, VertexKind};

fn single_edge_network() -> crate::RailNetwork {
    let mut b = RailNetworkBuilder::new();
    b.add_vertex("v0", VertexKind::TtdBorder, None);
    b.add_vertex("v1", VertexKind::TtdBorder, Some(30));
    b.add_edge("v0", "v1", 5000.0, 50.0, false, 0.0, 0.0);
    b.build().unwrap()
}

#[test]
fn build_single_edge() {
    let net = single_edge_network();
    assert_eq!(net.vertex_count(), 2);
    assert_eq!(net.edge_count(), 1);
}

#[test]
fn out_edges_and_reverse_edge() {
    let net = single_edge_network();
    let v0 = net.vertex_by_name("v0").unwrap();
    assert_eq!(net.out_edges(v0).len(), 1);
    let e = net.out_edges(v0)[0];
    assert!(net.reverse_edge(e).is_none());
}

#[test]
fn rejects_breakable_edge_without_block_length() {
    let mut b = RailNetworkBuilder::new();
    b.add_vertex("a", VertexKind::TtdBorder, None);
    b.add_vertex("b", VertexKind::TtdBorder, None);
    b.add_edge("a", "b", 100.0, 10.0, true, 0.0, 0.0);
    assert!(b.build().is_err());
}

#[test]
fn rejects_nonborder_vertex_with_too_many_neighbors() {
    let mut b = RailNetworkBuilder::new();
    b.add_vertex("hub", VertexKind::NonBorder, None);
    b.add_vertex("a", VertexKind::TtdBorder, None);
    b.add_vertex("b", VertexKind::TtdBorder, None);
    b.add_vertex("c", VertexKind::TtdBorder, None);
    b.add_edge("a", "hub", 10.0, 10.0, false, 0.0, 0.0);
    b.add_edge("hub", "b", 10.0, 10.0, false, 0.0, 0.0);
    b.add_edge("hub", "c", 10.0, 10.0, false, 0.0, 0.0);
    assert!(b.build().is_err());
}

#[test]
fn rejects_edge_to_unknown_vertex() {
    let mut b = RailNetworkBuilder::new();
    b.add_vertex("a", VertexKind::TtdBorder, None);
    b.add_edge("a", "ghost", 10.0, 10.0, false, 0.0, 0.0);
    assert!(b.build().is_err());
}

#[test]
fn rejects_mismatched_reverse_edges() {
    let mut b = RailNetworkBuilder::new();
    b.add_vertex("a", VertexKind::TtdBorder, None);
    b.add_vertex("b", VertexKind::TtdBorder, None);
    b.add_edge("a", "b", 100.0, 10.0, false, 0.0, 0.0);
    b.add_edge("b", "a", 90.0, 10.0, false, 0.0, 0.0);
    assert!(b.build().is_err());
}

#[test]
fn shortest_path_finds_direct_route() {
    let mut b = RailNetworkBuilder::new();
    b.add_vertex("v0", VertexKind::TtdBorder, None);
    b.add_vertex("v1", VertexKind::NonBorder, None);
    b.add_vertex("v2", VertexKind::TtdBorder, None);
    b.add_edge("v0", "v1", 1000.0, 20.0, false, 0.0, 0.0);
    b.add_edge("v1", "v2", 1000.0, 20.0, false, 0.0, 0.0);
    b.add_successor(("v0", "v1"), ("v1", "v2"));
    let net = b.build().unwrap();

    let v0 = net.vertex_by_name("v0").unwrap();
    let v2 = net.vertex_by_name("v2").unwrap();
    let first = net.out_edges(v0)[0];
    let path = net.shortest_path(first, v2, 20.0).unwrap();
    assert_eq!(path.edges.len(), 2);
    assert!((path.length_m - 2000.0).abs() < 1e-9);
}

#[test]
fn unbreakable_sections_partition_by_ttd_border() {
    let mut b = RailNetworkBuilder::new();
    b.add_vertex("v0", VertexKind::TtdBorder, None);
    b.add_vertex("v1", VertexKind::NonBorder, None);
    b.add_vertex("v2", VertexKind::TtdBorder, None);
    b.add_edge("v0", "v1", 500.0, 20.0, false, 0.0, 0.0);
    b.add_edge("v1", "v2", 500.0, 20.0, false, 0.0, 0.0);
    let net = b.build().unwrap();
    let sections = net.unbreakable_sections();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].edges.len(), 2);
}

#[test]
fn all_paths_of_length_stops_at_target_length() {
    let mut b = RailNetworkBuilder::new();
    b.add_vertex("v0", VertexKind::TtdBorder, None);
    b.add_vertex("v1", VertexKind::NonBorder, None);
    b.add_vertex("v2", VertexKind::TtdBorder, None);
    b.add_edge("v0", "v1", 300.0, 20.0, false, 0.0, 0.0);
    b.add_edge("v1", "v2", 300.0, 20.0, false, 0.0, 0.0);
    b.add_successor(("v0", "v1"), ("v1", "v2"));
    let net = b.build().unwrap();
    let v0 = net.vertex_by_name("v0").unwrap();
    let paths = net.all_paths_of_length_starting_in_vertex(v0, 500.0, &[]);
    assert!(paths.iter().any(|p| p.length_m >= 500.0));
}
