//! Unit tests for `PartialState`.

use std::collections::HashSet;

use rail_core::{EdgeId, TrainId, TtdId, VertexId};

use crate::PartialState;

#[test]
fn empty_state_has_empty_arrays() {
    let s = PartialState::empty(2, 3, 4);
    assert!(s.train_edges(TrainId(0)).is_empty());
    assert!(s.ttd_order(TtdId(0)).is_empty());
    assert!(s.vertex_order(VertexId(0)).is_empty());
    assert!(s.stop_positions(TrainId(1)).is_empty());
}

#[test]
fn push_edge_does_not_mutate_original() {
    let s0 = PartialState::empty(1, 1, 1);
    let s1 = s0.push_edge(TrainId(0), EdgeId(7));

    assert!(s0.train_edges(TrainId(0)).is_empty(), "original state must stay untouched");
    assert_eq!(s1.train_edges(TrainId(0)), &[EdgeId(7)]);
}

#[test]
fn push_edge_appends_in_order() {
    let s = PartialState::empty(1, 1, 1)
        .push_edge(TrainId(0), EdgeId(1))
        .push_edge(TrainId(0), EdgeId(2))
        .push_edge(TrainId(0), EdgeId(3));
    assert_eq!(s.train_edges(TrainId(0)), &[EdgeId(1), EdgeId(2), EdgeId(3)]);
}

#[test]
fn pop_last_edge_removes_the_tail() {
    let s = PartialState::empty(1, 1, 1)
        .push_edge(TrainId(0), EdgeId(1))
        .push_edge(TrainId(0), EdgeId(2));
    let popped = s.pop_last_edge(TrainId(0));
    assert_eq!(popped.train_edges(TrainId(0)), &[EdgeId(1)]);
    assert_eq!(s.train_edges(TrainId(0)), &[EdgeId(1), EdgeId(2)], "pop must not mutate the source state");
}

#[test]
fn pop_last_edge_on_empty_is_a_noop() {
    let s = PartialState::empty(1, 1, 1);
    let popped = s.pop_last_edge(TrainId(0));
    assert!(popped.train_edges(TrainId(0)).is_empty());
}

#[test]
fn commit_stop_accumulates_strictly_increasing_positions() {
    let s = PartialState::empty(1, 0, 0)
        .commit_stop(TrainId(0), 100.0)
        .commit_stop(TrainId(0), 250.5);
    assert_eq!(s.stop_positions(TrainId(0)), &[100.0, 250.5]);
}

#[test]
#[should_panic(expected = "strictly increasing")]
fn commit_stop_rejects_non_increasing_position() {
    PartialState::empty(1, 0, 0).commit_stop(TrainId(0), 100.0).commit_stop(TrainId(0), 50.0);
}

#[test]
fn insert_ttd_order_and_vertex_order_append_independently_per_key() {
    let s = PartialState::empty(2, 2, 2)
        .insert_ttd_order(TtdId(0), TrainId(1))
        .insert_ttd_order(TtdId(0), TrainId(0))
        .insert_vertex_order(VertexId(1), TrainId(0));

    assert_eq!(s.ttd_order(TtdId(0)), &[TrainId(1), TrainId(0)]);
    assert!(s.ttd_order(TtdId(1)).is_empty());
    assert_eq!(s.vertex_order(VertexId(1)), &[TrainId(0)]);
    assert!(s.vertex_order(VertexId(0)).is_empty());
}

#[test]
fn unrelated_trains_share_storage_until_one_is_updated() {
    // Updating train 0's edges must not disturb train 1's (empty) array.
    let s = PartialState::empty(2, 1, 1).push_edge(TrainId(0), EdgeId(5));
    assert!(s.train_edges(TrainId(1)).is_empty());
}

#[test]
fn equal_states_compare_equal_and_hash_equal() {
    let a = PartialState::empty(1, 1, 1)
        .push_edge(TrainId(0), EdgeId(1))
        .commit_stop(TrainId(0), 42.0);
    let b = PartialState::empty(1, 1, 1)
        .push_edge(TrainId(0), EdgeId(1))
        .commit_stop(TrainId(0), 42.0);
    assert_eq!(a, b);

    fn hash_of(s: &PartialState) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut h = std::collections::hash_map::DefaultHasher::new();
        s.hash(&mut h);
        h.finish()
    }
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn states_differing_only_in_order_are_not_equal() {
    let a = PartialState::empty(2, 1, 0).insert_ttd_order(TtdId(0), TrainId(0)).insert_ttd_order(TtdId(0), TrainId(1));
    let b = PartialState::empty(2, 1, 0).insert_ttd_order(TtdId(0), TrainId(1)).insert_ttd_order(TtdId(0), TrainId(0));
    assert_ne!(a, b, "TTD order is first-come-first-served — order matters");
}

#[test]
fn distinct_states_are_usable_as_hash_set_keys() {
    let mut seen = HashSet::new();
    let base = PartialState::empty(1, 0, 0);
    seen.insert(base.clone());
    seen.insert(base.commit_stop(TrainId(0), 1.0));
    seen.insert(base.commit_stop(TrainId(0), 2.0));
    assert_eq!(seen.len(), 3);
}
