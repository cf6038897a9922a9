//! `PartialState` — the solver's structurally-equal, persistently-updated
//! value type (spec.md §4.5).
//!
//! # Design
//!
//! Each of the four arrays is a `Vec<Rc<Vec<_>>>`, indexed by `TrainId`,
//! `TtdId`, or `VertexId` respectively. A mutation method clones the whole
//! outer `PartialState` (cheap: it's four `Vec`s of `Rc` pointers) and then
//! replaces exactly one inner `Rc<Vec<_>>` with a freshly grown copy,
//! leaving every other train/section/vertex's array shared by reference
//! with the state it was derived from. This gives the "every update
//! produces a new state, nothing already in the closed set is ever
//! mutated" value semantics spec.md §4.5 and §2.5 require, without paying
//! to deep-clone state that did not change.
//!
//! `PartialState` mirrors the "validate once, expose plain fields" SoA
//! shape of `rail-state`'s own teacher type, `dt-agent::AgentStore`, but
//! drops `AgentStore`'s type-erased `ComponentMap` — a partial-state has a
//! small, fixed set of arrays known at compile time, so there is nothing to
//! register.

use std::rc::Rc;

use rail_core::{EdgeId, TrainId, TtdId, VertexId};

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartialState {
    train_edges: Vec<Rc<Vec<EdgeId>>>,
    ttd_order: Vec<Rc<Vec<TrainId>>>,
    vertex_order: Vec<Rc<Vec<TrainId>>>,
    stop_positions: Vec<Rc<Vec<f64>>>,
}

impl PartialState {
    /// An empty state: no train has committed any edge, order, or stop.
    pub fn empty(num_trains: usize, num_ttd: usize, num_vertices: usize) -> Self {
        Self {
            train_edges: vec![Rc::new(Vec::new()); num_trains],
            ttd_order: vec![Rc::new(Vec::new()); num_ttd],
            vertex_order: vec![Rc::new(Vec::new()); num_vertices],
            stop_positions: vec![Rc::new(Vec::new()); num_trains],
        }
    }

    // ── Read access ───────────────────────────────────────────────────────

    pub fn train_edges(&self, train: TrainId) -> &[EdgeId] {
        self.train_edges.get(train.index()).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn ttd_order(&self, ttd: TtdId) -> &[TrainId] {
        self.ttd_order.get(ttd.index()).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn vertex_order(&self, vertex: VertexId) -> &[TrainId] {
        self.vertex_order.get(vertex.index()).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn stop_positions(&self, train: TrainId) -> &[f64] {
        self.stop_positions.get(train.index()).map(|v| v.as_slice()).unwrap_or(&[])
    }

    // ── Persistent updates ────────────────────────────────────────────────

    /// Append `edge` to `train`'s committed route prefix.
    #[must_use]
    pub fn push_edge(&self, train: TrainId, edge: EdgeId) -> Self {
        let mut next = self.clone();
        let mut edges = (*next.train_edges[train.index()]).clone();
        edges.push(edge);
        next.train_edges[train.index()] = Rc::new(edges);
        next
    }

    /// Remove the last edge from `train`'s committed route prefix, if any.
    /// Used by the solver when backtracking out of a dead branch.
    #[must_use]
    pub fn pop_last_edge(&self, train: TrainId) -> Self {
        let mut next = self.clone();
        let mut edges = (*next.train_edges[train.index()]).clone();
        edges.pop();
        next.train_edges[train.index()] = Rc::new(edges);
        next
    }

    /// Commit `train` to stopping at `position_m` along its route.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `position_m` is not strictly greater than
    /// the train's previous commitment — `stop_positions[t]` must stay
    /// strictly increasing (spec.md §3).
    #[must_use]
    pub fn commit_stop(&self, train: TrainId, position_m: f64) -> Self {
        let mut next = self.clone();
        let mut stops = (*next.stop_positions[train.index()]).clone();
        debug_assert!(
            stops.last().is_none_or(|&last| position_m > last),
            "stop_positions must be strictly increasing"
        );
        stops.push(position_m);
        next.stop_positions[train.index()] = Rc::new(stops);
        next
    }

    /// Append `train` to the first-come-first-served order of TTD section `ttd`.
    #[must_use]
    pub fn insert_ttd_order(&self, ttd: TtdId, train: TrainId) -> Self {
        let mut next = self.clone();
        let mut order = (*next.ttd_order[ttd.index()]).clone();
        order.push(train);
        next.ttd_order[ttd.index()] = Rc::new(order);
        next
    }

    /// Append `train` to the passage order of `vertex`.
    #[must_use]
    pub fn insert_vertex_order(&self, vertex: VertexId, train: TrainId) -> Self {
        let mut next = self.clone();
        let mut order = (*next.vertex_order[vertex.index()]).clone();
        order.push(train);
        next.vertex_order[vertex.index()] = Rc::new(order);
        next
    }
}

// ── Structural equality and hashing ──────────────────────────────────────────
//
// `f64` has no `Eq`/`Hash` impl (NaN breaks reflexivity), so the derive
// macros can't be used directly on `stop_positions`. Positions are real
// physical distances and never NaN by construction, so hashing/comparing
// their bit patterns is sound and bitwise-reproducible (rail_core's
// determinism requirement).

impl PartialEq for PartialState {
    fn eq(&self, other: &Self) -> bool {
        self.train_edges == other.train_edges
            && self.ttd_order == other.ttd_order
            && self.vertex_order == other.vertex_order
            && self.stop_positions.len() == other.stop_positions.len()
            && self
                .stop_positions
                .iter()
                .zip(&other.stop_positions)
                .all(|(a, b)| a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits()))
    }
}

impl Eq for PartialState {}

impl std::hash::Hash for PartialState {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.train_edges.hash(state);
        self.ttd_order.hash(state);
        self.vertex_order.hash(state);
        for stops in &self.stop_positions {
            stops.len().hash(state);
            for p in stops.iter() {
                p.to_bits().hash(state);
            }
        }
    }
}
