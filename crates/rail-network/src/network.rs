//! Railway track graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `VertexId v`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_source[ vertex_out_start[v] .. vertex_out_start[v+1] ]
//! ```
//!
//! Edges are stored sorted by source vertex and indexed by `EdgeId`. The
//! *successor* relation (which directed edge may legally follow which,
//! modelling turnouts) is a separate adjacency list keyed by `EdgeId`,
//! distinct from mere vertex connectivity.

use std::collections::HashMap;

use rail_core::{EdgeId, RailError, VertexId};

use crate::error::{NetworkError, NetworkResult};

// ── Vertex / Edge ───────────────────────────────────────────────────────────

/// A vertex's role in the signalling topology.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VertexKind {
    /// Boundary of a train-detection (TTD) section.
    TtdBorder,
    /// Boundary of a virtual sub-section (VSS) within a breakable TTD.
    VssBorder,
    /// Ordinary interior vertex — exactly 2 neighbors.
    NonBorder,
    /// Interior vertex that is also a VSS boundary.
    NonBorderVss,
}

impl VertexKind {
    /// `true` for the two non-border variants, which are degree-constrained.
    pub fn is_non_border(self) -> bool {
        matches!(self, VertexKind::NonBorder | VertexKind::NonBorderVss)
    }

    pub fn is_ttd_border(self) -> bool {
        matches!(self, VertexKind::TtdBorder)
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vertex {
    pub id: VertexId,
    pub name: String,
    pub kind: VertexKind,
    /// Minimum time separation between successive vertex-entry events, if any.
    pub entry_headway_secs: Option<u32>,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub id: EdgeId,
    pub source: VertexId,
    pub target: VertexId,
    pub length_m: f64,
    pub max_speed: f64,
    pub breakable: bool,
    pub min_block_length_m: f64,
    pub min_stop_block_length_m: f64,
}

/// A sequence of edges with its cumulative length and unconstrained travel
/// time at the applicable speed caps.
#[derive(Clone, Debug, Default)]
pub struct Path {
    pub edges: Vec<EdgeId>,
    pub length_m: f64,
    pub time_s: f64,
}

/// A TTD (train-detection) section: a maximal run of edges that forms one
/// capacity-1 unit of track, bounded by `TtdBorder` vertices.
#[derive(Clone, Debug, Default)]
pub struct TtdSection {
    pub edges: Vec<EdgeId>,
}

// ── RailNetwork ───────────────────────────────────────────────────────────────

/// Directed railway track graph in CSR form, plus the successor (turnout)
/// relation and reverse-edge lookup. Immutable once built.
pub struct RailNetwork {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    name_to_index: HashMap<String, VertexId>,

    /// CSR row pointer over `edges`, by source vertex. Length = vertices+1.
    vertex_out_start: Vec<u32>,

    /// `successors_start[e]..successors_start[e+1]` indexes into `successors_flat`.
    successors_start: Vec<u32>,
    successors_flat: Vec<EdgeId>,

    /// Reverse of the successor relation, same indexing convention.
    predecessors_start: Vec<u32>,
    predecessors_flat: Vec<EdgeId>,

    /// `(source, target) -> EdgeId`, used for reverse-edge lookup.
    edge_index: HashMap<(VertexId, VertexId), EdgeId>,

    /// `EdgeId(i)` for `i` in `0..edges.len()`, precomputed so `out_edges`
    /// can return a plain slice instead of allocating per call.
    edge_ids: Vec<EdgeId>,
}

impl RailNetwork {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex(&self, id: VertexId) -> NetworkResult<&Vertex> {
        self.vertices
            .get(id.index())
            .ok_or(NetworkError::VertexNotFound(id))
    }

    pub fn edge(&self, id: EdgeId) -> NetworkResult<&Edge> {
        self.edges.get(id.index()).ok_or(NetworkError::EdgeNotFound(id))
    }

    pub fn vertex_by_name(&self, name: &str) -> Option<VertexId> {
        self.name_to_index.get(name).copied()
    }

    /// Outgoing edges of `vertex`, in build order.
    #[inline]
    pub fn out_edges(&self, vertex: VertexId) -> &[EdgeId] {
        let start = self.vertex_out_start[vertex.index()] as usize;
        let end = self.vertex_out_start[vertex.index() + 1] as usize;
        &self.edge_ids[start..end]
    }

    /// The turnout-constrained successors of `edge`: edges that may legally
    /// follow it.
    #[inline]
    pub fn successors(&self, edge: EdgeId) -> &[EdgeId] {
        let start = self.successors_start[edge.index()] as usize;
        let end = self.successors_start[edge.index() + 1] as usize;
        &self.successors_flat[start..end]
    }

    /// Edges that may legally precede `edge`.
    #[inline]
    pub fn predecessors(&self, edge: EdgeId) -> &[EdgeId] {
        let start = self.predecessors_start[edge.index()] as usize;
        let end = self.predecessors_start[edge.index() + 1] as usize;
        &self.predecessors_flat[start..end]
    }

    /// The edge running from `target(edge)` back to `source(edge)`, if any.
    pub fn reverse_edge(&self, edge: EdgeId) -> Option<EdgeId> {
        let e = &self.edges[edge.index()];
        self.edge_index.get(&(e.target, e.source)).copied()
    }

    /// Dijkstra shortest path from `from_edge`'s target onward, restricted to
    /// the successor relation, to the first edge whose target is `to`.
    /// Weight = `length_m / min(max_speed, cap_speed)`.
    pub fn shortest_path(&self, from_edge: EdgeId, to: VertexId, cap_speed: f64) -> Option<Path> {
        self.shortest_path_between_sets(&[from_edge], &self.edges_entering(to), cap_speed)
    }

    /// Multi-source, multi-target Dijkstra over edges, expanding only along
    /// [`successors`]. Returns the cheapest path from any edge in `from` to
    /// any edge in `to` (inclusive of the starting edge).
    pub fn shortest_path_between_sets(
        &self,
        from: &[EdgeId],
        to: &[EdgeId],
        cap_speed: f64,
    ) -> Option<Path> {
        use std::cmp::Ordering;
        use std::collections::BinaryHeap;

        #[derive(PartialEq)]
        struct HeapEntry {
            cost: f64,
            edge: EdgeId,
        }
        impl Eq for HeapEntry {}
        impl Ord for HeapEntry {
            fn cmp(&self, other: &Self) -> Ordering {
                // Reverse for min-heap; tie-break on EdgeId for determinism.
                other
                    .cost
                    .partial_cmp(&self.cost)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| self.edge.cmp(&other.edge))
            }
        }
        impl PartialOrd for HeapEntry {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        let target_set: std::collections::HashSet<EdgeId> = to.iter().copied().collect();
        let mut dist = vec![f64::INFINITY; self.edges.len()];
        let mut prev: Vec<Option<EdgeId>> = vec![None; self.edges.len()];
        let mut heap = BinaryHeap::new();

        for &e in from {
            let w = self.edge_weight(e, cap_speed);
            if w < dist[e.index()] {
                dist[e.index()] = w;
                heap.push(HeapEntry { cost: w, edge: e });
            }
        }

        let mut goal: Option<EdgeId> = None;
        while let Some(HeapEntry { cost, edge }) = heap.pop() {
            if cost > dist[edge.index()] {
                continue;
            }
            if target_set.contains(&edge) {
                goal = Some(edge);
                break;
            }
            for &next in self.successors(edge) {
                let new_cost = cost + self.edge_weight(next, cap_speed);
                if new_cost < dist[next.index()] {
                    dist[next.index()] = new_cost;
                    prev[next.index()] = Some(edge);
                    heap.push(HeapEntry { cost: new_cost, edge: next });
                }
            }
        }

        let goal = goal?;
        let mut edges = Vec::new();
        let mut cur = Some(goal);
        while let Some(e) = cur {
            edges.push(e);
            cur = prev[e.index()];
        }
        edges.reverse();
        let length_m: f64 = edges.iter().map(|&e| self.edges[e.index()].length_m).sum();
        Some(Path {
            edges,
            length_m,
            time_s: dist[goal.index()],
        })
    }

    fn edge_weight(&self, edge: EdgeId, cap_speed: f64) -> f64 {
        let e = &self.edges[edge.index()];
        e.length_m / e.max_speed.min(cap_speed)
    }

    /// All edges whose target is `vertex`, in edge-id order.
    pub fn edges_entering(&self, vertex: VertexId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|e| e.target == vertex)
            .map(|e| e.id)
            .collect()
    }

    /// Enumerate simple edge sequences starting at `vertex`'s out-edges,
    /// following [`successors`], whose cumulative length reaches at least
    /// `min_length` or which terminate at a vertex in `stop_at`.
    pub fn all_paths_of_length_starting_in_vertex(
        &self,
        vertex: VertexId,
        min_length: f64,
        stop_at: &[VertexId],
    ) -> Vec<Path> {
        let mut results = Vec::new();
        for &first in self.out_edges(vertex) {
            let mut edges = vec![first];
            let len = self.edges[first.index()].length_m;
            self.extend_path(&mut edges, len, min_length, stop_at, &mut results);
        }
        results
    }

    fn extend_path(
        &self,
        edges: &mut Vec<EdgeId>,
        length_so_far: f64,
        min_length: f64,
        stop_at: &[VertexId],
        results: &mut Vec<Path>,
    ) {
        let last = *edges.last().unwrap();
        let target = self.edges[last.index()].target;
        if length_so_far >= min_length || stop_at.contains(&target) {
            results.push(Path {
                edges: edges.clone(),
                length_m: length_so_far,
                time_s: 0.0,
            });
            return;
        }
        let nexts: Vec<EdgeId> = self.successors(last).to_vec();
        if nexts.is_empty() {
            // Dead end before reaching min_length: still report what we have.
            results.push(Path {
                edges: edges.clone(),
                length_m: length_so_far,
                time_s: 0.0,
            });
            return;
        }
        for next in nexts {
            edges.push(next);
            let new_len = length_so_far + self.edges[next.index()].length_m;
            self.extend_path(edges, new_len, min_length, stop_at, results);
            edges.pop();
        }
    }

    /// Partition the edge set into TTD sections: maximal runs of edges not
    /// separated by a [`VertexKind::TtdBorder`] vertex.
    pub fn unbreakable_sections(&self) -> Vec<TtdSection> {
        let mut uf = UnionFind::new(self.edges.len());
        for v in &self.vertices {
            if v.kind.is_ttd_border() {
                continue;
            }
            let incident: Vec<EdgeId> = self
                .edges
                .iter()
                .filter(|e| e.source == v.id || e.target == v.id)
                .map(|e| e.id)
                .collect();
            for pair in incident.windows(2) {
                uf.union(pair[0].index(), pair[1].index());
            }
        }
        let mut groups: HashMap<usize, Vec<EdgeId>> = HashMap::new();
        for e in &self.edges {
            groups.entry(uf.find(e.id.index())).or_default().push(e.id);
        }
        let mut sections: Vec<TtdSection> = groups
            .into_values()
            .map(|mut edges| {
                edges.sort();
                TtdSection { edges }
            })
            .collect();
        sections.sort_by_key(|s| s.edges.first().copied().unwrap_or(EdgeId::INVALID));
        sections
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

// ── RailNetworkBuilder ────────────────────────────────────────────────────────

struct RawEdge {
    source_name: String,
    target_name: String,
    length_m: f64,
    max_speed: f64,
    breakable: bool,
    min_block_length_m: f64,
    min_stop_block_length_m: f64,
}

/// Construct a [`RailNetwork`] incrementally, then call [`build`](Self::build).
///
/// Accepts vertices, edges, and successor pairs in any order. `build()`
/// sorts edges by source vertex into CSR form, resolves the successor
/// relation (specified as `(source, target)` vertex-name pairs on either
/// side) into `EdgeId` pairs, and runs the eager consistency checks: a
/// non-border vertex with more than 2 neighbors, a breakable edge with
/// non-positive `min_block_length_m`, a reverse edge disagreeing in length
/// or breakability, and an edge referencing an undeclared vertex are all
/// rejected here rather than discovered later inside the simulator.
pub struct RailNetworkBuilder {
    vertices: Vec<(String, VertexKind, Option<u32>)>,
    raw_edges: Vec<RawEdge>,
    raw_successors: Vec<((String, String), (String, String))>,
}

impl RailNetworkBuilder {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            raw_edges: Vec::new(),
            raw_successors: Vec::new(),
        }
    }

    pub fn add_vertex(&mut self, name: impl Into<String>, kind: VertexKind, entry_headway_secs: Option<u32>) {
        self.vertices.push((name.into(), kind, entry_headway_secs));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_edge(
        &mut self,
        source_name: impl Into<String>,
        target_name: impl Into<String>,
        length_m: f64,
        max_speed: f64,
        breakable: bool,
        min_block_length_m: f64,
        min_stop_block_length_m: f64,
    ) {
        self.raw_edges.push(RawEdge {
            source_name: source_name.into(),
            target_name: target_name.into(),
            length_m,
            max_speed,
            breakable,
            min_block_length_m,
            min_stop_block_length_m,
        });
    }

    /// Declare that the edge `(in_src, in_tgt)` may be legally followed by
    /// edge `(out_src, out_tgt)`.
    pub fn add_successor(
        &mut self,
        edge_in: (impl Into<String>, impl Into<String>),
        edge_out: (impl Into<String>, impl Into<String>),
    ) {
        self.raw_successors.push((
            (edge_in.0.into(), edge_in.1.into()),
            (edge_out.0.into(), edge_out.1.into()),
        ));
    }

    pub fn build(self) -> NetworkResult<RailNetwork> {
        let mut vertices = Vec::with_capacity(self.vertices.len());
        let mut name_to_index = HashMap::with_capacity(self.vertices.len());
        for (i, (name, kind, headway)) in self.vertices.into_iter().enumerate() {
            let id = VertexId(i as u32);
            name_to_index.insert(name.clone(), id);
            vertices.push(Vertex { id, name, kind, entry_headway_secs: headway });
        }

        let mut raw = Vec::with_capacity(self.raw_edges.len());
        for re in &self.raw_edges {
            let source = *name_to_index.get(&re.source_name).ok_or_else(|| {
                NetworkError::InvalidGraph(RailError::InvalidGraph(format!(
                    "edge references unknown vertex '{}'",
                    re.source_name
                )))
            })?;
            let target = *name_to_index.get(&re.target_name).ok_or_else(|| {
                NetworkError::InvalidGraph(RailError::InvalidGraph(format!(
                    "edge references unknown vertex '{}'",
                    re.target_name
                )))
            })?;
            if re.breakable && re.min_block_length_m <= 0.0 {
                return Err(NetworkError::InvalidGraph(RailError::InvalidGraph(format!(
                    "breakable edge {}->{} has non-positive min_block_length",
                    re.source_name, re.target_name
                ))));
            }
            raw.push((source, target, re));
        }

        // Sort by source vertex; stable to keep deterministic ordering of
        // same-source edges across builds with identical insertion order.
        raw.sort_by_key(|(s, _, _)| s.0);

        let vertex_count = vertices.len();
        let edge_count = raw.len();
        let mut vertex_out_start = vec![0u32; vertex_count + 1];
        for (s, _, _) in &raw {
            vertex_out_start[s.index() + 1] += 1;
        }
        for i in 1..=vertex_count {
            vertex_out_start[i] += vertex_out_start[i - 1];
        }

        let mut edges = Vec::with_capacity(edge_count);
        let mut edge_index = HashMap::with_capacity(edge_count);
        for (i, (source, target, re)) in raw.into_iter().enumerate() {
            let id = EdgeId(i as u32);
            edge_index.insert((source, target), id);
            edges.push(Edge {
                id,
                source,
                target,
                length_m: re.length_m,
                max_speed: re.max_speed,
                breakable: re.breakable,
                min_block_length_m: re.min_block_length_m,
                min_stop_block_length_m: re.min_stop_block_length_m,
            });
        }

        // Reverse-edge length/breakability consistency.
        for e in &edges {
            if let Some(&rev) = edge_index.get(&(e.target, e.source)) {
                let r = &edges[rev.index()];
                if (r.length_m - e.length_m).abs() > rail_core::EPS || r.breakable != e.breakable {
                    return Err(NetworkError::InvalidGraph(RailError::InvalidGraph(format!(
                        "reverse edge pair {}<->{} disagrees in length or breakability",
                        e.id, rev
                    ))));
                }
            }
        }

        // Non-border degree check: at most 2 distinct neighbors.
        for v in &vertices {
            if v.kind.is_non_border() {
                let mut neighbors: Vec<VertexId> = edges
                    .iter()
                    .filter(|e| e.source == v.id)
                    .map(|e| e.target)
                    .chain(edges.iter().filter(|e| e.target == v.id).map(|e| e.source))
                    .collect();
                neighbors.sort();
                neighbors.dedup();
                if neighbors.len() > 2 {
                    return Err(NetworkError::InvalidGraph(RailError::InvalidGraph(format!(
                        "non-border vertex '{}' has {} neighbors (max 2)",
                        v.name,
                        neighbors.len()
                    ))));
                }
            }
        }

        let mut successors_map: Vec<Vec<EdgeId>> = vec![Vec::new(); edge_count];
        let mut predecessors_map: Vec<Vec<EdgeId>> = vec![Vec::new(); edge_count];
        for ((in_src, in_tgt), (out_src, out_tgt)) in &self.raw_successors {
            let in_edge = lookup_edge(&name_to_index, &edge_index, in_src, in_tgt)?;
            let out_edge = lookup_edge(&name_to_index, &edge_index, out_src, out_tgt)?;
            successors_map[in_edge.index()].push(out_edge);
            predecessors_map[out_edge.index()].push(in_edge);
        }

        let (successors_start, successors_flat) = flatten(successors_map);
        let (predecessors_start, predecessors_flat) = flatten(predecessors_map);

        let edge_ids: Vec<EdgeId> = (0..edges.len() as u32).map(EdgeId).collect();
        Ok(RailNetwork {
            vertices,
            edges,
            name_to_index,
            vertex_out_start,
            successors_start,
            successors_flat,
            predecessors_start,
            predecessors_flat,
            edge_index,
            edge_ids,
        })
    }
}

fn lookup_edge(
    name_to_index: &HashMap<String, VertexId>,
    edge_index: &HashMap<(VertexId, VertexId), EdgeId>,
    src: &str,
    tgt: &str,
) -> NetworkResult<EdgeId> {
    let s = *name_to_index
        .get(src)
        .ok_or_else(|| NetworkError::InvalidGraph(RailError::InvalidGraph(format!("unknown vertex '{src}'"))))?;
    let t = *name_to_index
        .get(tgt)
        .ok_or_else(|| NetworkError::InvalidGraph(RailError::InvalidGraph(format!("unknown vertex '{tgt}'"))))?;
    edge_index
        .get(&(s, t))
        .copied()
        .ok_or_else(|| NetworkError::InvalidGraph(RailError::InvalidGraph(format!("no edge {src}->{tgt}"))))
}

fn flatten(mut grouped: Vec<Vec<EdgeId>>) -> (Vec<u32>, Vec<EdgeId>) {
    let mut start = vec![0u32; grouped.len() + 1];
    for group in &mut grouped {
        group.sort();
    }
    for (i, group) in grouped.iter().enumerate() {
        start[i + 1] = start[i] + group.len() as u32;
    }
    let flat = grouped.into_iter().flatten().collect();
    (start, flat)
}

impl Default for RailNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
