//! `Instance` — network + timetable composition with eagerly-derived,
//! read-only lookup tables.
//!
//! Mirrors the "validate once, expose plain fields" shape `rail-state`
//! borrows from `AgentStoreBuilder`: every derived table below is computed
//! exactly once in [`Instance::build`] and never mutated afterwards, so an
//! `Instance` can be shared by reference across solver threads without
//! synchronization.

use rail_core::{EdgeId, StationId, TrainId, TtdId, VertexId};
use rail_network::RailNetwork;
use rail_timetable::Timetable;

use crate::error::{InstanceError, InstanceResult};

/// Classification of how two edges can conflict for capacity purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OverlapKind {
    /// The same edge.
    Parallel,
    /// Both edges belong to the same TTD (train detection) section.
    Ttd,
    /// The two edges are a breakable edge's forward/reverse pair.
    Reverse,
    /// `Ttd` or `Reverse` — the merged closure used for deadlock-sensitive checks.
    Crossing,
}

/// Network + timetable composition with eagerly-derived lookup tables.
///
/// `overlap` is deliberately a function of an *edge pair*, not a train pair:
/// every conflict kind in spec.md §4.4 (`parallel`, `ttd`, `reverse`,
/// `crossing`) is defined purely in terms of network topology (shared edge,
/// shared TTD section, reverse-edge pairing), so precomputing it per train
/// pair would duplicate the same answer for every pair of trains that later
/// happen to occupy those edges. Callers (the simulator) supply the two
/// edges each train currently occupies.
pub struct Instance {
    pub network: RailNetwork,
    pub timetable: Timetable,

    /// `possible_stop_vertices[train][station]`: every vertex from which a
    /// forward path of exactly the train's length lands on an edge of that
    /// station.
    possible_stop_vertices: Vec<Vec<Vec<VertexId>>>,

    /// `shortest_paths[v1][v2]`: minimum travel time in seconds from `v1` to
    /// `v2` ignoring all trains, or `f64::INFINITY` if unreachable.
    shortest_paths: Vec<Vec<f64>>,

    /// Edge -> index into `ttd_sections`, for O(1) `Ttd`/`Crossing` lookups.
    edge_ttd_section: Vec<Option<usize>>,
}

impl Instance {
    /// Validate `timetable` against `network` and eagerly compute every
    /// derived table.
    pub fn build(network: RailNetwork, timetable: Timetable) -> InstanceResult<Instance> {
        timetable.check_consistency(&network)?;

        let edge_ttd_section = build_edge_ttd_section(&network);
        let shortest_paths = build_shortest_paths(&network);
        let possible_stop_vertices = build_possible_stop_vertices(&network, &timetable)?;

        Ok(Instance { network, timetable, possible_stop_vertices, shortest_paths, edge_ttd_section })
    }

    /// Vertices from which train `train` may come to a stop inside the
    /// edges of station `station`.
    pub fn possible_stop_vertices(&self, train: TrainId, station: StationId) -> &[VertexId] {
        self.possible_stop_vertices
            .get(train.index())
            .and_then(|by_station| by_station.get(station.index()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Minimum travel time in seconds from `from` to `to`, ignoring trains.
    /// `f64::INFINITY` if unreachable.
    pub fn shortest_path_time(&self, from: VertexId, to: VertexId) -> f64 {
        self.shortest_paths
            .get(from.index())
            .and_then(|row| row.get(to.index()))
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    fn ttd_section_of(&self, edge: EdgeId) -> Option<usize> {
        self.edge_ttd_section.get(edge.index()).copied().flatten()
    }

    /// The TTD section containing `edge`, if any — used by the simulator to
    /// name the section in a `CapacityViolation`.
    pub fn ttd_id(&self, edge: EdgeId) -> Option<TtdId> {
        self.ttd_section_of(edge)
            .map(|idx| TtdId::try_from(idx).expect("ttd section index fits in TtdId"))
    }

    /// Whether `e1` and `e2` conflict under `kind`.
    pub fn overlap(&self, e1: EdgeId, e2: EdgeId, kind: OverlapKind) -> bool {
        let is_reverse = self.network.reverse_edge(e1) == Some(e2);
        let is_ttd = match (self.ttd_section_of(e1), self.ttd_section_of(e2)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        match kind {
            OverlapKind::Parallel => e1 == e2,
            OverlapKind::Reverse => is_reverse,
            OverlapKind::Ttd => is_ttd,
            OverlapKind::Crossing => is_ttd || is_reverse,
        }
    }
}

fn build_edge_ttd_section(network: &RailNetwork) -> Vec<Option<usize>> {
    let sections = network.unbreakable_sections();
    let mut edge_to_section = vec![None; network.edge_count()];
    for (idx, section) in sections.iter().enumerate() {
        for &edge in &section.edges {
            edge_to_section[edge.index()] = Some(idx);
        }
    }
    edge_to_section
}

fn build_shortest_paths(network: &RailNetwork) -> Vec<Vec<f64>> {
    let n = network.vertex_count();
    let mut table = vec![vec![f64::INFINITY; n]; n];
    for from in 0..n {
        let from_vertex = VertexId::try_from(from).expect("vertex index fits in VertexId");
        table[from][from] = 0.0;
        let out = network.out_edges(from_vertex);
        if out.is_empty() {
            continue;
        }
        for to in 0..n {
            if to == from {
                continue;
            }
            let to_vertex = VertexId::try_from(to).expect("vertex index fits in VertexId");
            let targets = network.edges_entering(to_vertex);
            if let Some(path) = network.shortest_path_between_sets(out, &targets, f64::INFINITY) {
                table[from][to] = path.time_s;
            }
        }
    }
    table
}

fn build_possible_stop_vertices(
    network: &RailNetwork,
    timetable: &Timetable,
) -> InstanceResult<Vec<Vec<Vec<VertexId>>>> {
    let n = network.vertex_count();
    let mut out = Vec::with_capacity(timetable.trains.len());

    for (ti, train) in timetable.trains.iter().enumerate() {
        let train_id = TrainId::try_from(ti).expect("train index fits in TrainId");
        let mut by_station = Vec::with_capacity(timetable.stations.len());

        for station in &timetable.stations {
            let mut vertices = Vec::new();
            for v in 0..n {
                let vertex = VertexId::try_from(v).expect("vertex index fits in VertexId");
                if lands_in_station(network, vertex, train.length_m, &station.edges) {
                    vertices.push(vertex);
                }
            }
            by_station.push(vertices);
        }

        let schedule = timetable.schedule(train_id);
        if let Some(schedule) = schedule {
            for stop in &schedule.stops {
                let vertices = by_station.get(stop.station.index()).map(Vec::as_slice).unwrap_or(&[]);
                if vertices.is_empty() {
                    return Err(InstanceError::NoPossibleStop(train_id));
                }
            }
        }

        out.push(by_station);
    }

    Ok(out)
}

/// Whether a forward path of exactly `length_m` starting at `vertex` ends on
/// an edge in `station_edges`.
fn lands_in_station(network: &RailNetwork, vertex: VertexId, length_m: f64, station_edges: &[EdgeId]) -> bool {
    network
        .all_paths_of_length_starting_in_vertex(vertex, length_m, &[])
        .iter()
        .any(|path| path.edges.last().is_some_and(|last| station_edges.contains(last)))
}
