//! `load_instance` — reads the on-disk `network/` + `timetable/` (+
//! optional `routes/`) directory layout into a fully built [`Instance`].
//!
//! Grounded on the source framework's `RailwayNetwork::read_graphml` /
//! `read_successors`: the track graph and its turnout relation come from two
//! separate files because GraphML has no native way to express "this
//! directed edge may only be followed by that one," so the turnout table is
//! carried alongside as plain JSON.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use rail_core::StationId;
use rail_network::{RailNetwork, RailNetworkBuilder, VertexKind};
use rail_timetable::{Schedule, Station, Stop, Timetable, Train};
use rail_instance::Instance;

use crate::error::{IoError, IoResult};

/// Load the network, timetable, and (if present) route hints rooted at
/// `dir`, and assemble them into a validated [`Instance`].
pub fn load_instance(dir: &Path) -> IoResult<Instance> {
    let network = load_network(&dir.join("network"))?;
    let timetable = load_timetable(&dir.join("timetable"), &network)?;

    let routes_file = dir.join("routes").join("routes.json");
    if routes_file.is_file() {
        validate_routes(&routes_file, &network)?;
    }

    Instance::build(network, timetable).map_err(Into::into)
}

// ── network/tracks.graphml ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct GraphMl {
    #[serde(rename = "key", default)]
    keys: Vec<KeyDef>,
    graph: Graph,
}

#[derive(Deserialize)]
struct KeyDef {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@attr.name")]
    attr_name: String,
}

#[derive(Deserialize)]
struct Graph {
    #[serde(rename = "node", default)]
    nodes: Vec<NodeXml>,
    #[serde(rename = "edge", default)]
    edges: Vec<EdgeXml>,
}

#[derive(Deserialize)]
struct NodeXml {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "data", default)]
    data: Vec<DataXml>,
}

#[derive(Deserialize)]
struct EdgeXml {
    #[serde(rename = "@source")]
    source: String,
    #[serde(rename = "@target")]
    target: String,
    #[serde(rename = "data", default)]
    data: Vec<DataXml>,
}

#[derive(Deserialize)]
struct DataXml {
    #[serde(rename = "@key")]
    key: String,
    #[serde(rename = "$text", default)]
    value: String,
}

/// Resolves a node/edge's `<data key="...">` entries into attribute-name ->
/// text-value, using the document's `<key>` definitions.
fn resolve_attrs<'a>(data: &'a [DataXml], keys: &'a HashMap<String, String>) -> HashMap<&'a str, &'a str> {
    data.iter()
        .filter_map(|d| keys.get(&d.key).map(|name| (name.as_str(), d.value.as_str())))
        .collect()
}

fn parse_vertex_kind(s: &str) -> IoResult<VertexKind> {
    match s {
        "TtdBorder" => Ok(VertexKind::TtdBorder),
        "VssBorder" => Ok(VertexKind::VssBorder),
        "NonBorder" => Ok(VertexKind::NonBorder),
        "NonBorderVss" => Ok(VertexKind::NonBorderVss),
        other => Err(IoError::UnknownVertexKind(other.to_string())),
    }
}

fn parse_f64(attrs: &HashMap<&str, &str>, key: &str, default: f64) -> IoResult<f64> {
    match attrs.get(key) {
        Some(v) => v.parse().map_err(|_| IoError::BadEdgeKey(format!("{key}={v}"))),
        None => Ok(default),
    }
}

fn load_network(dir: &Path) -> IoResult<RailNetwork> {
    let xml = fs::read_to_string(dir.join("tracks.graphml"))?;
    let doc: GraphMl = quick_xml::de::from_str(&xml)?;
    let keys: HashMap<String, String> = doc.keys.into_iter().map(|k| (k.id, k.attr_name)).collect();

    let mut builder = RailNetworkBuilder::new();
    for node in &doc.graph.nodes {
        let attrs = resolve_attrs(&node.data, &keys);
        let kind = parse_vertex_kind(attrs.get("type").copied().unwrap_or("NonBorder"))?;
        let headway = attrs.get("entry_headway").and_then(|v| v.parse::<u32>().ok());
        builder.add_vertex(node.id.clone(), kind, headway);
    }
    for edge in &doc.graph.edges {
        let attrs = resolve_attrs(&edge.data, &keys);
        let length_m = parse_f64(&attrs, "length", 0.0)?;
        let max_speed = parse_f64(&attrs, "max_speed", 0.0)?;
        let breakable = attrs.get("breakable").map(|v| *v == "true" || *v == "1").unwrap_or(false);
        let min_block_length_m = parse_f64(&attrs, "min_block_length", 0.0)?;
        let min_stop_block_length_m = parse_f64(&attrs, "min_stop_block_length", min_block_length_m)?;
        builder.add_edge(
            edge.source.clone(),
            edge.target.clone(),
            length_m,
            max_speed,
            breakable,
            min_block_length_m,
            min_stop_block_length_m,
        );
    }

    let successors_path = dir.join("successors_cpp.json");
    if successors_path.is_file() {
        let raw = fs::read_to_string(&successors_path)?;
        let table: HashMap<String, Vec<(String, String)>> = serde_json::from_str(&raw)?;
        for (key, outs) in &table {
            let edge_in = parse_pair_key(key)?;
            for edge_out in outs {
                builder.add_successor(edge_in.clone(), edge_out.clone());
            }
        }
    }

    builder.build().map_err(Into::into)
}

/// Parses the literal text `('src','tgt')` into `(src, tgt)`.
fn parse_pair_key(key: &str) -> IoResult<(String, String)> {
    let inner = key.trim().strip_prefix('(').and_then(|s| s.strip_suffix(')')).ok_or_else(|| IoError::BadEdgeKey(key.to_string()))?;
    let mut parts = inner.splitn(2, ',');
    let (Some(src), Some(tgt)) = (parts.next(), parts.next()) else {
        return Err(IoError::BadEdgeKey(key.to_string()));
    };
    let unquote = |s: &str| s.trim().trim_matches('\'').trim_matches('"').to_string();
    Ok((unquote(src), unquote(tgt)))
}

// ── timetable/ ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TrainJson {
    name: String,
    length: f64,
    max_speed: f64,
    acceleration: f64,
    deceleration: f64,
    #[serde(default)]
    bidirectional: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StopJson {
    Classical { begin: u32, end: u32, station: String },
    General { begin_range: u32, end_range: u32, min_stopping_time: u32, station: String },
}

impl StopJson {
    fn window(&self) -> (u32, u32) {
        match self {
            StopJson::Classical { begin, end, .. } => (*begin, *end),
            StopJson::General { begin_range, end_range, .. } => (*begin_range, *end_range),
        }
    }

    fn min_dwell_secs(&self) -> u32 {
        match self {
            StopJson::Classical { begin, end, .. } => end.saturating_sub(*begin),
            StopJson::General { min_stopping_time, .. } => *min_stopping_time,
        }
    }

    fn station(&self) -> &str {
        match self {
            StopJson::Classical { station, .. } => station,
            StopJson::General { station, .. } => station,
        }
    }
}

#[derive(Deserialize)]
struct ScheduleJson {
    t_0: (u32, u32),
    v_0: f64,
    entry: String,
    t_n: (u32, u32),
    v_n: f64,
    exit: String,
    #[serde(default)]
    stops: Vec<StopJson>,
}

fn load_timetable(dir: &Path, network: &RailNetwork) -> IoResult<Timetable> {
    let trains_raw: Vec<TrainJson> = serde_json::from_str(&fs::read_to_string(dir.join("trains.json"))?)?;
    let stations_raw: HashMap<String, Vec<(String, String)>> =
        serde_json::from_str(&fs::read_to_string(dir.join("stations.json"))?)?;
    let schedules_raw: HashMap<String, ScheduleJson> =
        serde_json::from_str(&fs::read_to_string(dir.join("schedules.json"))?)?;

    let mut stations = Vec::with_capacity(stations_raw.len());
    let mut station_index = HashMap::with_capacity(stations_raw.len());
    // Sort for a deterministic `StationId` assignment independent of the
    // JSON object's (unordered) key iteration.
    let mut station_names: Vec<&String> = stations_raw.keys().collect();
    station_names.sort();
    for name in station_names {
        let pairs = &stations_raw[name];
        let mut edges = Vec::with_capacity(pairs.len());
        for (src, tgt) in pairs {
            let src_v = network.vertex_by_name(src).ok_or_else(|| IoError::BadEdgeKey(format!("{src:?}")))?;
            let tgt_v = network.vertex_by_name(tgt).ok_or_else(|| IoError::BadEdgeKey(format!("{tgt:?}")))?;
            let edge = *network
                .out_edges(src_v)
                .iter()
                .find(|&&e| network.edge(e).map(|e| e.target == tgt_v).unwrap_or(false))
                .ok_or_else(|| IoError::UnknownRouteEdge(src.clone(), tgt.clone()))?;
            edges.push(edge);
        }
        station_index.insert(name.clone(), StationId::try_from(stations.len()).expect("station index fits in StationId"));
        stations.push(Station { name: name.clone(), edges });
    }

    let mut trains = Vec::with_capacity(trains_raw.len());
    let mut schedules = Vec::with_capacity(trains_raw.len());
    for (i, t) in trains_raw.into_iter().enumerate() {
        let id = rail_core::TrainId::try_from(i).expect("train index fits in TrainId");
        let raw_schedule = schedules_raw
            .get(&t.name)
            .ok_or_else(|| IoError::UnknownTrain { file: "schedules.json", train: t.name.clone() })?;

        let entry = network.vertex_by_name(&raw_schedule.entry).ok_or_else(|| IoError::BadEdgeKey(raw_schedule.entry.clone()))?;
        let exit = network.vertex_by_name(&raw_schedule.exit).ok_or_else(|| IoError::BadEdgeKey(raw_schedule.exit.clone()))?;

        let mut stops = Vec::with_capacity(raw_schedule.stops.len());
        for stop in &raw_schedule.stops {
            let station = *station_index
                .get(stop.station())
                .ok_or_else(|| IoError::UnknownStation { file: "schedules.json", station: stop.station().to_string() })?;
            let (begin, end) = stop.window();
            stops.push(Stop { station, arrival_begin: begin, arrival_end: end, min_dwell_secs: stop.min_dwell_secs() });
        }

        trains.push(Train {
            id,
            name: t.name,
            length_m: t.length,
            vmax: t.max_speed,
            accel: t.acceleration,
            decel: t.deceleration,
            bidirectional: t.bidirectional,
        });
        schedules.push(Schedule {
            entry,
            exit,
            entry_window: raw_schedule.t_0,
            exit_window: raw_schedule.t_n,
            v0: raw_schedule.v_0,
            vn: raw_schedule.v_n,
            stops,
        });
    }

    Ok(Timetable { trains, schedules, stations })
}

/// `routes/routes.json` carries no model counterpart in [`Instance`] (routes
/// are computed by the solver, not taken as input) — this only checks that
/// every edge it names still exists, so a stale route file next to a changed
/// network is caught at load time instead of silently ignored.
fn validate_routes(path: &Path, network: &RailNetwork) -> IoResult<()> {
    let raw: HashMap<String, Vec<(String, String)>> = serde_json::from_str(&fs::read_to_string(path)?)?;
    for pairs in raw.values() {
        for (src, tgt) in pairs {
            let src_v = network.vertex_by_name(src).ok_or_else(|| IoError::UnknownRouteEdge(src.clone(), tgt.clone()))?;
            let tgt_v = network.vertex_by_name(tgt).ok_or_else(|| IoError::UnknownRouteEdge(src.clone(), tgt.clone()))?;
            let exists = network.out_edges(src_v).iter().any(|&e| network.edge(e).map(|e| e.target == tgt_v).unwrap_or(false));
            if !exists {
                return Err(IoError::UnknownRouteEdge(src.clone(), tgt.clone()));
            }
        }
    }
    Ok(())
}
