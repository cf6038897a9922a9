//! Round-trip tests for `load_instance` / `write_solution`.

use std::fs;

use tempfile::tempdir;

use rail_solve::{Solution, SolverStatus};

use crate::loader::load_instance;
use crate::writer::write_solution;

const TRACKS_GRAPHML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<graphml>
  <key id="d0" for="node" attr.name="type" attr.type="string"/>
  <key id="d1" for="edge" attr.name="length" attr.type="double"/>
  <key id="d2" for="edge" attr.name="max_speed" attr.type="double"/>
  <key id="d3" for="edge" attr.name="breakable" attr.type="boolean"/>
  <key id="d4" for="edge" attr.name="min_block_length" attr.type="double"/>
  <graph edgedefault="directed">
    <node id="a"><data key="d0">TtdBorder</data></node>
    <node id="b"><data key="d0">TtdBorder</data></node>
    <edge source="a" target="b">
      <data key="d1">1000.0</data>
      <data key="d2">50.0</data>
      <data key="d3">false</data>
      <data key="d4">0.0</data>
    </edge>
  </graph>
</graphml>
"#;

/// Writes the smallest consistent `network/` + `timetable/` directory pair:
/// a single `a -> b` edge and a single train scheduled across it.
fn write_single_edge_scenario(root: &std::path::Path) {
    let network_dir = root.join("network");
    let timetable_dir = root.join("timetable");
    fs::create_dir_all(&network_dir).unwrap();
    fs::create_dir_all(&timetable_dir).unwrap();

    fs::write(network_dir.join("tracks.graphml"), TRACKS_GRAPHML).unwrap();
    fs::write(network_dir.join("successors_cpp.json"), "{}").unwrap();

    fs::write(
        timetable_dir.join("trains.json"),
        r#"[{"name":"T0","length":100.0,"max_speed":50.0,"acceleration":2.0,"deceleration":2.0}]"#,
    )
    .unwrap();
    fs::write(timetable_dir.join("stations.json"), "{}").unwrap();
    fs::write(
        timetable_dir.join("schedules.json"),
        r#"{"T0":{"t_0":[0,60],"v_0":0.0,"entry":"a","t_n":[0,6000],"v_n":0.0,"exit":"b","stops":[]}}"#,
    )
    .unwrap();
}

#[test]
fn loads_single_edge_scenario() {
    let dir = tempdir().unwrap();
    write_single_edge_scenario(dir.path());

    let instance = load_instance(dir.path()).unwrap();
    assert_eq!(instance.network.vertex_count(), 2);
    assert_eq!(instance.network.edge_count(), 1);
    assert_eq!(instance.timetable.trains.len(), 1);
    assert_eq!(instance.timetable.trains[0].name, "T0");
    assert_eq!(instance.timetable.schedules[0].exit_window, (0, 6000));
}

#[test]
fn rejects_unknown_vertex_kind() {
    let dir = tempdir().unwrap();
    write_single_edge_scenario(dir.path());
    let bad = TRACKS_GRAPHML.replace("TtdBorder", "NotARealKind");
    fs::write(dir.path().join("network").join("tracks.graphml"), bad).unwrap();

    assert!(load_instance(dir.path()).is_err());
}

#[test]
fn stale_route_file_is_rejected() {
    let dir = tempdir().unwrap();
    write_single_edge_scenario(dir.path());
    fs::create_dir_all(dir.path().join("routes")).unwrap();
    fs::write(dir.path().join("routes").join("routes.json"), r#"{"T0":[["a","c"]]}"#).unwrap();

    assert!(load_instance(dir.path()).is_err());
}

#[test]
fn writes_solution_directory() {
    let dir = tempdir().unwrap();
    write_single_edge_scenario(dir.path());
    let instance = load_instance(dir.path()).unwrap();

    let solution = Solution {
        train_routed: vec![true],
        route: vec![vec![instance.network.out_edges(instance.network.vertex_by_name("a").unwrap())[0]]],
        pos: vec![vec![(0.0, 0.0), (6.0, 36.0)]],
        speed: vec![vec![(0.0, 0.0), (6.0, 12.0)]],
    };

    write_solution(dir.path(), &instance.network, &solution, SolverStatus::Optimal, Some(204.0), 6.0).unwrap();

    let out = dir.path().join("solution");
    let data: serde_json::Value = serde_json::from_slice(&fs::read(out.join("data.json")).unwrap()).unwrap();
    assert_eq!(data["status"], "Optimal");
    assert_eq!(data["objective"], 204.0);
    assert_eq!(data["postprocessed"], false);

    let routed: Vec<bool> = serde_json::from_slice(&fs::read(out.join("train_routed.json")).unwrap()).unwrap();
    assert_eq!(routed, vec![true]);

    assert!(!out.join("vss_pos.json").exists(), "no VSS boundary vertices in this network");
}
