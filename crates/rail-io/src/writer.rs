//! `write_solution` — serializes a solver result to the `solution/`
//! directory layout of spec.md §6.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use rail_network::{RailNetwork, VertexKind};
use rail_solve::{Solution, SolverStatus};

use crate::error::IoResult;

#[derive(Serialize)]
struct DataJson {
    dt: f64,
    status: &'static str,
    objective: Option<f64>,
    postprocessed: bool,
}

fn status_name(status: SolverStatus) -> &'static str {
    match status {
        SolverStatus::Optimal => "Optimal",
        SolverStatus::Timeout => "Timeout",
        SolverStatus::Infeasible => "Infeasible",
        SolverStatus::Unknown => "Unknown",
    }
}

/// Writes `dir/solution/{data,train_pos,train_speed,train_routed}.json`,
/// and `vss_pos.json` when `network` declares any VSS boundary.
///
/// No postprocessing pass exists in this crate, so `data.json`'s
/// `postprocessed` flag is always `false`.
pub fn write_solution(
    dir: &Path,
    network: &RailNetwork,
    solution: &Solution,
    status: SolverStatus,
    objective: Option<f64>,
    dt: f64,
) -> IoResult<()> {
    let out = dir.join("solution");
    fs::create_dir_all(&out)?;

    let data = DataJson { dt, status: status_name(status), objective, postprocessed: false };
    fs::write(out.join("data.json"), serde_json::to_vec_pretty(&data)?)?;
    fs::write(out.join("train_pos.json"), serde_json::to_vec_pretty(&solution.pos)?)?;
    fs::write(out.join("train_speed.json"), serde_json::to_vec_pretty(&solution.speed)?)?;
    fs::write(out.join("train_routed.json"), serde_json::to_vec_pretty(&solution.train_routed)?)?;

    let vss = vss_boundary_offsets(network);
    if !vss.is_empty() {
        fs::write(out.join("vss_pos.json"), serde_json::to_vec_pretty(&vss)?)?;
    }
    Ok(())
}

/// For every edge whose source or target is itself a VSS boundary vertex,
/// the offset along that edge (`0.0` at the source, `length_m` at the
/// target) where the boundary sits — the only VSS position data the network
/// model carries, since boundaries are represented as graph vertices rather
/// than as free-floating offsets within an edge.
fn vss_boundary_offsets(network: &RailNetwork) -> BTreeMap<String, Vec<f64>> {
    let is_vss = |kind: VertexKind| matches!(kind, VertexKind::VssBorder | VertexKind::NonBorderVss);
    let mut table = BTreeMap::new();
    for v in 0..network.vertex_count() {
        let vertex = match rail_core::VertexId::try_from(v) {
            Ok(id) => id,
            Err(_) => continue,
        };
        for &edge_id in network.out_edges(vertex) {
            let Ok(edge) = network.edge(edge_id) else { continue };
            let Ok(source) = network.vertex(edge.source) else { continue };
            let Ok(target) = network.vertex(edge.target) else { continue };
            let mut offsets = Vec::new();
            if is_vss(source.kind) {
                offsets.push(0.0);
            }
            if is_vss(target.kind) {
                offsets.push(edge.length_m);
            }
            if !offsets.is_empty() {
                table.insert(format!("('{}','{}')", source.name, target.name), offsets);
            }
        }
    }
    table
}
