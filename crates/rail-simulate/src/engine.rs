//! The fixed-`dt` greedy step loop.
//!
//! `GreedySimulator` itself carries no state — it is a zero-sized handle so
//! that two concurrent `simulate()` calls over different `PartialState`s can
//! never interact. All of the per-step arithmetic lives in free functions
//! (`get_ma_and_maxv`, `move_train`, `get_max_speed_exit_headway`,
//! `is_feasible_to_schedule`) that borrow `Instance`/`PartialState` data and
//! return plain values.

use rail_core::{EdgeId, TrainId, VertexId};
use rail_instance::{Instance, OverlapKind};
use rail_state::PartialState;
use rail_timetable::Schedule;

use crate::error::{SimulateError, SimulateResult};
use crate::observer::{NoopSimulatorObserver, SimulatorObserver};
use crate::state::{SimulationOutcome, SimulatorOptions};

/// Extra iterations allowed beyond the naive window-derived cap, to absorb
/// dwell time and headway waits that stretch a run past the raw schedule span.
const SAFETY_ITERATIONS: u64 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    NotEntered,
    Running,
    Stopped,
    Exited,
}

struct TrainRun {
    status: Status,
    /// Distance of the train's front along its committed route, in metres.
    front: f64,
    v: f64,
    /// Cumulative length at the start of each committed edge, plus a final
    /// entry equal to the total committed length.
    edge_starts: Vec<f64>,
    next_stop_idx: usize,
    remaining_dwell: f64,
    brake_window: Option<(f64, f64)>,
    exit_time: Option<f64>,
    delay: f64,
    /// `true` once this train has run out of committed track without having
    /// reached its exit vertex — it is stuck waiting on the solver to extend
    /// `train_edges`, not on another train, so it never counts towards
    /// deadlock detection.
    waiting_on_commitment: bool,
    /// `true` for a step in which `get_ma_and_maxv` pinned this train's speed
    /// to the exit-headway cap. A train riding that cap down to a standstill
    /// short of its exit boundary is waiting out a scheduled release, not
    /// deadlocked, so it is excluded the same way `waiting_on_commitment` is.
    /// Does not cover the separate park-at-boundary wait below, which is a
    /// genuine block between two trains contending for the same exit vertex.
    headway_capped: bool,
}

impl TrainRun {
    fn new(instance: &Instance, state: &PartialState, train: TrainId) -> Self {
        let edges = state.train_edges(train);
        let mut edge_starts = Vec::with_capacity(edges.len() + 1);
        let mut acc = 0.0;
        edge_starts.push(0.0);
        for &e in edges {
            acc += instance.network.edge(e).map(|e| e.length_m).unwrap_or(0.0);
            edge_starts.push(acc);
        }
        Self {
            status: Status::NotEntered,
            front: 0.0,
            v: 0.0,
            edge_starts,
            next_stop_idx: 0,
            remaining_dwell: 0.0,
            brake_window: None,
            exit_time: None,
            delay: 0.0,
            waiting_on_commitment: false,
            headway_capped: false,
        }
    }

    fn total_committed(&self) -> f64 {
        *self.edge_starts.last().unwrap_or(&0.0)
    }

    /// Index of the committed edge containing `front`, or `None` if the
    /// train has run past the end of its committed prefix.
    fn current_edge_index(&self) -> Option<usize> {
        let total = self.total_committed();
        if self.front >= total - rail_core::EPS {
            return None;
        }
        let mut idx = 0;
        while idx + 1 < self.edge_starts.len() && self.edge_starts[idx + 1] <= self.front + rail_core::EPS {
            idx += 1;
        }
        Some(idx)
    }
}

/// `GreedySimulator` — a pure, zero-sized handle over `Instance`/`PartialState`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedySimulator;

impl GreedySimulator {
    pub fn new() -> Self {
        Self
    }

    /// Run the fixed-`dt` step loop described by spec.md §4.6 to completion
    /// (all trains exited) or to one of the documented failure conditions.
    pub fn simulate(
        &self,
        instance: &Instance,
        state: &PartialState,
        options: &SimulatorOptions,
    ) -> SimulateResult<SimulationOutcome> {
        self.simulate_with_observer(instance, state, options, &mut NoopSimulatorObserver)
    }

    /// As [`Self::simulate`], but invokes `observer`'s hooks at each step
    /// boundary and on every train's exit transition. `simulate()` is this
    /// method called with a [`NoopSimulatorObserver`] — callers that want
    /// per-step telemetry (a progress bar, a trajectory recorder) implement
    /// [`SimulatorObserver`] instead of this engine growing output concerns
    /// of its own.
    pub fn simulate_with_observer(
        &self,
        instance: &Instance,
        state: &PartialState,
        options: &SimulatorOptions,
        observer: &mut impl SimulatorObserver,
    ) -> SimulateResult<SimulationOutcome> {
        let num_trains = instance.timetable.trains.len();
        let num_vertices = instance.network.vertex_count();
        let dt = options.time.dt;

        let mut runs: Vec<TrainRun> = (0..num_trains)
            .map(|i| TrainRun::new(instance, state, TrainId::try_from(i).expect("train index fits in TrainId")))
            .collect();
        let mut vertex_free_time = vec![0.0f64; num_vertices];

        let (min_t0_lo, max_tn_hi) = instance
            .timetable
            .schedules
            .iter()
            .fold((u32::MAX, 0u32), |(lo, hi), s| (lo.min(s.entry_window.0), hi.max(s.exit_window.1)));
        let span = max_tn_hi.saturating_sub(min_t0_lo) as f64;
        let max_iterations = (span / dt).ceil() as u64 + SAFETY_ITERATIONS;

        let mut tau = min_t0_lo as f64;

        for _ in 0..max_iterations {
            if runs.iter().all(|r| r.status == Status::Exited) {
                break;
            }

            let before: Vec<(f64, f64, Status)> = runs.iter().map(|r| (r.front, r.v, r.status)).collect();

            let occupancy = occupied_edges_snapshot(instance, state, &runs);

            for i in 0..num_trains {
                let train = TrainId::try_from(i).expect("train index fits in TrainId");
                let schedule = instance
                    .timetable
                    .schedule(train)
                    .ok_or_else(|| SimulateError::InfeasibleSchedule { train, cause: "no schedule".into() })?;
                is_feasible_to_schedule(train, tau, schedule, &runs[i], options)?;
            }

            // Entry pass. Re-snapshots occupancy after every admitted entry
            // (rather than reusing the pre-step `occupancy` above) so two
            // trains cannot both be admitted onto conflicting first edges
            // within the same step just because neither had entered yet when
            // the step began.
            for i in 0..num_trains {
                if runs[i].status != Status::NotEntered {
                    continue;
                }
                let train = TrainId::try_from(i).expect("train index fits in TrainId");
                let schedule = instance.timetable.schedule(train).expect("schedule exists");
                if tau < schedule.entry_window.0 as f64 {
                    continue;
                }
                if !entry_order_clear(state, train, schedule.entry, &runs) {
                    continue;
                }
                if tau < vertex_free_time[schedule.entry.index()] {
                    continue;
                }
                let first_edge = match state.train_edges(train).first() {
                    Some(&e) => e,
                    None => continue, // nothing committed yet for this train
                };
                let live_occupancy = occupied_edges_snapshot(instance, state, &runs);
                if live_occupancy.iter().enumerate().any(|(other, edges)| {
                    other != i && edges.iter().any(|&e| edge_conflicts(instance, e, first_edge, train, TrainId::try_from(other).unwrap()))
                }) {
                    continue;
                }
                runs[i].status = Status::Running;
                runs[i].front = 0.0;
                runs[i].v = schedule.v0;
                if tau > schedule.entry_window.1 as f64 {
                    runs[i].delay += tau - schedule.entry_window.1 as f64;
                }
                let h = instance.network.vertex(schedule.entry).ok().and_then(|v| v.entry_headway_secs).unwrap_or(0) as f64;
                vertex_free_time[schedule.entry.index()] = tau + h;
            }

            // Movement pass.
            for i in 0..num_trains {
                if runs[i].status != Status::Running {
                    continue;
                }
                let train = TrainId::try_from(i).expect("train index fits in TrainId");
                let train_spec = instance.timetable.train(train).expect("train exists");
                let schedule = instance.timetable.schedule(train).expect("schedule exists");

                runs[i].waiting_on_commitment = false;
                runs[i].headway_capped = false;
                let total = runs[i].total_committed();

                if runs[i].front >= total - rail_core::EPS {
                    // Ran out of committed track. Either it's the exit
                    // vertex (try to leave) or it's a dead end the solver
                    // hasn't extended yet.
                    let last_edge = state.train_edges(train).last().copied();
                    let reaches_exit = last_edge
                        .and_then(|e| instance.network.edge(e).ok())
                        .is_some_and(|e| e.target == schedule.exit);
                    if reaches_exit {
                        let free = vertex_free_time[schedule.exit.index()];
                        if tau >= free {
                            runs[i].status = Status::Exited;
                            runs[i].exit_time = Some(tau);
                            observer.on_exit(train, tau);
                            if tau > schedule.exit_window.1 as f64 {
                                runs[i].delay += tau - schedule.exit_window.1 as f64;
                            }
                            let h = instance
                                .network
                                .vertex(schedule.exit)
                                .ok()
                                .and_then(|v| v.entry_headway_secs)
                                .unwrap_or(0) as f64;
                            vertex_free_time[schedule.exit.index()] = tau + h;
                        }
                        // else: parked at the boundary, waiting on headway —
                        // a genuine block, not a commitment shortfall.
                    } else {
                        runs[i].waiting_on_commitment = true;
                    }
                    continue;
                }

                let (ma, vmax_local, headway_capped) =
                    get_ma_and_maxv(instance, state, train, &runs[i], &occupancy, i, tau, &vertex_free_time, schedule);
                runs[i].headway_capped = headway_capped;
                let (delta, new_v) = move_train(runs[i].v, vmax_local, train_spec.accel, train_spec.decel, dt, ma)?;

                if new_v > train_spec.vmax + rail_core::LINE_SPEED_ACCURACY {
                    let edge = runs[i]
                        .current_edge_index()
                        .and_then(|idx| state.train_edges(train).get(idx).copied())
                        .unwrap_or(EdgeId::INVALID);
                    return Err(SimulateError::Overspeed { train, edge });
                }

                runs[i].front += delta;
                runs[i].v = new_v;

                let arrived_at_stop = runs[i].next_stop_idx < schedule.stops.len()
                    && {
                        let target = state.stop_positions(train).get(runs[i].next_stop_idx).copied();
                        target.is_some_and(|p| (runs[i].front - p).abs() < rail_core::LINE_SPEED_ACCURACY)
                    };

                if new_v <= rail_core::LINE_SPEED_ACCURACY && arrived_at_stop {
                    if runs[i].brake_window.is_none() {
                        runs[i].brake_window = Some((tau, runs[i].front));
                    }
                    let stop = schedule.stops[runs[i].next_stop_idx];
                    if tau > stop.arrival_end as f64 && !options.late_stop_possible {
                        return Err(SimulateError::InfeasibleSchedule {
                            train,
                            cause: format!("missed stop window for station {}", stop.station),
                        });
                    }
                    runs[i].status = Status::Stopped;
                    runs[i].remaining_dwell = stop.min_dwell_secs as f64;
                }
            }

            // Dwell pass.
            for i in 0..num_trains {
                if runs[i].status != Status::Stopped {
                    continue;
                }
                runs[i].remaining_dwell -= dt;
                if runs[i].remaining_dwell <= 0.0 {
                    runs[i].next_stop_idx += 1;
                    runs[i].status = Status::Running;
                }
            }

            capacity_check(instance, &occupied_edges_snapshot(instance, state, &runs))?;

            let fronts: Vec<f64> = runs.iter().map(|r| r.front).collect();
            let speeds: Vec<f64> = runs.iter().map(|r| r.v).collect();
            observer.on_step(tau, &fronts, &speeds);

            // A dwelling train always makes progress (its remaining dwell
            // ticks down even though front/v/status hold steady), so it is
            // never itself evidence of a deadlock — nor is a train that has
            // simply exhausted its committed route (`waiting_on_commitment`)
            // or is riding the exit-headway cap down to a scheduled release
            // (`headway_capped`), or has not yet been admitted. Only a
            // `Running` train with no front/speed/status change counts as
            // genuinely stuck.
            let dwelling = runs.iter().any(|r| r.status == Status::Stopped);
            let any_running_stuck = runs.iter().zip(&before).any(|(r, b)| {
                r.status == Status::Running
                    && b.2 == Status::Running
                    && !r.waiting_on_commitment
                    && !r.headway_capped
                    && (r.front - b.0).abs() < rail_core::EPS
                    && (r.v - b.1).abs() < rail_core::EPS
            });
            let any_transition = runs.iter().zip(&before).any(|(r, b)| r.status != b.2);

            if !dwelling && !any_transition && any_running_stuck {
                return Err(SimulateError::Deadlock);
            }
            if !dwelling && !any_transition && !any_running_stuck {
                let all_stuck_on_commitment = runs
                    .iter()
                    .all(|r| r.status == Status::Exited || r.waiting_on_commitment || r.status == Status::NotEntered);
                if all_stuck_on_commitment {
                    break;
                }
            }

            tau += dt;
        }

        Ok(SimulationOutcome {
            exit_time: runs.iter().map(|r| r.exit_time).collect(),
            braking_window: runs.iter().map(|r| r.brake_window).collect(),
            vertex_free_time,
            delay: runs.iter().map(|r| r.delay).collect(),
            final_front: runs.iter().map(|r| r.front).collect(),
            final_v: runs.iter().map(|r| r.v).collect(),
        })
    }
}

/// Snapshot of which edges each train's `[rear, front]` interval currently
/// intersects, indexed by train.
fn occupied_edges_snapshot(instance: &Instance, state: &PartialState, runs: &[TrainRun]) -> Vec<Vec<EdgeId>> {
    runs.iter()
        .enumerate()
        .map(|(i, r)| {
            if !matches!(r.status, Status::Running | Status::Stopped) {
                return Vec::new();
            }
            let train = TrainId::try_from(i).expect("train index fits in TrainId");
            let length = instance.timetable.train(train).map(|t| t.length_m).unwrap_or(0.0);
            let rear = (r.front - length).max(0.0);
            let edges = state.train_edges(train);
            r.edge_starts
                .windows(2)
                .enumerate()
                .filter(|(_, w)| w[1] > rear && w[0] < r.front + rail_core::EPS)
                .filter_map(|(idx, _)| edges.get(idx).copied())
                .collect()
        })
        .collect()
}

fn entry_order_clear(state: &PartialState, train: TrainId, entry_vertex: VertexId, runs: &[TrainRun]) -> bool {
    let order = state.vertex_order(entry_vertex);
    let Some(pos) = order.iter().position(|&t| t == train) else {
        return true; // train not named in the order: no declared constraint
    };
    order[..pos].iter().all(|&earlier| runs[earlier.index()].status != Status::NotEntered)
}

fn edge_conflicts(instance: &Instance, e1: EdgeId, e2: EdgeId, t1: TrainId, t2: TrainId) -> bool {
    if instance.overlap(e1, e2, OverlapKind::Parallel) || instance.overlap(e1, e2, OverlapKind::Ttd) {
        return true;
    }
    if instance.overlap(e1, e2, OverlapKind::Reverse) {
        let bidi = |t: TrainId| instance.timetable.train(t).is_some_and(|tr| tr.bidirectional);
        return !(bidi(t1) || bidi(t2));
    }
    false
}

fn capacity_check(instance: &Instance, occupancy: &[Vec<EdgeId>]) -> SimulateResult<()> {
    for i in 0..occupancy.len() {
        for j in (i + 1)..occupancy.len() {
            for &e1 in &occupancy[i] {
                for &e2 in &occupancy[j] {
                    let ti = TrainId::try_from(i).expect("train index fits in TrainId");
                    let tj = TrainId::try_from(j).expect("train index fits in TrainId");
                    if edge_conflicts(instance, e1, e2, ti, tj) {
                        let ttd = instance.ttd_id(e1).or_else(|| instance.ttd_id(e2));
                        if let Some(ttd) = ttd {
                            return Err(SimulateError::CapacityViolation { ttd });
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Movement authority and local speed cap for `train`, per spec.md §4.6.4.
fn get_ma_and_maxv(
    instance: &Instance,
    state: &PartialState,
    train: TrainId,
    run: &TrainRun,
    occupancy: &[Vec<EdgeId>],
    self_index: usize,
    tau: f64,
    vertex_free_time: &[f64],
    schedule: &Schedule,
) -> (f64, f64, bool) {
    let committed = state.train_edges(train);
    let train_spec = instance.timetable.train(train).expect("train exists");

    let ma_route = run.total_committed() - run.front;

    let ma_stop = state
        .stop_positions(train)
        .get(run.next_stop_idx)
        .map(|&p| (p - run.front).max(0.0))
        .unwrap_or(f64::INFINITY);

    let mut ma_capacity = ma_route;
    if let Some(start_idx) = run.current_edge_index() {
        for idx in start_idx..committed.len() {
            let edge = committed[idx];
            let blocked = occupancy.iter().enumerate().any(|(other, edges)| {
                other != self_index
                    && edges.iter().any(|&oe| {
                        let other_train = TrainId::try_from(other).expect("train index fits in TrainId");
                        edge_conflicts(instance, edge, oe, train, other_train)
                    })
            });
            if blocked {
                ma_capacity = (run.edge_starts[idx] - run.front).max(0.0);
                break;
            }
        }
    }

    let mut vmax_local = train_spec.vmax;
    if let Some(idx) = run.current_edge_index() {
        if let Ok(edge) = instance.network.edge(committed[idx]) {
            vmax_local = vmax_local.min(edge.max_speed);
        }
        // Look ahead one edge if the braking distance from the current speed
        // reaches into it, honoring a lower speed limit early.
        if let Ok(braking) = rail_core::kinematics::braking_distance(run.v, train_spec.decel) {
            if run.edge_starts.get(idx + 1).is_some_and(|&b| b - run.front < braking) {
                if let Some(&next_edge) = committed.get(idx + 1) {
                    if let Ok(edge) = instance.network.edge(next_edge) {
                        vmax_local = vmax_local.min(edge.max_speed);
                    }
                }
            }
        }
    }

    // Exit-headway cap (spec.md §4.6.6). Once the train's committed route
    // ends at its own exit vertex and it is within braking range of that
    // boundary, `get_max_speed_exit_headway` pins both the authority and the
    // local speed cap to whatever the previous occupant's headway still
    // allows, so the train decelerates into the wait rather than coasting to
    // the boundary at `vmax_local` and stopping dead once parked there.
    let reaches_exit = committed.last().and_then(|&e| instance.network.edge(e).ok()).is_some_and(|e| e.target == schedule.exit);

    let mut headway_capped = false;
    let ma_exit = if reaches_exit {
        let free = vertex_free_time[schedule.exit.index()];
        let dist_to_exit = (run.total_committed() - run.front).max(0.0);
        let approach_window = rail_core::kinematics::braking_distance(train_spec.vmax, train_spec.decel).unwrap_or(dist_to_exit);
        if tau < free && dist_to_exit <= approach_window {
            vmax_local = vmax_local.min(get_max_speed_exit_headway(tau, free, vmax_local));
            headway_capped = true;
            dist_to_exit
        } else {
            f64::INFINITY
        }
    } else {
        f64::INFINITY
    };

    (ma_route.min(ma_capacity).min(ma_stop).min(ma_exit), vmax_local, headway_capped)
}

/// Post-step position/velocity update, per spec.md §4.6.5.
///
/// `target_v` is the fastest speed whose own braking distance still fits the
/// remaining authority (`get_v1_from_ma`). Reaching it by accelerating uses
/// the kernel's closed-form accelerate-then-cruise displacement; shedding
/// speed towards a tighter authority has no closed form in the kernel, so it
/// falls back to an average-velocity estimate over one `dt`. Either way, a
/// displacement that reaches `ma` is clamped to exactly `ma` with the train
/// parked at zero speed — by construction there is no room left to carry any
/// speed past that point.
fn move_train(v: f64, vmax_local: f64, a: f64, d: f64, dt: f64, ma: f64) -> SimulateResult<(f64, f64)> {
    if ma <= rail_core::EPS {
        return Ok((0.0, 0.0));
    }
    let target_v = vmax_local.min(rail_core::kinematics::get_v1_from_ma(v, ma, d, dt)?).max(0.0);

    let (delta, new_v) = if target_v >= v {
        let raw = rail_core::kinematics::max_braking_pos_after_dt_linear_movement(v, target_v.max(v), a, d, dt)?;
        (raw, (v + a * dt).min(target_v))
    } else {
        let braked_v = (v - d * dt).max(target_v).max(0.0);
        (0.5 * (v + braked_v) * dt, braked_v)
    };

    if delta >= ma - rail_core::LINE_SPEED_ACCURACY {
        Ok((ma, 0.0))
    } else {
        Ok((delta.max(0.0), new_v))
    }
}

/// Caps the speed approaching the exit vertex so the train does not arrive
/// earlier than the previous exit's headway release, per spec.md §4.6.6.
fn get_max_speed_exit_headway(tau: f64, free_time: f64, default_vmax: f64) -> f64 {
    if tau >= free_time {
        default_vmax
    } else {
        0.0
    }
}

/// Verifies `train`'s window is still admissible given its current status
/// and the simulated time `tau`, per spec.md §4.6.7.
fn is_feasible_to_schedule(
    train: TrainId,
    tau: f64,
    schedule: &Schedule,
    run: &TrainRun,
    options: &SimulatorOptions,
) -> SimulateResult<()> {
    match run.status {
        Status::NotEntered if tau > schedule.entry_window.1 as f64 && !options.late_entry_possible => {
            Err(SimulateError::InfeasibleSchedule { train, cause: "missed entry window".into() })
        }
        Status::Running | Status::Stopped
            if tau > schedule.exit_window.1 as f64 && !options.late_exit_possible && run.exit_time.is_none() =>
        {
            Err(SimulateError::InfeasibleSchedule { train, cause: "missed exit window".into() })
        }
        _ => Ok(()),
    }
}
