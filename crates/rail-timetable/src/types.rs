//! Core timetable types: `Train`, `Stop`, `Schedule`, `Station`, and the
//! aggregate `Timetable` with its consistency check.
//!
//! # Consistency model
//!
//! [`Timetable::check_consistency`] verifies the invariants spec'd for a
//! schedulable timetable without yet knowing which vertices a train may
//! brake to a halt at (that is [`Instance`](../rail_instance/index.html)'s
//! job, since it depends on train length). It checks:
//!
//! 1. Every train's entry vertex has exactly one outgoing edge and its exit
//!    vertex has exactly one incoming edge.
//! 2. Every stop references a station whose edges all exist in the network.
//! 3. A train's stops admit their own dwell and do not overlap each other
//!    in time (route order is the order they appear in `Schedule::stops`).
//! 4. The direct entry-to-exit shortest-path travel time fits inside the
//!    schedule window plus a fixed slack. Intermediate station stops widen
//!    the real feasible window rather than narrow it, so using the direct
//!    route is a conservative lower bound — the Instance/Solver layers
//!    enforce the tighter, stop-aware bound.

use rail_core::{EdgeId, StationId, TrainId, VertexId};
use rail_network::RailNetwork;

use crate::error::{TimetableError, TimetableResult};

/// Fixed scheduling slack applied when checking that a minimum-length route
/// fits inside a train's `[entry_window.0, exit_window.1]`.
pub const WINDOW_SLACK_SECS: u32 = 3600;

// ── Train ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Train {
    pub id: TrainId,
    pub name: String,
    pub length_m: f64,
    pub vmax: f64,
    pub accel: f64,
    pub decel: f64,
    pub bidirectional: bool,
}

// ── Stop ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    pub station: StationId,
    pub arrival_begin: u32,
    pub arrival_end: u32,
    pub min_dwell_secs: u32,
}

impl Stop {
    /// Length of the window in which the train may be dwelling.
    pub fn window_secs(&self) -> u32 {
        self.arrival_end.saturating_sub(self.arrival_begin)
    }

    /// Whether this stop's own window admits the required dwell.
    pub fn admits_own_dwell(&self) -> bool {
        self.window_secs() >= self.min_dwell_secs
    }
}

// ── Schedule ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    pub entry: VertexId,
    pub exit: VertexId,
    pub entry_window: (u32, u32),
    pub exit_window: (u32, u32),
    pub v0: f64,
    pub vn: f64,
    pub stops: Vec<Stop>,
}

// ── Station ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Station {
    pub name: String,
    pub edges: Vec<EdgeId>,
}

// ── Timetable ─────────────────────────────────────────────────────────────────

/// All trains, their schedules, and the named stations they may stop at.
///
/// `trains[i]` and `schedules[i]` describe the same train (indexed by
/// `TrainId`); `stations[i]` is indexed by `StationId`.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timetable {
    pub trains: Vec<Train>,
    pub schedules: Vec<Schedule>,
    pub stations: Vec<Station>,
}

impl Timetable {
    pub fn train(&self, id: TrainId) -> Option<&Train> {
        self.trains.get(id.index())
    }

    pub fn schedule(&self, id: TrainId) -> Option<&Schedule> {
        self.schedules.get(id.index())
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id.index())
    }

    pub fn check_consistency(&self, network: &RailNetwork) -> TimetableResult<()> {
        for (i, schedule) in self.schedules.iter().enumerate() {
            let train = TrainId::try_from(i).expect("train index fits in TrainId");
            self.check_entry_exit(train, schedule, network)?;
            self.check_stops(train, schedule, network)?;
            self.check_window(train, schedule, network)?;
        }
        Ok(())
    }

    fn check_entry_exit(
        &self,
        train: TrainId,
        schedule: &Schedule,
        network: &RailNetwork,
    ) -> TimetableResult<()> {
        network
            .vertex(schedule.entry)
            .map_err(|_| TimetableError::BadEntryExitVertex { train })?;
        network
            .vertex(schedule.exit)
            .map_err(|_| TimetableError::BadEntryExitVertex { train })?;

        if network.out_edges(schedule.entry).len() != 1 {
            return Err(TimetableError::BadEntryExitVertex { train });
        }
        if network.edges_entering(schedule.exit).len() != 1 {
            return Err(TimetableError::BadEntryExitVertex { train });
        }
        Ok(())
    }

    fn check_stops(
        &self,
        train: TrainId,
        schedule: &Schedule,
        network: &RailNetwork,
    ) -> TimetableResult<()> {
        let mut prev_end: Option<u32> = None;
        for stop in &schedule.stops {
            let station = self
                .station(stop.station)
                .ok_or(TimetableError::UnknownStationEdge { train, station: stop.station })?;
            for &edge in &station.edges {
                network
                    .edge(edge)
                    .map_err(|_| TimetableError::UnknownStationEdge { train, station: stop.station })?;
            }
            if !stop.admits_own_dwell() {
                return Err(TimetableError::ConflictingStops { train });
            }
            if let Some(end) = prev_end {
                if stop.arrival_begin < end {
                    return Err(TimetableError::ConflictingStops { train });
                }
            }
            prev_end = Some(stop.arrival_end);
        }
        Ok(())
    }

    fn check_window(
        &self,
        train: TrainId,
        schedule: &Schedule,
        network: &RailNetwork,
    ) -> TimetableResult<()> {
        let entry_edge = match network.out_edges(schedule.entry).first() {
            Some(&e) => e,
            None => return Err(TimetableError::BadEntryExitVertex { train }),
        };
        let vmax = self.train(train).map(|t| t.vmax).unwrap_or(f64::INFINITY);
        let path = network.shortest_path(entry_edge, schedule.exit, vmax);

        let Some(path) = path else {
            return Err(TimetableError::WindowTooTight { train });
        };

        let available = (schedule.exit_window.1 as f64 - schedule.entry_window.0 as f64)
            + WINDOW_SLACK_SECS as f64;
        if path.time_s > available {
            return Err(TimetableError::WindowTooTight { train });
        }
        Ok(())
    }
}
