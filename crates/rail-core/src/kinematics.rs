//! Pure closed-form kinematics kernel.
//!
//! Every function here is a pure `f64` computation: no I/O, no allocation
//! beyond its return value, and a fixed left-to-right summation order so
//! that two calls with bitwise-identical inputs produce bitwise-identical
//! outputs (required for reproducible simulator/solver runs).
//!
//! All functions reject negative speeds, non-positive `a`/`d`, negative
//! `dt`, and `v > vmax + EPS` with [`RailError::InvalidInput`].

use crate::config::EPS;
use crate::error::{CoreResult, RailError};

fn invalid(msg: impl Into<String>) -> RailError {
    RailError::InvalidInput(msg.into())
}

fn check_speed(name: &str, v: f64) -> CoreResult<()> {
    if v < -EPS {
        return Err(invalid(format!("{name} must be non-negative, got {v}")));
    }
    Ok(())
}

fn check_rate(name: &str, rate: f64) -> CoreResult<()> {
    if rate <= 0.0 {
        return Err(invalid(format!("{name} must be positive, got {rate}")));
    }
    Ok(())
}

fn check_vmax(v: f64, vmax: f64) -> CoreResult<()> {
    if v > vmax + EPS {
        return Err(invalid(format!("speed {v} exceeds vmax {vmax}")));
    }
    Ok(())
}

/// Distance needed to brake from `v` to a stop at deceleration `d`.
///
/// `braking_distance(v, d) = v² / (2d)`.
pub fn braking_distance(v: f64, d: f64) -> CoreResult<f64> {
    check_speed("v", v)?;
    check_rate("d", d)?;
    Ok(v * v / (2.0 * d))
}

/// Time to traverse distance `s` starting at `v0`, ending at `v1` exactly
/// at `s`, never exceeding `vmax`, under acceleration `a` and deceleration
/// `d`. Returns `f64::INFINITY` if no such profile exists.
///
/// The time-optimal profile accelerates from `v0` towards `vmax`, cruises,
/// then decelerates to `v1`; if `s` is too short to reach `vmax` the cruise
/// phase collapses and the peak speed is the largest value reachable by a
/// pure accelerate-then-brake ("triangular") profile.
pub fn min_travel_time(v0: f64, v1: f64, vmax: f64, a: f64, d: f64, s: f64) -> CoreResult<f64> {
    check_speed("v0", v0)?;
    check_speed("v1", v1)?;
    check_rate("vmax", vmax)?;
    check_rate("a", a)?;
    check_rate("d", d)?;
    check_vmax(v0, vmax)?;
    check_vmax(v1, vmax)?;
    if s < -EPS {
        return Err(invalid(format!("s must be non-negative, got {s}")));
    }
    let s = s.max(0.0);

    let d_acc = (vmax * vmax - v0 * v0) / (2.0 * a);
    let d_dec = (vmax * vmax - v1 * v1) / (2.0 * d);

    if d_acc >= -EPS && d_dec >= -EPS && d_acc + d_dec <= s + EPS {
        // Trapezoidal profile: accelerate to vmax, cruise, brake to v1.
        let cruise_dist = (s - d_acc - d_dec).max(0.0);
        let t_acc = (vmax - v0) / a;
        let t_dec = (vmax - v1) / d;
        let t_cruise = cruise_dist / vmax;
        return Ok(t_acc + t_dec + t_cruise);
    }

    // Triangular profile: find the peak speed vp reached by accelerating
    // from v0 then immediately decelerating to v1 over exactly distance s.
    let denom = 1.0 / (2.0 * a) + 1.0 / (2.0 * d);
    let vp_sq = (s + v0 * v0 / (2.0 * a) + v1 * v1 / (2.0 * d)) / denom;
    if vp_sq < v0 * v0 - EPS || vp_sq < v1 * v1 - EPS {
        // s too short even for a direct v0 -> v1 transition.
        return Ok(f64::INFINITY);
    }
    let vp = vp_sq.max(0.0).sqrt();
    let t_acc = (vp - v0) / a;
    let t_dec = (vp - v1) / d;
    if t_acc < -EPS || t_dec < -EPS {
        return Ok(f64::INFINITY);
    }
    Ok(t_acc.max(0.0) + t_dec.max(0.0))
}

/// The dual of [`min_travel_time`]: the longest time to traverse `s` from
/// `v0` to `v1` without ever dwelling below `vmin`. The slowest profile
/// decelerates from `v0` down to `vmin`, cruises, then accelerates to `v1`.
pub fn max_travel_time_no_stopping(
    v0: f64,
    v1: f64,
    vmin: f64,
    a: f64,
    d: f64,
    s: f64,
) -> CoreResult<f64> {
    check_speed("v0", v0)?;
    check_speed("v1", v1)?;
    check_rate("vmin", vmin)?;
    check_rate("a", a)?;
    check_rate("d", d)?;
    if v0 < vmin - EPS || v1 < vmin - EPS {
        return Err(invalid("v0 and v1 must be at least vmin"));
    }
    if s < -EPS {
        return Err(invalid(format!("s must be non-negative, got {s}")));
    }
    let s = s.max(0.0);

    let d_dec = (v0 * v0 - vmin * vmin) / (2.0 * d);
    let d_acc = (v1 * v1 - vmin * vmin) / (2.0 * a);

    if d_dec >= -EPS && d_acc >= -EPS && d_dec + d_acc <= s + EPS {
        let cruise_dist = (s - d_dec - d_acc).max(0.0);
        let t_dec = (v0 - vmin) / d;
        let t_acc = (v1 - vmin) / a;
        let t_cruise = cruise_dist / vmin;
        return Ok(t_dec + t_acc + t_cruise);
    }

    // Trough profile: decelerate from v0 down to vt, then accelerate to v1.
    let denom = 1.0 / (2.0 * d) + 1.0 / (2.0 * a);
    let vt_sq = (v0 * v0 / (2.0 * d) + v1 * v1 / (2.0 * a) - s) / denom;
    if vt_sq > v0 * v0 + EPS || vt_sq > v1 * v1 + EPS || vt_sq < -EPS {
        return Ok(f64::INFINITY);
    }
    let vt = vt_sq.max(0.0).sqrt();
    let t_dec = (v0 - vt) / d;
    let t_acc = (v1 - vt) / a;
    if t_dec < -EPS || t_acc < -EPS {
        return Ok(f64::INFINITY);
    }
    Ok(t_dec.max(0.0) + t_acc.max(0.0))
}

/// Extremal position reachable by accelerating (capped at `vmax`) for `dt`
/// seconds starting at `v0` — the forward excursion used to bound movement
/// authority before the subsequent braking phase is considered.
pub fn max_braking_pos_after_dt_linear_movement(
    v0: f64,
    vmax: f64,
    a: f64,
    d: f64,
    dt: f64,
) -> CoreResult<f64> {
    check_speed("v0", v0)?;
    check_rate("vmax", vmax)?;
    check_rate("a", a)?;
    check_rate("d", d)?;
    check_vmax(v0, vmax)?;
    if dt < -EPS {
        return Err(invalid(format!("dt must be non-negative, got {dt}")));
    }
    let dt = dt.max(0.0);

    let t_to_cap = (vmax - v0) / a;
    if t_to_cap >= dt {
        // Never reaches vmax within the window: pure acceleration.
        Ok(v0 * dt + 0.5 * a * dt * dt)
    } else {
        let dist_to_cap = v0 * t_to_cap + 0.5 * a * t_to_cap * t_to_cap;
        let cruise_time = dt - t_to_cap;
        Ok(dist_to_cap + vmax * cruise_time)
    }
}

/// The largest `v1` reachable at time `dt` (starting at `v0`, under
/// acceleration `a`) such that the resulting braking distance at
/// deceleration `d` does not exceed the movement authority `ma`.
pub fn get_v1_from_ma(v0: f64, ma: f64, d: f64, dt: f64) -> CoreResult<f64> {
    check_speed("v0", v0)?;
    check_rate("d", d)?;
    if ma < -EPS {
        return Err(invalid(format!("ma must be non-negative, got {ma}")));
    }
    if dt < -EPS {
        return Err(invalid(format!("dt must be non-negative, got {dt}")));
    }
    let ma = ma.max(0.0);
    let _ = (v0, dt);
    Ok((2.0 * d * ma).sqrt())
}

/// Remaining-time estimator used by the `Simple` heuristic (A* search).
///
/// Estimates the time to cover distance `s` starting at `v0`, never
/// exceeding the local speed cap `v1`, ending at `vfinal` exactly at `s`,
/// under acceleration `a` and deceleration `d`; `dt` is added as the
/// book-keeping delay before this profile begins. Returns
/// `f64::INFINITY` when reaching `vfinal` exactly at `s` is kinematically
/// impossible (e.g. `vfinal == 0` forced at a location with no stop).
///
/// Four regimes fall out of the shared trapezoid/triangle solve inside
/// [`min_travel_time`]: accelerate-only (never reaches the cap),
/// accelerate-cap-brake (full trapezoid), brake-only (`v0` already above
/// `vfinal` and above the cap never applies), and brake-below-cruise then
/// re-accelerate (triangular profile dips below both `v0` and `vfinal`).
pub fn time_to_exit_objective(
    v0: f64,
    v1: f64,
    vfinal: f64,
    s: f64,
    a: f64,
    d: f64,
    dt: f64,
) -> CoreResult<f64> {
    check_speed("v0", v0)?;
    check_speed("v1", v1)?;
    check_speed("vfinal", vfinal)?;
    check_rate("a", a)?;
    check_rate("d", d)?;
    if dt < -EPS {
        return Err(invalid(format!("dt must be non-negative, got {dt}")));
    }
    let remaining = min_travel_time(v0, vfinal, v1.max(v0).max(vfinal), a, d, s)?;
    if remaining.is_infinite() {
        return Ok(f64::INFINITY);
    }
    Ok(dt.max(0.0) + remaining)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn braking_distance_basic() {
        let bd = braking_distance(10.0, 2.0).unwrap();
        assert!((bd - 25.0).abs() < 1e-9);
    }

    #[test]
    fn braking_distance_rejects_negative_speed() {
        assert!(braking_distance(-1.0, 2.0).is_err());
    }

    #[test]
    fn braking_distance_rejects_nonpositive_decel() {
        assert!(braking_distance(10.0, 0.0).is_err());
    }

    #[test]
    fn min_travel_time_trapezoid() {
        // v0=0, v1=0, vmax=50, a=4, d=2, s=5000 (scenario (a) from the fixture set)
        let t = min_travel_time(15.0, 40.0, 50.0, 4.0, 2.0, 5000.0).unwrap();
        assert!(t.is_finite());
        assert!(t > 0.0);
    }

    #[test]
    fn min_travel_time_short_distance_is_triangular() {
        let t = min_travel_time(0.0, 0.0, 50.0, 4.0, 2.0, 10.0).unwrap();
        assert!(t.is_finite());
    }

    #[test]
    fn min_travel_time_infeasible_is_infinite() {
        // Cannot decelerate from 40 to 0 within 1 metre at d=2.
        let t = min_travel_time(40.0, 0.0, 50.0, 4.0, 2.0, 1.0).unwrap();
        assert!(t.is_infinite());
    }

    #[test]
    fn min_travel_time_rejects_speed_above_vmax() {
        assert!(min_travel_time(60.0, 0.0, 50.0, 4.0, 2.0, 100.0).is_err());
    }

    #[test]
    fn max_travel_time_no_stopping_respects_floor() {
        let t = max_travel_time_no_stopping(20.0, 20.0, 5.0, 2.0, 2.0, 1000.0).unwrap();
        assert!(t.is_finite());
        let fast = min_travel_time(20.0, 20.0, 50.0, 2.0, 2.0, 1000.0).unwrap();
        assert!(t > fast, "slow profile should take longer than the fast one");
    }

    #[test]
    fn get_v1_from_ma_caps_speed() {
        let v1 = get_v1_from_ma(10.0, 50.0, 2.0, 6.0).unwrap();
        // braking_distance(v1, 2.0) must not exceed 50.
        assert!(braking_distance(v1, 2.0).unwrap() <= 50.0 + 1e-6);
    }

    #[test]
    fn time_to_exit_objective_stop_at_non_stop_is_infinite() {
        // 1 metre remaining, current speed 40, forced to reach 0 exactly there: impossible.
        let t = time_to_exit_objective(40.0, 50.0, 0.0, 1.0, 4.0, 2.0, 6.0).unwrap();
        assert!(t.is_infinite());
    }

    #[test]
    fn time_to_exit_objective_reproducible() {
        let a = time_to_exit_objective(15.0, 50.0, 40.0, 5000.0, 4.0, 2.0, 6.0).unwrap();
        let b = time_to_exit_objective(15.0, 50.0, 40.0, 5000.0, 4.0, 2.0, 6.0).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
