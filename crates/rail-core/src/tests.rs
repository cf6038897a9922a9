//! Unit tests for rail-core primitives not already covered inline
//! (`kinematics` keeps its own `#[cfg(test)]` module next to the formulas).

#[cfg(test)]
mod ids {
    use crate::{EdgeId, TrainId, VertexId};

    #[test]
    fn index_roundtrip() {
        let id = TrainId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(TrainId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(TrainId(0) < TrainId(1));
        assert!(VertexId(100) > VertexId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(TrainId::INVALID.0, u32::MAX);
        assert_eq!(VertexId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::INVALID.0, u32::MAX);
        assert!(!TrainId::INVALID.is_valid());
        assert!(TrainId(0).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(TrainId(7).to_string(), "TrainId(7)");
    }

    #[test]
    fn default_is_invalid() {
        assert_eq!(VertexId::default(), VertexId::INVALID);
    }
}

#[cfg(test)]
mod config {
    use crate::SimTimeConfig;

    #[test]
    fn default_matches_documented_constants() {
        let cfg = SimTimeConfig::default();
        assert_eq!(cfg.dt, 6.0);
        assert_eq!(cfg.v_min, 1.0);
    }

    #[test]
    fn new_overrides_both_fields() {
        let cfg = SimTimeConfig::new(1.0, 0.5);
        assert_eq!(cfg.dt, 1.0);
        assert_eq!(cfg.v_min, 0.5);
    }
}

#[cfg(test)]
mod error {
    use crate::{RailError, TrainId};

    #[test]
    fn infeasible_schedule_displays_train_and_cause() {
        let e = RailError::InfeasibleSchedule {
            train: TrainId(3),
            cause: "overspeed".to_string(),
        };
        assert_eq!(e.to_string(), "infeasible schedule for train TrainId(3): overspeed");
    }

    #[test]
    fn not_existent_displays_kind_and_key() {
        let e = RailError::NotExistent {
            kind: "vertex",
            key: "v99".to_string(),
        };
        assert_eq!(e.to_string(), "vertex v99 does not exist");
    }
}
