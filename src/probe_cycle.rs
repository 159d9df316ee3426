//! Fixed-dwell round-robin.
//!
//! Sends `units_per_trip` to the current arm for `trips_per_arm` consecutive
//! trips, then advances to the next arm (wrapping). Outcomes do not influence
//! the choice; budget exhaustion is the only stop.

use tracing::info;

use crate::{
    AllocationPolicy, Decision, DecisionContext, DecisionNote, Error, PolicyConfig, Result,
    TripFeedback,
};

/// Configuration for [`ProbeCycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProbeCycleConfig {
    /// Consecutive trips spent on an arm before moving on (`K`).
    pub trips_per_arm: u64,
    /// Units sent on every trip.
    pub units_per_trip: u64,
}

impl Default for ProbeCycleConfig {
    fn default() -> Self {
        Self {
            trips_per_arm: 12,
            units_per_trip: 1,
        }
    }
}

/// Round-robin policy with a fixed dwell per arm.
#[derive(Debug, Clone)]
pub struct ProbeCycle {
    cfg: ProbeCycleConfig,
    arm_count: usize,
    current: usize,
    dwell: u64,
}

impl ProbeCycle {
    pub fn new(cfg: ProbeCycleConfig, arm_count: usize) -> Result<Self> {
        if arm_count == 0 {
            return Err(Error::config("probe cycle needs at least one arm"));
        }
        if cfg.trips_per_arm == 0 {
            return Err(Error::config("trips_per_arm must be at least 1"));
        }
        if cfg.units_per_trip == 0 {
            return Err(Error::config("units_per_trip must be at least 1"));
        }
        Ok(Self {
            cfg,
            arm_count,
            current: 0,
            dwell: 0,
        })
    }

    /// Arm the next decision will target.
    pub fn current_arm(&self) -> usize {
        self.current
    }
}

impl AllocationPolicy for ProbeCycle {
    fn decide(&mut self, _ctx: &DecisionContext<'_>) -> Decision {
        Decision::new(
            self.current,
            self.cfg.units_per_trip,
            DecisionNote::Cycle { dwell: self.dwell },
        )
    }

    fn observe(&mut self, _feedback: &TripFeedback) {
        self.dwell += 1;
        if self.dwell >= self.cfg.trips_per_arm {
            let previous = self.current;
            self.dwell = 0;
            self.current = (self.current + 1) % self.arm_count;
            info!(
                from = previous,
                to = self.current,
                trips = self.cfg.trips_per_arm,
                "probe cycle advancing"
            );
        }
    }

    fn reset(&mut self) {
        self.current = 0;
        self.dwell = 0;
    }

    fn name(&self) -> String {
        format!("ProbeCycle_{}", self.cfg.trips_per_arm)
    }

    fn config(&self) -> PolicyConfig {
        PolicyConfig::ProbeCycle(self.cfg)
    }
}
