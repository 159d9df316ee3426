//! Run reports.
//!
//! A report is a pure fold over the committed trips of one run plus the
//! gateway's final status. It carries the policy's configuration so a run
//! can be reproduced from its report alone.

use crate::{AllocationPolicy, FinalStatus, PolicyConfig, TripRecord};

/// Per-arm totals over one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmTally {
    pub trips: u64,
    pub units_sent: u64,
    pub surviving_trips: u64,
    pub units_survived: u64,
}

impl ArmTally {
    /// Fraction of trips to this arm that survived (0 when never visited).
    pub fn trip_success_rate(&self) -> f64 {
        if self.trips == 0 {
            0.0
        } else {
            self.surviving_trips as f64 / self.trips as f64
        }
    }
}

/// Final report for one run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunResult {
    pub run_number: u64,
    pub policy_name: String,
    pub policy_params: PolicyConfig,
    pub initial_budget: u64,
    /// `final_arrived_count / initial_budget * 100`; 0 for an empty budget.
    pub success_percentage: f64,
    pub final_arrived_count: u64,
    pub final_lost_count: u64,
    pub total_trips: u64,
    pub per_arm: Vec<ArmTally>,
    pub trips: Vec<TripRecord>,
}

/// Folds trip history into a [`RunResult`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummarizer;

impl RunSummarizer {
    pub fn summarize(
        run_number: u64,
        policy: &dyn AllocationPolicy,
        initial_budget: u64,
        status: FinalStatus,
        arm_count: usize,
        trips: Vec<TripRecord>,
    ) -> RunResult {
        let success_percentage = if initial_budget == 0 {
            0.0
        } else {
            status.arrived_count as f64 / initial_budget as f64 * 100.0
        };
        RunResult {
            run_number,
            policy_name: policy.name(),
            policy_params: policy.config(),
            initial_budget,
            success_percentage,
            final_arrived_count: status.arrived_count,
            final_lost_count: status.lost_count,
            total_trips: trips.len() as u64,
            per_arm: tally(arm_count, &trips),
            trips,
        }
    }
}

/// Per-arm tallies; trips against arms `>= arm_count` are skipped.
pub fn tally(arm_count: usize, trips: &[TripRecord]) -> Vec<ArmTally> {
    trips
        .iter()
        .fold(vec![ArmTally::default(); arm_count], |mut acc, t| {
            if let Some(a) = acc.get_mut(t.arm) {
                a.trips += 1;
                a.units_sent += t.units_sent;
                if t.survived {
                    a.surviving_trips += 1;
                    a.units_survived += t.units_sent;
                }
            }
            acc
        })
}
