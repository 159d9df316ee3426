//! The trip loop.
//!
//! One run: start an episode, then repeatedly ask the policy for a decision,
//! clamp it to the remaining budget, hand it to the gateway, and fold the
//! outcome back into the estimator and the trip history. The loop ends
//! exactly when the budget reaches zero.
//!
//! A trip is committed only after the gateway answered and the answer passed
//! validation. A gateway failure or contract breach aborts the run with the
//! budget as of the last committed trip.

use tracing::{debug, info};

use crate::{
    AllocationOutcome, AllocationPolicy, Decision, DecisionContext, DecisionNote, EpisodeGateway,
    Error, InvariantViolation, Result, RollingEstimator, RunResult, RunSummarizer, TripFeedback,
};

/// Engine-wide knobs shared by every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Number of arms, indexed `0..arm_count`.
    pub arm_count: usize,
    /// Rolling window capacity per arm (`W`).
    pub window_capacity: usize,
    /// Emit a progress line with current estimates every this many trips (0 disables).
    pub log_every: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            arm_count: 3,
            window_capacity: 20,
            log_every: 25,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.arm_count == 0 {
            return Err(Error::config("arm_count must be at least 1"));
        }
        if self.window_capacity == 0 {
            return Err(Error::config("window_capacity must be at least 1"));
        }
        Ok(())
    }
}

/// One committed trip: the decision plus what the gateway reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripRecord {
    /// 1-based trip number within the run.
    pub trip_number: u64,
    pub arm: usize,
    pub units_requested: u64,
    pub units_sent: u64,
    pub survived: bool,
    pub remaining_budget: u64,
    pub arrived_count: u64,
    pub lost_count: u64,
    pub steps_taken: u64,
    pub note: DecisionNote,
}

impl TripRecord {
    fn new(trip_number: u64, decision: &Decision, outcome: &AllocationOutcome) -> Self {
        Self {
            trip_number,
            arm: decision.arm,
            units_requested: decision.units,
            units_sent: outcome.units_sent,
            survived: outcome.survived,
            remaining_budget: outcome.remaining_budget,
            arrived_count: outcome.arrived_count,
            lost_count: outcome.lost_count,
            steps_taken: outcome.steps_taken,
            note: decision.note,
        }
    }
}

/// Drives a policy against a gateway until the episode budget is spent.
#[derive(Debug)]
pub struct TripOrchestrator<G> {
    gateway: G,
    cfg: EngineConfig,
}

impl<G: EpisodeGateway> TripOrchestrator<G> {
    pub fn new(gateway: G, cfg: EngineConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self { gateway, cfg })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }

    /// Run one full episode with `policy`.
    ///
    /// The policy is reset first; estimator windows start empty.
    pub async fn run_episode(
        &mut self,
        run_number: u64,
        policy: &mut dyn AllocationPolicy,
    ) -> Result<RunResult> {
        let start = self.gateway.start_episode().await?;
        let initial_budget = start.initial_budget;
        info!(
            run = run_number,
            policy = %policy.name(),
            budget = initial_budget,
            "starting run"
        );

        policy.reset();
        let mut estimator = RollingEstimator::new(self.cfg.arm_count, self.cfg.window_capacity);
        let mut trips: Vec<TripRecord> = Vec::new();
        let mut budget = initial_budget;

        while budget > 0 {
            let trip_index = trips.len() as u64;
            let decision = policy.decide(&DecisionContext {
                trip_index,
                remaining: budget,
                estimator: &estimator,
            });
            self.check_decision(trip_index, &decision)?;

            let units = decision.units.min(budget);
            let outcome = self.gateway.allocate(decision.arm, units).await?;
            check_outcome(budget, units, &outcome)?;

            budget -= outcome.units_sent;
            estimator.record(decision.arm, outcome.survived);
            policy.observe(&TripFeedback {
                arm: decision.arm,
                units_sent: outcome.units_sent,
                survived: outcome.survived,
            });
            let record = TripRecord::new(trip_index + 1, &decision, &outcome);
            debug!(
                run = run_number,
                trip = record.trip_number,
                arm = record.arm,
                sent = record.units_sent,
                survived = record.survived,
                remaining = budget,
                "trip"
            );
            trips.push(record);

            if self.cfg.log_every > 0 && record.trip_number % self.cfg.log_every == 0 {
                info!(
                    run = run_number,
                    trip = record.trip_number,
                    remaining = budget,
                    arrived = record.arrived_count,
                    estimates = ?estimator.estimates(),
                    "progress"
                );
            }
        }

        let status = self.gateway.final_status().await?;
        let result = RunSummarizer::summarize(
            run_number,
            &*policy,
            initial_budget,
            status,
            self.cfg.arm_count,
            trips,
        );
        info!(
            run = run_number,
            arrived = result.final_arrived_count,
            lost = result.final_lost_count,
            success_pct = result.success_percentage,
            trips = result.total_trips,
            "run complete"
        );
        Ok(result)
    }

    fn check_decision(&self, trip_index: u64, d: &Decision) -> Result<()> {
        if d.arm >= self.cfg.arm_count {
            return Err(InvariantViolation::ArmOutOfRange {
                arm: d.arm,
                arm_count: self.cfg.arm_count,
            }
            .into());
        }
        if d.units == 0 {
            return Err(InvariantViolation::ZeroUnits { trip_index }.into());
        }
        Ok(())
    }
}

fn check_outcome(before: u64, requested: u64, o: &AllocationOutcome) -> Result<()> {
    if o.units_sent > requested {
        return Err(InvariantViolation::OverSent {
            requested,
            sent: o.units_sent,
        }
        .into());
    }
    if o.units_sent == 0 {
        return Err(InvariantViolation::NoProgress { requested }.into());
    }
    if o.remaining_budget != before - o.units_sent {
        return Err(InvariantViolation::BudgetMismatch {
            before,
            sent: o.units_sent,
            reported: o.remaining_budget,
        }
        .into());
    }
    Ok(())
}
