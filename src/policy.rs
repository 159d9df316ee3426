//! `AllocationPolicy`: the common interface of every allocation strategy.
//!
//! All variants share the same two-method shape: `decide(ctx) -> Decision`
//! before a trip, `observe(feedback)` after it. The orchestrator only ever
//! talks to this trait, so strategies can be swapped without touching the
//! trip loop.
//!
//! Policies own their counters and RNG. Nothing is shared across runs: the
//! runner builds a fresh policy from its [`PolicyConfig`] for every run.

use crate::{
    Decision, DecisionContext, EpsilonGreedy, EpsilonGreedyConfig, FixedArm, FixedArmConfig,
    ProbeCycle, ProbeCycleConfig, Result, TripFeedback, UniformRandom, UniformRandomConfig,
};

/// Common interface for stateful allocation policies.
///
/// # Example
///
/// ```rust
/// use ferry::{AllocationPolicy, DecisionContext, ProbeCycle, ProbeCycleConfig, RollingEstimator};
///
/// let est = RollingEstimator::new(3, 20);
/// let mut p = ProbeCycle::new(ProbeCycleConfig { trips_per_arm: 2, units_per_trip: 1 }, 3).unwrap();
/// let ctx = DecisionContext { trip_index: 0, remaining: 10, estimator: &est };
/// assert_eq!(p.decide(&ctx).arm, 0);
/// ```
pub trait AllocationPolicy: Send {
    /// Choose the next `(arm, units)`. Must return an arm in
    /// `0..ctx.arm_count()` and at least one unit.
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Decision;

    /// Feed back the completed trip. Default: stateless.
    fn observe(&mut self, _feedback: &TripFeedback) {}

    /// Reset per-run counters.
    fn reset(&mut self) {}

    /// Stable, human-readable name used in run reports.
    fn name(&self) -> String;

    /// The configuration this policy was built from.
    fn config(&self) -> PolicyConfig;
}

/// Which policy family a config or report refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PolicyKind {
    ProbeCycle,
    EpsilonGreedy,
    UniformRandom,
    FixedArm,
}

/// Serializable policy configuration; `build` turns it into a live policy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "policy", rename_all = "snake_case"))]
pub enum PolicyConfig {
    ProbeCycle(ProbeCycleConfig),
    EpsilonGreedy(EpsilonGreedyConfig),
    UniformRandom(UniformRandomConfig),
    FixedArm(FixedArmConfig),
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig::EpsilonGreedy(EpsilonGreedyConfig::default())
    }
}

impl PolicyConfig {
    pub fn kind(&self) -> PolicyKind {
        match self {
            PolicyConfig::ProbeCycle(_) => PolicyKind::ProbeCycle,
            PolicyConfig::EpsilonGreedy(_) => PolicyKind::EpsilonGreedy,
            PolicyConfig::UniformRandom(_) => PolicyKind::UniformRandom,
            PolicyConfig::FixedArm(_) => PolicyKind::FixedArm,
        }
    }

    /// Build a policy for `arm_count` arms. `seed` drives any randomness.
    pub fn build(&self, arm_count: usize, seed: u64) -> Result<Box<dyn AllocationPolicy>> {
        let policy: Box<dyn AllocationPolicy> = match self {
            PolicyConfig::ProbeCycle(c) => Box::new(ProbeCycle::new(*c, arm_count)?),
            PolicyConfig::EpsilonGreedy(c) => {
                Box::new(EpsilonGreedy::with_seed(*c, arm_count, seed)?)
            }
            PolicyConfig::UniformRandom(c) => {
                Box::new(UniformRandom::with_seed(*c, arm_count, seed)?)
            }
            PolicyConfig::FixedArm(c) => Box::new(FixedArm::new(*c, arm_count)?),
        };
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RollingEstimator;

    fn all_configs() -> Vec<PolicyConfig> {
        vec![
            PolicyConfig::ProbeCycle(ProbeCycleConfig::default()),
            PolicyConfig::EpsilonGreedy(EpsilonGreedyConfig::default()),
            PolicyConfig::UniformRandom(UniformRandomConfig::default()),
            PolicyConfig::FixedArm(FixedArmConfig::default()),
        ]
    }

    fn run_generic(p: &mut dyn AllocationPolicy, arm_count: usize) {
        let mut est = RollingEstimator::new(arm_count, 5);
        for t in 0..200u64 {
            let ctx = DecisionContext {
                trip_index: t,
                remaining: 1_000 - t,
                estimator: &est,
            };
            let d = p.decide(&ctx);
            assert!(d.arm < arm_count, "arm {} out of range", d.arm);
            assert!(d.units >= 1);
            let survived = t % 3 == 0;
            est.record(d.arm, survived);
            p.observe(&TripFeedback {
                arm: d.arm,
                units_sent: d.units,
                survived,
            });
        }
    }

    #[test]
    fn every_variant_stays_in_range_and_sends_units() {
        for cfg in all_configs() {
            let mut p = cfg.build(3, 7).unwrap();
            run_generic(p.as_mut(), 3);
        }
    }

    #[test]
    fn built_policy_reports_its_config() {
        for cfg in all_configs() {
            let p = cfg.build(3, 0).unwrap();
            assert_eq!(p.config(), cfg);
            assert_eq!(p.config().kind(), cfg.kind());
        }
    }

    #[test]
    fn build_rejects_zero_arms() {
        for cfg in all_configs() {
            assert!(cfg.build(0, 0).is_err());
        }
    }
}
