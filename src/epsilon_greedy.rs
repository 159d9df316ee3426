//! Two-phase epsilon-greedy allocation.
//!
//! Phases:
//! - **Probe** (`trip_index < probe_trips_per_arm * arm_count`): round-robin in
//!   arm order, `probe_units` per trip, ignoring estimates. This fills every
//!   arm's rolling window before estimates are acted on.
//! - **Exploit**: draw `r` in `[0, 1)`. If `r < epsilon`, send `explore_units`
//!   to a uniformly random arm; otherwise send `exploit_units` to the arm with
//!   the highest rolling estimate.
//!
//! The policy is **seedable**; the same seed and the same feedback replay the
//! same decisions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{
    AllocationPolicy, Decision, DecisionContext, DecisionNote, Error, PolicyConfig, Result,
    RollingEstimator,
};

/// How to break ties between arms sharing the maximum estimate.
///
/// An arm with an empty window estimates `0.0`, the same as an arm observed
/// to lose every trip. `LowestIndex` treats them identically; `FewestSamples`
/// prefers the less-observed arm among the tied ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TieBreak {
    #[default]
    LowestIndex,
    /// Fewest window samples first, then lowest index.
    FewestSamples,
}

/// Configuration for [`EpsilonGreedy`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EpsilonGreedyConfig {
    /// Probability of the explore branch once probing is over. Must be in `[0, 1]`.
    pub epsilon: f64,
    /// Probe trips per arm; the probe phase lasts this times the arm count.
    pub probe_trips_per_arm: u64,
    /// Units per probe trip.
    pub probe_units: u64,
    /// Units per exploration trip.
    pub explore_units: u64,
    /// Units per exploitation trip.
    pub exploit_units: u64,
    pub tie_break: TieBreak,
}

impl Default for EpsilonGreedyConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.4,
            probe_trips_per_arm: 20,
            probe_units: 1,
            explore_units: 1,
            exploit_units: 3,
            tie_break: TieBreak::LowestIndex,
        }
    }
}

impl EpsilonGreedyConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon.is_finite() && (0.0..=1.0).contains(&self.epsilon)) {
            return Err(Error::config(format!(
                "epsilon must be in [0, 1], got {}",
                self.epsilon
            )));
        }
        if self.probe_units == 0 || self.explore_units == 0 || self.exploit_units == 0 {
            return Err(Error::config("epsilon-greedy unit counts must be at least 1"));
        }
        Ok(())
    }
}

/// Index of the best arm under `tie_break`, or `None` if there are no arms.
pub fn best_arm(estimator: &RollingEstimator, tie_break: TieBreak) -> Option<usize> {
    let mut best: Option<(usize, f64, usize)> = None;
    for arm in 0..estimator.arm_count() {
        let est = estimator.estimate(arm);
        let n = estimator.samples(arm);
        let better = match best {
            None => true,
            Some((_, best_est, best_n)) => {
                est > best_est
                    || (est == best_est && tie_break == TieBreak::FewestSamples && n < best_n)
            }
        };
        if better {
            best = Some((arm, est, n));
        }
    }
    best.map(|(arm, _, _)| arm)
}

/// Seedable two-phase epsilon-greedy policy.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    cfg: EpsilonGreedyConfig,
    arm_count: usize,
    rng: StdRng,
}

impl EpsilonGreedy {
    /// Create with a deterministic fixed seed (0).
    pub fn new(cfg: EpsilonGreedyConfig, arm_count: usize) -> Result<Self> {
        Self::with_seed(cfg, arm_count, 0)
    }

    /// Create with an explicit seed (reproducible).
    pub fn with_seed(cfg: EpsilonGreedyConfig, arm_count: usize, seed: u64) -> Result<Self> {
        cfg.validate()?;
        if arm_count == 0 {
            return Err(Error::config("epsilon-greedy needs at least one arm"));
        }
        Ok(Self {
            cfg,
            arm_count,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Length of the probe phase in trips.
    pub fn probe_trip_count(&self) -> u64 {
        self.cfg.probe_trips_per_arm.saturating_mul(self.arm_count as u64)
    }
}

impl AllocationPolicy for EpsilonGreedy {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Decision {
        if ctx.trip_index < self.probe_trip_count() {
            let arm = (ctx.trip_index % self.arm_count as u64) as usize;
            return Decision::new(arm, self.cfg.probe_units, DecisionNote::Probe);
        }

        let r: f64 = self.rng.random();
        if r < self.cfg.epsilon {
            let arm = self.rng.random_range(0..self.arm_count);
            return Decision::new(arm, self.cfg.explore_units, DecisionNote::Explore);
        }

        let arm = best_arm(ctx.estimator, self.cfg.tie_break).unwrap_or(0);
        Decision::new(arm, self.cfg.exploit_units, DecisionNote::Exploit)
    }

    fn name(&self) -> String {
        "EpsilonGreedy".to_string()
    }

    fn config(&self) -> PolicyConfig {
        PolicyConfig::EpsilonGreedy(self.cfg)
    }
}
