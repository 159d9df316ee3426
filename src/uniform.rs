//! Uniform-random control policy.
//!
//! Arm and unit count are drawn independently and uniformly on every trip,
//! ignoring all feedback. Useful as the baseline the adaptive policies are
//! measured against.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{
    AllocationPolicy, Decision, DecisionContext, DecisionNote, Error, PolicyConfig, Result,
};

/// Configuration for [`UniformRandom`]: units drawn from `min_units..=max_units`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UniformRandomConfig {
    pub min_units: u64,
    pub max_units: u64,
}

impl Default for UniformRandomConfig {
    fn default() -> Self {
        Self {
            min_units: 1,
            max_units: 3,
        }
    }
}

/// Seedable uniform-random policy.
#[derive(Debug, Clone)]
pub struct UniformRandom {
    cfg: UniformRandomConfig,
    arm_count: usize,
    rng: StdRng,
}

impl UniformRandom {
    pub fn new(cfg: UniformRandomConfig, arm_count: usize) -> Result<Self> {
        Self::with_seed(cfg, arm_count, 0)
    }

    pub fn with_seed(cfg: UniformRandomConfig, arm_count: usize, seed: u64) -> Result<Self> {
        if arm_count == 0 {
            return Err(Error::config("uniform policy needs at least one arm"));
        }
        if cfg.min_units == 0 || cfg.min_units > cfg.max_units {
            return Err(Error::config(format!(
                "unit range {}..={} must be non-empty and start at 1 or more",
                cfg.min_units, cfg.max_units
            )));
        }
        Ok(Self {
            cfg,
            arm_count,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl AllocationPolicy for UniformRandom {
    fn decide(&mut self, _ctx: &DecisionContext<'_>) -> Decision {
        let arm = self.rng.random_range(0..self.arm_count);
        let units = self.rng.random_range(self.cfg.min_units..=self.cfg.max_units);
        Decision::new(arm, units, DecisionNote::Uniform)
    }

    fn name(&self) -> String {
        "TotallyRandom".to_string()
    }

    fn config(&self) -> PolicyConfig {
        PolicyConfig::UniformRandom(self.cfg)
    }
}
