//! Single-arm baseline: always the same arm, always the same unit count.

use crate::{
    AllocationPolicy, Decision, DecisionContext, DecisionNote, Error, PolicyConfig, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FixedArmConfig {
    pub arm: usize,
    pub units: u64,
}

impl Default for FixedArmConfig {
    fn default() -> Self {
        Self { arm: 0, units: 1 }
    }
}

#[derive(Debug, Clone)]
pub struct FixedArm {
    cfg: FixedArmConfig,
}

impl FixedArm {
    pub fn new(cfg: FixedArmConfig, arm_count: usize) -> Result<Self> {
        if cfg.arm >= arm_count {
            return Err(Error::config(format!(
                "fixed arm {} is outside 0..{arm_count}",
                cfg.arm
            )));
        }
        if cfg.units == 0 {
            return Err(Error::config("fixed units must be at least 1"));
        }
        Ok(Self { cfg })
    }
}

impl AllocationPolicy for FixedArm {
    fn decide(&mut self, _ctx: &DecisionContext<'_>) -> Decision {
        Decision::new(self.cfg.arm, self.cfg.units, DecisionNote::Fixed)
    }

    fn name(&self) -> String {
        format!("Baseline_P{}_M{}", self.cfg.arm, self.cfg.units)
    }

    fn config(&self) -> PolicyConfig {
        PolicyConfig::FixedArm(self.cfg)
    }
}
