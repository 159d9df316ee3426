//! In-process gateway for offline runs, tests, and demos.
//!
//! Each trip draws one Bernoulli outcome from the target arm's survival
//! curve: on success every unit of the trip arrives, otherwise every unit is
//! lost. Curves may depend on the step count, which gives a controlled
//! non-stationary world.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Bernoulli, Distribution};

use crate::{AllocationOutcome, EpisodeGateway, EpisodeStart, FinalStatus, GatewayError};

/// Survival probability of an arm as a function of the episode step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "curve", rename_all = "snake_case"))]
pub enum SurvivalCurve {
    Constant { p: f64 },
    /// `mean + amplitude * sin(2π * step / period)`, clamped to `[0, 1]`.
    Periodic { mean: f64, amplitude: f64, period: u64 },
}

impl SurvivalCurve {
    pub fn probability(&self, step: u64) -> f64 {
        let p = match *self {
            SurvivalCurve::Constant { p } => p,
            SurvivalCurve::Periodic {
                mean,
                amplitude,
                period,
            } => {
                let phase = step as f64 / period.max(1) as f64;
                mean + amplitude * (std::f64::consts::TAU * phase).sin()
            }
        };
        if p.is_finite() {
            p.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Seeded simulator implementing [`EpisodeGateway`].
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    curves: Vec<SurvivalCurve>,
    initial_budget: u64,
    rng: StdRng,
    remaining: u64,
    arrived: u64,
    lost: u64,
    steps: u64,
}

impl SimulatedGateway {
    pub fn new(curves: Vec<SurvivalCurve>, initial_budget: u64, seed: u64) -> Self {
        Self {
            curves,
            initial_budget,
            rng: StdRng::seed_from_u64(seed),
            remaining: initial_budget,
            arrived: 0,
            lost: 0,
            steps: 0,
        }
    }

    /// Constant-probability arms.
    pub fn constant(probabilities: &[f64], initial_budget: u64, seed: u64) -> Self {
        let curves = probabilities
            .iter()
            .map(|&p| SurvivalCurve::Constant { p })
            .collect();
        Self::new(curves, initial_budget, seed)
    }

    pub fn arm_count(&self) -> usize {
        self.curves.len()
    }

    fn draw(&mut self, p: f64) -> bool {
        match Bernoulli::new(p) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl EpisodeGateway for SimulatedGateway {
    async fn start_episode(&mut self) -> Result<EpisodeStart, GatewayError> {
        self.remaining = self.initial_budget;
        self.arrived = 0;
        self.lost = 0;
        self.steps = 0;
        Ok(EpisodeStart {
            initial_budget: self.initial_budget,
        })
    }

    async fn allocate(&mut self, arm: usize, units: u64) -> Result<AllocationOutcome, GatewayError> {
        let Some(curve) = self.curves.get(arm).copied() else {
            return Err(GatewayError::Rejected(format!("unknown arm {arm}")));
        };
        if units == 0 || units > self.remaining {
            return Err(GatewayError::Rejected(format!(
                "cannot send {units} units with {} remaining",
                self.remaining
            )));
        }
        let survived = self.draw(curve.probability(self.steps));
        self.steps += 1;
        self.remaining -= units;
        if survived {
            self.arrived += units;
        } else {
            self.lost += units;
        }
        Ok(AllocationOutcome {
            units_sent: units,
            survived,
            remaining_budget: self.remaining,
            arrived_count: self.arrived,
            lost_count: self.lost,
            steps_taken: self.steps,
        })
    }

    async fn final_status(&mut self) -> Result<FinalStatus, GatewayError> {
        Ok(FinalStatus {
            arrived_count: self.arrived,
            lost_count: self.lost,
        })
    }
}
