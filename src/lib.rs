//! `ferry`: finite-horizon bandit allocation of indivisible units.
//!
//! Designed for "send a shrinking pool somewhere" problems: you hold a budget
//! of units, there are a few destinations (arms), and every trip either
//! survives or is lost with an unknown, possibly drifting, per-arm
//! probability. You want as many units as possible to survive by the time
//! the budget is spent.
//!
//! **Pieces:**
//! - [`RollingEstimator`] / [`RollingWindow`]: per-arm success rate over the
//!   last `W` trips. Empty windows estimate `0.0`; use
//!   [`RollingEstimator::samples`] to tell "unknown" from "observed 0%".
//! - [`AllocationPolicy`]: `decide` / `observe` interface, with
//!   [`EpsilonGreedy`] (probe phase, then explore/exploit),
//!   [`ProbeCycle`] (fixed-dwell round-robin), [`UniformRandom`] (control),
//!   and [`FixedArm`] (single-arm baseline). All randomness is seedable.
//! - [`TripOrchestrator`]: the trip loop. Clamps every request to the
//!   remaining budget, validates every gateway reply, and commits a trip only
//!   once it fully succeeded.
//! - [`RunSummarizer`]: folds the trip history into a [`RunResult`].
//! - [`Runner`] + [`RetryPolicy`]: back-to-back runs with bounded,
//!   transient-only retry around whole runs.
//! - [`EpisodeGateway`]: the only seam to the outside world;
//!   [`SimulatedGateway`] implements it in-process.
//!
//! **Non-goals:**
//! - Not a general reinforcement-learning framework.
//! - No posterior sampling; estimates are plain windowed frequencies.
//! - No transport, credentials, or persistence: those live behind
//!   [`EpisodeGateway`] and in the caller.
//!
//! # Example
//!
//! ```rust
//! use ferry::{
//!     EngineConfig, EpsilonGreedy, EpsilonGreedyConfig, SimulatedGateway, TripOrchestrator,
//! };
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let gateway = SimulatedGateway::constant(&[0.3, 0.8, 0.5], 200, 7);
//! let mut orch = TripOrchestrator::new(gateway, EngineConfig::default()).unwrap();
//! let mut policy = EpsilonGreedy::with_seed(EpsilonGreedyConfig::default(), 3, 7).unwrap();
//!
//! let result = orch.run_episode(1, &mut policy).await.unwrap();
//! assert_eq!(result.trips.last().map(|t| t.remaining_budget), Some(0));
//! assert_eq!(result.final_arrived_count + result.final_lost_count, 200);
//! # });
//! ```

mod error;
pub use error::*;

mod window;
pub use window::*;

mod decision;
pub use decision::*;

mod policy;
pub use policy::*;

mod probe_cycle;
pub use probe_cycle::*;

mod epsilon_greedy;
pub use epsilon_greedy::*;

mod uniform;
pub use uniform::*;

mod fixed;
pub use fixed::*;

mod gateway;
pub use gateway::*;

mod simulate;
pub use simulate::*;

mod orchestrator;
pub use orchestrator::*;

mod summary;
pub use summary::*;

mod retry;
pub use retry::*;

mod runner;
pub use runner::*;

mod stable_hash;
pub use stable_hash::*;
