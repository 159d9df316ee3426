//! Unified decision envelope for policy outputs.
//!
//! A policy answers one question per trip: which arm, and how many units.
//! The [`Decision`] carries that answer plus a typed [`DecisionNote`] naming
//! the branch that produced it, so trip logs can be audited and replayed.

use crate::RollingEstimator;

/// Which branch of a policy produced a decision.
///
/// Notes are small, typed, and stable. Prefer adding new variants over
/// changing existing semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum DecisionNote {
    /// Bootstrap round-robin before estimates are trusted.
    Probe,
    /// Exploration branch: uniformly random arm.
    Explore,
    /// Exploitation branch: highest current estimate.
    Exploit,
    /// Fixed-dwell round-robin; `dwell` trips already spent on this arm.
    Cycle { dwell: u64 },
    /// Uniform random arm and unit count (control baseline).
    Uniform,
    /// Constant arm and unit count (per-arm baseline).
    Fixed,
}

/// A single allocation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision {
    /// Chosen arm index.
    pub arm: usize,
    /// Units the policy would like to send (before clamping to budget).
    pub units: u64,
    /// Why this choice happened.
    pub note: DecisionNote,
}

impl Decision {
    /// Build a decision; `units` is the unclamped request.
    pub fn new(arm: usize, units: u64, note: DecisionNote) -> Self {
        Self { arm, units, note }
    }
}

/// Read-only view handed to a policy when it decides.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    /// Zero-based index of the trip about to be made in this run.
    pub trip_index: u64,
    /// Units still unallocated.
    pub remaining: u64,
    /// Current rolling estimates.
    pub estimator: &'a RollingEstimator,
}

impl DecisionContext<'_> {
    /// Number of arms the policy may choose from (`0..arm_count`).
    pub fn arm_count(&self) -> usize {
        self.estimator.arm_count()
    }
}

/// What a policy learns after a trip completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripFeedback {
    /// Arm the trip went to.
    pub arm: usize,
    /// Units the gateway actually sent (after clamping).
    pub units_sent: u64,
    /// Whether the whole trip survived.
    pub survived: bool,
}
