//! Error taxonomy for a single run.
//!
//! Every error here is local to the run that raised it: nothing global is
//! corrupted, so a fresh run can always be started afterwards.

use thiserror::Error;

use crate::GatewayError;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error for the decision engine.
#[derive(Error, Debug)]
pub enum Error {
    /// The episode gateway failed (network, authentication, timeout, ...).
    #[error("transport error: {0}")]
    Transport(#[from] GatewayError),

    /// A contract between the loop, the policy, and the gateway was broken.
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    /// Configuration was rejected before any trip was attempted.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Whether retrying the whole run could plausibly succeed.
    ///
    /// Only transport failures can be transient; contract and configuration
    /// errors are deterministic.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_transient(),
            Error::Invariant(_) | Error::Config(_) => false,
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

/// Contract breaches that make budget accounting untrustworthy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The gateway reports more units sent than were asked for.
    #[error("gateway sent {sent} units but only {requested} were requested")]
    OverSent { requested: u64, sent: u64 },

    /// The gateway accepted a non-empty request but sent nothing.
    #[error("gateway sent 0 units for a request of {requested}")]
    NoProgress { requested: u64 },

    /// The reported remaining budget does not equal `before - sent`.
    #[error("remaining budget {reported} does not match {before} - {sent}")]
    BudgetMismatch { before: u64, sent: u64, reported: u64 },

    /// A policy chose an arm outside the configured arm set.
    #[error("policy chose arm {arm} but only {arm_count} arms exist")]
    ArmOutOfRange { arm: usize, arm_count: usize },

    /// A policy requested zero units.
    #[error("policy requested 0 units on trip {trip_index}")]
    ZeroUnits { trip_index: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_transport_errors_are_transient() {
        assert!(Error::from(GatewayError::Timeout).is_transient());
        assert!(!Error::from(GatewayError::Unauthorized).is_transient());
        assert!(!Error::from(InvariantViolation::NoProgress { requested: 1 }).is_transient());
        assert!(!Error::config("zero arms").is_transient());
    }

    #[test]
    fn messages_name_the_numbers() {
        let e = Error::from(InvariantViolation::OverSent {
            requested: 2,
            sent: 3,
        });
        assert_eq!(
            e.to_string(),
            "invariant violation: gateway sent 3 units but only 2 were requested"
        );
    }
}
