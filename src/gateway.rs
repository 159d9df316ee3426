//! Episode gateway port.
//!
//! The engine reaches the outside world only through [`EpisodeGateway`]:
//! start an episode, allocate units to an arm, read the final status.
//! Transport, authentication, and wire format belong to the implementor.

use async_trait::async_trait;
use thiserror::Error;

/// Reply to `start_episode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpisodeStart {
    pub initial_budget: u64,
}

/// Result of one allocation, as reported by the gateway.
///
/// The gateway is authoritative for every count here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocationOutcome {
    pub units_sent: u64,
    pub survived: bool,
    pub remaining_budget: u64,
    /// Cumulative units that arrived this episode.
    pub arrived_count: u64,
    /// Cumulative units lost this episode.
    pub lost_count: u64,
    pub steps_taken: u64,
}

/// Reply to `final_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FinalStatus {
    pub arrived_count: u64,
    pub lost_count: u64,
}

/// Failures surfaced by a gateway implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// Credentials missing or refused.
    #[error("unauthorized")]
    Unauthorized,

    #[error("request timed out")]
    Timeout,

    /// Non-success status from the remote side.
    #[error("status {code}: {message}")]
    Status { code: u16, message: String },

    /// The remote side refused the request as malformed.
    #[error("rejected: {0}")]
    Rejected(String),
}

impl GatewayError {
    /// Returns true if this error is transient and the run may be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Network(_) | GatewayError::Timeout => true,
            GatewayError::Status { code, .. } => *code == 429 || *code >= 500,
            GatewayError::Unauthorized | GatewayError::Rejected(_) => false,
        }
    }
}

/// Port to the system that actually moves units.
///
/// Implementations must honor the precondition `units <= remaining budget`;
/// the orchestrator clamps before calling.
#[async_trait]
pub trait EpisodeGateway: Send {
    /// Begin a fresh episode and report its budget.
    async fn start_episode(&mut self) -> Result<EpisodeStart, GatewayError>;

    /// Send `units` units to `arm`.
    async fn allocate(&mut self, arm: usize, units: u64) -> Result<AllocationOutcome, GatewayError>;

    /// Final tallies for the current episode.
    async fn final_status(&mut self) -> Result<FinalStatus, GatewayError>;
}
