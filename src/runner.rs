//! Back-to-back runs.
//!
//! Each run builds a fresh policy (seeded from the base seed and the run
//! number), runs one episode under the retry policy, and waits
//! `inter_run_delay_ms` before the next. No state crosses run boundaries
//! except the gateway connection itself.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::{
    stable_hash64_u64, EpisodeGateway, PolicyConfig, Result, RetryConfig, RetryPolicy, RunResult,
    TripOrchestrator,
};

/// Series configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunnerConfig {
    /// Number of runs in the series.
    pub runs: u64,
    pub inter_run_delay_ms: u64,
    /// Base seed; run `n` uses `stable_hash64_u64(seed, n)`.
    pub seed: u64,
    pub policy: PolicyConfig,
    pub retry: RetryConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            runs: 1,
            inter_run_delay_ms: 5_000,
            seed: 0,
            policy: PolicyConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Executes a series of runs against one gateway.
#[derive(Debug)]
pub struct Runner<G> {
    orchestrator: TripOrchestrator<G>,
    cfg: RunnerConfig,
    retry: RetryPolicy,
}

impl<G: EpisodeGateway + 'static> Runner<G> {
    pub fn new(orchestrator: TripOrchestrator<G>, cfg: RunnerConfig) -> Result<Self> {
        let retry = RetryPolicy::new(cfg.retry)?;
        // Surface policy misconfiguration before the first episode starts.
        cfg.policy.build(orchestrator.config().arm_count, cfg.seed)?;
        Ok(Self {
            orchestrator,
            cfg,
            retry,
        })
    }

    /// Seed used for run `run_number`.
    pub fn run_seed(&self, run_number: u64) -> u64 {
        stable_hash64_u64(self.cfg.seed, run_number)
    }

    /// One run, retried on transient failure. Every attempt starts from scratch.
    pub async fn run_once(&mut self, run_number: u64) -> Result<RunResult> {
        let arm_count = self.orchestrator.config().arm_count;
        let seed = self.run_seed(run_number);
        let Self {
            orchestrator,
            cfg,
            retry,
        } = self;
        retry
            .execute(orchestrator, |orchestrator, attempt| {
                let policy = cfg.policy.build(arm_count, seed);
                Box::pin(async move {
                    let mut policy = policy?;
                    debug!(run = run_number, attempt, "starting episode");
                    orchestrator.run_episode(run_number, policy.as_mut()).await
                })
            })
            .await
    }

    /// Run the whole series, handing each report to `on_run` as soon as its
    /// run completes. Stops at the first run that fails permanently; reports
    /// already handed out are unaffected. Returns the number of completed runs.
    pub async fn run_series<F>(&mut self, mut on_run: F) -> Result<u64>
    where
        F: FnMut(RunResult),
    {
        let mut completed = 0;
        for run_number in 1..=self.cfg.runs {
            let result = self.run_once(run_number).await?;
            on_run(result);
            completed += 1;
            if run_number < self.cfg.runs && self.cfg.inter_run_delay_ms > 0 {
                info!(
                    delay_ms = self.cfg.inter_run_delay_ms,
                    "waiting before next run"
                );
                sleep(Duration::from_millis(self.cfg.inter_run_delay_ms)).await;
            }
        }
        Ok(completed)
    }

    pub fn orchestrator(&self) -> &TripOrchestrator<G> {
        &self.orchestrator
    }

    pub fn into_orchestrator(self) -> TripOrchestrator<G> {
        self.orchestrator
    }
}
