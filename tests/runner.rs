//! Series execution and whole-run retry.

mod common;

use common::{alternating, always, ScriptedGateway};
use ferry::{
    EngineConfig, Error, GatewayError, PolicyConfig, ProbeCycleConfig, RetryConfig, Runner,
    RunnerConfig, SimulatedGateway, TripOrchestrator, UniformRandomConfig,
};

fn engine() -> EngineConfig {
    EngineConfig {
        log_every: 0,
        ..EngineConfig::default()
    }
}

fn runner_cfg(runs: u64, policy: PolicyConfig) -> RunnerConfig {
    RunnerConfig {
        runs,
        inter_run_delay_ms: 5_000,
        seed: 1,
        policy,
        retry: RetryConfig {
            max_attempts: 3,
            initial_backoff_ms: 30_000,
            max_backoff_ms: 300_000,
        },
    }
}

fn probe_cycle() -> PolicyConfig {
    PolicyConfig::ProbeCycle(ProbeCycleConfig {
        trips_per_arm: 4,
        units_per_trip: 1,
    })
}

#[tokio::test(start_paused = true)]
async fn transient_failure_restarts_the_whole_run() {
    let gw = ScriptedGateway::new(20, alternating).failing(7, GatewayError::Timeout, 1);
    let orch = TripOrchestrator::new(gw, engine()).unwrap();
    let mut runner = Runner::new(orch, runner_cfg(1, probe_cycle())).unwrap();

    let r = runner.run_once(1).await.unwrap();

    let gw = runner.orchestrator().gateway();
    assert_eq!(gw.episodes_started, 2);
    // 8 requests in the failed attempt, 20 in the successful one.
    assert_eq!(gw.requests.len(), 28);
    // Fresh policy state: the retried run starts its cycle at arm 0 again.
    assert_eq!(r.trips.len(), 20);
    assert_eq!(r.trips[0].arm, 0);
    assert_eq!(r.trips[4].arm, 1);
}

#[tokio::test(start_paused = true)]
async fn permanent_failure_is_not_retried() {
    let gw = ScriptedGateway::new(20, always).failing(0, GatewayError::Unauthorized, 10);
    let orch = TripOrchestrator::new(gw, engine()).unwrap();
    let mut runner = Runner::new(orch, runner_cfg(3, probe_cycle())).unwrap();

    let mut reports = Vec::new();
    let err = runner.run_series(|r| reports.push(r)).await.unwrap_err();

    assert!(matches!(err, Error::Transport(GatewayError::Unauthorized)));
    assert_eq!(runner.orchestrator().gateway().episodes_started, 1);
    assert!(reports.is_empty());
}

#[tokio::test(start_paused = true)]
async fn retries_are_bounded() {
    let gw = ScriptedGateway::new(20, always).failing(
        3,
        GatewayError::Status {
            code: 503,
            message: "unavailable".into(),
        },
        u32::MAX,
    );
    let orch = TripOrchestrator::new(gw, engine()).unwrap();
    let mut runner = Runner::new(orch, runner_cfg(1, probe_cycle())).unwrap();

    let err = runner.run_once(1).await.unwrap_err();

    assert!(err.is_transient());
    assert_eq!(runner.orchestrator().gateway().episodes_started, 3);
}

#[tokio::test(start_paused = true)]
async fn series_numbers_runs_and_isolates_state() {
    let gw = SimulatedGateway::constant(&[0.4, 0.6, 0.5], 60, 5);
    let orch = TripOrchestrator::new(gw, engine()).unwrap();
    let policy = PolicyConfig::UniformRandom(UniformRandomConfig::default());
    let mut runner = Runner::new(orch, runner_cfg(3, policy)).unwrap();

    let mut results = Vec::new();
    let completed = runner.run_series(|r| results.push(r)).await.unwrap();

    assert_eq!(completed, 3);
    assert_eq!(
        results.iter().map(|r| r.run_number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    for r in &results {
        assert_eq!(r.initial_budget, 60);
        assert_eq!(r.final_arrived_count + r.final_lost_count, 60);
        assert_eq!(r.trips.first().map(|t| t.trip_number), Some(1));
        assert_eq!(r.trips.last().map(|t| t.remaining_budget), Some(0));
    }
    assert_ne!(runner.run_seed(1), runner.run_seed(2));
}

#[tokio::test(start_paused = true)]
async fn completed_runs_are_reported_before_a_later_failure() {
    let gw = ScriptedGateway::new(20, always).failing_in(2, 5, GatewayError::Unauthorized);
    let orch = TripOrchestrator::new(gw, engine()).unwrap();
    let mut runner = Runner::new(orch, runner_cfg(3, probe_cycle())).unwrap();

    let mut reports = Vec::new();
    let err = runner.run_series(|r| reports.push(r)).await.unwrap_err();

    assert!(matches!(err, Error::Transport(GatewayError::Unauthorized)));
    assert_eq!(runner.orchestrator().gateway().episodes_started, 2);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].run_number, 1);
    assert_eq!(reports[0].total_trips, 20);
    assert_eq!(reports[0].final_arrived_count, 20);
}

#[tokio::test(start_paused = true)]
async fn unbounded_run_count_does_not_preallocate() {
    let gw = ScriptedGateway::new(20, always).failing_in(3, 0, GatewayError::Unauthorized);
    let orch = TripOrchestrator::new(gw, engine()).unwrap();
    let mut runner = Runner::new(orch, runner_cfg(u64::MAX, probe_cycle())).unwrap();

    let mut seen = Vec::new();
    let err = runner
        .run_series(|r| seen.push(r.run_number))
        .await
        .unwrap_err();

    assert!(!err.is_transient());
    assert_eq!(seen, vec![1, 2]);
}

#[test]
fn misconfigured_policy_is_rejected_up_front() {
    let gw = ScriptedGateway::new(20, always);
    let orch = TripOrchestrator::new(gw, engine()).unwrap();
    let bad = PolicyConfig::UniformRandom(UniformRandomConfig {
        min_units: 0,
        max_units: 0,
    });
    assert!(matches!(
        Runner::new(orch, runner_cfg(1, bad)),
        Err(Error::Config(_))
    ));
}
