//! `ferry-sim`: run allocation policies against the in-process simulator.
//!
//! Prints one JSON `RunResult` per line on stdout; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ferry::{
    EngineConfig, EpsilonGreedyConfig, Error, FixedArmConfig, PolicyConfig, ProbeCycleConfig,
    Runner, RunnerConfig, SimulatedGateway, SurvivalCurve, TripOrchestrator, UniformRandomConfig,
};

/// Settings file shape (JSON). Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct SimConfig {
    engine: EngineConfig,
    runner: RunnerConfig,
    budget: u64,
    gateway_seed: u64,
    arms: Vec<SurvivalCurve>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            runner: RunnerConfig {
                inter_run_delay_ms: 0,
                ..RunnerConfig::default()
            },
            budget: 1_000,
            gateway_seed: 0,
            arms: vec![
                SurvivalCurve::Constant { p: 0.55 },
                SurvivalCurve::Periodic {
                    mean: 0.6,
                    amplitude: 0.3,
                    period: 200,
                },
                SurvivalCurve::Constant { p: 0.45 },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    EpsilonGreedy,
    ProbeCycle,
    Uniform,
    Fixed,
}

#[derive(Debug, Parser)]
#[command(name = "ferry-sim", version, about = "Simulate finite-horizon allocation policies")]
struct Cli {
    /// JSON settings file; flags below override it.
    #[arg(short, long, env = "FERRY_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Explore probability (epsilon-greedy).
    #[arg(long)]
    epsilon: Option<f64>,

    /// Dwell per arm (probe cycle).
    #[arg(long)]
    trips_per_arm: Option<u64>,

    /// Target arm (fixed).
    #[arg(long)]
    arm: Option<usize>,

    /// Units per trip (fixed, probe cycle).
    #[arg(long)]
    units: Option<u64>,

    #[arg(long)]
    runs: Option<u64>,

    #[arg(long)]
    budget: Option<u64>,

    /// Base seed for policies and the simulator.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    delay_ms: Option<u64>,
}

fn load(cli: &Cli) -> Result<SimConfig, Box<dyn std::error::Error>> {
    let mut cfg = match &cli.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => SimConfig::default(),
    };
    if let Some(p) = cli.policy {
        cfg.runner.policy = match p {
            PolicyArg::EpsilonGreedy => PolicyConfig::EpsilonGreedy(EpsilonGreedyConfig::default()),
            PolicyArg::ProbeCycle => PolicyConfig::ProbeCycle(ProbeCycleConfig::default()),
            PolicyArg::Uniform => PolicyConfig::UniformRandom(UniformRandomConfig::default()),
            PolicyArg::Fixed => PolicyConfig::FixedArm(FixedArmConfig::default()),
        };
    }
    match &mut cfg.runner.policy {
        PolicyConfig::EpsilonGreedy(c) => {
            if let Some(e) = cli.epsilon {
                c.epsilon = e;
            }
        }
        PolicyConfig::ProbeCycle(c) => {
            if let Some(k) = cli.trips_per_arm {
                c.trips_per_arm = k;
            }
            if let Some(u) = cli.units {
                c.units_per_trip = u;
            }
        }
        PolicyConfig::UniformRandom(_) => {}
        PolicyConfig::FixedArm(c) => {
            if let Some(a) = cli.arm {
                c.arm = a;
            }
            if let Some(u) = cli.units {
                c.units = u;
            }
        }
    }
    if let Some(r) = cli.runs {
        cfg.runner.runs = r;
    }
    if let Some(b) = cli.budget {
        cfg.budget = b;
    }
    if let Some(s) = cli.seed {
        cfg.runner.seed = s;
        cfg.gateway_seed = s;
    }
    if let Some(d) = cli.delay_ms {
        cfg.runner.inter_run_delay_ms = d;
    }
    cfg.engine.arm_count = cfg.arms.len();
    Ok(cfg)
}

async fn run(cfg: SimConfig) -> Result<(), Error> {
    let gateway = SimulatedGateway::new(cfg.arms, cfg.budget, cfg.gateway_seed);
    let orchestrator = TripOrchestrator::new(gateway, cfg.engine)?;
    let mut runner = Runner::new(orchestrator, cfg.runner)?;
    let completed = runner
        .run_series(|result| match serde_json::to_string(&result) {
            Ok(line) => println!("{line}"),
            Err(e) => error!(run = result.run_number, error = %e, "could not encode result"),
        })
        .await?;
    info!(completed, "series finished");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = match load(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "could not load configuration");
            return ExitCode::from(2);
        }
    };
    match run(cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "simulation failed");
            ExitCode::FAILURE
        }
    }
}
