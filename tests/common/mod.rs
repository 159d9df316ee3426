#![allow(dead_code)]

use std::ops::RangeInclusive;

use async_trait::async_trait;
use ferry::{AllocationOutcome, EpisodeGateway, EpisodeStart, FinalStatus, GatewayError};

/// How the scripted gateway misreports an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tamper {
    None,
    /// Report one more unit sent than requested.
    OverSend,
    /// Report a remaining budget one higher than the truth.
    WrongRemaining,
    /// Report zero units sent.
    SendNothing,
}

/// Deterministic gateway: survival is a pure function of `(arm, step)`.
pub struct ScriptedGateway {
    pub initial_budget: u64,
    pub survive: fn(usize, u64) -> bool,
    /// Fail the allocate call with this 0-based index within an episode.
    pub fail_at: Option<(u64, GatewayError)>,
    /// Episodes (1-based) in which `fail_at` fires.
    pub failing_episodes: RangeInclusive<u32>,
    pub tamper: Tamper,
    /// Every `(arm, units)` the gateway was asked for, across episodes.
    pub requests: Vec<(usize, u64)>,
    pub episodes_started: u32,
    remaining: u64,
    arrived: u64,
    lost: u64,
    steps: u64,
}

impl ScriptedGateway {
    pub fn new(initial_budget: u64, survive: fn(usize, u64) -> bool) -> Self {
        Self {
            initial_budget,
            survive,
            fail_at: None,
            failing_episodes: 1..=0,
            tamper: Tamper::None,
            requests: Vec::new(),
            episodes_started: 0,
            remaining: 0,
            arrived: 0,
            lost: 0,
            steps: 0,
        }
    }

    pub fn failing(mut self, at: u64, err: GatewayError, episodes: u32) -> Self {
        self.fail_at = Some((at, err));
        self.failing_episodes = 1..=episodes;
        self
    }

    /// Fail only inside episode `episode`.
    pub fn failing_in(mut self, episode: u32, at: u64, err: GatewayError) -> Self {
        self.fail_at = Some((at, err));
        self.failing_episodes = episode..=episode;
        self
    }

    pub fn tampering(mut self, tamper: Tamper) -> Self {
        self.tamper = tamper;
        self
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

#[async_trait]
impl EpisodeGateway for ScriptedGateway {
    async fn start_episode(&mut self) -> Result<EpisodeStart, GatewayError> {
        self.episodes_started += 1;
        self.remaining = self.initial_budget;
        self.arrived = 0;
        self.lost = 0;
        self.steps = 0;
        Ok(EpisodeStart {
            initial_budget: self.initial_budget,
        })
    }

    async fn allocate(&mut self, arm: usize, units: u64) -> Result<AllocationOutcome, GatewayError> {
        self.requests.push((arm, units));
        if let Some((at, err)) = &self.fail_at {
            if *at == self.steps && self.failing_episodes.contains(&self.episodes_started) {
                return Err(err.clone());
            }
        }
        assert!(units <= self.remaining, "asked for {units} with {} left", self.remaining);

        let survived = (self.survive)(arm, self.steps);
        self.steps += 1;
        self.remaining -= units;
        if survived {
            self.arrived += units;
        } else {
            self.lost += units;
        }
        let mut out = AllocationOutcome {
            units_sent: units,
            survived,
            remaining_budget: self.remaining,
            arrived_count: self.arrived,
            lost_count: self.lost,
            steps_taken: self.steps,
        };
        match self.tamper {
            Tamper::None => {}
            Tamper::OverSend => out.units_sent += 1,
            Tamper::WrongRemaining => out.remaining_budget += 1,
            Tamper::SendNothing => out.units_sent = 0,
        }
        Ok(out)
    }

    async fn final_status(&mut self) -> Result<FinalStatus, GatewayError> {
        Ok(FinalStatus {
            arrived_count: self.arrived,
            lost_count: self.lost,
        })
    }
}

pub fn always(_arm: usize, _step: u64) -> bool {
    true
}

pub fn only_arm_one(arm: usize, _step: u64) -> bool {
    arm == 1
}

pub fn alternating(_arm: usize, step: u64) -> bool {
    step % 2 == 0
}

pub fn never(_arm: usize, _step: u64) -> bool {
    false
}
