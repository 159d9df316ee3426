//! Rolling per-arm success windows.
//!
//! Estimates are computed over a bounded recent history rather than lifetime
//! counts, so an arm whose success rate drifts is re-evaluated within `cap`
//! trips.

use std::collections::VecDeque;

#[cfg(feature = "serde")]
use crate::{Error, Result};

/// Bounded FIFO of survived/lost flags for one arm.
///
/// Deserialization rejects `cap == 0` and a history longer than `cap`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawWindow"))]
pub struct RollingWindow {
    cap: usize,
    buf: VecDeque<bool>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawWindow {
    cap: usize,
    buf: VecDeque<bool>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawWindow> for RollingWindow {
    type Error = Error;

    fn try_from(raw: RawWindow) -> Result<Self> {
        if raw.cap == 0 {
            return Err(Error::config("window cap must be at least 1"));
        }
        if raw.buf.len() > raw.cap {
            return Err(Error::config(format!(
                "window holds {} flags but cap is {}",
                raw.buf.len(),
                raw.cap
            )));
        }
        Ok(Self {
            cap: raw.cap,
            buf: raw.buf,
        })
    }
}

impl RollingWindow {
    /// Create an empty window with capacity `cap` (minimum 1).
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            buf: VecDeque::with_capacity(cap),
        }
    }

    /// Maximum number of flags retained.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Number of flags currently retained.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.buf.iter().copied()
    }

    /// Push a flag, evicting the oldest if at capacity.
    pub fn push(&mut self, survived: bool) {
        while self.buf.len() >= self.cap.max(1) {
            self.buf.pop_front();
        }
        self.buf.push_back(survived);
    }

    /// Number of `true` flags in the window.
    pub fn successes(&self) -> usize {
        self.buf.iter().filter(|&&s| s).count()
    }

    /// `successes / max(1, len)`; an empty window yields `0.0`.
    pub fn rate(&self) -> f64 {
        self.successes() as f64 / self.buf.len().max(1) as f64
    }
}

/// Per-arm rolling success-rate estimator.
///
/// Arms are indexed `0..arm_count`. Recording against an arm outside that
/// range is ignored; the orchestrator validates arms before recording.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollingEstimator {
    windows: Vec<RollingWindow>,
}

impl RollingEstimator {
    /// One empty window of capacity `cap` per arm.
    pub fn new(arm_count: usize, cap: usize) -> Self {
        Self {
            windows: (0..arm_count).map(|_| RollingWindow::new(cap)).collect(),
        }
    }

    /// Number of arms tracked.
    pub fn arm_count(&self) -> usize {
        self.windows.len()
    }

    /// Window for `arm`, if it exists.
    pub fn window(&self, arm: usize) -> Option<&RollingWindow> {
        self.windows.get(arm)
    }

    /// Append an outcome to `arm`'s window.
    pub fn record(&mut self, arm: usize, survived: bool) {
        if let Some(w) = self.windows.get_mut(arm) {
            w.push(survived);
        }
    }

    /// Point estimate of `arm`'s success rate in `[0, 1]`.
    ///
    /// An untouched (or unknown) arm reports `0.0`. Callers that need to
    /// tell "unknown" apart from "observed 0%" should check [`Self::samples`].
    pub fn estimate(&self, arm: usize) -> f64 {
        self.windows.get(arm).map(RollingWindow::rate).unwrap_or(0.0)
    }

    /// Number of outcomes currently in `arm`'s window.
    pub fn samples(&self, arm: usize) -> usize {
        self.windows.get(arm).map(RollingWindow::len).unwrap_or(0)
    }

    /// Estimates for every arm, in arm order.
    pub fn estimates(&self) -> Vec<f64> {
        self.windows.iter().map(RollingWindow::rate).collect()
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        for w in &mut self.windows {
            w.buf.clear();
        }
    }
}
