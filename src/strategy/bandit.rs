//! Multi-armed bandit statistics for per-source performance.
//!
//! Tracks an incremental running mean of observed rewards per source.
//! Arms are created lazily on first update and never removed — stale
//! sources simply stop being queried.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

// ---------------------------------------------------------------------------
// Arm
// ---------------------------------------------------------------------------

/// Learned statistics for one source.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BanditArm {
    /// Number of times this source was selected and rewarded.
    pub pulls: u64,
    /// Running average of observed rewards.
    pub mean_reward: f64,
}

// ---------------------------------------------------------------------------
// Learner
// ---------------------------------------------------------------------------

/// Per-source running-mean reward estimator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BanditLearner {
    arms: HashMap<String, BanditArm>,
}

impl BanditLearner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observed reward for a source.
    ///
    /// Applies the incremental-average recurrence
    /// `mean += (reward - mean) / pulls` (after the pull increment) —
    /// numerically stable and O(1) memory per arm.
    pub fn update(&mut self, source: &str, reward: f64) {
        let arm = self.arms.entry(source.to_string()).or_default();
        arm.pulls += 1;
        let old_mean = arm.mean_reward;
        arm.mean_reward += (reward - arm.mean_reward) / arm.pulls as f64;

        debug!(
            source,
            reward = format!("{reward:.4}"),
            old_value = format!("{old_mean:.4}"),
            new_value = format!("{:.4}", arm.mean_reward),
            pulls = arm.pulls,
            "Bandit arm updated"
        );
    }

    /// Learned value for a source (0.0 for an arm never updated).
    pub fn estimated_value(&self, source: &str) -> f64 {
        self.arms.get(source).map_or(0.0, |arm| arm.mean_reward)
    }

    /// How many times a source was rewarded (0 for an arm never updated).
    pub fn pull_count(&self, source: &str) -> u64 {
        self.arms.get(source).map_or(0, |arm| arm.pulls)
    }

    /// Number of arms with at least one observation.
    pub fn arm_count(&self) -> usize {
        self.arms.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
