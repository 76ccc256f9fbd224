//! Epsilon-greedy exploration control.
//!
//! Decides, per cycle, whether to explore (uniform random source) or
//! exploit (best final score), with a UCB-style confidence bonus that
//! biases exploitation toward under-sampled sources. Epsilon decays
//! toward a floor so minimal exploration never fully stops.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationConfig {
    /// Starting exploration rate.
    pub initial_epsilon: f64,
    /// Lower bound epsilon decays toward (perpetual minimal exploration).
    pub epsilon_floor: f64,
    /// Multiplicative decay applied after every decision.
    pub epsilon_decay: f64,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            initial_epsilon: 0.2,
            epsilon_floor: 0.05,
            epsilon_decay: 0.995,
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Exploration state: current epsilon, decision counter, and the RNG that
/// drives branch selection.
///
/// The RNG is injected (seedable `StdRng`) so exploration branches are
/// reproducible in tests; production construction seeds from the OS.
#[derive(Debug)]
pub struct ExplorationController {
    config: ExplorationConfig,
    epsilon: f64,
    total_decisions: u64,
    rng: StdRng,
}

impl ExplorationController {
    /// OS-seeded controller for production use.
    pub fn new(config: ExplorationConfig) -> Self {
        let rng = StdRng::from_os_rng();
        Self::with_rng(config, rng)
    }

    /// Deterministic controller for reproducible runs and tests.
    pub fn with_seed(config: ExplorationConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ExplorationConfig, rng: StdRng) -> Self {
        let epsilon = config.initial_epsilon.clamp(0.0, 1.0);
        Self {
            config,
            epsilon,
            total_decisions: 0,
            rng,
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Decisions made so far — incremented once per cycle regardless of
    /// which branch is taken.
    pub fn total_decisions(&self) -> u64 {
        self.total_decisions
    }

    /// Count a decision cycle. Called before the branch draw, so explore
    /// cycles also feed the confidence-bonus denominator.
    pub fn record_decision(&mut self) {
        self.total_decisions += 1;
    }

    /// Draw the branch: true → explore with probability epsilon.
    pub fn should_explore(&mut self) -> bool {
        self.rng.random::<f64>() < self.epsilon
    }

    /// Pick a uniform random index among `len` candidates (explore branch).
    pub fn pick_uniform(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        self.rng.random_range(0..len)
    }

    /// UCB-style bonus for a candidate with `pulls` historical selections.
    ///
    /// Sources pulled rarely relative to the total decision count receive
    /// a larger bonus. Zero until the first decision has been counted.
    pub fn confidence_bonus(&self, pulls: u64) -> f64 {
        if self.total_decisions == 0 {
            return 0.0;
        }
        (((self.total_decisions + 1) as f64).ln() / (pulls + 1) as f64).sqrt()
    }

    /// Decay epsilon toward the floor. Applied after every decision,
    /// either branch.
    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_floor);
        debug!(
            epsilon = format!("{:.4}", self.epsilon),
            total_decisions = self.total_decisions,
            "Epsilon decayed"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
