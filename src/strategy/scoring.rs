//! Base utility scoring for candidate data sources.
//!
//! Computes an interpretable priority score from a source's quality
//! attributes and the remaining collection budget. Learning and
//! exploration adjustments are layered on top by the decision agent.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Weights of the base utility score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight of data recency.
    pub freshness_weight: f64,
    /// Weight of source trustworthiness.
    pub reliability_weight: f64,
    /// Penalty weight of query cost.
    pub cost_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            freshness_weight: 0.45,
            reliability_weight: 0.45,
            cost_weight: 0.25,
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Pure scoring policy — deterministic, no side effects.
///
/// Inputs are assumed normalized to `[0, 1]`; the snapshot boundary is
/// responsible for that invariant, not this policy.
#[derive(Debug, Clone, Default)]
pub struct ScoringPolicy {
    config: ScoringConfig,
}

impl ScoringPolicy {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Access the scoring configuration.
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Base utility of querying a source given the remaining budget.
    ///
    /// - No budget left → 0.0 (no collection).
    /// - The weighted utility is scaled by `min(1, remaining_budget)` so the
    ///   agent becomes conservative as the budget drops — a graceful decay,
    ///   not a hard stop.
    /// - Never negative; penalties beyond the cost weight are handled
    ///   separately by the agent.
    pub fn score(&self, freshness: f64, reliability: f64, cost: f64, remaining_budget: f64) -> f64 {
        if remaining_budget <= 0.0 {
            return 0.0;
        }

        let base = self.config.freshness_weight * freshness
            + self.config.reliability_weight * reliability
            - self.config.cost_weight * cost;

        let budget_factor = remaining_budget.min(1.0);

        (base * budget_factor).max(0.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ScoringPolicy {
        ScoringPolicy::default()
    }

    #[test]
    fn test_zero_budget_scores_zero() {
        let p = policy();
        assert_eq!(p.score(1.0, 1.0, 0.0, 0.0), 0.0);
        assert_eq!(p.score(1.0, 1.0, 0.0, -3.0), 0.0);
        assert_eq!(p.score(0.5, 0.5, 0.5, 0.0), 0.0);
    }

    #[test]
    fn test_scenario_high_quality_source() {
        // freshness 0.9, reliability 0.9, cost 0.1, budget above 1.0:
        // 0.45*0.9 + 0.45*0.9 - 0.25*0.1 = 0.785, budget factor clamps to 1.
        let p = policy();
        let score = p.score(0.9, 0.9, 0.1, 5.0);
        assert!((score - 0.785).abs() < 1e-12);
    }

    #[test]
    fn test_budget_factor_scales_below_one() {
        let p = policy();
        let full = p.score(0.8, 0.8, 0.2, 1.0);
        let half = p.score(0.8, 0.8, 0.2, 0.5);
        assert!((half - full * 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_budget_factor_clamps_above_one() {
        let p = policy();
        assert_eq!(p.score(0.8, 0.8, 0.2, 1.0), p.score(0.8, 0.8, 0.2, 100.0));
    }

    #[test]
    fn test_never_negative() {
        // Costly, stale, unreliable source: weighted base is negative.
        let p = policy();
        assert_eq!(p.score(0.0, 0.0, 1.0, 5.0), 0.0);
    }

    #[test]
    fn test_monotone_in_freshness() {
        let p = policy();
        let mut prev = -1.0;
        for i in 0..=10 {
            let f = f64::from(i) / 10.0;
            let s = p.score(f, 0.5, 0.5, 2.0);
            assert!(s >= prev, "score must be non-decreasing in freshness");
            prev = s;
        }
    }

    #[test]
    fn test_monotone_in_reliability() {
        let p = policy();
        let mut prev = -1.0;
        for i in 0..=10 {
            let r = f64::from(i) / 10.0;
            let s = p.score(0.5, r, 0.5, 2.0);
            assert!(s >= prev, "score must be non-decreasing in reliability");
            prev = s;
        }
    }

    #[test]
    fn test_antitone_in_cost() {
        let p = policy();
        let mut prev = f64::MAX;
        for i in 0..=10 {
            let c = f64::from(i) / 10.0;
            let s = p.score(0.5, 0.5, c, 2.0);
            assert!(s <= prev, "score must be non-increasing in cost");
            prev = s;
        }
    }

    #[test]
    fn test_default_weights() {
        let config = ScoringConfig::default();
        assert_eq!(config.freshness_weight, 0.45);
        assert_eq!(config.reliability_weight, 0.45);
        assert_eq!(config.cost_weight, 0.25);
    }
}
