//! Real-time silver market environment.
//!
//! Owns the current snapshot of resolvable data sources and the reward
//! logic that turns an observation into a learning signal. The snapshot
//! is rebuilt wholesale on every `step`; providers that fail are logged
//! and omitted for the cycle — failures never reach the decision path.

use futures::future::join_all;
use tracing::{info, warn};

use crate::data::SourceProvider;
use crate::types::{Snapshot, SourceAttributes};

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

pub struct MarketEnvironment {
    providers: Vec<Box<dyn SourceProvider>>,
    snapshot: Snapshot,
    time_step: u64,
}

impl MarketEnvironment {
    pub fn new(providers: Vec<Box<dyn SourceProvider>>) -> Self {
        Self {
            providers,
            snapshot: Snapshot::new(),
            time_step: 0,
        }
    }

    pub fn time_step(&self) -> u64 {
        self.time_step
    }

    /// The current snapshot. Immutable for the duration of one decision
    /// cycle — it only changes through `step`.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    // -- Dynamics ---------------------------------------------------------

    /// Refresh the environment with live data.
    ///
    /// All providers are queried concurrently; each either contributes a
    /// snapshot entry (attributes clamped to `[0, 1]` here, at the
    /// boundary) or is omitted for the cycle.
    pub async fn step(&mut self) {
        self.time_step += 1;

        let fetches = self.providers.iter().map(|p| async {
            let result = p.fetch_value().await;
            (p.name().to_string(), p.profile(), result)
        });

        let mut snapshot = Snapshot::new();
        for (name, profile, result) in join_all(fetches).await {
            match result {
                Ok(value) => {
                    let attrs =
                        SourceAttributes::new(profile.freshness, profile.reliability, profile.cost)
                            .clamped()
                            .with_value(value);
                    snapshot.insert(name, attrs);
                }
                Err(e) => {
                    warn!(source = %name, error = %e, "Source absent this cycle");
                }
            }
        }

        info!(
            time_step = self.time_step,
            sources = ?snapshot.names(),
            "Environment refreshed"
        );
        self.snapshot = snapshot;
    }

    /// Replace the snapshot directly — simulation and test harnesses.
    pub fn set_snapshot(&mut self, snapshot: Snapshot) {
        self.time_step += 1;
        self.snapshot = snapshot;
    }

    // -- Reward logic -----------------------------------------------------

    /// Mean observed value over all sources currently carrying one.
    /// `None` when no source carries a value.
    pub fn market_average(&self) -> Option<f64> {
        let values: Vec<f64> = self
            .snapshot
            .iter()
            .filter_map(|(_, a)| a.value)
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Learning signal for a selected source: agreement with the market
    /// consensus, weighted by quality, minus cost.
    ///
    /// `quality = freshness * reliability * 1 / (1 + |value - avg|)`;
    /// `reward = quality - cost`. Unclamped — negative rewards teach the
    /// bandit to disfavour a source. `None` when the source is absent,
    /// carries no value, or no market average is computable.
    pub fn reward(&self, source: &str) -> Option<f64> {
        let attrs = self.snapshot.get(source)?;
        let value = attrs.value?;
        let avg = self.market_average()?;

        let quality = attrs.freshness * attrs.reliability * (1.0 / (1.0 + (value - avg).abs()));
        let reward = quality - attrs.cost;

        info!(
            source,
            quality = format!("{quality:.4}"),
            cost = attrs.cost,
            reward = format!("{reward:.4}"),
            "Reward computed"
        );
        Some(reward)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SourceProfile;
    use anyhow::anyhow;
    use async_trait::async_trait;

    // ---- mock provider -----------------------------------------------------

    struct FixedProvider {
        name: &'static str,
        profile: SourceProfile,
        value: Option<f64>, // None → fetch fails
    }

    #[async_trait]
    impl SourceProvider for FixedProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn profile(&self) -> SourceProfile {
            self.profile
        }

        async fn fetch_value(&self) -> anyhow::Result<f64> {
            self.value.ok_or_else(|| anyhow!("fetch failed"))
        }
    }

    fn provider(name: &'static str, cost: f64, value: Option<f64>) -> Box<dyn SourceProvider> {
        Box::new(FixedProvider {
            name,
            profile: SourceProfile {
                freshness: 0.9,
                reliability: 0.9,
                cost,
            },
            value,
        })
    }

    fn snapshot_env(entries: &[(&str, SourceAttributes)]) -> MarketEnvironment {
        let mut env = MarketEnvironment::new(Vec::new());
        let mut snap = Snapshot::new();
        for (name, attrs) in entries {
            snap.insert(*name, *attrs);
        }
        env.set_snapshot(snap);
        env
    }

    // ---- tests -------------------------------------------------------------

    #[tokio::test]
    async fn test_step_builds_snapshot_from_providers() {
        let mut env = MarketEnvironment::new(vec![
            provider("a", 0.3, Some(24.0)),
            provider("b", 0.4, Some(24.5)),
        ]);
        env.step().await;

        assert_eq!(env.time_step(), 1);
        assert_eq!(env.snapshot().len(), 2);
        assert_eq!(env.snapshot().get("a").unwrap().value, Some(24.0));
    }

    #[tokio::test]
    async fn test_failed_provider_omitted() {
        let mut env = MarketEnvironment::new(vec![
            provider("healthy", 0.3, Some(24.0)),
            provider("broken", 0.4, None),
        ]);
        env.step().await;

        assert_eq!(env.snapshot().len(), 1);
        assert!(env.snapshot().get("broken").is_none());
    }

    #[tokio::test]
    async fn test_step_replaces_snapshot_wholesale() {
        let mut env = MarketEnvironment::new(vec![provider("a", 0.3, Some(24.0))]);
        env.step().await;

        // Inject a stale extra source, then step: it must disappear.
        let mut stale = Snapshot::new();
        stale.insert("a", SourceAttributes::new(0.9, 0.9, 0.3).with_value(24.0));
        stale.insert("ghost", SourceAttributes::new(0.5, 0.5, 0.5).with_value(1.0));
        env.set_snapshot(stale);

        env.step().await;
        assert_eq!(env.snapshot().len(), 1);
        assert!(env.snapshot().get("ghost").is_none());
    }

    #[test]
    fn test_reward_at_market_consensus() {
        // value == avg, freshness 0.9, reliability 0.9, cost 0.3:
        // quality = 0.81, reward = 0.51
        let env = snapshot_env(&[(
            "spot",
            SourceAttributes::new(0.9, 0.9, 0.3).with_value(24.0),
        )]);
        let reward = env.reward("spot").unwrap();
        assert!((reward - 0.51).abs() < 1e-12);
    }

    #[test]
    fn test_reward_penalizes_divergence_from_average() {
        let env = snapshot_env(&[
            ("agrees", SourceAttributes::new(0.9, 0.9, 0.3).with_value(24.0)),
            ("outlier", SourceAttributes::new(0.9, 0.9, 0.3).with_value(30.0)),
        ]);
        let agree = env.reward("agrees").unwrap();
        let outlier = env.reward("outlier").unwrap();
        assert!(agree > outlier);
    }

    #[test]
    fn test_reward_can_be_negative() {
        let env = snapshot_env(&[(
            "costly",
            SourceAttributes::new(0.4, 0.4, 0.9).with_value(24.0),
        )]);
        assert!(env.reward("costly").unwrap() < 0.0);
    }

    #[test]
    fn test_reward_absent_source_is_none() {
        let env = snapshot_env(&[(
            "spot",
            SourceAttributes::new(0.9, 0.9, 0.3).with_value(24.0),
        )]);
        assert!(env.reward("missing").is_none());
    }

    #[test]
    fn test_reward_valueless_source_is_none() {
        let env = snapshot_env(&[("no_value", SourceAttributes::new(0.9, 0.9, 0.3))]);
        assert!(env.reward("no_value").is_none());
    }

    #[test]
    fn test_market_average_empty_snapshot_is_none() {
        let env = snapshot_env(&[]);
        assert!(env.market_average().is_none());
    }

    #[test]
    fn test_market_average_skips_valueless_sources() {
        let env = snapshot_env(&[
            ("priced", SourceAttributes::new(0.9, 0.9, 0.3).with_value(20.0)),
            ("priced2", SourceAttributes::new(0.9, 0.9, 0.3).with_value(30.0)),
            ("signal_only", SourceAttributes::new(0.7, 0.6, 0.2)),
        ]);
        assert_eq!(env.market_average(), Some(25.0));
    }

    #[tokio::test]
    async fn test_attributes_clamped_at_boundary() {
        let mut env = MarketEnvironment::new(vec![Box::new(FixedProvider {
            name: "wild",
            profile: SourceProfile {
                freshness: 1.7,
                reliability: -0.4,
                cost: 0.5,
            },
            value: Some(1.0),
        })]);
        env.step().await;

        let attrs = env.snapshot().get("wild").unwrap();
        assert_eq!(attrs.freshness, 1.0);
        assert_eq!(attrs.reliability, 0.0);
    }
}
