//! Multi-cycle simulation harness.
//!
//! Drives the full select→deduct→reward→learn loop against a synthetic
//! environment with deterministic exploration, validating learning
//! convergence, budget depletion, and graceful degradation end to end.

use anyhow::anyhow;
use async_trait::async_trait;

use argent::data::{SourceProfile, SourceProvider};
use argent::environment::MarketEnvironment;
use argent::strategy::exploration::ExplorationConfig;
use argent::strategy::DecisionAgent;
use argent::types::{AgentStatus, Snapshot, SourceAttributes};

// ---------------------------------------------------------------------------
// Synthetic environment
// ---------------------------------------------------------------------------

/// A reliable source near consensus and a costly outlier. The reliable
/// one earns positive rewards, the outlier negative ones.
fn synthetic_snapshot() -> Snapshot {
    let mut snap = Snapshot::new();
    snap.insert(
        "steady_feed",
        SourceAttributes::new(0.9, 0.9, 0.2).with_value(24.0),
    );
    snap.insert(
        "flaky_feed",
        SourceAttributes::new(0.5, 0.4, 0.7).with_value(27.0),
    );
    snap
}

fn seeded_agent(total_budget: f64, epsilon: f64, seed: u64) -> DecisionAgent {
    DecisionAgent::with_seed(
        total_budget,
        ExplorationConfig {
            initial_epsilon: epsilon,
            ..Default::default()
        },
        seed,
    )
}

struct ScriptedProvider {
    name: &'static str,
    profile: SourceProfile,
    value: Option<f64>,
}

#[async_trait]
impl SourceProvider for ScriptedProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn profile(&self) -> SourceProfile {
        self.profile
    }

    async fn fetch_value(&self) -> anyhow::Result<f64> {
        self.value.ok_or_else(|| anyhow!("scripted failure"))
    }
}

// ---------------------------------------------------------------------------
// Simulations
// ---------------------------------------------------------------------------

#[test]
fn simulation_agent_learns_to_prefer_rewarding_source() {
    let mut env = MarketEnvironment::new(Vec::new());
    let mut agent = seeded_agent(50.0, 0.3, 1234);

    let mut exploit_wins_for_steady = 0u32;
    let mut exploit_cycles = 0u32;

    for _ in 0..80 {
        env.set_snapshot(synthetic_snapshot());
        let decision = agent.select_best_source(env.snapshot());
        let Some(name) = decision.source.clone() else {
            break;
        };

        let cost = env.snapshot().get(&name).unwrap().cost;
        agent.deduct_cost(cost);

        if let Some(reward) = env.reward(&name) {
            agent.update_learning(Some(&name), reward);
        }

        if !decision.explored {
            exploit_cycles += 1;
            if name == "steady_feed" {
                exploit_wins_for_steady += 1;
            }
        }
    }

    // The steady feed dominates on attributes and rewards. The confidence
    // bonus may send at most one optimistic exploitation pick to the
    // never-pulled flaky feed; its first negative reward ends that.
    assert!(exploit_cycles > 0);
    assert!(exploit_wins_for_steady + 1 >= exploit_cycles);
    assert!(exploit_wins_for_steady * 2 > exploit_cycles);

    // Learned values reflect the reward structure.
    let steady = agent.bandit().estimated_value("steady_feed");
    assert!(steady > 0.0, "steady feed should earn positive rewards");
    if agent.bandit().pull_count("flaky_feed") > 0 {
        assert!(steady > agent.bandit().estimated_value("flaky_feed"));
    }
}

#[test]
fn simulation_budget_depletes_and_agent_degrades_gracefully() {
    let mut env = MarketEnvironment::new(Vec::new());
    // Tiny budget: a handful of queries at cost ~0.2 exhausts it.
    let mut agent = seeded_agent(1.0, 0.0, 9);

    let mut decisions_made = 0u32;
    for _ in 0..20 {
        env.set_snapshot(synthetic_snapshot());
        let decision = agent.select_best_source(env.snapshot());
        match decision.source {
            Some(name) => {
                decisions_made += 1;
                let cost = env.snapshot().get(&name).unwrap().cost;
                agent.deduct_cost(cost);
                if let Some(reward) = env.reward(&name) {
                    agent.update_learning(Some(&name), reward);
                }
            }
            None => {
                // Exhausted: the no-decision result is stable and repeatable.
                assert_eq!(agent.status(), AgentStatus::Exhausted);
                assert_eq!(decision.score, 0.0);
            }
        }
    }

    assert!(decisions_made >= 1);
    assert_eq!(agent.status(), AgentStatus::Exhausted);
    assert_eq!(agent.remaining_budget(), 0.0);

    // Still answers after exhaustion, without panicking.
    let after = agent.select_best_source(env.snapshot());
    assert!(after.source.is_none());
}

#[test]
fn simulation_epsilon_decays_toward_floor() {
    let mut env = MarketEnvironment::new(Vec::new());
    let mut agent = seeded_agent(1000.0, 0.2, 7);

    for _ in 0..1000 {
        env.set_snapshot(synthetic_snapshot());
        let decision = agent.select_best_source(env.snapshot());
        agent.deduct_cost(0.0); // keep the ledger alive for the whole run
        agent.update_learning(decision.source.as_deref(), 0.1);
    }

    assert_eq!(agent.total_decisions(), 1000);
    assert!((agent.epsilon() - 0.05).abs() < 1e-12);
}

#[test]
fn simulation_empty_market_yields_no_decisions() {
    let mut env = MarketEnvironment::new(Vec::new());
    let mut agent = seeded_agent(5.0, 0.2, 3);

    env.set_snapshot(Snapshot::new());
    let decision = agent.select_best_source(env.snapshot());
    assert!(decision.source.is_none());
    assert!(env.reward("anything").is_none());
    assert!(env.market_average().is_none());

    // Budget untouched when nothing can be collected.
    assert_eq!(agent.remaining_budget(), 5.0);
}

#[tokio::test]
async fn simulation_provider_failures_absorbed_by_environment() {
    let mut env = MarketEnvironment::new(vec![
        Box::new(ScriptedProvider {
            name: "healthy",
            profile: SourceProfile {
                freshness: 0.9,
                reliability: 0.9,
                cost: 0.2,
            },
            value: Some(24.0),
        }),
        Box::new(ScriptedProvider {
            name: "dead_api",
            profile: SourceProfile {
                freshness: 0.8,
                reliability: 0.8,
                cost: 0.3,
            },
            value: None,
        }),
    ]);
    let mut agent = seeded_agent(5.0, 0.0, 5);

    env.step().await;

    // The failing provider is simply absent — never an error in the
    // decision path.
    assert_eq!(env.snapshot().len(), 1);
    let decision = agent.select_best_source(env.snapshot());
    assert_eq!(decision.source.as_deref(), Some("healthy"));

    let reward = env.reward("healthy").unwrap();
    agent.update_learning(decision.source.as_deref(), reward);
    assert_eq!(agent.bandit().pull_count("healthy"), 1);
}

#[test]
fn simulation_reward_drift_uses_current_snapshot() {
    // The reward is computed against whatever snapshot is current at
    // reward time; selection and reward may see different markets.
    let mut env = MarketEnvironment::new(Vec::new());
    let mut agent = seeded_agent(5.0, 0.0, 2);

    env.set_snapshot(synthetic_snapshot());
    let decision = agent.select_best_source(env.snapshot());
    let name = decision.source.unwrap();

    // Market moves before the reward is collected.
    let mut moved = Snapshot::new();
    moved.insert(
        "steady_feed",
        SourceAttributes::new(0.9, 0.9, 0.2).with_value(25.0),
    );
    env.set_snapshot(moved);

    let reward = env.reward(&name).unwrap();
    // value == new consensus of one → quality 0.81, reward 0.61
    assert!((reward - 0.61).abs() < 1e-12);
    agent.update_learning(Some(&name), reward);
    assert_eq!(agent.bandit().pull_count(&name), 1);
}
