//! Decision engine — scoring, bandit learning, exploration, and budget.
//!
//! The `DecisionAgent` orchestrates one decision cycle: pick a source
//! from the current snapshot (explore or exploit), and absorb the reward
//! feedback that follows. The caller drives the fixed cycle order:
//! `select_best_source` → `deduct_cost` → obtain reward → `update_learning`.

pub mod bandit;
pub mod budget;
pub mod exploration;
pub mod scoring;

use tracing::{debug, info, warn};

use crate::types::{AgentStatus, Decision, EvaluationRecord, Snapshot, SourceAttributes};
use bandit::BanditLearner;
use budget::BudgetTracker;
use exploration::{ExplorationConfig, ExplorationController};
use scoring::{ScoringConfig, ScoringPolicy};

/// Weight of the confidence bonus in the final exploitation score.
const BONUS_WEIGHT: f64 = 0.5;

/// Rate of the soft penalty for sources whose cost would overdraw the
/// remaining budget. Additive, not rejecting — the ledger floors at zero
/// anyway.
const OVERDRAW_PENALTY_RATE: f64 = 1.5;

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Orchestrates scoring, learning, exploration, and budget tracking into
/// a single decision cycle.
///
/// All state is owned exclusively by one agent instance; the decision
/// cycle is synchronous with no suspension points. Callers that share an
/// agent across threads must wrap it in their own mutual exclusion.
pub struct DecisionAgent {
    scoring: ScoringPolicy,
    bandit: BanditLearner,
    exploration: ExplorationController,
    budget: BudgetTracker,
}

impl DecisionAgent {
    /// Agent with OS-seeded exploration.
    pub fn new(total_budget: f64, exploration: ExplorationConfig) -> Self {
        Self::build(total_budget, ExplorationController::new(exploration))
    }

    /// Agent with deterministic exploration — reproducible runs and tests.
    pub fn with_seed(total_budget: f64, exploration: ExplorationConfig, seed: u64) -> Self {
        Self::build(
            total_budget,
            ExplorationController::with_seed(exploration, seed),
        )
    }

    fn build(total_budget: f64, exploration: ExplorationController) -> Self {
        Self {
            scoring: ScoringPolicy::new(ScoringConfig::default()),
            bandit: BanditLearner::new(),
            exploration,
            budget: BudgetTracker::new(total_budget),
        }
    }

    pub fn status(&self) -> AgentStatus {
        if self.budget.is_exhausted() {
            AgentStatus::Exhausted
        } else {
            AgentStatus::Ready
        }
    }

    pub fn remaining_budget(&self) -> f64 {
        self.budget.remaining()
    }

    pub fn epsilon(&self) -> f64 {
        self.exploration.epsilon()
    }

    pub fn total_decisions(&self) -> u64 {
        self.exploration.total_decisions()
    }

    /// Learned statistics, read-only.
    pub fn bandit(&self) -> &BanditLearner {
        &self.bandit
    }

    /// External replenishment of the budget ledger. The agent never calls
    /// this itself; an exhausted agent stays exhausted otherwise.
    pub fn replenish_budget(&mut self, amount: f64) {
        self.budget.replenish(amount);
    }

    // -- Decision cycle ---------------------------------------------------

    /// Select the next source to query from the current snapshot.
    ///
    /// Exhausted budget or an empty snapshot yield the "no decision"
    /// result without mutating learning or exploration state. Otherwise
    /// the decision counter advances, the explore/exploit branch is
    /// drawn, and epsilon decays — on every cycle, either branch.
    pub fn select_best_source(&mut self, snapshot: &Snapshot) -> Decision {
        if self.budget.is_exhausted() {
            info!(
                remaining = format!("{:.2}", self.budget.remaining()),
                "Budget exhausted — no source selected"
            );
            return Decision::none();
        }

        if snapshot.is_empty() {
            warn!("Empty snapshot — no decision possible this cycle");
            return Decision::none();
        }

        self.exploration.record_decision();

        let decision = if self.exploration.should_explore() {
            self.explore(snapshot)
        } else {
            self.exploit(snapshot)
        };

        self.exploration.decay_epsilon();
        decision
    }

    /// Explore branch: uniform random pick; only the chosen source is
    /// scored, and no explanation is produced.
    fn explore(&mut self, snapshot: &Snapshot) -> Decision {
        let idx = self.exploration.pick_uniform(snapshot.len());
        let Some((name, attrs)) = snapshot.iter().nth(idx).map(|(n, a)| (n.to_string(), *a))
        else {
            return Decision::none();
        };

        let score = self.final_score(&name, &attrs);
        debug!(
            source = %name,
            score = format!("{score:.4}"),
            epsilon = format!("{:.4}", self.exploration.epsilon()),
            "Exploration pick"
        );

        Decision {
            source: Some(name),
            score,
            explored: true,
            explanation: None,
        }
    }

    /// Exploit branch: score every source, select the maximum (first-seen
    /// order breaks ties), and build the full evaluation map feeding the
    /// audit explanation.
    fn exploit(&mut self, snapshot: &Snapshot) -> Decision {
        let mut evaluations: Vec<(String, EvaluationRecord)> = Vec::with_capacity(snapshot.len());
        let mut best: Option<(usize, f64)> = None;

        for (i, (name, attrs)) in snapshot.iter().enumerate() {
            let final_score = self.final_score(name, attrs);
            evaluations.push((
                name.to_string(),
                EvaluationRecord {
                    attributes: *attrs,
                    learned_value: self.bandit.estimated_value(name),
                    final_score,
                },
            ));
            // Strictly-greater comparison keeps the first-seen source on ties.
            if best.map_or(true, |(_, s)| final_score > s) {
                best = Some((i, final_score));
            }
        }

        // Snapshot is non-empty here, so a winner always exists.
        let (winner_idx, score) = match best {
            Some(b) => b,
            None => return Decision::none(),
        };
        let winner = evaluations[winner_idx].0.clone();
        let explanation = build_explanation(&winner, &evaluations);

        info!(
            source = %winner,
            score = format!("{score:.4}"),
            candidates = evaluations.len(),
            budget_remaining = format!("{:.2}", self.budget.remaining()),
            "Source selected"
        );

        Decision {
            source: Some(winner),
            score,
            explored: false,
            explanation: Some(explanation),
        }
    }

    /// Final per-candidate score during exploitation (and for the single
    /// explored candidate): base utility + learned value + weighted
    /// confidence bonus − soft overdraw penalty.
    fn final_score(&self, name: &str, attrs: &SourceAttributes) -> f64 {
        let remaining = self.budget.remaining();
        let base = self
            .scoring
            .score(attrs.freshness, attrs.reliability, attrs.cost, remaining);
        let learned = self.bandit.estimated_value(name);
        let bonus = self.exploration.confidence_bonus(self.bandit.pull_count(name));
        let overdraw_penalty = (OVERDRAW_PENALTY_RATE * (attrs.cost - remaining)).max(0.0);

        base + learned + BONUS_WEIGHT * bonus - overdraw_penalty
    }

    // -- Feedback ---------------------------------------------------------

    /// Record the observed reward for the selected source. A `None` source
    /// (no decision was made) is a no-op. An unknown source just creates a
    /// fresh arm — caller misuse, not an error.
    pub fn update_learning(&mut self, source: Option<&str>, reward: f64) {
        let Some(name) = source else {
            return;
        };
        self.bandit.update(name, reward);
    }

    /// Deduct the selected source's cost from the budget ledger. Once the
    /// remaining budget hits zero the agent reports `Exhausted`.
    pub fn deduct_cost(&mut self, cost: f64) {
        self.budget.deduct(cost);
        if self.budget.is_exhausted() {
            warn!("Collection budget exhausted");
        }
    }
}

// ---------------------------------------------------------------------------
// Explanation synthesis
// ---------------------------------------------------------------------------

/// Human-readable audit line for an exploitation decision: the winner's
/// attributes, then — per rival — only the attributes strictly worse than
/// the winner's. A learned-value clause is appended when the winner's
/// learned value is positive.
fn build_explanation(winner: &str, evaluations: &[(String, EvaluationRecord)]) -> String {
    let Some((_, winner_eval)) = evaluations.iter().find(|(n, _)| n == winner) else {
        return String::new();
    };
    let w = &winner_eval.attributes;

    let mut out = format!(
        "Selected '{winner}' ({}).",
        winner_eval.attributes
    );

    for (name, eval) in evaluations {
        if name == winner {
            continue;
        }
        let a = &eval.attributes;
        let mut worse = Vec::new();
        if a.freshness < w.freshness {
            worse.push("lower freshness");
        }
        if a.reliability < w.reliability {
            worse.push("lower reliability");
        }
        if a.cost > w.cost {
            worse.push("higher cost");
        }
        if worse.is_empty() {
            out.push_str(&format!(" '{name}' scores lower overall."));
        } else {
            out.push_str(&format!(" '{name}' loses on: {}.", worse.join(", ")));
        }
    }

    if winner_eval.learned_value > 0.0 {
        out.push_str(&format!(
            " Learned value favours it (+{:.4}).",
            winner_eval.learned_value
        ));
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
