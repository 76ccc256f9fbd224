//! Shared types for the ARGENT agent.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that data, environment,
//! and strategy modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Source attributes
// ---------------------------------------------------------------------------

/// Quality attributes of a data source at a given cycle.
///
/// `freshness`, `reliability`, and `cost` are normalized to `[0, 1]`;
/// out-of-range values are clamped once at the snapshot boundary so the
/// strategy layer can assume the invariant holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceAttributes {
    /// How recent the data is (0.0–1.0).
    pub freshness: f64,
    /// How trustworthy the source is (0.0–1.0).
    pub reliability: f64,
    /// How expensive it is to query (0.0–1.0).
    pub cost: f64,
    /// Latest observed market quantity, if the source produced one.
    pub value: Option<f64>,
}

impl SourceAttributes {
    pub fn new(freshness: f64, reliability: f64, cost: f64) -> Self {
        Self {
            freshness,
            reliability,
            cost,
            value: None,
        }
    }

    /// Attach an observed value.
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Clamp the normalized attributes into `[0, 1]`.
    ///
    /// Applied by the environment when a snapshot is assembled — the
    /// strategy layer never validates ranges itself.
    pub fn clamped(mut self) -> Self {
        self.freshness = self.freshness.clamp(0.0, 1.0);
        self.reliability = self.reliability.clamp(0.0, 1.0);
        self.cost = self.cost.clamp(0.0, 1.0);
        self
    }
}

impl fmt::Display for SourceAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "freshness {:.2}, reliability {:.2}, cost {:.2}",
            self.freshness, self.reliability, self.cost
        )
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One cycle's view of all resolvable data sources.
///
/// Rebuilt wholesale each environment step; sources that failed to resolve
/// are omitted entirely rather than included with placeholder values.
/// Insertion order is preserved so that exploitation tie-breaking is
/// deterministic (first-seen wins).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    entries: Vec<(String, SourceAttributes)>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a source. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, attributes: SourceAttributes) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = attributes,
            None => self.entries.push((name, attributes)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SourceAttributes> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| a)
    }

    /// Iterate sources in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceAttributes)> {
        self.entries.iter().map(|(n, a)| (n.as_str(), a))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// Outcome of a single decision cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// The chosen source, or `None` when no decision was possible
    /// (exhausted budget or empty snapshot).
    pub source: Option<String>,
    /// Final score of the chosen source (0.0 when no decision was made).
    pub score: f64,
    /// Whether the exploration branch was taken.
    pub explored: bool,
    /// Audit explanation — produced on exploitation cycles only.
    pub explanation: Option<String>,
}

impl Decision {
    /// The "no decision possible" result.
    pub fn none() -> Self {
        Self {
            source: None,
            score: 0.0,
            explored: false,
            explanation: None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(name) => write!(
                f,
                "{} (score {:.4}{})",
                name,
                self.score,
                if self.explored { ", explored" } else { "" }
            ),
            None => write!(f, "no decision"),
        }
    }
}

/// Per-source scoring detail for one exploitation cycle.
///
/// Ephemeral — exists only to support the explanation output and is
/// rebuilt from scratch each cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub attributes: SourceAttributes,
    pub learned_value: f64,
    pub final_score: f64,
}

// ---------------------------------------------------------------------------
// Agent status
// ---------------------------------------------------------------------------

/// Agent lifecycle status.
///
/// `Exhausted` is terminal unless the budget ledger is externally
/// replenished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentStatus {
    Ready,
    Exhausted,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentStatus::Ready => write!(f, "🟢 READY"),
            AgentStatus::Exhausted => write!(f, "🔴 EXHAUSTED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cycle report
// ---------------------------------------------------------------------------

/// Summary of a single collect→reward→learn cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub timestamp: DateTime<Utc>,
    pub cycle_number: u64,
    pub sources_available: usize,
    pub selected: Option<String>,
    pub score: f64,
    pub explored: bool,
    pub reward: Option<f64>,
    pub remaining_budget: f64,
    pub status: AgentStatus,
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cycle #{}: sources={} selected={} score={:.4} reward={} budget={:.2} [{}]",
            self.cycle_number,
            self.sources_available,
            self.selected.as_deref().unwrap_or("-"),
            self.score,
            self.reward
                .map_or_else(|| "-".to_string(), |r| format!("{r:.4}")),
            self.remaining_budget,
            self.status,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for ARGENT.
///
/// The decision path itself has no fatal conditions — every edge case
/// (zero budget, empty snapshot, unseen arm) degrades to a defined
/// zero/no-op value. These errors belong to the collaborator layer, where
/// they are absorbed and surfaced as "source absent this cycle".
#[derive(Debug, thiserror::Error)]
pub enum ArgentError {
    #[error("Data provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("Malformed payload from {provider}: {message}")]
    MalformedPayload { provider: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
