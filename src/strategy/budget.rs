//! Collection budget ledger.
//!
//! Monotone-decreasing budget tracker. Deductions clamp at zero and
//! never error — overdrawing costs are already priced in by the soft
//! penalty in the decision agent, so the ledger simply floors.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Consumable budget, mutated only through `deduct` (and the external
/// `replenish` operation — the agent never calls that itself).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetTracker {
    total: f64,
    remaining: f64,
}

impl BudgetTracker {
    pub fn new(total: f64) -> Self {
        let total = total.max(0.0);
        Self {
            total,
            remaining: total,
        }
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Deduct a cost, flooring at zero. Costs exceeding the remaining
    /// budget are allowed.
    pub fn deduct(&mut self, cost: f64) {
        let old = self.remaining;
        self.remaining = (self.remaining - cost).max(0.0);
        debug!(
            old = format!("{old:.2}"),
            new = format!("{:.2}", self.remaining),
            cost = format!("{cost:.2}"),
            "Budget deducted"
        );
    }

    /// External replenishment, capped at the original total.
    pub fn replenish(&mut self, amount: f64) {
        self.remaining = (self.remaining + amount.max(0.0)).min(self.total);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_budget_full() {
        let b = BudgetTracker::new(5.0);
        assert_eq!(b.total(), 5.0);
        assert_eq!(b.remaining(), 5.0);
        assert!(!b.is_exhausted());
    }

    #[test]
    fn test_negative_total_clamped() {
        let b = BudgetTracker::new(-3.0);
        assert_eq!(b.total(), 0.0);
        assert!(b.is_exhausted());
    }

    #[test]
    fn test_deduct_reduces_remaining() {
        let mut b = BudgetTracker::new(5.0);
        b.deduct(0.3);
        b.deduct(0.2);
        assert!((b.remaining() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_deduct_floors_at_zero() {
        let mut b = BudgetTracker::new(1.0);
        b.deduct(100.0);
        assert_eq!(b.remaining(), 0.0);
        assert!(b.is_exhausted());
    }

    #[test]
    fn test_overdraw_cost_allowed() {
        let mut b = BudgetTracker::new(0.5);
        b.deduct(0.9); // cost > remaining — allowed, just floors
        assert_eq!(b.remaining(), 0.0);
    }

    #[test]
    fn test_exhausted_at_exact_zero() {
        let mut b = BudgetTracker::new(0.5);
        b.deduct(0.5);
        assert!(b.is_exhausted());
    }

    #[test]
    fn test_replenish_capped_at_total() {
        let mut b = BudgetTracker::new(5.0);
        b.deduct(3.0);
        b.replenish(10.0);
        assert_eq!(b.remaining(), 5.0);
    }

    #[test]
    fn test_replenish_revives_exhausted_ledger() {
        let mut b = BudgetTracker::new(2.0);
        b.deduct(2.0);
        assert!(b.is_exhausted());
        b.replenish(1.0);
        assert!(!b.is_exhausted());
        assert_eq!(b.remaining(), 1.0);
    }

    #[test]
    fn test_negative_replenish_ignored() {
        let mut b = BudgetTracker::new(2.0);
        b.deduct(1.0);
        b.replenish(-5.0);
        assert_eq!(b.remaining(), 1.0);
    }
}
