//! Live data source providers.
//!
//! Defines the `SourceProvider` trait and the concrete silver-market
//! providers (spot price, exchange rate, news sentiment, momentum).
//! Every provider failure is absorbed by the environment and surfaced
//! as "source absent this cycle" — errors never reach the decision path.

pub mod momentum;
pub mod sentiment;
pub mod spot;

use anyhow::Result;
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Provider contract
// ---------------------------------------------------------------------------

/// Quality attributes a provider declares for the source it backs.
#[derive(Debug, Clone, Copy)]
pub struct SourceProfile {
    pub freshness: f64,
    pub reliability: f64,
    pub cost: f64,
}

/// Abstraction over external data sources.
///
/// A provider contributes one snapshot entry per cycle: its declared
/// profile plus the freshly observed value. Fetching is a blocking
/// collaborator call from the agent's point of view — it completes (or
/// fails soft) before a snapshot is considered ready.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Stable source identifier used as the snapshot key.
    fn name(&self) -> &str;

    /// Declared quality attributes for this source.
    fn profile(&self) -> SourceProfile;

    /// Fetch the latest observed value. Errors are logged and the source
    /// is omitted from the snapshot for the cycle.
    async fn fetch_value(&self) -> Result<f64>;
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Normalize a raw value into `[0, 1]` over a fixed band.
/// Degenerate bands map to the 0.5 midpoint.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if (max - min).abs() < f64::EPSILON {
        return 0.5;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_midpoint() {
        assert_eq!(normalize(25.0, 10.0, 40.0), 0.5);
    }

    #[test]
    fn test_normalize_clamps() {
        assert_eq!(normalize(100.0, 10.0, 40.0), 1.0);
        assert_eq!(normalize(-5.0, 10.0, 40.0), 0.0);
    }

    #[test]
    fn test_normalize_degenerate_band() {
        assert_eq!(normalize(7.0, 3.0, 3.0), 0.5);
    }
}
