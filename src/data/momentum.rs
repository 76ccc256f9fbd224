//! Short-term market momentum provider.
//!
//! Uses Alpha Vantage FX intraday series (XAG/USD, 5-minute bars) to
//! estimate momentum as a clamped percentage change over the most
//! recent closes, normalized to `[-1, 1]`. Fewer than two closes yield
//! a neutral 0.0.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::{SourceProfile, SourceProvider};
use crate::types::ArgentError;

/// Percentage move mapped to full-scale impact (±1.0).
const FULL_SCALE_MOVE: f64 = 0.02;

/// Number of most recent closes considered.
const WINDOW: usize = 5;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct IntradayResponse {
    #[serde(rename = "Time Series FX (5min)", default)]
    series: Option<BTreeMap<String, IntradayBar>>,
}

#[derive(Debug, Deserialize)]
struct IntradayBar {
    #[serde(rename = "4. close")]
    close: String,
}

// ---------------------------------------------------------------------------
// Impact math
// ---------------------------------------------------------------------------

/// Momentum impact in `[-1, 1]` from closes ordered most-recent-first.
fn impact_from_closes(closes: &[f64]) -> f64 {
    if closes.len() < 2 {
        return 0.0;
    }
    let recent = closes[0];
    let older = closes[closes.len() - 1];
    if older == 0.0 {
        return 0.0;
    }
    let change_pct = ((recent - older) / older).clamp(-FULL_SCALE_MOVE, FULL_SCALE_MOVE);
    change_pct / FULL_SCALE_MOVE
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct MomentumProvider {
    http: Client,
    api_key: String,
    base_url: String,
}

impl MomentumProvider {
    pub fn from_env(key_env: &str) -> Result<Self> {
        let api_key =
            std::env::var(key_env).map_err(|_| ArgentError::MissingApiKey(key_env.to_string()))?;
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent("ARGENT/0.1.0")
            .build()
            .context("Failed to build momentum HTTP client")?;
        Ok(Self {
            http,
            api_key,
            base_url: "https://www.alphavantage.co/query".to_string(),
        })
    }

    /// Extract up to `WINDOW` closes, most recent first. Timestamps sort
    /// lexicographically, so reverse iteration of the BTreeMap is newest
    /// first.
    fn recent_closes(series: &BTreeMap<String, IntradayBar>) -> Vec<f64> {
        series
            .iter()
            .rev()
            .take(WINDOW)
            .filter_map(|(_, bar)| bar.close.parse::<f64>().ok())
            .collect()
    }
}

#[async_trait]
impl SourceProvider for MomentumProvider {
    fn name(&self) -> &str {
        "market_momentum"
    }

    fn profile(&self) -> SourceProfile {
        SourceProfile {
            freshness: 0.8,
            reliability: 0.75,
            cost: 0.25,
        }
    }

    async fn fetch_value(&self) -> Result<f64> {
        let resp: IntradayResponse = self
            .http
            .get(&self.base_url)
            .query(&[
                ("function", "FX_INTRADAY"),
                ("from_symbol", "XAG"),
                ("to_symbol", "USD"),
                ("interval", "5min"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("Alpha Vantage intraday request failed")?
            .error_for_status()
            .context("Alpha Vantage returned an error status")?
            .json()
            .await
            .context("Failed to parse intraday response")?;

        let closes = resp
            .series
            .as_ref()
            .map(|s| Self::recent_closes(s))
            .unwrap_or_default();

        let impact = impact_from_closes(&closes);
        debug!(
            closes = closes.len(),
            impact = format!("{impact:.4}"),
            "Market momentum computed"
        );
        Ok(impact)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
