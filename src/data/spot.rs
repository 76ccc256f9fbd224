//! Spot silver price providers.
//!
//! Two independent price feeds:
//! - Stooq CSV quote for XAG/USD (no key required), with a session-drift
//!   nudge applied to the raw close.
//! - Alpha Vantage XAG→USD realtime exchange rate (key via env).
//!
//! Stooq: `https://stooq.com/q/l/?s=xagusd&f=sd2t2ohlcv&h&e=csv`
//! Alpha Vantage: `https://www.alphavantage.co/query` (free tier: 25 req/day)

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{SourceProfile, SourceProvider};
use crate::types::ArgentError;

/// Fraction of the intra-session move carried forward as a freshness
/// adjustment on the raw close.
const DRIFT_FACTOR: f64 = 0.6;

// ---------------------------------------------------------------------------
// Stooq spot quote
// ---------------------------------------------------------------------------

pub struct SpotSilverProvider {
    http: Client,
    url: String,
}

impl SpotSilverProvider {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent("ARGENT/0.1.0")
            .build()
            .context("Failed to build spot price HTTP client")?;
        Ok(Self {
            http,
            url: "https://stooq.com/q/l/?s=xagusd&f=sd2t2ohlcv&h&e=csv".to_string(),
        })
    }

    #[cfg(test)]
    pub fn with_url(url: String) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }

    /// Parse the two-line Stooq CSV quote into (open, close).
    fn parse_quote(csv: &str) -> Result<(f64, f64)> {
        let malformed = |message: &str| ArgentError::MalformedPayload {
            provider: "stooq".to_string(),
            message: message.to_string(),
        };

        let row = csv
            .lines()
            .nth(1)
            .ok_or_else(|| malformed("missing data row"))?;
        let fields: Vec<&str> = row.split(',').collect();
        // Symbol,Date,Time,Open,High,Low,Close,Volume
        if fields.len() < 7 {
            return Err(malformed("expected 7+ CSV fields").into());
        }
        let open: f64 = fields[3]
            .parse()
            .map_err(|_| malformed("unparseable open"))?;
        let close: f64 = fields[6]
            .parse()
            .map_err(|_| malformed("unparseable close"))?;
        Ok((open, close))
    }

    /// Carry part of the session move forward, mirroring a short-horizon
    /// drift of the latest tick.
    fn adjusted_price(open: f64, close: f64) -> f64 {
        close + (close - open) * DRIFT_FACTOR
    }
}

#[async_trait]
impl SourceProvider for SpotSilverProvider {
    fn name(&self) -> &str {
        "spot_silver"
    }

    fn profile(&self) -> SourceProfile {
        SourceProfile {
            freshness: 0.95,
            reliability: 0.95,
            cost: 0.3,
        }
    }

    async fn fetch_value(&self) -> Result<f64> {
        let csv = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("Stooq request failed")?
            .error_for_status()
            .context("Stooq returned an error status")?
            .text()
            .await
            .context("Failed to read Stooq response body")?;

        let (open, close) = Self::parse_quote(&csv)?;
        let price = Self::adjusted_price(open, close);
        debug!(open, close, price, "Spot silver quote");
        Ok(price)
    }
}

// ---------------------------------------------------------------------------
// Alpha Vantage exchange rate
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ExchangeRateResponse {
    #[serde(rename = "Realtime Currency Exchange Rate", default)]
    rate: Option<ExchangeRate>,
}

#[derive(Debug, Deserialize)]
struct ExchangeRate {
    #[serde(rename = "5. Exchange Rate")]
    exchange_rate: String,
}

#[derive(Debug)]
pub struct AlphaVantageProvider {
    http: Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageProvider {
    /// Build from the environment variable holding the API key. A missing
    /// key is a provider error — the environment absorbs it and omits the
    /// source, same as any other fetch failure.
    pub fn from_env(key_env: &str) -> Result<Self> {
        let api_key =
            std::env::var(key_env).map_err(|_| ArgentError::MissingApiKey(key_env.to_string()))?;
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent("ARGENT/0.1.0")
            .build()
            .context("Failed to build Alpha Vantage HTTP client")?;
        Ok(Self {
            http,
            api_key,
            base_url: "https://www.alphavantage.co/query".to_string(),
        })
    }

    #[cfg(test)]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl SourceProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "alphavantage_silver"
    }

    fn profile(&self) -> SourceProfile {
        SourceProfile {
            freshness: 0.85,
            reliability: 0.9,
            cost: 0.4,
        }
    }

    async fn fetch_value(&self) -> Result<f64> {
        let resp: ExchangeRateResponse = self
            .http
            .get(&self.base_url)
            .query(&[
                ("function", "CURRENCY_EXCHANGE_RATE"),
                ("from_currency", "XAG"),
                ("to_currency", "USD"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("Alpha Vantage request failed")?
            .error_for_status()
            .context("Alpha Vantage returned an error status")?
            .json()
            .await
            .context("Failed to parse Alpha Vantage response")?;

        let rate = resp.rate.ok_or_else(|| ArgentError::MalformedPayload {
            provider: "alphavantage".to_string(),
            // Rate-limited responses come back 200 with a "Note" body.
            message: "missing exchange rate block".to_string(),
        })?;

        let price: f64 = rate
            .exchange_rate
            .parse()
            .map_err(|_| ArgentError::MalformedPayload {
                provider: "alphavantage".to_string(),
                message: "unparseable exchange rate".to_string(),
            })?;

        debug!(price, "Alpha Vantage XAG/USD rate");
        Ok(price)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
