//! News sentiment provider.
//!
//! Fetches silver-related headlines from GNews and scores them with a
//! small polarity lexicon, normalized to `[0, 1]` (0.5 = neutral). Safe
//! fallbacks everywhere: no key or no articles yield the neutral value
//! rather than an error, matching the "absent or harmless" contract.
//!
//! API: `https://gnews.io/api/v4/search`
//! Auth: API key via `apikey` query param. Free tier: 100 req/day.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{SourceProfile, SourceProvider};

/// Neutral sentiment when no signal is available.
const NEUTRAL: f64 = 0.5;

// ---------------------------------------------------------------------------
// Polarity lexicon
// ---------------------------------------------------------------------------

const POSITIVE_WORDS: &[&str] = &[
    "surge", "surges", "rally", "rallies", "gain", "gains", "rise", "rises", "soar", "soars",
    "record", "strong", "bullish", "boom", "upbeat", "demand", "growth", "optimism", "recovery",
    "outperform", "beat", "beats", "high", "highs",
];

const NEGATIVE_WORDS: &[&str] = &[
    "fall", "falls", "drop", "drops", "plunge", "plunges", "slump", "slumps", "decline",
    "declines", "weak", "bearish", "crash", "fear", "fears", "recession", "loss", "losses",
    "selloff", "downturn", "miss", "misses", "low", "lows",
];

/// Polarity of a text in `[-1, 1]`: balance of positive vs. negative
/// lexicon hits, 0.0 when neither appears.
fn polarity(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let mut pos = 0usize;
    let mut neg = 0usize;
    for token in lower.split(|c: char| !c.is_alphanumeric()) {
        if token.is_empty() {
            continue;
        }
        if POSITIVE_WORDS.contains(&token) {
            pos += 1;
        } else if NEGATIVE_WORDS.contains(&token) {
            neg += 1;
        }
    }
    let hits = pos + neg;
    if hits == 0 {
        return 0.0;
    }
    (pos as f64 - neg as f64) / hits as f64
}

// ---------------------------------------------------------------------------
// GNews response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GNewsResponse {
    #[serde(default)]
    articles: Vec<GNewsArticle>,
}

#[derive(Debug, Deserialize)]
struct GNewsArticle {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct SentimentProvider {
    http: Client,
    api_key: Option<String>,
    query: String,
    endpoint: String,
}

impl SentimentProvider {
    /// `key_env` resolves the GNews key; a missing key downgrades the
    /// provider to the neutral fallback instead of failing.
    pub fn new(key_env: Option<&str>, query: impl Into<String>) -> Result<Self> {
        let api_key = key_env.and_then(|env| std::env::var(env).ok());
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent("ARGENT/0.1.0")
            .build()
            .context("Failed to build sentiment HTTP client")?;
        Ok(Self {
            http,
            api_key,
            query: query.into(),
            endpoint: "https://gnews.io/api/v4/search".to_string(),
        })
    }

    #[cfg(test)]
    fn offline(query: &str) -> Self {
        Self {
            http: Client::new(),
            api_key: None,
            query: query.to_string(),
            endpoint: String::new(),
        }
    }

    /// Average polarity over article texts, normalized `[-1,1]` → `[0,1]`.
    fn score_articles(articles: &[GNewsArticle]) -> f64 {
        if articles.is_empty() {
            return NEUTRAL;
        }
        let sum: f64 = articles
            .iter()
            .map(|a| polarity(&format!("{} {}", a.title, a.description)))
            .sum();
        let avg = sum / articles.len() as f64;
        (avg + 1.0) / 2.0
    }
}

#[async_trait]
impl SourceProvider for SentimentProvider {
    fn name(&self) -> &str {
        "news_sentiment"
    }

    fn profile(&self) -> SourceProfile {
        SourceProfile {
            freshness: 0.7,
            reliability: 0.6,
            cost: 0.2,
        }
    }

    async fn fetch_value(&self) -> Result<f64> {
        let Some(key) = &self.api_key else {
            debug!("No GNews key configured — neutral sentiment");
            return Ok(NEUTRAL);
        };

        let url = format!(
            "{}?q={}&lang=en&max=10&apikey={}",
            self.endpoint,
            urlencoding::encode(&self.query),
            key
        );

        let resp: GNewsResponse = self
            .http
            .get(&url)
            .send()
            .await
            .context("GNews request failed")?
            .error_for_status()
            .context("GNews returned an error status")?
            .json()
            .await
            .context("Failed to parse GNews response")?;

        let score = Self::score_articles(&resp.articles);
        debug!(
            articles = resp.articles.len(),
            score = format!("{score:.4}"),
            "News sentiment computed"
        );
        Ok(score)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
