//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API keys) are referenced by env-var name in the config and
//! resolved at runtime via `std::env::var` — the agent itself holds no
//! global state.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub data_sources: DataSourcesConfig,
    pub forecast: ForecastConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    pub name: String,
    pub scan_interval_secs: u64,
    /// Total collection budget for the agent's lifetime.
    pub total_budget: f64,
    /// Starting exploration rate.
    pub initial_epsilon: f64,
    /// Optional RNG seed for reproducible exploration.
    #[serde(default)]
    pub exploration_seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataSourcesConfig {
    pub alpha_vantage_key_env: Option<String>,
    pub gnews_key_env: Option<String>,
    /// Search query for the news sentiment source.
    #[serde(default = "default_news_query")]
    pub news_query: String,
}

fn default_news_query() -> String {
    "silver price".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastConfig {
    /// Trailing diffs considered by the drift rule.
    pub window: usize,
    /// Observations required before forecasting starts.
    pub min_data_points: usize,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig =
            toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name).with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
