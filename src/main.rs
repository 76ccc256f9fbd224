//! ARGENT — Autonomous Data-Collection Agent for the Silver Market
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the live data providers into the market environment, and runs
//! the collect→reward→learn loop with graceful shutdown.

use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn};

use argent::config::AppConfig;
use argent::data::sentiment::SentimentProvider;
use argent::data::spot::{AlphaVantageProvider, SpotSilverProvider};
use argent::data::{momentum::MomentumProvider, SourceProvider};
use argent::environment::MarketEnvironment;
use argent::forecast::{DriftPredictor, Predictor};
use argent::strategy::exploration::ExplorationConfig;
use argent::strategy::DecisionAgent;
use argent::types::{AgentStatus, CycleReport};

const BANNER: &str = r#"
    _    ____   ____ _____ _   _ _____
   / \  |  _ \ / ___| ____| \ | |_   _|
  / _ \ | |_) | |  _|  _| |  \| | | |
 / ___ \|  _ <| |_| | |___| |\  | | |
/_/   \_\_| \_\\____|_____|_| \_| |_|

  Adaptive Resource-Governed ENvironment Tracker
  v0.1.0 — Autonomous Agent
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        agent_name = %cfg.agent.name,
        scan_interval_secs = cfg.agent.scan_interval_secs,
        total_budget = cfg.agent.total_budget,
        initial_epsilon = cfg.agent.initial_epsilon,
        "ARGENT starting up"
    );

    // -- Initialise components -------------------------------------------

    let mut env = MarketEnvironment::new(build_providers(&cfg));

    let exploration = ExplorationConfig {
        initial_epsilon: cfg.agent.initial_epsilon,
        ..Default::default()
    };
    let mut agent = match cfg.agent.exploration_seed {
        Some(seed) => {
            info!(seed, "Using seeded exploration");
            DecisionAgent::with_seed(cfg.agent.total_budget, exploration, seed)
        }
        None => DecisionAgent::new(cfg.agent.total_budget, exploration),
    };

    let mut predictor = DriftPredictor::new(cfg.forecast.window, cfg.forecast.min_data_points);

    // -- Main loop -------------------------------------------------------

    let scan_interval = Duration::from_secs(cfg.agent.scan_interval_secs);
    let mut interval = tokio::time::interval(scan_interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_secs = cfg.agent.scan_interval_secs,
        "Entering main loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = run_cycle(&mut env, &mut agent, &mut predictor).await;
                info!(%report, "Cycle complete");

                if report.status == AgentStatus::Exhausted {
                    info!("Collection budget exhausted. Shutting down.");
                    break;
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!(
        cycles = env.time_step(),
        decisions = agent.total_decisions(),
        budget_remaining = format!("{:.2}", agent.remaining_budget()),
        epsilon = format!("{:.4}", agent.epsilon()),
        "ARGENT shut down cleanly."
    );

    Ok(())
}

/// Wire up the live data providers declared in the config. Providers
/// that cannot be constructed (e.g. missing API key) are skipped — their
/// sources are simply absent from every snapshot.
fn build_providers(cfg: &AppConfig) -> Vec<Box<dyn SourceProvider>> {
    let mut providers: Vec<Box<dyn SourceProvider>> = Vec::new();

    match SpotSilverProvider::new() {
        Ok(p) => providers.push(Box::new(p)),
        Err(e) => warn!(error = %e, "Spot silver provider unavailable"),
    }

    if let Some(key_env) = cfg.data_sources.alpha_vantage_key_env.as_deref() {
        match AlphaVantageProvider::from_env(key_env) {
            Ok(p) => providers.push(Box::new(p)),
            Err(e) => warn!(error = %e, "Alpha Vantage provider unavailable"),
        }
        match MomentumProvider::from_env(key_env) {
            Ok(p) => providers.push(Box::new(p)),
            Err(e) => warn!(error = %e, "Momentum provider unavailable"),
        }
    }

    match SentimentProvider::new(
        cfg.data_sources.gnews_key_env.as_deref(),
        cfg.data_sources.news_query.clone(),
    ) {
        Ok(p) => providers.push(Box::new(p)),
        Err(e) => warn!(error = %e, "Sentiment provider unavailable"),
    }

    info!(count = providers.len(), "Data providers initialised");
    providers
}

/// Run a single refresh→select→deduct→forecast→reward→learn cycle.
async fn run_cycle(
    env: &mut MarketEnvironment,
    agent: &mut DecisionAgent,
    predictor: &mut DriftPredictor,
) -> CycleReport {
    // 1. Refresh environment with live data
    env.step().await;
    let sources_available = env.snapshot().len();

    // 2. Agent selects the best source
    let decision = agent.select_best_source(env.snapshot());

    if let Some(explanation) = &decision.explanation {
        info!(explanation, "Decision audit");
    }

    let mut reward = None;
    if let Some(name) = decision.source.as_deref() {
        let attrs = env.snapshot().get(name).copied();

        // 3. Deduct the selected source's cost
        if let Some(attrs) = &attrs {
            agent.deduct_cost(attrs.cost);
        }

        // 4. Feed the observed price into the forecaster
        if let Some(value) = attrs.and_then(|a| a.value) {
            predictor.add_price(value);
            let forecast = predictor.predict_next();
            info!(
                price = ?forecast.price,
                trend = %forecast.trend,
                confidence = format!("{:.4}", forecast.confidence),
                "Next price forecast"
            );
        }

        // 5. Reward feedback closes the learning loop
        reward = env.reward(name);
        if let Some(r) = reward {
            agent.update_learning(Some(name), r);
        } else {
            warn!(source = name, "No reward computable this cycle");
        }
    }

    CycleReport {
        timestamp: chrono::Utc::now(),
        cycle_number: env.time_step(),
        sources_available,
        selected: decision.source,
        score: decision.score,
        explored: decision.explored,
        reward,
        remaining_budget: agent.remaining_budget(),
        status: agent.status(),
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("argent=info"));

    let json_logging = std::env::var("ARGENT_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
