//! Price forecasting.
//!
//! Defines the `Predictor` trait and a drift-based implementation that
//! extrapolates the mean first-difference over a recent window. An
//! unready predictor yields an empty forecast, never an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

// ---------------------------------------------------------------------------
// Forecast types
// ---------------------------------------------------------------------------

/// Direction of the predicted move relative to the last observed price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
    Stable,
    Unknown,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
            Trend::Stable => write!(f, "stable"),
            Trend::Unknown => write!(f, "unknown"),
        }
    }
}

/// One-step-ahead prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    /// Predicted next price, `None` while the model is warming up.
    pub price: Option<f64>,
    pub trend: Trend,
    /// Confidence in `[0, 1]`, derived from in-sample residual error.
    pub confidence: f64,
}

impl Forecast {
    fn unknown() -> Self {
        Self {
            price: None,
            trend: Trend::Unknown,
            confidence: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Predictor contract
// ---------------------------------------------------------------------------

/// Standard interface for price predictors.
pub trait Predictor {
    /// Ingest a new observed price.
    fn add_price(&mut self, price: f64);

    /// Predict the next price. Yields an unknown forecast while the model
    /// lacks data — never an error.
    fn predict_next(&mut self) -> Forecast;

    /// Direction of the last prediction relative to the last price.
    fn trend(&self) -> Trend;

    /// Confidence of the last prediction (0 to 1).
    fn confidence(&self) -> f64;
}

// ---------------------------------------------------------------------------
// Drift predictor
// ---------------------------------------------------------------------------

/// Extrapolates the mean first-difference over the trailing window.
///
/// Confidence is `1 / (1 + mse)` of the one-step-ahead residuals the
/// same rule would have produced over the observed history.
pub struct DriftPredictor {
    prices: Vec<f64>,
    window: usize,
    min_data_points: usize,
    last_prediction: Option<f64>,
    last_confidence: f64,
}

impl DriftPredictor {
    pub fn new(window: usize, min_data_points: usize) -> Self {
        Self {
            prices: Vec::new(),
            window: window.max(1),
            min_data_points: min_data_points.max(2),
            last_prediction: None,
            last_confidence: 0.0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.prices.len() >= self.min_data_points
    }

    pub fn observations(&self) -> usize {
        self.prices.len()
    }

    /// Mean first-difference over the trailing `window` diffs ending at
    /// index `end` (exclusive).
    fn drift_at(&self, end: usize) -> f64 {
        let start = end.saturating_sub(self.window + 1);
        let slice = &self.prices[start..end];
        if slice.len() < 2 {
            return 0.0;
        }
        let diffs: f64 = slice.windows(2).map(|w| w[1] - w[0]).sum();
        diffs / (slice.len() - 1) as f64
    }

    /// Mean squared error of one-step-ahead forecasts replayed over the
    /// observed history.
    fn replay_mse(&self) -> f64 {
        let n = self.prices.len();
        let mut sum = 0.0;
        let mut count = 0usize;
        for i in 2..n {
            let predicted = self.prices[i - 1] + self.drift_at(i);
            let residual = self.prices[i] - predicted;
            sum += residual * residual;
            count += 1;
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }
}

impl Predictor for DriftPredictor {
    fn add_price(&mut self, price: f64) {
        self.prices.push(price);
    }

    fn predict_next(&mut self) -> Forecast {
        if !self.is_ready() {
            self.last_prediction = None;
            self.last_confidence = 0.0;
            return Forecast::unknown();
        }

        let last = self.prices[self.prices.len() - 1];
        let predicted = last + self.drift_at(self.prices.len());
        self.last_prediction = Some(predicted);
        self.last_confidence = 1.0 / (1.0 + self.replay_mse());

        let forecast = Forecast {
            price: Some(predicted),
            trend: self.trend(),
            confidence: self.last_confidence,
        };
        debug!(
            predicted = format!("{predicted:.4}"),
            trend = %forecast.trend,
            confidence = format!("{:.4}", forecast.confidence),
            "Price forecast"
        );
        forecast
    }

    fn trend(&self) -> Trend {
        let (Some(prediction), Some(last)) = (self.last_prediction, self.prices.last()) else {
            return Trend::Unknown;
        };
        if prediction > *last {
            Trend::Up
        } else if prediction < *last {
            Trend::Down
        } else {
            Trend::Stable
        }
    }

    fn confidence(&self) -> f64 {
        self.last_confidence
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
