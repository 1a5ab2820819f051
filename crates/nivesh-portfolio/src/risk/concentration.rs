//! Concentration risk metrics.

use serde::{Deserialize, Serialize};

/// Qualitative banding of the top-3 weight concentration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationLevel {
    /// Top-3 weight at or below 30%.
    Low,
    /// Top-3 weight above 30%.
    Moderate,
    /// Top-3 weight above 50%.
    High,
    /// Top-3 weight above 75%.
    VeryHigh,
}

impl ConcentrationLevel {
    fn from_top_3(top_3: f64) -> Self {
        if top_3 > 0.75 {
            Self::VeryHigh
        } else if top_3 > 0.50 {
            Self::High
        } else if top_3 > 0.30 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

/// Concentration metrics over the portfolio weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concentration {
    /// Herfindahl-Hirschman index, sum of squared weights, in (0, 1].
    pub hhi: f64,

    /// Largest single weight.
    pub top_1: f64,

    /// Sum of the three largest weights.
    pub top_3: f64,

    /// Sum of the five largest weights.
    pub top_5: f64,

    /// Effective number of holdings, 1/HHI.
    pub effective_holdings: f64,

    /// Qualitative banding of the top-3 concentration.
    pub level: ConcentrationLevel,
}

/// Computes concentration metrics from portfolio weights (fractions
/// summing to one). Zero weights contribute nothing.
#[must_use]
pub fn concentration(weights: &[f64]) -> Concentration {
    let mut sorted: Vec<f64> = weights.iter().copied().filter(|w| *w > 0.0).collect();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let hhi: f64 = sorted.iter().map(|w| w * w).sum();
    let top_1 = sorted.first().copied().unwrap_or(0.0);
    let top_3: f64 = sorted.iter().take(3).sum();
    let top_5: f64 = sorted.iter().take(5).sum();

    Concentration {
        hhi,
        top_1,
        top_3,
        top_5,
        effective_holdings: if hhi > 0.0 { 1.0 / hhi } else { 0.0 },
        level: ConcentrationLevel::from_top_3(top_3),
    }
}
