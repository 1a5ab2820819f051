//! Historical Value at Risk and expected shortfall.

use crate::error::AnalysisResult;
use nivesh_core::AnalysisConfig;
use nivesh_math::stats;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Historical VaR of the daily portfolio return distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarEstimate {
    /// Confidence level (e.g., 0.95).
    pub confidence: f64,

    /// Daily VaR as a return (typically negative).
    pub daily: f64,

    /// Annualized VaR (daily x sqrt of trading days).
    pub annualized: f64,

    /// Currency loss estimate: |daily| x total portfolio value.
    pub value_loss: Decimal,
}

/// Conditional VaR (expected shortfall) of the same distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvarEstimate {
    /// Confidence level (e.g., 0.95).
    pub confidence: f64,

    /// Daily CVaR as a return; at least as negative as the daily VaR.
    pub daily: f64,

    /// Annualized CVaR.
    pub annualized: f64,

    /// Currency loss estimate: |daily| x total portfolio value.
    pub value_loss: Decimal,
}

/// Historical VaR: the (1 - confidence) percentile of the simulated
/// daily portfolio returns.
///
/// # Errors
///
/// Propagates the percentile error on an empty return series; callers
/// treat that as a flagged, absent estimate.
pub fn historical_var(
    portfolio_returns: &[f64],
    total_value: Decimal,
    config: &AnalysisConfig,
) -> AnalysisResult<VarEstimate> {
    let confidence = config.var_confidence;
    let daily = stats::percentile(portfolio_returns, (1.0 - confidence) * 100.0)?;
    Ok(VarEstimate {
        confidence,
        daily,
        annualized: daily * config.annualization_sqrt(),
        value_loss: currency_loss(daily, total_value),
    })
}

/// Expected shortfall: the mean of all daily returns at or below the VaR
/// threshold. The loss magnitude is at least that of the VaR.
///
/// # Errors
///
/// Propagates the percentile error on an empty return series.
pub fn historical_cvar(
    portfolio_returns: &[f64],
    total_value: Decimal,
    config: &AnalysisConfig,
) -> AnalysisResult<CvarEstimate> {
    let confidence = config.var_confidence;
    let threshold = stats::percentile(portfolio_returns, (1.0 - confidence) * 100.0)?;

    let tail: Vec<f64> = portfolio_returns
        .iter()
        .copied()
        .filter(|r| *r <= threshold)
        .collect();
    // The threshold is interpolated from the sample, so at least one
    // observation sits at or below it.
    let daily = if tail.is_empty() {
        threshold
    } else {
        stats::mean(&tail)
    };

    Ok(CvarEstimate {
        confidence,
        daily,
        annualized: daily * config.annualization_sqrt(),
        value_loss: currency_loss(daily, total_value),
    })
}

fn currency_loss(daily_return: f64, total_value: Decimal) -> Decimal {
    let magnitude = Decimal::from_f64_retain(daily_return.abs()).unwrap_or(Decimal::ZERO);
    magnitude * total_value
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    fn sample_returns() -> Vec<f64> {
        vec![
            -0.030, -0.022, -0.015, -0.008, -0.003, 0.000, 0.004, 0.007, 0.011, 0.014, 0.018,
            0.021, -0.012, 0.006, -0.001, 0.009, -0.005, 0.002, 0.013, -0.019,
        ]
    }

    #[test]
    fn test_var_is_left_tail() {
        let config = AnalysisConfig::default();
        let var = historical_var(&sample_returns(), dec!(1_000_000), &config).unwrap();

        assert!(var.daily < 0.0);
        assert_relative_eq!(
            var.annualized,
            var.daily * config.annualization_sqrt(),
            epsilon = 1e-12
        );
        assert!(var.value_loss > Decimal::ZERO);
    }

    #[test]
    fn test_cvar_loss_at_least_var_loss() {
        let config = AnalysisConfig::default();
        let returns = sample_returns();
        let var = historical_var(&returns, dec!(1_000_000), &config).unwrap();
        let cvar = historical_cvar(&returns, dec!(1_000_000), &config).unwrap();

        assert!(cvar.daily <= var.daily);
        assert!(cvar.value_loss >= var.value_loss);
    }

    #[test]
    fn test_confidence_level_carried() {
        let config = AnalysisConfig::default().with_var_confidence(0.99);
        let var = historical_var(&sample_returns(), dec!(100), &config).unwrap();
        assert_relative_eq!(var.confidence, 0.99, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_returns_error() {
        let config = AnalysisConfig::default();
        assert!(historical_var(&[], dec!(100), &config).is_err());
        assert!(historical_cvar(&[], dec!(100), &config).is_err());
    }

    #[test]
    fn test_single_observation_degenerates_equal() {
        let config = AnalysisConfig::default();
        let var = historical_var(&[-0.02], dec!(1000), &config).unwrap();
        let cvar = historical_cvar(&[-0.02], dec!(1000), &config).unwrap();
        assert_relative_eq!(var.daily, -0.02, epsilon = 1e-12);
        assert_relative_eq!(cvar.daily, var.daily, epsilon = 1e-12);
    }
}
