//! Marginal risk contribution per holding.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// How much one holding contributes to total portfolio volatility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskContribution {
    /// Ticker symbol.
    pub symbol: String,

    /// Portfolio weight (0-1).
    pub weight: f64,

    /// Marginal contribution to risk: (S w)_i / sigma_p.
    pub marginal: f64,

    /// Absolute contribution: weight x marginal. Contributions sum to
    /// the portfolio volatility.
    pub contribution: f64,

    /// Contribution as a percentage of total volatility.
    pub contribution_pct: f64,
}

/// Computes per-holding risk contributions from a covariance matrix and
/// weights, both in the given symbol order.
///
/// Returns the contributions sorted by absolute contribution descending,
/// plus the portfolio volatility they sum to. A zero-volatility
/// portfolio yields all-zero contributions.
#[must_use]
pub fn risk_contributions(
    symbols: &[String],
    covariance: &DMatrix<f64>,
    weights: &[f64],
) -> (Vec<RiskContribution>, f64) {
    let w = DVector::from_column_slice(weights);
    let cov_w = covariance * &w;
    let variance = (w.transpose() * &cov_w)[(0, 0)].max(0.0);
    let volatility = variance.sqrt();

    let mut contributions: Vec<RiskContribution> = symbols
        .iter()
        .enumerate()
        .map(|(i, symbol)| {
            let marginal = if volatility > 0.0 {
                cov_w[i] / volatility
            } else {
                0.0
            };
            let contribution = weights[i] * marginal;
            RiskContribution {
                symbol: symbol.clone(),
                weight: weights[i],
                marginal,
                contribution,
                contribution_pct: if volatility > 0.0 {
                    contribution / volatility * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();

    contributions.sort_by(|a, b| {
        b.contribution
            .abs()
            .partial_cmp(&a.contribution.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    (contributions, volatility)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn symbols(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("S{i}")).collect()
    }

    #[test]
    fn test_contributions_sum_to_volatility() {
        let covariance =
            DMatrix::from_row_slice(3, 3, &[0.04, 0.01, 0.0, 0.01, 0.09, 0.02, 0.0, 0.02, 0.0625]);
        let weights = [0.5, 0.3, 0.2];

        let (contributions, volatility) = risk_contributions(&symbols(3), &covariance, &weights);

        let sum: f64 = contributions.iter().map(|c| c.contribution).sum();
        assert_relative_eq!(sum, volatility, epsilon = 1e-9);

        let pct_sum: f64 = contributions.iter().map(|c| c.contribution_pct).sum();
        assert_relative_eq!(pct_sum, 100.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sorted_by_absolute_contribution() {
        let covariance =
            DMatrix::from_row_slice(2, 2, &[0.25, 0.0, 0.0, 0.0025]);
        let weights = [0.5, 0.5];
        let (contributions, _) = risk_contributions(&symbols(2), &covariance, &weights);

        // The high-variance asset dominates.
        assert_eq!(contributions[0].symbol, "S0");
        assert!(contributions[0].contribution > contributions[1].contribution);
    }

    #[test]
    fn test_zero_volatility_portfolio() {
        let covariance = DMatrix::zeros(2, 2);
        let weights = [0.5, 0.5];
        let (contributions, volatility) = risk_contributions(&symbols(2), &covariance, &weights);

        assert_relative_eq!(volatility, 0.0);
        for c in contributions {
            assert_relative_eq!(c.contribution, 0.0);
            assert_relative_eq!(c.contribution_pct, 0.0);
        }
    }

    #[test]
    fn test_single_holding_owns_all_risk() {
        let covariance = DMatrix::from_row_slice(1, 1, &[0.04]);
        let (contributions, volatility) = risk_contributions(&symbols(1), &covariance, &[1.0]);

        assert_relative_eq!(volatility, 0.2, epsilon = 1e-12);
        assert_relative_eq!(contributions[0].contribution, 0.2, epsilon = 1e-12);
        assert_relative_eq!(contributions[0].contribution_pct, 100.0, epsilon = 1e-9);
    }
}
