//! Annualized moment estimates feeding the optimizer.

use nalgebra::{DMatrix, DVector};
use nivesh_core::{AnalysisConfig, ReturnTable};
use nivesh_math::stats;

/// Annualized expected-return vector and covariance matrix for a set of
/// symbols, in the symbol order of the source return table.
#[derive(Debug, Clone)]
pub struct Moments {
    /// Symbols, one per entry/column.
    pub symbols: Vec<String>,

    /// Annualized expected returns.
    pub expected_returns: DVector<f64>,

    /// Annualized covariance matrix.
    pub covariance: DMatrix<f64>,
}

impl Moments {
    /// Number of assets.
    #[must_use]
    pub fn n_assets(&self) -> usize {
        self.symbols.len()
    }

    /// Annualized portfolio return for a weight vector.
    ///
    /// # Panics
    ///
    /// Panics if `weights.len()` differs from the asset count.
    #[must_use]
    pub fn portfolio_return(&self, weights: &[f64]) -> f64 {
        assert_eq!(weights.len(), self.n_assets());
        weights
            .iter()
            .zip(self.expected_returns.iter())
            .map(|(w, mu)| w * mu)
            .sum()
    }

    /// Annualized portfolio volatility sqrt(w' S w), floored at zero
    /// against round-off.
    ///
    /// # Panics
    ///
    /// Panics if `weights.len()` differs from the asset count.
    #[must_use]
    pub fn portfolio_volatility(&self, weights: &[f64]) -> f64 {
        assert_eq!(weights.len(), self.n_assets());
        let w = DVector::from_column_slice(weights);
        let variance = (w.transpose() * &self.covariance * &w)[(0, 0)];
        variance.max(0.0).sqrt()
    }

    /// Sharpe ratio for a weight vector; `None` when volatility is zero.
    #[must_use]
    pub fn sharpe(&self, weights: &[f64], risk_free_rate: f64) -> Option<f64> {
        let volatility = self.portfolio_volatility(weights);
        if volatility > 0.0 {
            Some((self.portfolio_return(weights) - risk_free_rate) / volatility)
        } else {
            None
        }
    }

    /// Largest single-asset expected return (the maximum achievable
    /// portfolio return on the long-only simplex).
    #[must_use]
    pub fn max_asset_return(&self) -> f64 {
        self.expected_returns.iter().copied().fold(f64::MIN, f64::max)
    }
}

/// Estimates annualized moments from a daily return table.
#[must_use]
pub fn estimate_moments(table: &ReturnTable, config: &AnalysisConfig) -> Moments {
    let annualization = config.annualization();
    let n = table.n_symbols();

    let expected_returns = DVector::from_iterator(
        n,
        (0..n).map(|col| {
            let series: Vec<f64> = table.returns.column(col).iter().copied().collect();
            stats::mean(&series) * annualization
        }),
    );

    let covariance = stats::covariance_matrix(&table.returns) * annualization;

    Moments {
        symbols: table.symbols.clone(),
        expected_returns,
        covariance,
    }
}
