//! Configuration for portfolio analysis.

use serde::{Deserialize, Serialize};

/// Configuration for portfolio analysis computation.
///
/// Bundles the market conventions (risk-free rate, trading-day count),
/// the estimation window, and the budgets that bound the optimizer and
/// the efficient-frontier sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Annual risk-free rate as a decimal (e.g., 0.065 for 6.5%).
    pub risk_free_rate: f64,

    /// Trading days per year, used for annualization.
    pub trading_days: u32,

    /// Lookback window for historical series, in trading days.
    pub lookback_days: usize,

    /// Confidence level for VaR/CVaR (e.g., 0.95 for 95%).
    pub var_confidence: f64,

    /// Materiality threshold for rebalancing trades, as a fraction of
    /// total portfolio value. Deltas below this are dropped.
    pub materiality_threshold: f64,

    /// Number of target-return points on the efficient frontier.
    pub frontier_points: usize,

    /// Iteration budget for each optimizer solve.
    pub max_iterations: u32,

    /// Convergence tolerance for the optimizer.
    pub tolerance: f64,

    /// Enable parallel processing (requires the 'parallel' feature).
    pub parallel: bool,

    /// Minimum work-item count to trigger parallel processing.
    pub parallel_threshold: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.065,
            trading_days: 252,
            lookback_days: 252,
            var_confidence: 0.95,
            materiality_threshold: 0.005,
            frontier_points: 40,
            max_iterations: 500,
            tolerance: 1e-8,
            parallel: true,
            parallel_threshold: 16,
        }
    }
}

impl AnalysisConfig {
    /// Creates a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config that always uses sequential processing.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Sets the risk-free rate.
    #[must_use]
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// Sets the trading-day count used for annualization.
    #[must_use]
    pub fn with_trading_days(mut self, days: u32) -> Self {
        self.trading_days = days;
        self
    }

    /// Sets the lookback window length.
    #[must_use]
    pub fn with_lookback_days(mut self, days: usize) -> Self {
        self.lookback_days = days;
        self
    }

    /// Sets the VaR confidence level.
    #[must_use]
    pub fn with_var_confidence(mut self, confidence: f64) -> Self {
        self.var_confidence = confidence;
        self
    }

    /// Sets the trade materiality threshold.
    #[must_use]
    pub fn with_materiality_threshold(mut self, threshold: f64) -> Self {
        self.materiality_threshold = threshold;
        self
    }

    /// Sets the number of efficient-frontier points.
    #[must_use]
    pub fn with_frontier_points(mut self, points: usize) -> Self {
        self.frontier_points = points;
        self
    }

    /// Sets the optimizer iteration budget.
    #[must_use]
    pub fn with_max_iterations(mut self, iterations: u32) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets the optimizer convergence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets whether to use parallel processing.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Sets the threshold for parallel processing.
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Annualization factor for returns (trading days per year).
    #[must_use]
    pub fn annualization(&self) -> f64 {
        f64::from(self.trading_days)
    }

    /// Annualization factor for volatility (sqrt of trading days).
    #[must_use]
    pub fn annualization_sqrt(&self) -> f64 {
        f64::from(self.trading_days).sqrt()
    }

    /// Returns true if parallel processing should be used for the given count.
    #[must_use]
    pub fn should_parallelize(&self, count: usize) -> bool {
        cfg!(feature = "parallel") && self.parallel && count >= self.parallel_threshold
    }
}
