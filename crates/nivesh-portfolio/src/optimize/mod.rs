//! Constrained mean-variance portfolio optimization.
//!
//! Three objectives dispatch through one solve path: maximum Sharpe
//! ratio (nonlinear, solved with a two-start retry progression), minimum
//! volatility (convex, single solve with ridge fallback on a singular
//! covariance), and closed-form equal weighting. Weight vectors always
//! satisfy full investment and no shorting.

mod frontier;
mod objective;
mod trades;

pub use frontier::{efficient_frontier, FrontierPoint};
pub use objective::Objective;
pub use trades::{rebalancing_trades, Trade, TradeAction};

use crate::error::{AnalysisError, AnalysisResult};
use crate::metrics::Moments;
use crate::valuation::PortfolioValuation;
use nalgebra::{Cholesky, DMatrix, DVector};
use nivesh_core::{AnalysisConfig, DiagnosticFlag};
use nivesh_math::optimization::{minimize_on_simplex, SolverConfig};
use serde::{Deserialize, Serialize};

/// Floor applied to volatility inside the Sharpe objective so the solver
/// never divides by zero on a degenerate covariance.
const VOLATILITY_FLOOR: f64 = 1e-10;

/// Return/volatility/Sharpe summary for one weight vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioStats {
    /// Annualized expected return.
    pub expected_return: f64,

    /// Annualized volatility.
    pub volatility: f64,

    /// Sharpe ratio; `None` when volatility is zero.
    pub sharpe: Option<f64>,
}

/// Change from the current to the optimized portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Improvement {
    /// Optimized minus current expected return.
    pub return_change: f64,

    /// Optimized minus current volatility.
    pub volatility_change: f64,

    /// Optimized minus current Sharpe; `None` when either side is
    /// undefined.
    pub sharpe_change: Option<f64>,
}

/// Output of one optimizer run, including trades and the frontier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// The objective that produced this result.
    pub method: Objective,

    /// Symbols, aligned with both weight vectors.
    pub symbols: Vec<String>,

    /// Current weights over the analyzable universe (sum to 1).
    pub current_weights: Vec<f64>,

    /// Optimized weights (sum to 1, non-negative).
    pub optimized_weights: Vec<f64>,

    /// Stats of the current allocation.
    pub current_metrics: PortfolioStats,

    /// Stats of the optimized allocation.
    pub optimized_metrics: PortfolioStats,

    /// Deltas between the two allocations.
    pub improvement: Improvement,

    /// Materiality-filtered trades, sorted by absolute value delta.
    pub trades: Vec<Trade>,

    /// Efficient-frontier points.
    pub frontier: Vec<FrontierPoint>,

    /// Degraded states encountered (ridge regularization, skipped
    /// frontier points, unpriceable symbols).
    pub flags: Vec<DiagnosticFlag>,
}

/// Starting points for the retry progression of nonlinear solves.
///
/// The solve begins from the neutral equal-weight point; on
/// non-convergence it moves to the caller's current weights; a second
/// non-convergence is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartPoint {
    /// Equal weights, 1/n.
    Neutral,
    /// The portfolio's current weights.
    Current,
}

impl StartPoint {
    fn weights(self, n: usize, current: &[f64]) -> Vec<f64> {
        match self {
            Self::Neutral => equal_weights(n),
            Self::Current => {
                if current.len() == n && current.iter().sum::<f64>() > 0.0 {
                    current.to_vec()
                } else {
                    equal_weights(n)
                }
            }
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            Self::Neutral => Some(Self::Current),
            Self::Current => None,
        }
    }
}

/// Solves for the target weights under the selected objective.
///
/// Returns the weights plus any flags describing approximations made
/// along the way.
///
/// # Errors
///
/// Returns [`AnalysisError::OptimizationFailed`] (carrying the last
/// attempted weights) when the solve exhausts every starting point
/// without converging.
pub fn optimize_weights(
    moments: &Moments,
    current_weights: &[f64],
    objective: Objective,
    config: &AnalysisConfig,
) -> AnalysisResult<(Vec<f64>, Vec<DiagnosticFlag>)> {
    let n = moments.n_assets();
    if n == 0 {
        return Err(AnalysisError::invalid_input("no assets to optimize"));
    }

    match objective {
        Objective::EqualWeight => Ok((equal_weights(n), Vec::new())),
        Objective::MaxSharpe => solve_max_sharpe(moments, current_weights, config),
        Objective::MinVolatility => solve_min_volatility(moments, config),
    }
}

/// Runs the full optimization: weights, stats, trades, and frontier.
///
/// # Errors
///
/// Propagates solver failure; the caller must surface it rather than
/// silently substituting a different method's result.
pub fn optimize_portfolio(
    moments: &Moments,
    valuation: &PortfolioValuation,
    objective: Objective,
    config: &AnalysisConfig,
) -> AnalysisResult<OptimizationResult> {
    let current_weights = valuation.aligned_weights(&moments.symbols);
    let (optimized_weights, mut flags) =
        optimize_weights(moments, &current_weights, objective, config)?;

    let current_metrics = portfolio_stats(moments, &current_weights, config.risk_free_rate);
    let optimized_metrics = portfolio_stats(moments, &optimized_weights, config.risk_free_rate);

    let improvement = Improvement {
        return_change: optimized_metrics.expected_return - current_metrics.expected_return,
        volatility_change: optimized_metrics.volatility - current_metrics.volatility,
        sharpe_change: match (optimized_metrics.sharpe, current_metrics.sharpe) {
            (Some(optimized), Some(current)) => Some(optimized - current),
            _ => None,
        },
    };

    for symbol in &moments.symbols {
        if valuation.price_of(symbol).is_none() {
            flags.push(DiagnosticFlag::DataUnavailable {
                symbol: symbol.clone(),
            });
        }
    }

    let trades = rebalancing_trades(valuation, &moments.symbols, &optimized_weights, config);

    let (frontier, frontier_flags) = efficient_frontier(moments, config)?;
    flags.extend(frontier_flags);

    Ok(OptimizationResult {
        method: objective,
        symbols: moments.symbols.clone(),
        current_weights,
        optimized_weights,
        current_metrics,
        optimized_metrics,
        improvement,
        trades,
        frontier,
        flags,
    })
}

/// Stats for a weight vector under the given moments.
#[must_use]
pub fn portfolio_stats(moments: &Moments, weights: &[f64], risk_free_rate: f64) -> PortfolioStats {
    PortfolioStats {
        expected_return: moments.portfolio_return(weights),
        volatility: moments.portfolio_volatility(weights),
        sharpe: moments.sharpe(weights, risk_free_rate),
    }
}

fn solve_max_sharpe(
    moments: &Moments,
    current_weights: &[f64],
    config: &AnalysisConfig,
) -> AnalysisResult<(Vec<f64>, Vec<DiagnosticFlag>)> {
    let n = moments.n_assets();
    let risk_free_rate = config.risk_free_rate;
    let negative_sharpe = |w: &[f64]| {
        let excess = moments.portfolio_return(w) - risk_free_rate;
        let volatility = moments.portfolio_volatility(w).max(VOLATILITY_FLOOR);
        -excess / volatility
    };
    let solver = solver_config(config);

    // Objective value at the current allocation. A converged solve must
    // not be worse than this; descent from the Current start point is
    // monotone, so the second attempt always clears the bar.
    let baseline = negative_sharpe(&StartPoint::Current.weights(n, current_weights));

    let mut state = StartPoint::Neutral;
    loop {
        let start = state.weights(n, current_weights);
        let outcome = minimize_on_simplex(negative_sharpe, &start, &solver)?;
        if outcome.converged && outcome.objective_value <= baseline + 1e-12 {
            return Ok((outcome.weights, Vec::new()));
        }
        match state.next() {
            Some(next) => {
                log::warn!(
                    "max_sharpe solve from {state:?} start {}; retrying from {next:?}",
                    if outcome.converged {
                        "converged below the current allocation"
                    } else {
                        "did not converge"
                    }
                );
                state = next;
            }
            None => {
                return Err(AnalysisError::OptimizationFailed {
                    method: Objective::MaxSharpe.name().to_string(),
                    iterations: outcome.iterations,
                    last_weights: outcome.weights,
                });
            }
        }
    }
}

fn solve_min_volatility(
    moments: &Moments,
    config: &AnalysisConfig,
) -> AnalysisResult<(Vec<f64>, Vec<DiagnosticFlag>)> {
    let n = moments.n_assets();
    let (covariance, flags) = regularize_if_singular(&moments.covariance);

    let outcome = minimize_on_simplex(
        |w| portfolio_variance(w, &covariance),
        &equal_weights(n),
        &solver_config(config),
    )?;

    if !outcome.converged {
        return Err(AnalysisError::OptimizationFailed {
            method: Objective::MinVolatility.name().to_string(),
            iterations: outcome.iterations,
            last_weights: outcome.weights,
        });
    }
    Ok((outcome.weights, flags))
}

/// Applies a diagonal ridge when the covariance has no Cholesky factor.
fn regularize_if_singular(covariance: &DMatrix<f64>) -> (DMatrix<f64>, Vec<DiagnosticFlag>) {
    let n = covariance.nrows();
    if n == 0 || Cholesky::new(covariance.clone()).is_some() {
        return (covariance.clone(), Vec::new());
    }

    let mean_diagonal = covariance.diagonal().iter().sum::<f64>() / n as f64;
    let ridge = mean_diagonal.abs().max(1e-12) * 1e-6;
    let mut regularized = covariance.clone();
    for i in 0..n {
        regularized[(i, i)] += ridge;
    }
    log::warn!("covariance matrix singular; applying ridge {ridge:.2e}");
    (
        regularized,
        vec![DiagnosticFlag::RegularizedCovariance { ridge }],
    )
}

pub(crate) fn equal_weights(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

pub(crate) fn portfolio_variance(weights: &[f64], covariance: &DMatrix<f64>) -> f64 {
    let w = DVector::from_column_slice(weights);
    (w.transpose() * covariance * w)[(0, 0)]
}

pub(crate) fn solver_config(config: &AnalysisConfig) -> SolverConfig {
    SolverConfig::default()
        .with_max_iterations(config.max_iterations)
        .with_tolerance(config.tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn moments(mu: &[f64], cov: &[f64]) -> Moments {
        let n = mu.len();
        Moments {
            symbols: (0..n).map(|i| format!("S{i}")).collect(),
            expected_returns: DVector::from_column_slice(mu),
            covariance: DMatrix::from_row_slice(n, n, cov),
        }
    }

    fn assert_on_simplex(weights: &[f64]) {
        let sum: f64 = weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6, "weights sum {sum}");
        assert!(weights.iter().all(|&w| w >= -1e-9), "negative weight");
    }

    #[test]
    fn test_equal_weight_closed_form() {
        let m = moments(
            &[0.08, 0.12, 0.10],
            &[0.04, 0.0, 0.0, 0.0, 0.09, 0.0, 0.0, 0.0, 0.0625],
        );
        let config = AnalysisConfig::default();
        let (weights, flags) =
            optimize_weights(&m, &[0.5, 0.3, 0.2], Objective::EqualWeight, &config).unwrap();

        assert!(flags.is_empty());
        assert_on_simplex(&weights);
        for &w in &weights {
            // Bit-identical closed form.
            assert_eq!(w, 1.0 / 3.0);
        }
    }

    #[test]
    fn test_equal_weight_deterministic() {
        let m = moments(&[0.08, 0.12], &[0.04, 0.01, 0.01, 0.09]);
        let config = AnalysisConfig::default();
        let first =
            optimize_weights(&m, &[0.6, 0.4], Objective::EqualWeight, &config).unwrap();
        let second =
            optimize_weights(&m, &[0.6, 0.4], Objective::EqualWeight, &config).unwrap();
        assert_eq!(first.0, second.0);
    }

    #[test]
    fn test_min_volatility_prefers_calm_asset() {
        // Asset 0 has far lower variance and low correlation.
        let m = moments(&[0.08, 0.12], &[0.01, 0.002, 0.002, 0.16]);
        let config = AnalysisConfig::default();
        let (weights, flags) =
            optimize_weights(&m, &[0.5, 0.5], Objective::MinVolatility, &config).unwrap();

        assert!(flags.is_empty());
        assert_on_simplex(&weights);
        assert!(weights[0] > 0.85, "calm asset weight {}", weights[0]);

        // Minimum-volatility result is no riskier than equal weighting.
        let min_vol = m.portfolio_volatility(&weights);
        let equal_vol = m.portfolio_volatility(&equal_weights(2));
        assert!(min_vol <= equal_vol + 1e-9);
    }

    #[test]
    fn test_max_sharpe_beats_current_allocation() {
        let m = moments(
            &[0.06, 0.18, 0.10],
            &[0.02, 0.002, 0.001, 0.002, 0.05, 0.004, 0.001, 0.004, 0.03],
        );
        let config = AnalysisConfig::default();
        let current = [0.8, 0.1, 0.1];
        let (weights, _) =
            optimize_weights(&m, &current, Objective::MaxSharpe, &config).unwrap();

        assert_on_simplex(&weights);
        let optimized = m.sharpe(&weights, config.risk_free_rate).unwrap();
        let baseline = m.sharpe(&current, config.risk_free_rate).unwrap();
        assert!(
            optimized >= baseline - 1e-9,
            "optimized {optimized} vs current {baseline}"
        );
    }

    #[test]
    fn test_singular_covariance_regularized_and_flagged() {
        // Two perfectly correlated assets: rank-1 covariance.
        let m = moments(&[0.08, 0.12], &[0.04, 0.04, 0.04, 0.04]);
        let config = AnalysisConfig::default();
        let (weights, flags) =
            optimize_weights(&m, &[0.5, 0.5], Objective::MinVolatility, &config).unwrap();

        assert_on_simplex(&weights);
        assert!(flags
            .iter()
            .any(|f| matches!(f, DiagnosticFlag::RegularizedCovariance { .. })));
    }

    #[test]
    fn test_iteration_budget_respected() {
        // A one-iteration budget cannot converge the nonlinear solve;
        // the error must carry the last attempted weights.
        let m = moments(
            &[0.06, 0.18, 0.10],
            &[0.02, 0.002, 0.001, 0.002, 0.05, 0.004, 0.001, 0.004, 0.03],
        );
        let config = AnalysisConfig::default()
            .with_max_iterations(1)
            .with_tolerance(1e-16);
        let result = optimize_weights(&m, &[0.8, 0.1, 0.1], Objective::MaxSharpe, &config);

        match result {
            Err(AnalysisError::OptimizationFailed { last_weights, .. }) => {
                assert_eq!(last_weights.len(), 3);
            }
            Ok(_) => {} // A lucky start may still converge; that is fine.
            Err(other) => unreachable!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_start_point_progression() {
        assert_eq!(StartPoint::Neutral.next(), Some(StartPoint::Current));
        assert_eq!(StartPoint::Current.next(), None);

        let from_current = StartPoint::Current.weights(2, &[0.7, 0.3]);
        assert_relative_eq!(from_current[0], 0.7, epsilon = 1e-12);

        // Malformed current weights fall back to neutral.
        let fallback = StartPoint::Current.weights(2, &[0.0, 0.0]);
        assert_relative_eq!(fallback[0], 0.5, epsilon = 1e-12);
    }
}
