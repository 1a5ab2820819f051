//! Efficient-frontier sweep.
//!
//! Sweeps target returns from the minimum-variance portfolio's return to
//! the maximum single-asset return, minimizing volatility at each target
//! subject to full investment, no shorting, and the target-return
//! equality. Infeasible or non-converged targets are skipped, never
//! failing the whole sweep.

use super::{equal_weights, optimize_weights, portfolio_variance, solver_config, Objective};
use crate::error::AnalysisResult;
use crate::metrics::Moments;
use crate::parallel::maybe_parallel_filter_map;
use nivesh_core::{AnalysisConfig, DiagnosticFlag};
use nivesh_math::optimization::minimize_on_simplex_penalized;
use serde::{Deserialize, Serialize};

/// One point on the efficient frontier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontierPoint {
    /// The target return the point was solved for.
    pub target_return: f64,

    /// Achieved annualized return.
    pub expected_return: f64,

    /// Achieved annualized volatility.
    pub volatility: f64,

    /// Sharpe ratio at the point; `None` when volatility is zero.
    pub sharpe: Option<f64>,
}

/// Sweeps the efficient frontier.
///
/// Returns the feasible points in target order plus a flag recording how
/// many targets were skipped. A single-asset universe yields the one
/// trivial point.
///
/// # Errors
///
/// Propagates failure of the minimum-variance anchor solve; individual
/// target failures are skipped instead.
pub fn efficient_frontier(
    moments: &Moments,
    config: &AnalysisConfig,
) -> AnalysisResult<(Vec<FrontierPoint>, Vec<DiagnosticFlag>)> {
    let n = moments.n_assets();
    if n == 0 {
        return Ok((Vec::new(), Vec::new()));
    }
    if n == 1 {
        let weights = vec![1.0];
        return Ok((vec![point_at(moments, moments.expected_returns[0], &weights, config)], Vec::new()));
    }

    let (anchor_weights, mut flags) = optimize_weights(
        moments,
        &equal_weights(n),
        Objective::MinVolatility,
        config,
    )?;

    let return_min = moments.portfolio_return(&anchor_weights);
    let return_max = moments.max_asset_return();
    if return_max <= return_min {
        // Degenerate frontier: the min-variance portfolio already earns
        // the best achievable return.
        return Ok((
            vec![point_at(moments, return_min, &anchor_weights, config)],
            flags,
        ));
    }

    let count = config.frontier_points.max(2);
    let step = (return_max - return_min) / (count - 1) as f64;
    let targets: Vec<f64> = (0..count).map(|i| return_min + step * i as f64).collect();

    let solver = solver_config(config);
    let points: Vec<FrontierPoint> = maybe_parallel_filter_map(&targets, config, |&target| {
        let outcome = minimize_on_simplex_penalized(
            |w| portfolio_variance(w, &moments.covariance),
            |w| moments.portfolio_return(w) - target,
            &anchor_weights,
            &solver,
        )
        .ok()?;
        if !outcome.converged {
            return None;
        }
        Some(point_at(moments, target, &outcome.weights, config))
    });
    let skipped = targets.len() - points.len();
    if skipped > 0 {
        log::debug!("frontier sweep skipped {skipped} of {} targets", targets.len());
        flags.push(DiagnosticFlag::FrontierPointsSkipped { count: skipped });
    }

    Ok((points, flags))
}

fn point_at(
    moments: &Moments,
    target_return: f64,
    weights: &[f64],
    config: &AnalysisConfig,
) -> FrontierPoint {
    FrontierPoint {
        target_return,
        expected_return: moments.portfolio_return(weights),
        volatility: moments.portfolio_volatility(weights),
        sharpe: moments.sharpe(weights, config.risk_free_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DMatrix, DVector};

    fn two_asset_moments() -> Moments {
        Moments {
            symbols: vec!["A".to_string(), "B".to_string()],
            expected_returns: DVector::from_vec(vec![0.08, 0.16]),
            covariance: DMatrix::from_row_slice(2, 2, &[0.04, 0.01, 0.01, 0.09]),
        }
    }

    #[test]
    fn test_frontier_spans_and_is_feasible() {
        let config = AnalysisConfig::default().with_frontier_points(20);
        let (points, _) = efficient_frontier(&two_asset_moments(), &config).unwrap();

        assert!(points.len() >= 10);
        for point in &points {
            assert!(point.volatility >= 0.0);
            // Achieved return tracks the target within penalty tolerance.
            assert!((point.expected_return - point.target_return).abs() < 1e-3);
        }
        // Volatility at the top of the frontier exceeds the bottom.
        assert!(points.last().unwrap().volatility > points.first().unwrap().volatility);
    }

    #[test]
    fn test_frontier_returns_increase() {
        let config = AnalysisConfig::default().with_frontier_points(15);
        let (points, _) = efficient_frontier(&two_asset_moments(), &config).unwrap();

        for pair in points.windows(2) {
            assert!(pair[1].target_return > pair[0].target_return);
        }
    }

    #[test]
    fn test_single_asset_trivial_frontier() {
        let moments = Moments {
            symbols: vec!["A".to_string()],
            expected_returns: DVector::from_vec(vec![0.12]),
            covariance: DMatrix::from_row_slice(1, 1, &[0.05]),
        };
        let config = AnalysisConfig::default();
        let (points, flags) = efficient_frontier(&moments, &config).unwrap();

        assert_eq!(points.len(), 1);
        assert!(flags.is_empty());
        assert!((points[0].expected_return - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_identical_assets_degenerate_frontier() {
        // Same return everywhere: the sweep collapses to one point.
        let moments = Moments {
            symbols: vec!["A".to_string(), "B".to_string()],
            expected_returns: DVector::from_vec(vec![0.10, 0.10]),
            covariance: DMatrix::from_row_slice(2, 2, &[0.04, 0.0, 0.0, 0.04]),
        };
        let config = AnalysisConfig::default();
        let (points, _) = efficient_frontier(&moments, &config).unwrap();
        assert_eq!(points.len(), 1);
    }
}
