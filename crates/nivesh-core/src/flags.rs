//! Diagnostic flags for degraded or approximate results.
//!
//! The engine recovers from per-symbol data gaps and numerically degenerate
//! inputs instead of failing. Each recovery is recorded as a flag on the
//! output so the presentation layer can show the specific degraded state.

use serde::{Deserialize, Serialize};

/// A non-fatal condition the engine worked around while computing a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticFlag {
    /// No usable price history or current price for a symbol; it was
    /// excluded from the computation.
    DataUnavailable {
        /// The affected symbol.
        symbol: String,
    },

    /// Volatility was zero, so the Sharpe ratio is undefined.
    SharpeUndefined,

    /// Benchmark variance was zero in the window; beta reported as 0.
    BenchmarkZeroVariance,

    /// Portfolio contains a single holding; diversification metrics
    /// degenerate.
    SingleHolding,

    /// A return series had zero variance in the window.
    ZeroVarianceAsset {
        /// The affected symbol.
        symbol: String,
    },

    /// Covariance matrix was singular; a diagonal ridge was applied and
    /// the result is approximate.
    RegularizedCovariance {
        /// The ridge added to the diagonal.
        ridge: f64,
    },

    /// Frontier target-return points that were infeasible or failed to
    /// converge and were skipped.
    FrontierPointsSkipped {
        /// Number of skipped points.
        count: usize,
    },

    /// Fewer return observations than the configured lookback window.
    ShortHistory {
        /// Number of return observations actually available.
        observations: usize,
    },
}

impl DiagnosticFlag {
    /// Human-readable description of the degraded state.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::DataUnavailable { symbol } => {
                format!("no price data for {symbol}; excluded from analysis")
            }
            Self::SharpeUndefined => {
                "Sharpe ratio undefined: volatility is zero in this window".to_string()
            }
            Self::BenchmarkZeroVariance => {
                "beta undefined: benchmark has zero variance in this window".to_string()
            }
            Self::SingleHolding => "portfolio holds a single position".to_string(),
            Self::ZeroVarianceAsset { symbol } => {
                format!("{symbol} has zero return variance in this window")
            }
            Self::RegularizedCovariance { ridge } => {
                format!("covariance was singular; ridge {ridge:.2e} applied, result approximate")
            }
            Self::FrontierPointsSkipped { count } => {
                format!("{count} infeasible frontier point(s) skipped")
            }
            Self::ShortHistory { observations } => {
                format!("only {observations} return observation(s) in the window")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions() {
        let flag = DiagnosticFlag::DataUnavailable {
            symbol: "WIPRO".to_string(),
        };
        assert!(flag.description().contains("WIPRO"));

        let flag = DiagnosticFlag::BenchmarkZeroVariance;
        assert!(flag.description().contains("benchmark"));
    }

    #[test]
    fn test_serde_tagging() {
        let flag = DiagnosticFlag::RegularizedCovariance { ridge: 1e-8 };
        let json = serde_json::to_string(&flag).unwrap();
        assert!(json.contains("regularized_covariance"));

        let parsed: DiagnosticFlag = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, flag);
    }
}
