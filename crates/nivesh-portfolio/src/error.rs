//! Error types for the analytics engine.
//!
//! Per-symbol data gaps are recovered locally (exclude and flag on the
//! output); only structural problems and optimizer non-convergence are
//! surfaced as errors.

use thiserror::Error;

/// Result type for engine operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors that can occur during portfolio analysis.
#[derive(Error, Debug, Clone)]
pub enum AnalysisError {
    /// Malformed or empty portfolio structure.
    #[error("Aggregation failed: {reason}")]
    Aggregation {
        /// Why the portfolio could not be aggregated.
        reason: String,
    },

    /// No usable price data remained for any requested symbol.
    #[error("No price data available for: {}", symbols.join(", "))]
    DataUnavailable {
        /// The symbols that could not be priced.
        symbols: Vec<String>,
    },

    /// The optimizer did not converge after every allowed attempt.
    ///
    /// Carries the last attempted weights for diagnostics; callers must
    /// not silently substitute a different method's result.
    #[error("Optimization failed for {method} after {iterations} iterations")]
    OptimizationFailed {
        /// The objective that failed.
        method: String,
        /// Iterations spent in the final attempt.
        iterations: u32,
        /// The last weight vector the solver reached.
        last_weights: Vec<f64>,
    },

    /// Fewer return observations than the operation requires.
    #[error("Insufficient history: need at least {required} observations, got {actual}")]
    InsufficientHistory {
        /// Minimum required observations.
        required: usize,
        /// Observations actually available.
        actual: usize,
    },

    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },

    /// Error from the math layer.
    #[error(transparent)]
    Math(#[from] nivesh_math::MathError),

    /// Error from price data handling.
    #[error(transparent)]
    Price(#[from] nivesh_core::PriceError),
}

impl AnalysisError {
    /// Creates an aggregation error.
    #[must_use]
    pub fn aggregation(reason: impl Into<String>) -> Self {
        Self::Aggregation {
            reason: reason.into(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a data unavailable error.
    #[must_use]
    pub fn data_unavailable(symbols: Vec<String>) -> Self {
        Self::DataUnavailable { symbols }
    }
}
