//! # Nivesh Math
//!
//! Statistics and constrained optimization for the Nivesh family
//! portfolio analytics engine.
//!
//! This crate provides:
//!
//! - **Statistics**: sample mean/variance, covariance and correlation
//!   matrices, linear-interpolated percentiles
//! - **Optimization**: projected-gradient minimization on the probability
//!   simplex, with a quadratic-penalty variant for equality constraints
//!
//! ## Design Philosophy
//!
//! - **Numerical Stability**: degenerate windows (single observation,
//!   zero variance) produce well-defined zero results, never NaN
//! - **Bounded work**: every iterative routine honors an explicit
//!   iteration budget and reports non-convergence instead of hanging

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]

pub mod error;
pub mod optimization;
pub mod stats;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::optimization::{
        minimize_on_simplex, minimize_on_simplex_penalized, project_to_simplex, SolveOutcome,
        SolverConfig,
    };
    pub use crate::stats::{
        average_pairwise_correlation, correlation_matrix, covariance, covariance_matrix, mean,
        percentile, sample_std, sample_variance,
    };
}

pub use error::{MathError, MathResult};
