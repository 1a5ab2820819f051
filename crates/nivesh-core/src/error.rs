//! Error types for price data handling.

use thiserror::Error;

/// A specialized Result type for price data operations.
pub type PriceResult<T> = Result<T, PriceError>;

/// Errors that can occur while building or aligning price data.
#[derive(Error, Debug, Clone)]
pub enum PriceError {
    /// A close price was zero, negative, or not finite.
    #[error("Invalid close for '{symbol}': {close}")]
    InvalidClose {
        /// The symbol the series belongs to.
        symbol: String,
        /// The offending close value.
        close: f64,
    },

    /// Series dates were not strictly increasing.
    #[error("Unordered dates in series for '{symbol}'")]
    UnorderedDates {
        /// The symbol the series belongs to.
        symbol: String,
    },

    /// No trading day is shared by all supplied series.
    #[error("No common trading days across the supplied price series")]
    NoCommonDates,

    /// No price series were supplied at all.
    #[error("No price series supplied")]
    NoSeries,
}
