//! Price series, date alignment, and return derivation.
//!
//! The engine never fetches data. The caller supplies per-symbol daily
//! close series plus a benchmark index series, and [`MarketData::align`]
//! intersects them onto one shared date index. Symbols with no usable
//! series are excluded and reported, not fatal.

use crate::error::{PriceError, PriceResult};
use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// One daily close observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date.
    pub date: NaiveDate,
    /// Closing price.
    pub close: f64,
}

impl PricePoint {
    /// Creates a new price point.
    #[must_use]
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily closing prices for one symbol over a lookback window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    /// The symbol this series belongs to.
    pub symbol: String,

    /// Close observations, strictly increasing by date.
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Creates a validated price series.
    ///
    /// Dates must be strictly increasing and every close must be a
    /// positive finite number. An empty series is accepted and treated
    /// as a data gap by [`MarketData::align`].
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> PriceResult<Self> {
        let symbol = symbol.into();

        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(PriceError::UnorderedDates {
                    symbol: symbol.clone(),
                });
            }
        }
        for point in &points {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(PriceError::InvalidClose {
                    symbol: symbol.clone(),
                    close: point.close,
                });
            }
        }

        Ok(Self { symbol, points })
    }

    /// Builds a series from parallel date/close slices.
    pub fn from_closes(
        symbol: impl Into<String>,
        dates: &[NaiveDate],
        closes: &[f64],
    ) -> PriceResult<Self> {
        let points = dates
            .iter()
            .zip(closes.iter())
            .map(|(d, c)| PricePoint::new(*d, *c))
            .collect();
        Self::new(symbol, points)
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the series holds no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Arithmetic daily percentage changes between consecutive closes.
    #[must_use]
    pub fn daily_returns(&self) -> Vec<f64> {
        self.points
            .windows(2)
            .map(|pair| pair[1].close / pair[0].close - 1.0)
            .collect()
    }
}

/// An aligned market snapshot: per-symbol close matrix, benchmark series,
/// and current prices, all sharing one date index.
#[derive(Debug, Clone)]
pub struct MarketData {
    /// Shared date index, ascending.
    pub dates: Vec<NaiveDate>,

    /// Symbols with usable history, sorted ascending.
    pub symbols: Vec<String>,

    /// Close matrix: one row per date, one column per symbol.
    pub closes: DMatrix<f64>,

    /// Benchmark closes on the shared date index.
    pub benchmark_closes: Vec<f64>,

    /// Current (live) price per symbol, for valuation and trades.
    pub current_prices: HashMap<String, Decimal>,

    /// Symbols that were requested but had no usable history.
    pub missing: Vec<String>,
}

impl MarketData {
    /// Aligns per-symbol series and a benchmark onto their common dates.
    ///
    /// Symbols whose series are empty land in `missing`; the remaining
    /// series and the benchmark must share at least one trading day.
    /// A single shared day is accepted (it yields an empty return table,
    /// which downstream metrics treat as a degenerate, flagged case).
    pub fn align(
        series: Vec<PriceSeries>,
        benchmark: &PriceSeries,
        current_prices: HashMap<String, Decimal>,
    ) -> PriceResult<Self> {
        if series.is_empty() {
            return Err(PriceError::NoSeries);
        }

        let mut missing: Vec<String> = Vec::new();
        let mut usable: Vec<&PriceSeries> = Vec::new();
        for s in &series {
            if s.is_empty() {
                missing.push(s.symbol.clone());
            } else {
                usable.push(s);
            }
        }
        missing.sort();

        if usable.is_empty() {
            return Err(PriceError::NoCommonDates);
        }

        // Intersect the date sets of every usable series and the benchmark.
        let mut common: BTreeSet<NaiveDate> =
            usable[0].points.iter().map(|p| p.date).collect();
        for s in usable.iter().skip(1) {
            let dates: BTreeSet<NaiveDate> = s.points.iter().map(|p| p.date).collect();
            common = common.intersection(&dates).copied().collect();
        }
        if !benchmark.is_empty() {
            let dates: BTreeSet<NaiveDate> = benchmark.points.iter().map(|p| p.date).collect();
            common = common.intersection(&dates).copied().collect();
        }

        if common.is_empty() {
            return Err(PriceError::NoCommonDates);
        }

        let dates: Vec<NaiveDate> = common.into_iter().collect();

        let mut usable_sorted = usable;
        usable_sorted.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        let symbols: Vec<String> = usable_sorted.iter().map(|s| s.symbol.clone()).collect();

        let mut closes = DMatrix::zeros(dates.len(), symbols.len());
        for (col, s) in usable_sorted.iter().enumerate() {
            let by_date: HashMap<NaiveDate, f64> =
                s.points.iter().map(|p| (p.date, p.close)).collect();
            for (row, date) in dates.iter().enumerate() {
                // Every common date is present in every usable series.
                closes[(row, col)] = by_date[date];
            }
        }

        let benchmark_closes: Vec<f64> = if benchmark.is_empty() {
            Vec::new()
        } else {
            let by_date: HashMap<NaiveDate, f64> =
                benchmark.points.iter().map(|p| (p.date, p.close)).collect();
            dates.iter().map(|d| by_date[d]).collect()
        };

        Ok(Self {
            dates,
            symbols,
            closes,
            benchmark_closes,
            current_prices,
            missing,
        })
    }

    /// Number of aligned trading days.
    #[must_use]
    pub fn n_days(&self) -> usize {
        self.dates.len()
    }

    /// Returns true if the snapshot has history for the symbol.
    #[must_use]
    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    /// Current price for a symbol, if the caller supplied one.
    #[must_use]
    pub fn current_price(&self, symbol: &str) -> Option<Decimal> {
        self.current_prices.get(symbol).copied()
    }

    /// Derives the daily return table from the aligned closes.
    #[must_use]
    pub fn return_table(&self) -> ReturnTable {
        let n_days = self.dates.len();
        let n_obs = n_days.saturating_sub(1);
        let n_sym = self.symbols.len();

        let mut returns = DMatrix::zeros(n_obs, n_sym);
        for row in 0..n_obs {
            for col in 0..n_sym {
                returns[(row, col)] =
                    self.closes[(row + 1, col)] / self.closes[(row, col)] - 1.0;
            }
        }

        let benchmark: Vec<f64> = self
            .benchmark_closes
            .windows(2)
            .map(|pair| pair[1] / pair[0] - 1.0)
            .collect();

        ReturnTable {
            symbols: self.symbols.clone(),
            dates: self.dates.iter().skip(1).copied().collect(),
            returns,
            benchmark,
        }
    }
}

/// Aligned daily returns for a set of symbols plus the benchmark.
#[derive(Debug, Clone)]
pub struct ReturnTable {
    /// Symbols, one per matrix column, sorted ascending.
    pub symbols: Vec<String>,

    /// Dates of the return observations (one fewer than the close dates).
    pub dates: Vec<NaiveDate>,

    /// Return matrix: one row per observation, one column per symbol.
    pub returns: DMatrix<f64>,

    /// Benchmark daily returns on the same index (empty if no benchmark).
    pub benchmark: Vec<f64>,
}

impl ReturnTable {
    /// Number of return observations.
    #[must_use]
    pub fn n_observations(&self) -> usize {
        self.returns.nrows()
    }

    /// Number of symbols.
    #[must_use]
    pub fn n_symbols(&self) -> usize {
        self.returns.ncols()
    }

    /// Column index of a symbol.
    #[must_use]
    pub fn column_of(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// The return series of one symbol.
    #[must_use]
    pub fn symbol_returns(&self, symbol: &str) -> Option<Vec<f64>> {
        self.column_of(symbol)
            .map(|col| self.returns.column(col).iter().copied().collect())
    }

    /// Daily portfolio returns for a weight vector aligned to `symbols`.
    ///
    /// # Panics
    ///
    /// Panics if `weights.len()` differs from the symbol count.
    #[must_use]
    pub fn portfolio_returns(&self, weights: &[f64]) -> Vec<f64> {
        assert_eq!(weights.len(), self.n_symbols());
        let w = DVector::from_column_slice(weights);
        let series = &self.returns * w;
        series.iter().copied().collect()
    }
}
