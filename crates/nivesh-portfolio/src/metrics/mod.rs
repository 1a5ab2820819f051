//! Return/risk metrics at family, member, and symbol granularity.
//!
//! Returns are arithmetic daily percentage changes on the aligned date
//! index. Annualization multiplies the mean by the trading-day constant
//! and the standard deviation by its square root; the constant lives in
//! [`AnalysisConfig`] and is applied here and nowhere else.

mod moments;
mod scores;

pub use moments::{estimate_moments, Moments};
pub use scores::{diversification_score, risk_score};

use crate::error::{AnalysisError, AnalysisResult};
use crate::parallel::maybe_parallel_map;
use crate::types::FamilyPortfolio;
use crate::valuation::PortfolioValuation;
use nalgebra::DMatrix;
use nivesh_core::{AnalysisConfig, DiagnosticFlag, MarketData, ReturnTable};
use nivesh_math::stats;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Computed statistics for one portfolio (family- or member-level).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSet {
    /// Annualized expected return.
    pub expected_return: f64,

    /// Annualized volatility (>= 0).
    pub volatility: f64,

    /// Beta against the benchmark; 0 (flagged) when the benchmark has
    /// zero variance in the window.
    pub beta: f64,

    /// Sharpe ratio; `None` (flagged) when volatility is zero.
    pub sharpe: Option<f64>,

    /// Diversification score, 0-10.
    pub diversification_score: f64,

    /// Composite risk score, 0-10.
    pub risk_score: f64,

    /// Degraded states encountered while computing this set.
    pub flags: Vec<DiagnosticFlag>,
}

/// Statistics for one symbol's return series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolMetrics {
    /// Ticker symbol.
    pub symbol: String,

    /// Annualized expected return.
    pub expected_return: f64,

    /// Annualized volatility.
    pub volatility: f64,

    /// Beta against the benchmark.
    pub beta: f64,

    /// Sharpe ratio; `None` when volatility is zero.
    pub sharpe: Option<f64>,
}

/// Metric set for one family member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberMetrics {
    /// The member's id.
    pub investor_id: String,

    /// The member's display name.
    pub name: String,

    /// The member's portfolio metrics.
    pub metrics: MetricSet,
}

/// Full metrics output: family, per-member, and per-symbol statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Family-level metrics.
    pub family: MetricSet,

    /// Per-member metrics, in family member order.
    pub members: Vec<MemberMetrics>,

    /// Per-symbol metrics for every symbol with history.
    pub symbols: Vec<SymbolMetrics>,

    /// Report-level degraded states (e.g. symbols without history).
    pub flags: Vec<DiagnosticFlag>,
}

/// Annualized expected return of a daily series.
#[must_use]
pub fn annualized_return(daily: &[f64], config: &AnalysisConfig) -> f64 {
    stats::mean(daily) * config.annualization()
}

/// Annualized volatility of a daily series.
#[must_use]
pub fn annualized_volatility(daily: &[f64], config: &AnalysisConfig) -> f64 {
    stats::sample_std(daily) * config.annualization_sqrt()
}

/// Sharpe ratio; `None` when volatility is zero (reportable, not a crash).
#[must_use]
pub fn sharpe_ratio(expected_return: f64, volatility: f64, risk_free_rate: f64) -> Option<f64> {
    if volatility > 0.0 {
        Some((expected_return - risk_free_rate) / volatility)
    } else {
        None
    }
}

/// Beta of a daily series against the benchmark series.
///
/// Fails gracefully: a missing or zero-variance benchmark yields beta 0
/// with a [`DiagnosticFlag::BenchmarkZeroVariance`] flag.
#[must_use]
pub fn beta(returns: &[f64], benchmark: &[f64]) -> (f64, Option<DiagnosticFlag>) {
    if benchmark.len() != returns.len() || benchmark.len() < 2 {
        return (0.0, Some(DiagnosticFlag::BenchmarkZeroVariance));
    }
    let benchmark_variance = stats::sample_variance(benchmark);
    if benchmark_variance == 0.0 {
        return (0.0, Some(DiagnosticFlag::BenchmarkZeroVariance));
    }
    // Lengths already match, so covariance cannot fail.
    let cov = stats::covariance(returns, benchmark).unwrap_or(0.0);
    (cov / benchmark_variance, None)
}

/// Computes metrics at family and per-member granularity.
///
/// Symbols without price history are excluded from every statistic and
/// flagged `data_unavailable` on the report.
///
/// # Errors
///
/// Returns [`AnalysisError::DataUnavailable`] when no held symbol has
/// both history and a current price.
pub fn compute_metrics(
    family: &FamilyPortfolio,
    market: &MarketData,
    valuation: &PortfolioValuation,
    config: &AnalysisConfig,
) -> AnalysisResult<MetricsReport> {
    let table = market.return_table();

    let mut report_flags: Vec<DiagnosticFlag> = Vec::new();
    for symbol in family.symbols() {
        if !market.has_symbol(&symbol) {
            log::debug!("no price history for {symbol}; excluding from metrics");
            report_flags.push(DiagnosticFlag::DataUnavailable { symbol });
        }
    }

    let family_weights = valuation.aligned_weights(&table.symbols);
    if family_weights.iter().sum::<f64>() <= 0.0 {
        return Err(AnalysisError::data_unavailable(family.symbols()));
    }

    let family_set = metric_set_for_weights(
        &table,
        &family_weights,
        family.overlap_count(),
        family.holding_count(),
        config,
    );

    let mut symbols = Vec::with_capacity(table.n_symbols());
    for (col, symbol) in table.symbols.iter().enumerate() {
        let series: Vec<f64> = table.returns.column(col).iter().copied().collect();
        let expected_return = annualized_return(&series, config);
        let volatility = annualized_volatility(&series, config);
        if volatility == 0.0 && series.len() >= 2 {
            report_flags.push(DiagnosticFlag::ZeroVarianceAsset {
                symbol: symbol.clone(),
            });
        }
        let (beta_value, _) = beta(&series, &table.benchmark);
        symbols.push(SymbolMetrics {
            symbol: symbol.clone(),
            expected_return,
            volatility,
            beta: beta_value,
            sharpe: sharpe_ratio(expected_return, volatility, config.risk_free_rate),
        });
    }

    let members: Vec<MemberMetrics> = maybe_parallel_map(&family.investors, config, |investor| {
        let raw: Vec<f64> = table
            .symbols
            .iter()
            .map(|symbol| match (investor.holding(symbol), market.current_price(symbol)) {
                (Some(holding), Some(price)) => {
                    (holding.quantity * price).to_f64().unwrap_or(0.0)
                }
                _ => 0.0,
            })
            .collect();
        let total: f64 = raw.iter().sum();

        let metrics = if total > 0.0 {
            let weights: Vec<f64> = raw.iter().map(|v| v / total).collect();
            let member_overlaps = investor
                .holdings
                .iter()
                .filter(|h| family.is_overlap(&h.symbol))
                .count();
            metric_set_for_weights(
                &table,
                &weights,
                member_overlaps,
                investor.holdings.len(),
                config,
            )
        } else {
            MetricSet {
                expected_return: 0.0,
                volatility: 0.0,
                beta: 0.0,
                sharpe: None,
                diversification_score: 0.0,
                risk_score: 0.0,
                flags: investor
                    .holdings
                    .iter()
                    .map(|h| DiagnosticFlag::DataUnavailable {
                        symbol: h.symbol.clone(),
                    })
                    .collect(),
            }
        };

        MemberMetrics {
            investor_id: investor.id.clone(),
            name: investor.name.clone(),
            metrics,
        }
    });

    Ok(MetricsReport {
        family: family_set,
        members,
        symbols,
        flags: report_flags,
    })
}

/// Metric set for an explicit weight vector aligned to the table symbols.
fn metric_set_for_weights(
    table: &ReturnTable,
    weights: &[f64],
    overlap_count: usize,
    total_holdings: usize,
    config: &AnalysisConfig,
) -> MetricSet {
    let mut flags = Vec::new();

    let daily = table.portfolio_returns(weights);
    if daily.len() < 2 {
        flags.push(DiagnosticFlag::ShortHistory {
            observations: daily.len(),
        });
    }

    let expected_return = annualized_return(&daily, config);
    let volatility = annualized_volatility(&daily, config);
    let sharpe = sharpe_ratio(expected_return, volatility, config.risk_free_rate);
    if sharpe.is_none() {
        flags.push(DiagnosticFlag::SharpeUndefined);
    }

    let (beta_value, beta_flag) = beta(&daily, &table.benchmark);
    if let Some(flag) = beta_flag {
        flags.push(flag);
    }

    let active: Vec<usize> = weights
        .iter()
        .enumerate()
        .filter(|(_, w)| **w > 0.0)
        .map(|(i, _)| i)
        .collect();
    let holdings_count = active.len();
    if holdings_count <= 1 {
        flags.push(DiagnosticFlag::SingleHolding);
    }

    let avg_correlation = if holdings_count >= 2 {
        let sub = select_columns(&table.returns, &active);
        stats::average_pairwise_correlation(&stats::correlation_matrix(&sub))
    } else {
        None
    };

    let diversification = diversification_score(holdings_count, avg_correlation);
    let risk = risk_score(
        volatility,
        beta_value,
        diversification,
        overlap_count,
        total_holdings,
    );

    MetricSet {
        expected_return,
        volatility,
        beta: beta_value,
        sharpe,
        diversification_score: diversification,
        risk_score: risk,
        flags,
    }
}

/// Copies the given columns into a new matrix, preserving order.
fn select_columns(matrix: &DMatrix<f64>, indices: &[usize]) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(matrix.nrows(), indices.len());
    for (j, &col) in indices.iter().enumerate() {
        out.set_column(j, &matrix.column(col));
    }
    out
}
