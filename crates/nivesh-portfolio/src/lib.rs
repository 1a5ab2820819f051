//! # Nivesh Portfolio
//!
//! Quantitative analytics engine for aggregated family stock portfolios.
//!
//! ## Design Philosophy
//!
//! - **Pure functions**: every operation is a stateless function of
//!   explicit inputs; the caller owns data retrieval and result caching
//! - **Typed boundaries**: the portfolio enters once as
//!   [`FamilyPortfolioInput`] and flows through as owned records, never
//!   as untyped maps
//! - **Reportable degradation**: per-symbol data gaps and degenerate
//!   numerics become [`DiagnosticFlag`]s on the outputs; only structural
//!   errors and optimizer non-convergence abort an analysis
//!
//! ## Features
//!
//! - **Aggregation**: per-member and family holdings tables, overlap
//!   detection with exact per-investor quantities
//! - **Metrics**: expected return, volatility, beta, Sharpe,
//!   diversification and composite risk scores at family and member
//!   granularity
//! - **Optimization**: max-Sharpe / min-volatility / equal-weight
//!   objectives, efficient-frontier sweep, rebalancing trades
//! - **Risk**: correlation matrix, historical VaR/CVaR, concentration,
//!   marginal risk contribution
//! - **Scenarios**: data-driven shock presets and simulation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nivesh_portfolio::prelude::*;
//!
//! let config = AnalysisConfig::default();
//! let analysis = analyze(&input, &market, &config)?;
//!
//! let optimized = analysis.optimize(Objective::MaxSharpe, &config)?;
//! let risk = analysis.risk_report(&config)?;
//! let shocked = analysis.simulate_scenarios(&[scenario::standard::market_crash()]);
//! ```
//!
//! ## Module Overview
//!
//! - [`aggregate`] - Multi-investor aggregation and overlap detection
//! - [`valuation`] - Current-price valuation and member rollups
//! - [`metrics`] - Return/risk statistics and moment estimation
//! - [`optimize`] - Mean-variance optimization, frontier, trades
//! - [`risk`] - VaR/CVaR, correlation, concentration, contributions
//! - [`scenario`] - Shock presets and simulation
//! - [`analysis`] - End-to-end facade
//! - [`types`] - Boundary inputs and the family tree
//!
//! ## Feature Flags
//!
//! - `parallel`: rayon-based fan-out for the frontier sweep and
//!   per-member metrics

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod aggregate;
pub mod analysis;
pub mod error;
pub mod metrics;
pub mod optimize;
pub mod parallel;
pub mod risk;
pub mod scenario;
pub mod types;
pub mod valuation;

// Re-export error types at crate root
pub use error::{AnalysisError, AnalysisResult};

// Re-export main types
pub use types::{
    FamilyHolding, FamilyPortfolio, FamilyPortfolioInput, Holding, HoldingInput, Investor,
    InvestorInput, Overlap, OwnerShare,
};

// Re-export the pipeline surface
pub use aggregate::aggregate;
pub use analysis::{analyze, FamilyAnalysis};
pub use valuation::{value_portfolio, MemberValue, PortfolioValuation, ValuedPosition};

// Re-export metrics types and functions
pub use metrics::{
    annualized_return, annualized_volatility, beta, compute_metrics, diversification_score,
    estimate_moments, risk_score, sharpe_ratio, MemberMetrics, MetricSet, MetricsReport, Moments,
    SymbolMetrics,
};

// Re-export optimizer types and functions
pub use optimize::{
    efficient_frontier, optimize_portfolio, optimize_weights, portfolio_stats,
    rebalancing_trades, FrontierPoint, Improvement, Objective, OptimizationResult,
    PortfolioStats, Trade, TradeAction,
};

// Re-export risk types and functions
pub use risk::{
    analyze_risk, concentration, historical_cvar, historical_var, risk_contributions,
    Concentration, ConcentrationLevel, CorrelationMatrix, CvarEstimate, RiskContribution,
    RiskReport, VarEstimate,
};

// Re-export scenario types and functions
pub use scenario::{run_scenarios, simulate, HoldingImpact, Scenario, ScenarioResult};

// Re-export the parallel helpers
pub use parallel::{maybe_parallel_filter_map, maybe_parallel_map};

// Re-export the core flag type, which appears on every output
pub use nivesh_core::DiagnosticFlag;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use nivesh_portfolio::prelude::*;
/// ```
pub mod prelude {
    // Error types
    pub use crate::error::{AnalysisError, AnalysisResult};

    // Boundary and family types
    pub use crate::types::{
        FamilyHolding, FamilyPortfolio, FamilyPortfolioInput, Holding, HoldingInput, Investor,
        InvestorInput, Overlap, OwnerShare,
    };

    // Pipeline
    pub use crate::aggregate::aggregate;
    pub use crate::analysis::{analyze, FamilyAnalysis};
    pub use crate::valuation::{value_portfolio, PortfolioValuation};

    // Metrics
    pub use crate::metrics::{
        compute_metrics, estimate_moments, MetricSet, MetricsReport, Moments,
    };

    // Optimizer
    pub use crate::optimize::{
        optimize_portfolio, Objective, OptimizationResult, Trade, TradeAction,
    };

    // Risk
    pub use crate::risk::{analyze_risk, RiskReport};

    // Scenarios
    pub use crate::scenario::{self, simulate, Scenario, ScenarioResult};

    // Re-export commonly used types from dependencies
    pub use nivesh_core::{
        AnalysisConfig, DiagnosticFlag, MarketData, PricePoint, PriceSeries, ReturnTable,
    };
    pub use rust_decimal::Decimal;
}
