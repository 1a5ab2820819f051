//! End-to-end analysis facade.
//!
//! Bundles aggregation, valuation, and metric computation into one call
//! and hands back a context from which the optimizer, risk analyzer,
//! and scenario simulator can each be invoked independently.

use crate::aggregate::aggregate;
use crate::error::AnalysisResult;
use crate::metrics::{compute_metrics, estimate_moments, MetricsReport, Moments};
use crate::optimize::{optimize_portfolio, Objective, OptimizationResult};
use crate::risk::{analyze_risk, RiskReport};
use crate::scenario::{run_scenarios, Scenario, ScenarioResult};
use crate::types::{FamilyPortfolio, FamilyPortfolioInput};
use crate::valuation::{value_portfolio, PortfolioValuation};
use nivesh_core::{AnalysisConfig, MarketData, ReturnTable};

/// A fully prepared analysis: aggregated family, valuation, metrics, and
/// the estimated moments.
///
/// All fields are plain values; the context holds no shared mutable
/// state and can be dropped after the outputs are extracted.
#[derive(Debug, Clone)]
pub struct FamilyAnalysis {
    /// The aggregated family tree.
    pub family: FamilyPortfolio,

    /// The portfolio valued at current prices.
    pub valuation: PortfolioValuation,

    /// Family/member/symbol metrics.
    pub metrics: MetricsReport,

    /// Daily return table on the aligned date index.
    pub returns: ReturnTable,

    /// Annualized moment estimates for the optimizer.
    pub moments: Moments,
}

impl FamilyAnalysis {
    /// Runs the optimizer for the given objective.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::AnalysisError::OptimizationFailed`].
    pub fn optimize(
        &self,
        objective: Objective,
        config: &AnalysisConfig,
    ) -> AnalysisResult<OptimizationResult> {
        optimize_portfolio(&self.moments, &self.valuation, objective, config)
    }

    /// Runs the risk analysis at the current weights.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::AnalysisError::DataUnavailable`].
    pub fn risk_report(&self, config: &AnalysisConfig) -> AnalysisResult<RiskReport> {
        analyze_risk(&self.returns, &self.valuation, config)
    }

    /// Simulates a batch of scenarios against the current valuation.
    #[must_use]
    pub fn simulate_scenarios(&self, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
        run_scenarios(scenarios, &self.valuation)
    }
}

/// Aggregates, values, and measures a family portfolio in one pass.
///
/// # Errors
///
/// Surfaces structural errors immediately (empty family, nothing
/// priceable); per-symbol gaps are flagged on the outputs instead.
pub fn analyze(
    input: &FamilyPortfolioInput,
    market: &MarketData,
    config: &AnalysisConfig,
) -> AnalysisResult<FamilyAnalysis> {
    let family = aggregate(input)?;
    let valuation = value_portfolio(&family, market)?;
    let metrics = compute_metrics(&family, market, &valuation, config)?;
    let returns = market.return_table();
    let moments = estimate_moments(&returns, config);

    Ok(FamilyAnalysis {
        family,
        valuation,
        metrics,
        returns,
        moments,
    })
}
