//! Downside-risk analysis.
//!
//! Correlation structure, historical VaR/CVaR, concentration indices,
//! and per-holding marginal risk contribution over the current weights.

mod concentration;
mod contribution;
mod correlation;
mod var;

pub use concentration::{concentration, Concentration, ConcentrationLevel};
pub use contribution::{risk_contributions, RiskContribution};
pub use correlation::CorrelationMatrix;
pub use var::{historical_cvar, historical_var, CvarEstimate, VarEstimate};

use crate::error::{AnalysisError, AnalysisResult};
use crate::valuation::PortfolioValuation;
use nivesh_core::{AnalysisConfig, DiagnosticFlag, ReturnTable};
use nivesh_math::stats;
use serde::{Deserialize, Serialize};

/// Output of a risk analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    /// Pairwise correlation of held symbols.
    pub correlation: CorrelationMatrix,

    /// Historical VaR; absent (flagged) when there are no return
    /// observations.
    pub var: Option<VarEstimate>,

    /// Expected shortfall; absent alongside VaR.
    pub cvar: Option<CvarEstimate>,

    /// Concentration metrics over the full priced portfolio.
    pub concentration: Concentration,

    /// Per-holding risk contributions, sorted by absolute contribution.
    pub contributions: Vec<RiskContribution>,

    /// Annualized portfolio volatility the contributions sum to.
    pub portfolio_volatility: f64,

    /// Degraded states encountered.
    pub flags: Vec<DiagnosticFlag>,
}

/// Analyzes portfolio risk at the current weights.
///
/// # Errors
///
/// Returns [`AnalysisError::DataUnavailable`] when no priced position
/// has return history.
pub fn analyze_risk(
    table: &ReturnTable,
    valuation: &PortfolioValuation,
    config: &AnalysisConfig,
) -> AnalysisResult<RiskReport> {
    let weights = valuation.aligned_weights(&table.symbols);
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(AnalysisError::data_unavailable(table.symbols.clone()));
    }

    let mut flags: Vec<DiagnosticFlag> = Vec::new();
    for position in &valuation.positions {
        if table.column_of(&position.symbol).is_none() {
            flags.push(DiagnosticFlag::DataUnavailable {
                symbol: position.symbol.clone(),
            });
        }
    }
    for (col, symbol) in table.symbols.iter().enumerate() {
        let series: Vec<f64> = table.returns.column(col).iter().copied().collect();
        if series.len() >= 2 && stats::sample_variance(&series) == 0.0 {
            flags.push(DiagnosticFlag::ZeroVarianceAsset {
                symbol: symbol.clone(),
            });
        }
    }

    let daily = table.portfolio_returns(&weights);
    let (var, cvar) = if daily.is_empty() {
        flags.push(DiagnosticFlag::ShortHistory { observations: 0 });
        (None, None)
    } else {
        if daily.len() < 2 {
            flags.push(DiagnosticFlag::ShortHistory {
                observations: daily.len(),
            });
        }
        (
            Some(historical_var(&daily, valuation.total_value, config)?),
            Some(historical_cvar(&daily, valuation.total_value, config)?),
        )
    };

    let correlation = CorrelationMatrix::from_returns(table);

    let position_weights: Vec<f64> = valuation.positions.iter().map(|p| p.weight).collect();
    let concentration_metrics = concentration(&position_weights);
    if valuation.positions.len() <= 1 {
        flags.push(DiagnosticFlag::SingleHolding);
    }

    let annualized_covariance =
        stats::covariance_matrix(&table.returns) * config.annualization();
    let (contributions, portfolio_volatility) =
        risk_contributions(&table.symbols, &annualized_covariance, &weights);

    Ok(RiskReport {
        correlation,
        var,
        cvar,
        concentration: concentration_metrics,
        contributions,
        portfolio_volatility,
        flags,
    })
}
