//! Portfolio valuation at current prices.
//!
//! Applies the caller-supplied current prices to the aggregated family
//! tree: per-symbol values and weights, per-member value/cost/gain
//! rollups, and family totals. Symbols without a current price are
//! excluded and flagged, not fatal.

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::FamilyPortfolio;
use nivesh_core::{DiagnosticFlag, MarketData};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One priced family-level position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuedPosition {
    /// Ticker symbol.
    pub symbol: String,

    /// Total family shares.
    pub quantity: Decimal,

    /// Current price per share.
    pub price: Decimal,

    /// Market value = quantity x price.
    pub value: Decimal,

    /// Fraction of the priced family value (0-1).
    pub weight: f64,
}

/// Value/cost/gain rollup for one member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberValue {
    /// The member's id.
    pub investor_id: String,

    /// The member's display name.
    pub name: String,

    /// Market value of the member's priced holdings.
    pub value: Decimal,

    /// Total cost of the holdings that carry a cost basis.
    pub cost: Decimal,

    /// Unrealized gain over the costed holdings.
    pub gain: Decimal,

    /// Gain as a percentage of cost (0 when no cost basis is known).
    pub gain_pct: f64,

    /// Number of distinct symbols the member holds.
    pub holdings_count: usize,
}

/// The family portfolio valued at current prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioValuation {
    /// Total market value of all priced positions.
    pub total_value: Decimal,

    /// Total cost over positions with a known cost basis.
    pub total_cost: Decimal,

    /// Unrealized gain over the costed positions.
    pub total_gain: Decimal,

    /// Gain as a percentage of cost.
    pub total_gain_pct: f64,

    /// Priced positions, sorted by symbol.
    pub positions: Vec<ValuedPosition>,

    /// Per-member rollups, in family member order.
    pub members: Vec<MemberValue>,

    /// Degraded states encountered (e.g. unpriceable symbols).
    pub flags: Vec<DiagnosticFlag>,
}

impl PortfolioValuation {
    /// Weight of a symbol in the priced family portfolio.
    #[must_use]
    pub fn weight_of(&self, symbol: &str) -> Option<f64> {
        self.positions
            .iter()
            .find(|p| p.symbol == symbol)
            .map(|p| p.weight)
    }

    /// Position value for a symbol.
    #[must_use]
    pub fn value_of(&self, symbol: &str) -> Option<Decimal> {
        self.positions
            .iter()
            .find(|p| p.symbol == symbol)
            .map(|p| p.value)
    }

    /// Current price for a symbol.
    #[must_use]
    pub fn price_of(&self, symbol: &str) -> Option<Decimal> {
        self.positions
            .iter()
            .find(|p| p.symbol == symbol)
            .map(|p| p.price)
    }

    /// Weights aligned to the given symbol order, renormalized to sum to
    /// one over the symbols present. Unpriced symbols get weight zero.
    #[must_use]
    pub fn aligned_weights(&self, symbols: &[String]) -> Vec<f64> {
        let raw: Vec<f64> = symbols
            .iter()
            .map(|s| self.weight_of(s).unwrap_or(0.0))
            .collect();
        let total: f64 = raw.iter().sum();
        if total > 0.0 {
            raw.iter().map(|w| w / total).collect()
        } else {
            raw
        }
    }
}

/// Values the family portfolio at the snapshot's current prices.
///
/// # Errors
///
/// Returns [`AnalysisError::DataUnavailable`] when no position can be
/// priced at all.
pub fn value_portfolio(
    family: &FamilyPortfolio,
    market: &MarketData,
) -> AnalysisResult<PortfolioValuation> {
    let mut flags = Vec::new();
    let mut positions = Vec::new();
    let mut total_value = Decimal::ZERO;
    let mut total_cost = Decimal::ZERO;

    for holding in family.holdings.values() {
        let Some(price) = market.current_price(&holding.symbol) else {
            flags.push(DiagnosticFlag::DataUnavailable {
                symbol: holding.symbol.clone(),
            });
            continue;
        };
        let value = holding.quantity * price;
        total_value += value;
        if let Some(cost_basis) = holding.cost_basis {
            total_cost += holding.quantity * cost_basis;
        }
        positions.push(ValuedPosition {
            symbol: holding.symbol.clone(),
            quantity: holding.quantity,
            price,
            value,
            weight: 0.0,
        });
    }

    if positions.is_empty() {
        return Err(AnalysisError::data_unavailable(family.symbols()));
    }

    let total_f64 = total_value.to_f64().unwrap_or(0.0);
    for position in &mut positions {
        position.weight = if total_f64 > 0.0 {
            position.value.to_f64().unwrap_or(0.0) / total_f64
        } else {
            0.0
        };
    }

    let members = family
        .investors
        .iter()
        .map(|investor| {
            let mut value = Decimal::ZERO;
            let mut cost = Decimal::ZERO;
            for holding in &investor.holdings {
                if let Some(price) = market.current_price(&holding.symbol) {
                    value += holding.quantity * price;
                    if let Some(cost_basis) = holding.cost_basis {
                        cost += holding.quantity * cost_basis;
                    }
                }
            }
            let gain = if cost > Decimal::ZERO {
                value - cost
            } else {
                Decimal::ZERO
            };
            MemberValue {
                investor_id: investor.id.clone(),
                name: investor.name.clone(),
                value,
                cost,
                gain,
                gain_pct: gain_pct(gain, cost),
                holdings_count: investor.holdings.len(),
            }
        })
        .collect();

    let total_gain = if total_cost > Decimal::ZERO {
        total_value - total_cost
    } else {
        Decimal::ZERO
    };

    Ok(PortfolioValuation {
        total_value,
        total_cost,
        total_gain,
        total_gain_pct: gain_pct(total_gain, total_cost),
        positions,
        members,
        flags,
    })
}

fn gain_pct(gain: Decimal, cost: Decimal) -> f64 {
    if cost > Decimal::ZERO {
        (gain / cost).to_f64().unwrap_or(0.0) * 100.0
    } else {
        0.0
    }
}
