//! Rebalancing trade synthesis.
//!
//! Converts the continuous weight delta between the current and target
//! allocations into a discrete, materiality-filtered trade list. The
//! returned ordering (largest absolute value delta first) is a contract:
//! downstream reporting renders the list as-is.

use crate::valuation::PortfolioValuation;
use nivesh_core::AnalysisConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a rebalancing trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    /// Increase the position.
    Buy,
    /// Reduce the position.
    Sell,
}

/// One rebalancing action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// Ticker symbol.
    pub symbol: String,

    /// Buy or sell; matches the sign of the deltas.
    pub action: TradeAction,

    /// Signed share quantity to trade (positive = buy).
    pub quantity_delta: Decimal,

    /// Signed value to trade (positive = buy).
    pub value_delta: Decimal,

    /// Current portfolio weight of the symbol (0-1).
    pub current_weight: f64,

    /// Target portfolio weight of the symbol (0-1).
    pub target_weight: f64,
}

/// Computes the trades that move the portfolio to the target weights.
///
/// Value delta per symbol is `(w_target - w_current) x total_value`,
/// converted to shares at the current price. Deltas below the
/// materiality threshold are dropped; symbols without a current price
/// cannot be sized and are skipped (the optimizer flags them). Trades
/// are sorted by absolute value delta, descending.
#[must_use]
pub fn rebalancing_trades(
    valuation: &PortfolioValuation,
    symbols: &[String],
    target_weights: &[f64],
    config: &AnalysisConfig,
) -> Vec<Trade> {
    use rust_decimal::prelude::ToPrimitive;

    let total_value = valuation.total_value.to_f64().unwrap_or(0.0);
    if total_value <= 0.0 {
        return Vec::new();
    }
    let threshold = config.materiality_threshold * total_value;

    let mut trades = Vec::new();
    for (symbol, &target_weight) in symbols.iter().zip(target_weights.iter()) {
        let current_weight = valuation.weight_of(symbol).unwrap_or(0.0);
        let delta_value = (target_weight - current_weight) * total_value;
        if delta_value.abs() < threshold {
            continue;
        }

        let Some(price) = valuation.price_of(symbol) else {
            log::warn!("no current price for {symbol}; cannot size trade");
            continue;
        };
        if price <= Decimal::ZERO {
            continue;
        }

        let value_delta = Decimal::from_f64_retain(delta_value).unwrap_or(Decimal::ZERO);
        if value_delta == Decimal::ZERO {
            continue;
        }

        trades.push(Trade {
            symbol: symbol.clone(),
            action: if value_delta > Decimal::ZERO {
                TradeAction::Buy
            } else {
                TradeAction::Sell
            },
            quantity_delta: value_delta / price,
            value_delta,
            current_weight,
            target_weight,
        });
    }

    trades.sort_by(|a, b| b.value_delta.abs().cmp(&a.value_delta.abs()));
    trades
}
