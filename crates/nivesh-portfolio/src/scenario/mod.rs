//! Scenario simulation.
//!
//! A scenario is pure data: per-symbol percentage shocks plus a default
//! shock for every other symbol. Presets are built by the constructors
//! in [`standard`]; adding a preset never requires engine changes.

use crate::valuation::PortfolioValuation;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named hypothetical market shock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,

    /// Description.
    pub description: Option<String>,

    /// Explicit percentage change per symbol (e.g. -15.0 for -15%).
    pub shocks_pct: HashMap<String, f64>,

    /// Percentage change applied to symbols not listed explicitly.
    pub default_shock_pct: f64,
}

impl Scenario {
    /// Creates a scenario with no shocks (identity).
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            shocks_pct: HashMap::new(),
            default_shock_pct: 0.0,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an explicit per-symbol shock in percent.
    #[must_use]
    pub fn with_shock(mut self, symbol: impl Into<String>, pct: f64) -> Self {
        self.shocks_pct.insert(symbol.into(), pct);
        self
    }

    /// Sets the default shock applied to unlisted symbols.
    #[must_use]
    pub fn with_default_shock(mut self, pct: f64) -> Self {
        self.default_shock_pct = pct;
        self
    }

    /// Percentage shock for a symbol: explicit entry, else the default.
    #[must_use]
    pub fn shock_for(&self, symbol: &str) -> f64 {
        self.shocks_pct
            .get(symbol)
            .copied()
            .unwrap_or(self.default_shock_pct)
    }

    /// Shock for a symbol as a decimal multiplier delta (e.g. -0.15).
    #[must_use]
    pub fn shock_decimal_for(&self, symbol: &str) -> f64 {
        self.shock_for(symbol) / 100.0
    }

    /// Returns true if no symbol is shocked at all.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.default_shock_pct == 0.0 && self.shocks_pct.values().all(|pct| *pct == 0.0)
    }
}

/// Impact of a scenario on one holding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingImpact {
    /// Ticker symbol.
    pub symbol: String,

    /// Value before the shock.
    pub current_value: Decimal,

    /// Value after the shock.
    pub projected_value: Decimal,

    /// Signed value change.
    pub value_change: Decimal,

    /// The percentage shock that was applied.
    pub shock_pct: f64,
}

/// Portfolio-level outcome of one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario name.
    pub scenario_name: String,

    /// Portfolio value before the shock.
    pub current_value: Decimal,

    /// Portfolio value after the shock.
    pub projected_value: Decimal,

    /// Signed portfolio value change.
    pub value_change: Decimal,

    /// Change as a percentage of the current value.
    pub pct_impact: f64,

    /// Per-holding breakdown, sorted by absolute value change
    /// descending.
    pub per_holding: Vec<HoldingImpact>,
}

impl ScenarioResult {
    /// Returns true if the scenario loses money.
    #[must_use]
    pub fn is_loss(&self) -> bool {
        self.value_change < Decimal::ZERO
    }
}

/// Applies a scenario to the valued portfolio.
///
/// Each position's value is scaled by (1 + shock); unlisted symbols move
/// by the scenario's default shock. An identity scenario reproduces the
/// current total value exactly.
#[must_use]
pub fn simulate(scenario: &Scenario, valuation: &PortfolioValuation) -> ScenarioResult {
    use rust_decimal::prelude::ToPrimitive;

    let mut per_holding: Vec<HoldingImpact> = valuation
        .positions
        .iter()
        .map(|position| {
            let shock_pct = scenario.shock_for(&position.symbol);
            let shock = Decimal::from_f64_retain(shock_pct).unwrap_or(Decimal::ZERO);
            let factor = Decimal::ONE + shock / Decimal::ONE_HUNDRED;
            let projected_value = position.value * factor;
            HoldingImpact {
                symbol: position.symbol.clone(),
                current_value: position.value,
                projected_value,
                value_change: projected_value - position.value,
                shock_pct,
            }
        })
        .collect();

    let current_value: Decimal = per_holding.iter().map(|h| h.current_value).sum();
    let projected_value: Decimal = per_holding.iter().map(|h| h.projected_value).sum();
    let value_change = projected_value - current_value;

    per_holding.sort_by(|a, b| b.value_change.abs().cmp(&a.value_change.abs()));

    let pct_impact = if current_value > Decimal::ZERO {
        (value_change / current_value).to_f64().unwrap_or(0.0) * 100.0
    } else {
        0.0
    };

    ScenarioResult {
        scenario_name: scenario.name.clone(),
        current_value,
        projected_value,
        value_change,
        pct_impact,
        per_holding,
    }
}

/// Runs a batch of scenarios, preserving input order.
#[must_use]
pub fn run_scenarios(scenarios: &[Scenario], valuation: &PortfolioValuation) -> Vec<ScenarioResult> {
    scenarios
        .iter()
        .map(|scenario| simulate(scenario, valuation))
        .collect()
}

/// Preset scenarios commonly used for family portfolios.
pub mod standard {
    use super::*;

    /// Broad market decline: every symbol -20%.
    #[must_use]
    pub fn market_crash() -> Scenario {
        Scenario::new("Market Crash (-20%)")
            .with_description("Broad decline of 20% across all holdings")
            .with_default_shock(-20.0)
    }

    /// Broad market rally: every symbol +15%.
    #[must_use]
    pub fn market_rally() -> Scenario {
        Scenario::new("Market Rally (+15%)")
            .with_description("Broad rally of 15% across all holdings")
            .with_default_shock(15.0)
    }

    /// Sector-specific decline: the named symbols -15%, others unchanged.
    #[must_use]
    pub fn sector_selloff(sector: &str, symbols: &[&str]) -> Scenario {
        let mut scenario = Scenario::new(format!("{sector} Selloff"))
            .with_description(format!("{sector} holdings decline 15%"));
        for symbol in symbols {
            scenario = scenario.with_shock(*symbol, -15.0);
        }
        scenario
    }

    /// Sector-specific rally: the named symbols +20%, others unchanged.
    #[must_use]
    pub fn sector_rally(sector: &str, symbols: &[&str]) -> Scenario {
        let mut scenario = Scenario::new(format!("{sector} Rally"))
            .with_description(format!("{sector} holdings rally 20%"));
        for symbol in symbols {
            scenario = scenario.with_shock(*symbol, 20.0);
        }
        scenario
    }
}
