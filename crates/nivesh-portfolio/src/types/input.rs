//! Boundary input types.
//!
//! The parsed portfolio is represented as explicit, statically-shaped
//! records constructed once at the boundary. Schema validation (symbol
//! resolution, positive quantities) happens upstream; the aggregator
//! re-checks the structural invariants defensively.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One position in one symbol, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingInput {
    /// Ticker symbol; must resolve to a known price series.
    pub symbol: String,

    /// Number of shares held; strictly positive.
    pub quantity: Decimal,

    /// Per-share purchase price, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_basis: Option<Decimal>,
}

impl HoldingInput {
    /// Creates a holding without a cost basis.
    #[must_use]
    pub fn new(symbol: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            cost_basis: None,
        }
    }

    /// Sets the cost basis.
    #[must_use]
    pub fn with_cost_basis(mut self, cost_basis: Decimal) -> Self {
        self.cost_basis = Some(cost_basis);
        self
    }
}

/// One family member and their holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorInput {
    /// Identifier, unique within the family.
    pub id: String,

    /// Display name.
    pub name: String,

    /// The member's positions, in submission order.
    pub holdings: Vec<HoldingInput>,
}

impl InvestorInput {
    /// Creates an investor with the given holdings.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        holdings: Vec<HoldingInput>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            holdings,
        }
    }
}

/// The raw family portfolio as submitted for analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyPortfolioInput {
    /// Family contact/identifier.
    pub email: String,

    /// All family members.
    pub investors: Vec<InvestorInput>,
}

impl FamilyPortfolioInput {
    /// Creates a family portfolio input.
    #[must_use]
    pub fn new(email: impl Into<String>, investors: Vec<InvestorInput>) -> Self {
        Self {
            email: email.into(),
            investors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builder_helpers() {
        let holding = HoldingInput::new("RELIANCE", dec!(100)).with_cost_basis(dec!(2450.50));
        assert_eq!(holding.symbol, "RELIANCE");
        assert_eq!(holding.cost_basis, Some(dec!(2450.50)));
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{
            "email": "family@example.com",
            "investors": [
                {
                    "id": "INV001",
                    "name": "Asha",
                    "holdings": [
                        { "symbol": "RELIANCE", "quantity": "100", "cost_basis": "2450.50" },
                        { "symbol": "TCS", "quantity": "25" }
                    ]
                }
            ]
        }"#;

        let input: FamilyPortfolioInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.investors.len(), 1);
        assert_eq!(input.investors[0].holdings[0].quantity, dec!(100));
        assert!(input.investors[0].holdings[1].cost_basis.is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let input = FamilyPortfolioInput::new(
            "family@example.com",
            vec![InvestorInput::new(
                "INV001",
                "Asha",
                vec![HoldingInput::new("TCS", dec!(10))],
            )],
        );

        let json = serde_json::to_string(&input).unwrap();
        let parsed: FamilyPortfolioInput = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, input);
    }
}
