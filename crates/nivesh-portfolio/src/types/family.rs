//! The aggregated family portfolio tree.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One position owned by one investor, after per-investor merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol.
    pub symbol: String,

    /// Number of shares held.
    pub quantity: Decimal,

    /// Per-share purchase price, if known.
    pub cost_basis: Option<Decimal>,
}

/// One family member with merged holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investor {
    /// Identifier, unique within the family.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Holdings, one entry per symbol, sorted by symbol.
    pub holdings: Vec<Holding>,
}

impl Investor {
    /// Returns the holding for a symbol, if this member owns it.
    #[must_use]
    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.symbol == symbol)
    }

    /// Symbols held by this member, sorted.
    #[must_use]
    pub fn symbols(&self) -> Vec<&str> {
        self.holdings.iter().map(|h| h.symbol.as_str()).collect()
    }
}

/// One investor's share of a family-level position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerShare {
    /// The owning investor's id.
    pub investor_id: String,

    /// Shares held by that investor.
    pub quantity: Decimal,
}

/// A family-level position: quantities summed across members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyHolding {
    /// Ticker symbol.
    pub symbol: String,

    /// Total shares across all members.
    pub quantity: Decimal,

    /// Quantity-weighted average cost basis over the members that
    /// supplied one.
    pub cost_basis: Option<Decimal>,

    /// The members holding this symbol and their individual quantities,
    /// in family member order.
    pub owners: Vec<OwnerShare>,
}

impl FamilyHolding {
    /// Returns true if at least two distinct members hold this symbol.
    #[must_use]
    pub fn is_overlap(&self) -> bool {
        self.owners.len() >= 2
    }
}

/// A symbol held by two or more family members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlap {
    /// The shared symbol.
    pub symbol: String,

    /// The holding members with their individual quantities.
    pub owners: Vec<OwnerShare>,
}

/// The aggregated family portfolio.
///
/// Owns its investor/holding tree exclusively; built once per analysis
/// request by [`crate::aggregate::aggregate`] and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyPortfolio {
    /// Family contact/identifier.
    pub email: String,

    /// Family members with merged holdings.
    pub investors: Vec<Investor>,

    /// Family-level positions keyed by symbol (iteration is sorted).
    pub holdings: BTreeMap<String, FamilyHolding>,

    /// Symbols held by two or more members, sorted by symbol.
    pub overlaps: Vec<Overlap>,
}

impl FamilyPortfolio {
    /// Number of distinct symbols held by the family.
    #[must_use]
    pub fn holding_count(&self) -> usize {
        self.holdings.len()
    }

    /// Number of overlap symbols.
    #[must_use]
    pub fn overlap_count(&self) -> usize {
        self.overlaps.len()
    }

    /// Distinct symbols, sorted ascending.
    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        self.holdings.keys().cloned().collect()
    }

    /// Looks up a member by id.
    #[must_use]
    pub fn member(&self, id: &str) -> Option<&Investor> {
        self.investors.iter().find(|i| i.id == id)
    }

    /// Returns true if the symbol is held by two or more members.
    #[must_use]
    pub fn is_overlap(&self, symbol: &str) -> bool {
        self.overlaps.iter().any(|o| o.symbol == symbol)
    }
}
