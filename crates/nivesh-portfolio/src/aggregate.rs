//! Family portfolio aggregation.
//!
//! Merges each investor's holdings into a per-member table and a
//! family-level table with quantities summed across members, and detects
//! overlap symbols (held by two or more members). Pure function of its
//! input; valuation and metrics happen downstream.

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{
    FamilyHolding, FamilyPortfolio, FamilyPortfolioInput, Holding, Investor, Overlap, OwnerShare,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

/// Aggregates a raw family portfolio into the owned engine tree.
///
/// # Errors
///
/// Returns [`AnalysisError::Aggregation`] when the family has no
/// investors, an investor id is empty or duplicated, an investor has no
/// holdings, or a quantity is not strictly positive.
pub fn aggregate(input: &FamilyPortfolioInput) -> AnalysisResult<FamilyPortfolio> {
    if input.investors.is_empty() {
        return Err(AnalysisError::aggregation("family has no investors"));
    }

    let mut seen_ids: HashSet<&str> = HashSet::new();
    for investor in &input.investors {
        if investor.id.trim().is_empty() {
            return Err(AnalysisError::aggregation("investor id is empty"));
        }
        if !seen_ids.insert(investor.id.as_str()) {
            return Err(AnalysisError::aggregation(format!(
                "duplicate investor id '{}'",
                investor.id
            )));
        }
        if investor.holdings.is_empty() {
            return Err(AnalysisError::aggregation(format!(
                "investor '{}' has no holdings",
                investor.id
            )));
        }
        for holding in &investor.holdings {
            if holding.quantity <= Decimal::ZERO {
                return Err(AnalysisError::aggregation(format!(
                    "non-positive quantity for '{}' held by '{}'",
                    holding.symbol, investor.id
                )));
            }
        }
    }

    let investors: Vec<Investor> = input
        .investors
        .iter()
        .map(|investor| Investor {
            id: investor.id.clone(),
            name: investor.name.clone(),
            holdings: merge_member_holdings(investor),
        })
        .collect();

    let holdings = build_family_holdings(&investors);
    let overlaps = detect_overlaps(&holdings);

    Ok(FamilyPortfolio {
        email: input.email.clone(),
        investors,
        holdings,
        overlaps,
    })
}

/// Merges duplicate symbols within one investor: quantities summed,
/// cost basis quantity-weighted over the lots that supplied one.
fn merge_member_holdings(investor: &crate::types::InvestorInput) -> Vec<Holding> {
    let mut merged: BTreeMap<String, (Decimal, Decimal, Decimal)> = BTreeMap::new();

    for holding in &investor.holdings {
        let entry = merged
            .entry(holding.symbol.clone())
            .or_insert((Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));
        entry.0 += holding.quantity;
        if let Some(cost_basis) = holding.cost_basis {
            entry.1 += holding.quantity * cost_basis;
            entry.2 += holding.quantity;
        }
    }

    merged
        .into_iter()
        .map(|(symbol, (quantity, cost_value, costed_quantity))| Holding {
            symbol,
            quantity,
            cost_basis: if costed_quantity > Decimal::ZERO {
                Some(cost_value / costed_quantity)
            } else {
                None
            },
        })
        .collect()
}

/// Sums member quantities per symbol and value-weights the cost basis.
fn build_family_holdings(investors: &[Investor]) -> BTreeMap<String, FamilyHolding> {
    let mut family: BTreeMap<String, FamilyHolding> = BTreeMap::new();
    let mut cost_values: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();

    for investor in investors {
        for holding in &investor.holdings {
            let entry = family
                .entry(holding.symbol.clone())
                .or_insert_with(|| FamilyHolding {
                    symbol: holding.symbol.clone(),
                    quantity: Decimal::ZERO,
                    cost_basis: None,
                    owners: Vec::new(),
                });
            entry.quantity += holding.quantity;
            entry.owners.push(OwnerShare {
                investor_id: investor.id.clone(),
                quantity: holding.quantity,
            });

            if let Some(cost_basis) = holding.cost_basis {
                let cost = cost_values
                    .entry(holding.symbol.clone())
                    .or_insert((Decimal::ZERO, Decimal::ZERO));
                cost.0 += holding.quantity * cost_basis;
                cost.1 += holding.quantity;
            }
        }
    }

    for (symbol, (cost_value, costed_quantity)) in cost_values {
        if costed_quantity > Decimal::ZERO {
            if let Some(entry) = family.get_mut(&symbol) {
                entry.cost_basis = Some(cost_value / costed_quantity);
            }
        }
    }

    family
}

/// Symbols with two or more owners, sorted by symbol via map order.
fn detect_overlaps(holdings: &BTreeMap<String, FamilyHolding>) -> Vec<Overlap> {
    holdings
        .values()
        .filter(|h| h.is_overlap())
        .map(|h| Overlap {
            symbol: h.symbol.clone(),
            owners: h.owners.clone(),
        })
        .collect()
}
