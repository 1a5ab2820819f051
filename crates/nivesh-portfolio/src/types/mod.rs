//! Core types: boundary inputs and the owned family portfolio tree.

mod family;
mod input;

pub use family::{FamilyHolding, FamilyPortfolio, Holding, Investor, Overlap, OwnerShare};
pub use input::{FamilyPortfolioInput, HoldingInput, InvestorInput};
