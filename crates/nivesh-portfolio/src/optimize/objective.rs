//! Optimization objectives.

use serde::{Deserialize, Serialize};

/// The closed set of selectable optimization objectives.
///
/// All three dispatch through the same solve path in
/// [`crate::optimize::optimize_weights`]; callers select behavior by
/// variant, never by ad hoc branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Maximize (w'mu - r_f) / sqrt(w'Sw), long-only, fully invested.
    MaxSharpe,

    /// Minimize sqrt(w'Sw), long-only, fully invested.
    MinVolatility,

    /// Closed-form equal allocation, w_i = 1/n.
    EqualWeight,
}

impl Objective {
    /// Stable identifier used in errors and serialized output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::MaxSharpe => "max_sharpe",
            Self::MinVolatility => "min_volatility",
            Self::EqualWeight => "equal_weight",
        }
    }
}

impl std::fmt::Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
