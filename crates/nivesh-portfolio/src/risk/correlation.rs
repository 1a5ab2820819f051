//! Pairwise correlation of held symbols.

use nivesh_core::ReturnTable;
use nivesh_math::stats;
use serde::{Deserialize, Serialize};

/// Pearson correlation matrix over the held symbols.
///
/// Symmetric with a unit diagonal; values clipped to [-1, 1] against
/// floating round-off. A single symbol degenerates to a 1x1 identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Symbols, one per row/column.
    pub symbols: Vec<String>,

    /// Correlation values, row-major.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Builds the correlation matrix from a return table.
    #[must_use]
    pub fn from_returns(table: &ReturnTable) -> Self {
        let corr = stats::correlation_matrix(&table.returns);
        let n = corr.nrows();
        let values = (0..n)
            .map(|i| (0..n).map(|j| corr[(i, j)]).collect())
            .collect();
        Self {
            symbols: table.symbols.clone(),
            values,
        }
    }

    /// Matrix dimension.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if the matrix is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Correlation between two symbols, if both are present.
    #[must_use]
    pub fn between(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.values[i][j])
    }

    /// Mean off-diagonal correlation; `None` for fewer than two symbols.
    #[must_use]
    pub fn average_pairwise(&self) -> Option<f64> {
        let n = self.len();
        if n < 2 {
            return None;
        }
        let mut sum = 0.0;
        let mut count = 0usize;
        for i in 0..n {
            for j in (i + 1)..n {
                sum += self.values[i][j];
                count += 1;
            }
        }
        Some(sum / count as f64)
    }
}
