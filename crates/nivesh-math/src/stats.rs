//! Descriptive statistics over return series.
//!
//! All dispersion estimators use sample statistics (ddof = 1). A series
//! with fewer than two observations has zero variance by convention, so
//! single-day histories degrade to zero-volatility results instead of
//! failing.

use crate::error::{MathError, MathResult};
use nalgebra::DMatrix;

/// Arithmetic mean. Zero for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (ddof = 1). Zero when fewer than two observations.
#[must_use]
pub fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (n - 1) as f64
}

/// Sample standard deviation (ddof = 1).
#[must_use]
pub fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Sample covariance of two equally long series (ddof = 1).
pub fn covariance(xs: &[f64], ys: &[f64]) -> MathResult<f64> {
    if xs.len() != ys.len() {
        return Err(MathError::DimensionMismatch {
            left: xs.len(),
            right: ys.len(),
        });
    }
    let n = xs.len();
    if n < 2 {
        return Ok(0.0);
    }
    let mx = mean(xs);
    let my = mean(ys);
    let sum: f64 = xs
        .iter()
        .zip(ys.iter())
        .map(|(x, y)| (x - mx) * (y - my))
        .sum();
    Ok(sum / (n - 1) as f64)
}

/// Sample covariance matrix of a return matrix (rows = observations,
/// columns = series).
///
/// With fewer than two observations every entry is zero, matching the
/// zero-variance convention for degenerate windows.
#[must_use]
pub fn covariance_matrix(returns: &DMatrix<f64>) -> DMatrix<f64> {
    let n_obs = returns.nrows();
    let n_series = returns.ncols();

    let mut cov = DMatrix::zeros(n_series, n_series);
    if n_obs < 2 {
        return cov;
    }

    let means: Vec<f64> = (0..n_series)
        .map(|c| returns.column(c).iter().sum::<f64>() / n_obs as f64)
        .collect();

    for i in 0..n_series {
        for j in i..n_series {
            let mut sum = 0.0;
            for row in 0..n_obs {
                sum += (returns[(row, i)] - means[i]) * (returns[(row, j)] - means[j]);
            }
            let value = sum / (n_obs - 1) as f64;
            cov[(i, j)] = value;
            cov[(j, i)] = value;
        }
    }
    cov
}

/// Pearson correlation matrix of a return matrix.
///
/// Symmetric with a unit diagonal; off-diagonal values are clipped to
/// [-1, 1] against floating round-off. A zero-variance series gets an
/// identity row (correlation 0 with everything else).
#[must_use]
pub fn correlation_matrix(returns: &DMatrix<f64>) -> DMatrix<f64> {
    let cov = covariance_matrix(returns);
    let n = cov.nrows();
    let mut corr = DMatrix::identity(n, n);

    for i in 0..n {
        for j in (i + 1)..n {
            let denom = (cov[(i, i)] * cov[(j, j)]).sqrt();
            let value = if denom > 0.0 {
                (cov[(i, j)] / denom).clamp(-1.0, 1.0)
            } else {
                0.0
            };
            corr[(i, j)] = value;
            corr[(j, i)] = value;
        }
    }
    corr
}

/// Mean of the strict upper triangle of a correlation matrix.
///
/// Returns `None` for matrices smaller than 2x2 (no pairs to average).
#[must_use]
pub fn average_pairwise_correlation(corr: &DMatrix<f64>) -> Option<f64> {
    let n = corr.nrows();
    if n < 2 {
        return None;
    }
    let mut sum = 0.0;
    let mut count = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            sum += corr[(i, j)];
            count += 1;
        }
    }
    Some(sum / count as f64)
}

/// Linear-interpolated percentile (inclusive method).
///
/// `p` is in percent, e.g. 5.0 for the 5th percentile.
pub fn percentile(values: &[f64], p: f64) -> MathResult<f64> {
    if values.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(MathError::invalid_input(format!(
            "percentile must be in [0, 100], got {p}"
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return Ok(sorted[lower]);
    }
    let fraction = rank - lower as f64;
    Ok(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_variance() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(mean(&xs), 2.5, epsilon = 1e-12);
        // Sample variance of 1..4 is 5/3.
        assert_relative_eq!(sample_variance(&xs), 5.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_series() {
        assert_relative_eq!(mean(&[]), 0.0);
        assert_relative_eq!(sample_variance(&[0.5]), 0.0);
        assert_relative_eq!(sample_std(&[]), 0.0);
    }

    #[test]
    fn test_covariance_identical_series() {
        let xs = [0.01, -0.02, 0.015, 0.0];
        let cov = covariance(&xs, &xs).unwrap();
        assert_relative_eq!(cov, sample_variance(&xs), epsilon = 1e-12);
    }

    #[test]
    fn test_covariance_dimension_mismatch() {
        assert!(covariance(&[1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn test_covariance_matrix_matches_pairwise() {
        let returns = DMatrix::from_row_slice(
            4,
            2,
            &[0.01, 0.02, -0.01, -0.015, 0.005, 0.01, 0.0, -0.005],
        );
        let cov = covariance_matrix(&returns);

        let col_a: Vec<f64> = returns.column(0).iter().copied().collect();
        let col_b: Vec<f64> = returns.column(1).iter().copied().collect();
        assert_relative_eq!(cov[(0, 0)], sample_variance(&col_a), epsilon = 1e-12);
        assert_relative_eq!(cov[(1, 1)], sample_variance(&col_b), epsilon = 1e-12);
        assert_relative_eq!(
            cov[(0, 1)],
            covariance(&col_a, &col_b).unwrap(),
            epsilon = 1e-12
        );
        assert_relative_eq!(cov[(0, 1)], cov[(1, 0)], epsilon = 1e-15);
    }

    #[test]
    fn test_correlation_matrix_properties() {
        let returns = DMatrix::from_row_slice(
            4,
            3,
            &[
                0.01, 0.02, 0.0, //
                -0.01, -0.02, 0.0, //
                0.005, 0.01, 0.0, //
                0.0, 0.0, 0.0,
            ],
        );
        let corr = correlation_matrix(&returns);

        // Unit diagonal, perfectly correlated pair, zero-variance column.
        assert_relative_eq!(corr[(0, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(corr[(0, 1)], 1.0, epsilon = 1e-9);
        assert_relative_eq!(corr[(0, 2)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(corr[(2, 2)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_average_pairwise_correlation() {
        let corr = DMatrix::from_row_slice(2, 2, &[1.0, 0.4, 0.4, 1.0]);
        assert_relative_eq!(
            average_pairwise_correlation(&corr).unwrap(),
            0.4,
            epsilon = 1e-12
        );

        let single = DMatrix::identity(1, 1);
        assert!(average_pairwise_correlation(&single).is_none());
    }

    #[test]
    fn test_percentile_interpolation() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile(&xs, 0.0).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(percentile(&xs, 100.0).unwrap(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(percentile(&xs, 50.0).unwrap(), 2.5, epsilon = 1e-12);
        // 5th percentile of 4 points: rank 0.15 -> 1.15
        assert_relative_eq!(percentile(&xs, 5.0).unwrap(), 1.15, epsilon = 1e-12);
    }

    #[test]
    fn test_percentile_errors() {
        assert!(percentile(&[], 50.0).is_err());
        assert!(percentile(&[1.0], 101.0).is_err());
    }
}
