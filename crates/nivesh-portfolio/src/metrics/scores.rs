//! Composite diversification and risk scores.

/// Diversification score on a 0-10 scale; higher is more diversified.
///
/// 50/50 blend of a holdings-count component that saturates around 20
/// holdings and an inverse average-pairwise-correlation component. A
/// single holding scores 0; when no correlation estimate exists for a
/// multi-holding portfolio, a neutral mid-score is returned.
#[must_use]
pub fn diversification_score(holdings_count: usize, avg_correlation: Option<f64>) -> f64 {
    if holdings_count <= 1 {
        return 0.0;
    }

    let Some(avg) = avg_correlation else {
        return 5.0;
    };
    if avg.is_nan() {
        return 5.0;
    }

    let holdings_component = (holdings_count as f64 / 20.0).min(1.0) * 5.0;
    let correlation_component = ((1.0 - avg) * 5.0).clamp(0.0, 5.0);

    holdings_component + correlation_component
}

/// Composite risk score on a 0-10 scale; higher is riskier.
///
/// Point ranges: volatility 0-3 (linear against a 30% annualized
/// reference band), beta deviation from 1.0 gives 0-2, inverted
/// diversification gives 0-3, overlap penalty gives 0-2. The sum is
/// clipped to [0, 10].
#[must_use]
pub fn risk_score(
    volatility: f64,
    beta: f64,
    diversification: f64,
    overlap_count: usize,
    total_holdings: usize,
) -> f64 {
    let volatility_component = (volatility * 10.0).min(3.0).max(0.0);
    let beta_component = ((beta - 1.0).abs() * 2.0).min(2.0);
    let diversification_component = (3.0 - diversification / 10.0 * 3.0).max(0.0);
    let overlap_component = if total_holdings > 0 {
        (overlap_count as f64 / total_holdings as f64 * 2.0).min(2.0)
    } else {
        0.0
    };

    (volatility_component + beta_component + diversification_component + overlap_component)
        .clamp(0.0, 10.0)
}
