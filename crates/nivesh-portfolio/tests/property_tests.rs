//! Property-based tests for engine invariants.
//!
//! These tests verify key mathematical properties that should always
//! hold, over families of deterministic seeded inputs:
//! - Optimizer weights live on the simplex
//! - CVaR loss magnitude >= VaR loss magnitude
//! - Risk contributions sum to total volatility
//! - HHI bounds and overlap exactness
//! - Trade materiality and ordering
//! - Identity scenarios preserve value

use chrono::NaiveDate;
use nivesh_portfolio::prelude::*;
use nivesh_portfolio::{concentration, Objective, Trade};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use std::collections::HashMap;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

/// Simple deterministic hash for test data generation.
fn simple_hash(seed: u64, i: u64) -> u64 {
    let mut x = seed.wrapping_add(i).wrapping_mul(0x517cc1b727220a95);
    x ^= x >> 32;
    x = x.wrapping_mul(0x517cc1b727220a95);
    x ^= x >> 32;
    x
}

fn symbol_name(index: usize) -> String {
    format!("SYM{index:02}")
}

/// Generates an aligned market with `n_symbols` synthetic price paths.
fn generate_market(seed: u64, n_symbols: usize, days: usize) -> MarketData {
    let start = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
    let dates: Vec<NaiveDate> = (0..days)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect();

    let mut series = Vec::new();
    let mut current = HashMap::new();
    for index in 0..n_symbols {
        let mut price = 100.0 + index as f64 * 40.0;
        let mut closes = Vec::with_capacity(days);
        for day in 0..days {
            let hash = simple_hash(seed.wrapping_add(index as u64 * 7919), day as u64);
            let step = ((hash % 2001) as f64 - 1000.0) / 1000.0;
            let drift = 0.0002 + index as f64 * 0.0001;
            let volatility = 0.004 + index as f64 * 0.0015;
            price *= 1.0 + drift + volatility * step;
            closes.push(price);
        }
        current.insert(
            symbol_name(index),
            Decimal::from_f64_retain(*closes.last().unwrap()).unwrap(),
        );
        series.push(PriceSeries::from_closes(symbol_name(index), &dates, &closes).unwrap());
    }

    let mut benchmark_closes = Vec::with_capacity(days);
    let mut level = 20000.0;
    for day in 0..days {
        let hash = simple_hash(seed.wrapping_add(424_242), day as u64);
        let step = ((hash % 2001) as f64 - 1000.0) / 1000.0;
        level *= 1.0 + 0.0002 + 0.005 * step;
        benchmark_closes.push(level);
    }
    let benchmark = PriceSeries::from_closes("BENCH", &dates, &benchmark_closes).unwrap();

    MarketData::align(series, &benchmark, current).unwrap()
}

/// Generates a two-member family over the first `n_symbols` symbols,
/// with the even-indexed symbols held by both members.
fn generate_family(seed: u64, n_symbols: usize) -> FamilyPortfolioInput {
    let mut first = Vec::new();
    let mut second = Vec::new();
    for index in 0..n_symbols {
        let quantity =
            Decimal::from(10 + (simple_hash(seed, index as u64) % 90) as i64);
        first.push(HoldingInput::new(symbol_name(index), quantity));
        if index % 2 == 0 {
            second.push(HoldingInput::new(symbol_name(index), quantity * dec!(2)));
        }
    }
    if second.is_empty() {
        second.push(HoldingInput::new(symbol_name(0), dec!(5)));
    }
    FamilyPortfolioInput::new(
        "property@example.com",
        vec![
            InvestorInput::new("M1", "Member One", first),
            InvestorInput::new("M2", "Member Two", second),
        ],
    )
}

fn assert_on_simplex(weights: &[f64]) {
    let sum: f64 = weights.iter().sum();
    assert!((sum - 1.0).abs() < 1e-6, "weights sum to {sum}");
    assert!(
        weights.iter().all(|&w| w >= -1e-9),
        "negative weight in {weights:?}"
    );
}

// =============================================================================
// PROPERTY: OPTIMIZER WEIGHTS LIVE ON THE SIMPLEX
// =============================================================================

#[test]
fn property_optimizer_weights_on_simplex() {
    let config = AnalysisConfig::default();

    for seed in 0..5u64 {
        for n_symbols in [2usize, 4, 6] {
            let market = generate_market(seed, n_symbols, 90);
            let family = generate_family(seed, n_symbols);
            let analysis = analyze(&family, &market, &config).unwrap();

            for objective in [
                Objective::EqualWeight,
                Objective::MinVolatility,
                Objective::MaxSharpe,
            ] {
                match analysis.optimize(objective, &config) {
                    Ok(result) => {
                        assert_on_simplex(&result.optimized_weights);
                        assert_on_simplex(&result.current_weights);
                    }
                    Err(AnalysisError::OptimizationFailed { last_weights, .. }) => {
                        // A typed failure still carries the last attempt.
                        assert_eq!(last_weights.len(), n_symbols);
                    }
                    Err(other) => unreachable!("seed {seed}: unexpected error {other}"),
                }
            }
        }
    }
}

// =============================================================================
// PROPERTY: CVAR LOSS >= VAR LOSS
// =============================================================================

#[test]
fn property_cvar_dominates_var() {
    let config = AnalysisConfig::default();

    for seed in 0..8u64 {
        let market = generate_market(seed, 5, 100);
        let family = generate_family(seed, 5);
        let analysis = analyze(&family, &market, &config).unwrap();
        let report = analysis.risk_report(&config).unwrap();

        let var = report.var.expect("history long enough for VaR");
        let cvar = report.cvar.expect("history long enough for CVaR");
        assert!(
            cvar.daily <= var.daily,
            "seed {seed}: CVaR {} vs VaR {}",
            cvar.daily,
            var.daily
        );
        assert!(cvar.value_loss >= var.value_loss);
    }
}

// =============================================================================
// PROPERTY: RISK CONTRIBUTIONS SUM TO TOTAL VOLATILITY
// =============================================================================

#[test]
fn property_contributions_sum_to_volatility() {
    let config = AnalysisConfig::default();

    for seed in 0..8u64 {
        for n_symbols in [2usize, 5, 8] {
            let market = generate_market(seed, n_symbols, 80);
            let family = generate_family(seed, n_symbols);
            let analysis = analyze(&family, &market, &config).unwrap();
            let report = analysis.risk_report(&config).unwrap();

            let sum: f64 = report.contributions.iter().map(|c| c.contribution).sum();
            let tolerance = 1e-6 * report.portfolio_volatility.max(1e-12);
            assert!(
                (sum - report.portfolio_volatility).abs() <= tolerance,
                "seed {seed} n {n_symbols}: contributions {sum} vs volatility {}",
                report.portfolio_volatility
            );
        }
    }
}

// =============================================================================
// PROPERTY: HHI BOUNDS
// =============================================================================

#[test]
fn property_hhi_bounds() {
    // Equal weights: HHI = 1/n, inside (1/(n+1), 1].
    for n in [1usize, 2, 3, 7, 15, 40] {
        let weights = vec![1.0 / n as f64; n];
        let c = concentration(&weights);
        assert!(c.hhi <= 1.0 + 1e-12);
        assert!(c.hhi > 1.0 / (n as f64 + 1.0));
        assert!((c.effective_holdings - n as f64).abs() < 1e-9);
    }

    // Single holding: HHI exactly 1.
    let single = concentration(&[1.0]);
    assert!((single.hhi - 1.0).abs() < 1e-12);
}

// =============================================================================
// PROPERTY: OVERLAP EXACTNESS
// =============================================================================

#[test]
fn property_overlaps_exact() {
    for seed in 0..10u64 {
        let n_symbols = 3 + (seed as usize % 5);
        let family = aggregate(&generate_family(seed, n_symbols)).unwrap();

        for overlap in &family.overlaps {
            // Every overlap really has two or more distinct owners.
            assert!(overlap.owners.len() >= 2);
            let mut ids: Vec<&str> =
                overlap.owners.iter().map(|o| o.investor_id.as_str()).collect();
            ids.dedup();
            assert_eq!(ids.len(), overlap.owners.len());
        }

        // Even-indexed symbols are held by both members, odd by one.
        for index in 0..n_symbols {
            let symbol = symbol_name(index);
            if index % 2 == 0 {
                assert!(family.is_overlap(&symbol), "seed {seed}: {symbol}");
            } else {
                assert!(!family.is_overlap(&symbol), "seed {seed}: {symbol}");
            }
        }

        // Overlaps are sorted by symbol.
        for pair in family.overlaps.windows(2) {
            assert!(pair[0].symbol < pair[1].symbol);
        }
    }
}

// =============================================================================
// PROPERTY: TRADES ARE MATERIAL AND ORDERED
// =============================================================================

#[test]
fn property_trades_material_and_ordered() {
    let config = AnalysisConfig::default();

    for seed in 0..6u64 {
        let market = generate_market(seed, 5, 90);
        let family = generate_family(seed, 5);
        let analysis = analyze(&family, &market, &config).unwrap();
        let result = analysis.optimize(Objective::EqualWeight, &config).unwrap();

        let total = analysis.valuation.total_value.to_f64().unwrap();
        let threshold = config.materiality_threshold * total;
        let trades: &[Trade] = &result.trades;

        for trade in trades {
            assert!(
                trade.value_delta.abs().to_f64().unwrap() >= threshold,
                "seed {seed}: immaterial trade {trade:?}"
            );
        }
        for pair in trades.windows(2) {
            assert!(pair[0].value_delta.abs() >= pair[1].value_delta.abs());
        }
    }
}

// =============================================================================
// PROPERTY: IDENTITY SCENARIO PRESERVES VALUE
// =============================================================================

#[test]
fn property_identity_scenario_preserves_value() {
    let config = AnalysisConfig::default();

    for seed in 0..6u64 {
        let market = generate_market(seed, 4, 60);
        let family = generate_family(seed, 4);
        let analysis = analyze(&family, &market, &config).unwrap();

        let results = analysis.simulate_scenarios(&[Scenario::new("Identity")]);
        assert_eq!(results[0].projected_value, analysis.valuation.total_value);
        assert_eq!(results[0].value_change, Decimal::ZERO);
    }
}

// =============================================================================
// PROPERTY: EQUAL WEIGHT IS BIT-IDENTICAL ACROSS CALLS
// =============================================================================

#[test]
fn property_equal_weight_idempotent() {
    let config = AnalysisConfig::default();

    for seed in 0..4u64 {
        let market = generate_market(seed, 6, 60);
        let family = generate_family(seed, 6);
        let analysis = analyze(&family, &market, &config).unwrap();

        let runs: Vec<Vec<f64>> = (0..3)
            .map(|_| {
                analysis
                    .optimize(Objective::EqualWeight, &config)
                    .unwrap()
                    .optimized_weights
            })
            .collect();
        assert_eq!(runs[0], runs[1]);
        assert_eq!(runs[1], runs[2]);
    }
}
