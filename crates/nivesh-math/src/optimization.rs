//! Constrained optimization on the probability simplex.
//!
//! Portfolio weight vectors live on the simplex {w : Σw = 1, w ≥ 0}
//! (fully invested, long-only). This module provides a projected-gradient
//! minimizer with numerical gradients and backtracking line search, plus a
//! quadratic-penalty variant for an additional equality constraint (used
//! for target-return points on the efficient frontier).

use crate::error::{MathError, MathResult};

/// Feasibility tolerance for penalized equality constraints.
const FEASIBILITY_TOL: f64 = 1e-4;

/// Configuration for simplex-constrained optimization.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Tolerance on the projected-gradient residual for convergence.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
    /// Step size for numerical gradients.
    pub gradient_step: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 500,
            gradient_step: 1e-7,
        }
    }
}

impl SolverConfig {
    /// Creates a config with the given iteration budget.
    #[must_use]
    pub fn with_max_iterations(mut self, iterations: u32) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Result of a simplex-constrained solve.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Final point on the simplex.
    pub weights: Vec<f64>,
    /// Objective value at the final point.
    pub objective_value: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Whether the optimization converged.
    pub converged: bool,
}

/// Euclidean projection onto the probability simplex.
///
/// Returns the closest point (in L2) with non-negative entries summing
/// to one. An empty input projects to an empty vector.
#[must_use]
pub fn project_to_simplex(v: &[f64]) -> Vec<f64> {
    let n = v.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }

    // Sort descending, then find the largest prefix whose shifted values
    // stay positive.
    let mut sorted = v.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let mut cumulative = 0.0;
    let mut theta = 0.0;
    for (i, &value) in sorted.iter().enumerate() {
        cumulative += value;
        let candidate = (cumulative - 1.0) / (i + 1) as f64;
        if value - candidate > 0.0 {
            theta = candidate;
        }
    }

    v.iter().map(|&x| (x - theta).max(0.0)).collect()
}

/// Minimizes `f` over the probability simplex via projected gradient
/// descent with backtracking line search.
///
/// The initial point is projected onto the simplex before iterating, so
/// any finite starting vector is accepted. A one-dimensional problem is
/// trivially solved at w = [1].
pub fn minimize_on_simplex<F>(
    f: F,
    initial: &[f64],
    config: &SolverConfig,
) -> MathResult<SolveOutcome>
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return Err(MathError::invalid_input("empty weight vector"));
    }
    if initial.iter().any(|x| !x.is_finite()) {
        return Err(MathError::invalid_input("non-finite starting point"));
    }

    let mut w = project_to_simplex(initial);
    let mut value = f(&w);

    if n == 1 {
        return Ok(SolveOutcome {
            weights: w,
            objective_value: value,
            iterations: 0,
            converged: true,
        });
    }

    for iteration in 0..config.max_iterations {
        let gradient = numerical_gradient(&f, &w, config.gradient_step);

        // Residual of the fixed-point condition w = P(w - grad).
        let unit_step = projected_step(&w, &gradient, 1.0);
        let residual = w
            .iter()
            .zip(unit_step.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0_f64, f64::max);
        if residual < config.tolerance {
            return Ok(SolveOutcome {
                weights: w,
                objective_value: value,
                iterations: iteration,
                converged: true,
            });
        }

        // Backtracking along the projected arc (Armijo condition).
        let mut step = 1.0;
        let mut advanced = false;
        while step >= 1e-14 {
            let candidate = projected_step(&w, &gradient, step);
            let candidate_value = f(&candidate);
            let decrease: f64 = gradient
                .iter()
                .zip(w.iter().zip(candidate.iter()))
                .map(|(g, (a, b))| g * (a - b))
                .sum();

            if candidate_value < value - 1e-4 * decrease.max(0.0) {
                w = candidate;
                value = candidate_value;
                advanced = true;
                break;
            }
            step *= 0.5;
        }

        if !advanced {
            // No descent direction left; a small residual means we sit at
            // a stationary point of the constrained problem.
            let converged = residual < config.tolerance.sqrt();
            if !converged {
                log::debug!(
                    "projected gradient stalled at iteration {iteration} (residual {residual:.2e})"
                );
            }
            return Ok(SolveOutcome {
                weights: w,
                objective_value: value,
                iterations: iteration,
                converged,
            });
        }
    }

    Ok(SolveOutcome {
        weights: w,
        objective_value: value,
        iterations: config.max_iterations,
        converged: false,
    })
}

/// Minimizes `f` on the simplex subject to an equality constraint
/// `g(w) = 0`, via escalating quadratic penalties.
///
/// Used for target-return frontier points, where `g` is linear. The
/// outcome reports `converged = false` when the final point violates the
/// constraint beyond tolerance (an infeasible target).
pub fn minimize_on_simplex_penalized<F, G>(
    f: F,
    g: G,
    initial: &[f64],
    config: &SolverConfig,
) -> MathResult<SolveOutcome>
where
    F: Fn(&[f64]) -> f64,
    G: Fn(&[f64]) -> f64,
{
    let mut start = initial.to_vec();
    let mut outcome = None;

    for &penalty in &[1e2, 1e4, 1e6] {
        let objective = |w: &[f64]| {
            let violation = g(w);
            f(w) + penalty * violation * violation
        };
        let solved = minimize_on_simplex(objective, &start, config)?;
        start.clone_from(&solved.weights);
        outcome = Some(solved);
    }

    // Penalty rounds are fixed, so an outcome always exists here.
    let mut outcome = outcome.ok_or_else(|| MathError::invalid_input("no penalty rounds"))?;
    let violation = g(&outcome.weights).abs();
    if violation > FEASIBILITY_TOL {
        outcome.converged = false;
    }
    outcome.objective_value = f(&outcome.weights);
    Ok(outcome)
}

/// One projected gradient step: P(w - step * gradient).
fn projected_step(w: &[f64], gradient: &[f64], step: f64) -> Vec<f64> {
    let moved: Vec<f64> = w
        .iter()
        .zip(gradient.iter())
        .map(|(x, g)| x - step * g)
        .collect();
    project_to_simplex(&moved)
}

/// Central-difference numerical gradient.
fn numerical_gradient<F>(f: &F, w: &[f64], step: f64) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let n = w.len();
    let mut gradient = vec![0.0; n];
    let mut plus = w.to_vec();
    let mut minus = w.to_vec();
    for i in 0..n {
        plus[i] += step;
        minus[i] -= step;
        gradient[i] = (f(&plus) - f(&minus)) / (2.0 * step);
        plus[i] = w[i];
        minus[i] = w[i];
    }
    gradient
}
