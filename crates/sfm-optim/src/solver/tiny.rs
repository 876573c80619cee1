//! Thin wrapper around tiny-solver for consistent option handling.

use anyhow::{anyhow, Result};
use nalgebra::DVector;
use std::collections::HashMap;
use tiny_solver::linear::sparse::LinearSolverType;
use tiny_solver::optimizer::{Optimizer, OptimizerOptions};
use tiny_solver::problem::Problem;
use tiny_solver::LevenbergMarquardtOptimizer;

/// Solver options mapped onto tiny-solver's optimizer settings.
///
/// Defaults match the refinement step this crate implements: a 200
/// iteration cap and a 1e-4 relative cost-decrease tolerance, with the
/// sparse Cholesky linear solver that suits the bipartite camera/point
/// structure.
#[derive(Clone)]
pub struct SolveOptions {
    pub max_iters: usize,
    pub verbosity: usize,
    pub linear_solver: Option<LinearSolverType>,
    pub min_abs_decrease: Option<f64>,
    pub min_rel_decrease: Option<f64>,
    pub min_error: Option<f64>,
}

// Manual impl because `LinearSolverType` does not implement `Debug`.
impl std::fmt::Debug for SolveOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let linear_solver = self.linear_solver.as_ref().map(|s| match s {
            LinearSolverType::SparseCholesky => "SparseCholesky",
            LinearSolverType::SparseQR => "SparseQR",
        });
        f.debug_struct("SolveOptions")
            .field("max_iters", &self.max_iters)
            .field("verbosity", &self.verbosity)
            .field("linear_solver", &linear_solver)
            .field("min_abs_decrease", &self.min_abs_decrease)
            .field("min_rel_decrease", &self.min_rel_decrease)
            .field("min_error", &self.min_error)
            .finish()
    }
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            max_iters: 200,
            verbosity: 0,
            linear_solver: Some(LinearSolverType::SparseCholesky),
            min_abs_decrease: None,
            min_rel_decrease: Some(1e-4),
            min_error: None,
        }
    }
}

impl SolveOptions {
    fn to_optimizer_options(&self) -> OptimizerOptions {
        let mut opts = OptimizerOptions::default();
        opts.max_iteration = self.max_iters;
        opts.verbosity_level = self.verbosity;
        if let Some(solver) = self.linear_solver.clone() {
            opts.linear_solver_type = solver;
        }
        if let Some(v) = self.min_abs_decrease {
            opts.min_abs_error_decrease_threshold = v;
        }
        if let Some(v) = self.min_rel_decrease {
            opts.min_rel_error_decrease_threshold = v;
        }
        if let Some(v) = self.min_error {
            opts.min_error_threshold = v;
        }
        opts
    }
}

/// Solve an assembled problem with the given initial values and options.
///
/// Returns `Err` only when the optimizer reports outright failure; hitting
/// the iteration cap still yields the best parameters found.
pub fn solve(
    problem: &Problem,
    initial: HashMap<String, DVector<f64>>,
    opts: &SolveOptions,
) -> Result<HashMap<String, DVector<f64>>> {
    let optimizer = LevenbergMarquardtOptimizer::default();
    let options = opts.to_optimizer_options();
    optimizer
        .optimize(problem, &initial, Some(options))
        .ok_or_else(|| anyhow!("bundle adjustment solver failed"))
}

/// Half the sum of squared residuals at the given parameter values.
pub fn evaluate_cost(problem: &Problem, params: &HashMap<String, DVector<f64>>) -> f64 {
    let param_blocks = problem.initialize_parameter_blocks(params);
    let residuals = problem.compute_residuals(&param_blocks, true);
    0.5 * residuals.as_ref().squared_norm_l2()
}
