//! # Equilibrium solver
//!
//! Finds the extents of reactions x that satisfy the equilibrium conditions
//! `A*ln(c0 + S*x) = ln K` (see `EquilibriumEquations`) with one of three methods:
//! - **BatchGradient**: gradient descent on 0.5*|r|^2 with g = J^T*r
//! - **StochasticGradient**: reactions are visited in random order, each one moves x along its own
//!   row of the Jacobian scaled by its own residual
//! - **Newton**: Newton-Raphson step J*dx = r solved by least squares (SVD), pseudo-inverse as fallback
//!
//! All methods share the backtracking line search that keeps concentrations non-negative and does
//! not let the objective grow. Non-convergence is not an error: the best point found is returned
//! and the report tells whether the tolerance was met.
use crate::Kinetics::stoichiometry_analyzer::Network;
use crate::Thermodynamics::ChemEquilibrium::EquilibriumEquations::EquilibriumEquations;
use crate::errors::ChemError;
use enum_dispatch::enum_dispatch;
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fmt;
use std::str::FromStr;

/// numerical options of the solvers
#[derive(Debug, Clone, PartialEq)]
pub struct SolverParams {
    pub max_iter: usize,
    /// initial step of the line search
    pub learning_rate: f64,
    pub tol: f64,
    /// step multiplier of the backtracking line search, 0 < beta < 1
    pub backtrack_beta: f64,
    /// floor of concentrations under the logarithm
    pub min_concentration: f64,
}

impl SolverParams {
    /// 5000 iterations, step 0.1, tol 1e-8 for the gradient methods;
    /// 200 iterations, unit step, tol 1e-10 for Newton
    pub fn default_for(method: &EquilibriumMethod) -> Self {
        match method {
            EquilibriumMethod::Newton(_) => Self {
                max_iter: 200,
                learning_rate: 1.0,
                tol: 1e-10,
                backtrack_beta: 0.5,
                min_concentration: 1e-12,
            },
            _ => Self {
                max_iter: 5000,
                learning_rate: 0.1,
                tol: 1e-8,
                backtrack_beta: 0.5,
                min_concentration: 1e-12,
            },
        }
    }
    pub fn validate(&self) -> Result<(), ChemError> {
        if self.max_iter == 0 {
            return Err(ChemError::configuration("max_iter must be positive"));
        }
        let positive = [
            ("learning_rate", self.learning_rate),
            ("tol", self.tol),
            ("min_concentration", self.min_concentration),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChemError::configuration(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(self.backtrack_beta > 0.0 && self.backtrack_beta < 1.0) {
            return Err(ChemError::configuration(format!(
                "backtrack_beta must lie in (0, 1), got {}",
                self.backtrack_beta
            )));
        }
        Ok(())
    }
}

/// how the last solve ended
#[derive(Debug, Clone, PartialEq)]
pub struct SolverReport {
    pub iterations: usize,
    pub converged: bool,
    /// |r|_2 at the returned point
    pub residual_norm: f64,
}

#[enum_dispatch]
pub trait EquilibriumAlgorithm {
    fn name(&self) -> &'static str;
    /// runs the method from x = 0; returns extents and the iteration count
    fn run(&mut self, eqs: &EquilibriumEquations, params: &SolverParams) -> (DVector<f64>, usize);
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchGradient;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StochasticGradient {
    /// seed of the permutation generator, None for a random seed
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Newton;

/// method of solving the equilibrium problem
#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch(EquilibriumAlgorithm)]
pub enum EquilibriumMethod {
    BatchGradient(BatchGradient),
    StochasticGradient(StochasticGradient),
    Newton(Newton),
}

impl EquilibriumMethod {
    pub fn batch_gradient() -> Self {
        EquilibriumMethod::BatchGradient(BatchGradient)
    }
    pub fn stochastic_gradient(seed: Option<u64>) -> Self {
        EquilibriumMethod::StochasticGradient(StochasticGradient { seed })
    }
    pub fn newton() -> Self {
        EquilibriumMethod::Newton(Newton)
    }
}

impl FromStr for EquilibriumMethod {
    type Err = ChemError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bgd" | "batch_gradient" | "batchgradient" => Ok(Self::batch_gradient()),
            "sgd" | "stochastic_gradient" | "stochasticgradient" => {
                Ok(Self::stochastic_gradient(None))
            }
            "newton" | "nr" | "newton_raphson" => Ok(Self::newton()),
            _ => Err(ChemError::configuration(format!(
                "unknown equilibrium method '{}', expected one of bgd, sgd, newton",
                s
            ))),
        }
    }
}

impl fmt::Display for EquilibriumMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn log_progress(method: &str, iter: usize, residual_norm: f64) {
    if iter % 100 == 0 {
        debug!("{}: iteration {}, |r| = {:e}", method, iter, residual_norm);
    }
}

impl EquilibriumAlgorithm for BatchGradient {
    fn name(&self) -> &'static str {
        "BatchGradient"
    }
    fn run(&mut self, eqs: &EquilibriumEquations, params: &SolverParams) -> (DVector<f64>, usize) {
        let min_c = params.min_concentration;
        let mut x = DVector::zeros(eqs.n_reactions());
        let mut iter = 0;
        while iter < params.max_iter {
            let r = eqs.residual(&x, min_c);
            log_progress(self.name(), iter, r.norm());
            if r.norm() < params.tol {
                break;
            }
            let grad = eqs.jacobian(&x, min_c).tr_mul(&r);
            if grad.norm() < params.tol {
                break;
            }
            let f_curr = 0.5 * r.norm_squared();
            iter += 1;
            match eqs.line_search(
                &x,
                &grad,
                f_curr,
                params.learning_rate,
                params.backtrack_beta,
                |x_new| eqs.objective(x_new, min_c),
            ) {
                Some(x_new) => x = x_new,
                None => break,
            }
        }
        (x, iter)
    }
}

impl EquilibriumAlgorithm for StochasticGradient {
    fn name(&self) -> &'static str {
        "StochasticGradient"
    }
    fn run(&mut self, eqs: &EquilibriumEquations, params: &SolverParams) -> (DVector<f64>, usize) {
        let min_c = params.min_concentration;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut x = DVector::zeros(eqs.n_reactions());
        let mut order: Vec<usize> = (0..eqs.n_reactions()).collect();
        let mut iter = 0;
        while iter < params.max_iter {
            iter += 1;
            order.shuffle(&mut rng);
            let mut any_update = false;
            for &i in &order {
                let r_i = eqs.residual_i(&x, i, min_c);
                if r_i.abs() < params.tol {
                    continue;
                }
                let grad_i = eqs.jacobian_row(&x, i, min_c).transpose() * r_i;
                let f_curr = 0.5 * r_i * r_i;
                if let Some(x_new) = eqs.line_search(
                    &x,
                    &grad_i,
                    f_curr,
                    params.learning_rate,
                    params.backtrack_beta,
                    |x_new| {
                        let r = eqs.residual_i(x_new, i, min_c);
                        0.5 * r * r
                    },
                ) {
                    x = x_new;
                    any_update = true;
                }
            }
            // both checks terminate the outer loop independently
            let full_norm = eqs.residual(&x, min_c).norm();
            log_progress(self.name(), iter, full_norm);
            if full_norm < params.tol {
                break;
            }
            if !any_update {
                break;
            }
        }
        (x, iter)
    }
}

/// least-squares solution of J*dx = r; pseudo-inverse if the SVD solve fails
fn least_squares(J: &DMatrix<f64>, r: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = J.clone().svd(true, true);
    let rcond = f64::EPSILON * J.nrows().max(J.ncols()) as f64 * svd.singular_values.max();
    match svd.solve(r, rcond) {
        Ok(dx) if dx.iter().all(|v| v.is_finite()) => Some(dx),
        _ => {
            warn!("least-squares solve failed, falling back to pseudo-inverse");
            J.clone().pseudo_inverse(rcond).ok().map(|pinv| pinv * r)
        }
    }
}

impl EquilibriumAlgorithm for Newton {
    fn name(&self) -> &'static str {
        "Newton"
    }
    fn run(&mut self, eqs: &EquilibriumEquations, params: &SolverParams) -> (DVector<f64>, usize) {
        let min_c = params.min_concentration;
        let mut x = DVector::zeros(eqs.n_reactions());
        let mut iter = 0;
        while iter < params.max_iter {
            let r = eqs.residual(&x, min_c);
            log_progress(self.name(), iter, r.norm());
            if r.norm() < params.tol {
                break;
            }
            let J = eqs.jacobian(&x, min_c);
            let Some(dx) = least_squares(&J, &r) else {
                warn!("Newton step could not be computed, stopping at iteration {}", iter);
                break;
            };
            if dx.norm() == 0.0 {
                break;
            }
            let f_curr = 0.5 * r.norm_squared();
            iter += 1;
            match eqs.line_search(
                &x,
                &dx,
                f_curr,
                params.learning_rate,
                params.backtrack_beta,
                |x_new| eqs.objective(x_new, min_c),
            ) {
                Some(x_new) => x = x_new,
                None => break,
            }
        }
        (x, iter)
    }
}

/// equilibrium solver bound to a snapshot of a network
#[derive(Debug, Clone)]
pub struct EquilibriumSolver {
    method: EquilibriumMethod,
    equations: Option<EquilibriumEquations>,
    /// extents of reactions found by the last solve
    x_solution: Option<DVector<f64>>,
    report: Option<SolverReport>,
}

impl EquilibriumSolver {
    pub fn new(method: EquilibriumMethod) -> Self {
        Self {
            method,
            equations: None,
            x_solution: None,
            report: None,
        }
    }
    /// takes initial concentrations, stoichiometry, phases and equilibrium constants of the network
    pub fn fit(&mut self, network: &Network) {
        self.equations = Some(EquilibriumEquations::from_network(network));
        self.x_solution = None;
        self.report = None;
    }
    pub fn is_fitted(&self) -> bool {
        self.equations.is_some()
    }
    pub fn method(&self) -> &EquilibriumMethod {
        &self.method
    }
    pub fn set_method(&mut self, method: EquilibriumMethod) {
        self.method = method;
    }
    pub fn equations(&self) -> Option<&EquilibriumEquations> {
        self.equations.as_ref()
    }
    /// extents of reactions found by the last solve
    pub fn extents(&self) -> Option<&DVector<f64>> {
        self.x_solution.as_ref()
    }
    pub fn report(&self) -> Option<&SolverReport> {
        self.report.as_ref()
    }

    /// equilibrium concentrations in species order: max(c0 + S*x, 0)
    pub fn solve(&mut self, params: &SolverParams) -> Result<Vec<f64>, ChemError> {
        params.validate()?;
        let eqs = self.equations.as_ref().ok_or_else(|| {
            ChemError::state("equilibrium solver must be fitted to a network before solving")
        })?;
        info!(
            "solving equilibrium by {}: {} reactions, {} species",
            self.method,
            eqs.n_reactions(),
            eqs.n_species()
        );
        let (x, iterations) = self.method.run(eqs, params);
        let residual_norm = eqs.residual(&x, params.min_concentration).norm();
        let converged = residual_norm < params.tol;
        if converged {
            info!(
                "{} converged in {} iterations, |r| = {:e}",
                self.method, iterations, residual_norm
            );
        } else {
            warn!(
                "{} stopped after {} iterations without reaching tol = {:e}, |r| = {:e}",
                self.method, iterations, params.tol, residual_norm
            );
        }
        let c_final = eqs.final_concentrations(&x);
        self.report = Some(SolverReport {
            iterations,
            converged,
            residual_norm,
        });
        self.x_solution = Some(x);
        Ok(c_final)
    }
}
