//! Equilibrium conditions in the space of reaction extents.
//!
//! With the stoichiometric matrix N (reactions x species, reactants positive) and S = N^T the
//! concentrations are an affine function of the extents x of the reactions:
//!
//! ```text
//! c(x) = c0 + S*x
//! ```
//!
//! The mass-action exponents are A = -N (products positive, reactants negative) with the columns of
//! condensed species (solid or liquid at the network temperature) zeroed, so that they do not take
//! part in the equilibrium expression. The residual of the equilibrium conditions is
//!
//! ```text
//! r(x) = A*ln(max(c(x), c_min)) - ln(max(K, 1e-300))
//! J(x) = A*diag(1/c_safe)*S
//! ```
//!
//! and all methods minimize f(x) = 0.5*|r(x)|^2 (or its single-reaction part).
use crate::Kinetics::stoichiometry_analyzer::Network;
use log::info;
use nalgebra::{DMatrix, DVector, RowDVector};

/// floor of the equilibrium constant before taking the logarithm
pub const K_FLOOR: f64 = 1e-300;
/// slightly negative concentrations produced by round-off are still feasible
pub const FEASIBILITY_TOL: f64 = 1e-15;
/// below this step the line search accepts any feasible point
pub const STEP_FLOOR: f64 = 1e-12;
/// the line search gives up below this step
pub const STEP_UNDERFLOW: f64 = 1e-300;

#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct EquilibriumEquations {
    /// initial concentrations
    pub c0: DVector<f64>,
    /// transposed stoichiometric matrix, species x reactions
    pub S: DMatrix<f64>,
    /// mass-action exponents, reactions x species
    pub A: DMatrix<f64>,
    /// logarithms of equilibrium constants
    pub lnK: DVector<f64>,
    /// species excluded from the equilibrium expression
    pub excluded: Vec<bool>,
}

#[allow(non_snake_case)]
impl EquilibriumEquations {
    pub fn from_network(network: &Network) -> Self {
        let N = network.stoich_matrix();
        let S = N.transpose();
        let mut A = -N.clone();
        let excluded: Vec<bool> = network
            .phases()
            .iter()
            .map(|p| p.map(|p| p.is_condensed()).unwrap_or(false))
            .collect();
        for (j, skip) in excluded.iter().enumerate() {
            if *skip {
                A.column_mut(j).fill(0.0);
                info!(
                    "species '{}' is condensed at T = {} K and is excluded from the equilibrium expression",
                    network.species()[j],
                    network.temperature()
                );
            }
        }
        let lnK = network.equilibrium_constants().map(|k| k.max(K_FLOOR).ln());
        Self {
            c0: network.concentrations().clone(),
            S,
            A,
            lnK,
            excluded,
        }
    }
    pub fn n_reactions(&self) -> usize {
        self.A.nrows()
    }
    pub fn n_species(&self) -> usize {
        self.A.ncols()
    }
    /// c(x) = c0 + S*x
    pub fn concentrations(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.c0 + &self.S * x
    }
    fn safe_concentrations(&self, x: &DVector<f64>, min_concentration: f64) -> DVector<f64> {
        self.concentrations(x).map(|c| c.max(min_concentration))
    }
    /// r(x) = A*ln(c_safe) - lnK
    pub fn residual(&self, x: &DVector<f64>, min_concentration: f64) -> DVector<f64> {
        let ln_c = self.safe_concentrations(x, min_concentration).map(f64::ln);
        &self.A * ln_c - &self.lnK
    }
    /// residual of a single reaction
    pub fn residual_i(&self, x: &DVector<f64>, i: usize, min_concentration: f64) -> f64 {
        let ln_c = self.safe_concentrations(x, min_concentration).map(f64::ln);
        self.A.row(i).iter().zip(ln_c.iter()).map(|(a, l)| a * l).sum::<f64>() - self.lnK[i]
    }
    /// J = A*diag(1/c_safe)*S, reactions x reactions
    pub fn jacobian(&self, x: &DVector<f64>, min_concentration: f64) -> DMatrix<f64> {
        let inv_c = self.safe_concentrations(x, min_concentration).map(|c| 1.0 / c);
        let mut scaled = self.S.clone();
        for (j, mut row) in scaled.row_iter_mut().enumerate() {
            row *= inv_c[j];
        }
        &self.A * scaled
    }
    /// i-th row of the Jacobian
    pub fn jacobian_row(&self, x: &DVector<f64>, i: usize, min_concentration: f64) -> RowDVector<f64> {
        let inv_c = self.safe_concentrations(x, min_concentration).map(|c| 1.0 / c);
        let weighted = self.A.row(i).component_mul(&inv_c.transpose());
        weighted * &self.S
    }
    /// 0.5*|r(x)|^2
    pub fn objective(&self, x: &DVector<f64>, min_concentration: f64) -> f64 {
        0.5 * self.residual(x, min_concentration).norm_squared()
    }
    /// all concentrations of c(x) are non-negative up to round-off
    pub fn is_feasible(&self, x: &DVector<f64>) -> bool {
        self.concentrations(x).iter().all(|c| *c >= -FEASIBILITY_TOL)
    }

    /// Backtracking line search along -direction starting from `learning_rate`.
    /// A point is accepted when it is feasible and does not increase the objective, or when it is
    /// feasible and the step has shrunk below STEP_FLOOR. Returns None if no feasible point was
    /// found before the step underflowed.
    pub fn line_search<F>(
        &self,
        x: &DVector<f64>,
        direction: &DVector<f64>,
        f_curr: f64,
        learning_rate: f64,
        backtrack_beta: f64,
        objective: F,
    ) -> Option<DVector<f64>>
    where
        F: Fn(&DVector<f64>) -> f64,
    {
        let mut step = learning_rate;
        while step > STEP_UNDERFLOW {
            let x_new = x - direction * step;
            if self.is_feasible(&x_new) {
                let f_new = objective(&x_new);
                if f_new <= f_curr || step < STEP_FLOOR {
                    return Some(x_new);
                }
            }
            step *= backtrack_beta;
        }
        None
    }

    /// max(c0 + S*x, 0) in species order
    pub fn final_concentrations(&self, x: &DVector<f64>) -> Vec<f64> {
        self.concentrations(x).iter().map(|c| c.max(0.0)).collect()
    }
}
