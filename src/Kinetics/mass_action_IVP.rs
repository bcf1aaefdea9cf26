//! # Mass-action kinetics IVP
//!
//! Fixed-step explicit integration of concentrations of a reaction network under the mass-action
//! rate law. For every step of width h:
//!
//! ```text
//! rf_i = kf_i * h * PROD_j c_j^order_fwd[i,j]
//! rb_i = kb_i * h * PROD_j c_j^order_bwd[i,j]
//! dc   = N^T * (rb - rf)
//! ```
//!
//! Products are evaluated as `exp(SUM_j order * ln(c_j + eps))`. A species with zero concentration
//! and a negative exponent switches the rate term off instead of blowing it up.
//!
//! The integrator owns the network it was fitted to and updates its concentration vector in place,
//! so consecutive calls of `integrate` continue from the last state.
//!
//! ## Example
//! ```rust
//! use KiReact::Kinetics::User_reactions::{Reaction, ReactionSpecies};
//! use KiReact::Kinetics::mass_action_IVP::{KineticsIntegrator, NegativePolicy};
//! use KiReact::Kinetics::stoichiometry_analyzer::Network;
//! use KiReact::Thermodynamics::User_substances::Compound;
//! let a = ReactionSpecies::reactant(Compound::new("A").unwrap()).concentration(1.0);
//! let b = ReactionSpecies::product(Compound::new("B").unwrap());
//! let reaction = Reaction::new(vec![a], vec![b]).with_rate_constants(1.0, 1.0);
//! let network = Network::build(vec![reaction], 298.15).unwrap();
//! let mut integrator = KineticsIntegrator::new();
//! integrator.fit(network);
//! let trajectory = integrator
//!     .integrate(10.0, 1e-3, &[1.0, 5.0], NegativePolicy::ClampToZero)
//!     .unwrap();
//! assert_eq!(trajectory.checkpoints.len(), 2);
//! ```
use crate::Kinetics::stoichiometry_analyzer::Network;
use crate::errors::ChemError;
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// floor added to concentrations before taking the logarithm
pub const LOG_EPS: f64 = 1e-300;

/// what to do with a species whose concentration would become negative after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NegativePolicy {
    /// floor the new value at zero
    #[default]
    ClampToZero,
    /// keep the value from before the step
    LeaveUnchanged,
    /// accept the negative value
    AllowNegative,
}

impl FromStr for NegativePolicy {
    type Err = ChemError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .collect();
        match key.as_str() {
            "clamptozero" | "clamp" => Ok(NegativePolicy::ClampToZero),
            "leaveunchanged" | "leave" => Ok(NegativePolicy::LeaveUnchanged),
            "allownegative" | "allow" => Ok(NegativePolicy::AllowNegative),
            _ => Err(ChemError::configuration(format!(
                "unknown negative concentration policy '{}', expected one of ClampToZero, LeaveUnchanged, AllowNegative",
                s
            ))),
        }
    }
}

impl fmt::Display for NegativePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            NegativePolicy::ClampToZero => "ClampToZero",
            NegativePolicy::LeaveUnchanged => "LeaveUnchanged",
            NegativePolicy::AllowNegative => "AllowNegative",
        };
        write!(f, "{}", name)
    }
}

/// concentrations (species order) at a moment of time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub time: f64,
    pub concentrations: Vec<f64>,
}

/// result of `integrate`: requested snapshots and the state at the end of the interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub checkpoints: Vec<Checkpoint>,
    pub final_state: Checkpoint,
}

impl Trajectory {
    /// checkpoints followed by the final state
    pub fn all(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter().chain(std::iter::once(&self.final_state))
    }
}

/// rates of one direction: k_i * h * PROD_j c_j^order[i,j]
pub fn mass_action_rates(
    order: &DMatrix<f64>,
    k: impl Iterator<Item = f64>,
    c: &DVector<f64>,
    h: f64,
) -> DVector<f64> {
    let log_c = c.map(|cj| (cj.max(0.0) + LOG_EPS).ln());
    let rates: Vec<f64> = k
        .enumerate()
        .map(|(i, k_i)| {
            if k_i == 0.0 {
                return 0.0;
            }
            let row = order.row(i);
            // zero concentration under a negative exponent switches the term off
            if row
                .iter()
                .zip(c.iter())
                .any(|(o, cj)| *o < 0.0 && *cj <= 0.0)
            {
                return 0.0;
            }
            let log_prod: f64 = row.iter().zip(log_c.iter()).map(|(o, l)| o * l).sum();
            k_i * h * log_prod.exp()
        })
        .collect();
    DVector::from_vec(rates)
}

/// change of concentrations over one step of width h: N^T * (rb - rf)
pub fn concentration_change(network: &Network, h: f64) -> DVector<f64> {
    let c = network.concentrations();
    let rf = mass_action_rates(
        network.order_fwd(),
        network.rate_constants().iter().map(|(kf, _)| *kf),
        c,
        h,
    );
    let rb = mass_action_rates(
        network.order_bwd(),
        network.rate_constants().iter().map(|(_, kb)| *kb),
        c,
        h,
    );
    let rate = rb - rf;
    network.stoich_matrix().tr_mul(&rate)
}

/// advances the concentrations of the network by one step; returns the number of species the
/// policy had to correct
fn step(network: &mut Network, h: f64, policy: NegativePolicy) -> usize {
    let delta = concentration_change(network, h);
    let c = network.concentrations_mut();
    let mut corrected = 0;
    for (cj, dj) in c.iter_mut().zip(delta.iter()) {
        let new = *cj + dj;
        if new < 0.0 {
            match policy {
                NegativePolicy::ClampToZero => {
                    *cj = 0.0;
                    corrected += 1;
                }
                NegativePolicy::LeaveUnchanged => corrected += 1,
                NegativePolicy::AllowNegative => *cj = new,
            }
        } else {
            *cj = new;
        }
    }
    corrected
}

fn check_step_size(step_size: f64) -> Result<(), ChemError> {
    if !step_size.is_finite() || step_size <= 0.0 {
        return Err(ChemError::configuration(format!(
            "step size must be positive, got {}",
            step_size
        )));
    }
    Ok(())
}

/// number of steps of width h needed to cover the duration; the last one may be shorter
fn number_of_steps(duration: f64, h: f64) -> usize {
    if duration == 0.0 {
        return 0;
    }
    let ratio = duration / h;
    (ratio - 1e-9 * ratio.max(1.0)).ceil().max(1.0) as usize
}

/// index of the step whose interval [k*h, (k + 1)*h) contains t, with the same relative tolerance
/// as `number_of_steps` so that t = k*h lands in step k whatever the rounding of k*h
fn checkpoint_step(t: f64, h: f64) -> usize {
    let ratio = t / h;
    (ratio + 1e-9 * ratio.max(1.0)).floor() as usize
}

/// stateful fixed-step integrator of mass-action kinetics
#[derive(Debug, Clone, Default)]
pub struct KineticsIntegrator {
    network: Option<Network>,
    /// total integrated time since fit
    elapsed: f64,
}

impl KineticsIntegrator {
    pub fn new() -> Self {
        Self::default()
    }
    /// binds the integrator to the network; integration starts from its current concentrations
    pub fn fit(&mut self, network: Network) {
        info!(
            "kinetics integrator fitted: {} reactions, {} species",
            network.n_reactions(),
            network.n_species()
        );
        self.network = Some(network);
        self.elapsed = 0.0;
    }
    pub fn is_fitted(&self) -> bool {
        self.network.is_some()
    }
    pub fn network(&self) -> Option<&Network> {
        self.network.as_ref()
    }
    pub fn network_mut(&mut self) -> Option<&mut Network> {
        self.network.as_mut()
    }
    pub fn into_network(self) -> Option<Network> {
        self.network
    }
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Integrates over `duration` with steps of `step_size`.
    /// A checkpoint t* is recorded after step k + 1, k = floor(t*/h) up to a relative tolerance of
    /// 1e-9, i.e. after the step whose interval [k*h, (k + 1)*h) contains it. Times are counted
    /// from the start of this call; times outside [0, duration) give no snapshot. The final state
    /// is stamped with `duration`.
    pub fn integrate(
        &mut self,
        duration: f64,
        step_size: f64,
        checkpoint_times: &[f64],
        negative_policy: NegativePolicy,
    ) -> Result<Trajectory, ChemError> {
        check_step_size(step_size)?;
        if !duration.is_finite() || duration < 0.0 {
            return Err(ChemError::configuration(format!(
                "duration must be non-negative, got {}",
                duration
            )));
        }
        let network = self.network.as_mut().ok_or_else(|| {
            ChemError::state("integrator must be fitted to a network before integration")
        })?;
        let n_steps = number_of_steps(duration, step_size);
        let mut times: Vec<f64> = checkpoint_times
            .iter()
            .copied()
            .filter(|t| *t >= 0.0 && *t < duration)
            .collect();
        times.sort_by(|a, b| a.total_cmp(b));
        // (step after which the snapshot is taken, time)
        let pending: Vec<(usize, f64)> = times
            .iter()
            .map(|t| (checkpoint_step(*t, step_size).min(n_steps.saturating_sub(1)), *t))
            .collect();

        info!(
            "integrating {} steps of {} up to t = {} ({})",
            n_steps, step_size, duration, negative_policy
        );
        let mut checkpoints = Vec::with_capacity(pending.len());
        let mut next = 0;
        let mut warned = false;
        for i in 0..n_steps {
            let t_start = i as f64 * step_size;
            let t_end = if i + 1 == n_steps {
                duration
            } else {
                (i + 1) as f64 * step_size
            };
            let corrected = step(network, t_end - t_start, negative_policy);
            if corrected > 0 && !warned {
                warn!(
                    "{} species would become negative at t = {}, applying {}",
                    corrected, t_end, negative_policy
                );
                warned = true;
            }
            while next < pending.len() && pending[next].0 <= i {
                let time = pending[next].1;
                debug!("checkpoint t = {}", time);
                checkpoints.push(Checkpoint {
                    time,
                    concentrations: network.concentrations().iter().copied().collect(),
                });
                next += 1;
            }
        }
        self.elapsed += duration;
        let final_state = Checkpoint {
            time: duration,
            concentrations: network.concentrations().iter().copied().collect(),
        };
        info!(
            "integration finished, {} checkpoints recorded, total elapsed {}",
            checkpoints.len(),
            self.elapsed
        );
        Ok(Trajectory {
            checkpoints,
            final_state,
        })
    }

    /// Lazy trajectory: every call of `next` performs one step and yields the new state.
    /// The iterator never ends on its own, bound it with `take` or `take_while`.
    pub fn trajectory(
        &mut self,
        step_size: f64,
        negative_policy: NegativePolicy,
    ) -> Result<TrajectoryIter<'_>, ChemError> {
        check_step_size(step_size)?;
        let network = self.network.as_mut().ok_or_else(|| {
            ChemError::state("integrator must be fitted to a network before integration")
        })?;
        Ok(TrajectoryIter {
            network,
            elapsed: &mut self.elapsed,
            step_size,
            negative_policy,
            steps: 0,
        })
    }
}

/// iterator over the states of the network after each step
pub struct TrajectoryIter<'a> {
    network: &'a mut Network,
    elapsed: &'a mut f64,
    step_size: f64,
    negative_policy: NegativePolicy,
    steps: usize,
}

impl Iterator for TrajectoryIter<'_> {
    type Item = Checkpoint;
    fn next(&mut self) -> Option<Checkpoint> {
        step(&mut *self.network, self.step_size, self.negative_policy);
        self.steps += 1;
        *self.elapsed += self.step_size;
        Some(Checkpoint {
            time: self.steps as f64 * self.step_size,
            concentrations: self.network.concentrations().iter().copied().collect(),
        })
    }
}
