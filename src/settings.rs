//! # Settings Module
//!
//! ## Purpose
//! Serializable description of a simulation task: compounds with phase data, reactions, the
//! temperature of the network and the options of the kinetics integrator and of the equilibrium
//! solver. Task files are plain JSON (see `Utils::load_from_file`).
//!
//! ## Task Format
//! ```json
//! {
//!   "temperature": 298.15,
//!   "compounds": [ { "formula": "H2O", "melting_point": 273.15, "boiling_point": 373.15 } ],
//!   "reactions": [
//!     { "reactants": [ { "formula": "A", "concentration": 1.0 } ],
//!       "products":  [ { "formula": "B" } ],
//!       "kf": 1.0, "kb": 1.0 }
//!   ],
//!   "kinetics": { "duration": 10.0, "step_size": 0.001, "checkpoint_times": [1.0, 5.0],
//!                 "negative_policy": "ClampToZero" },
//!   "equilibrium": { "method": "newton" }
//! }
//! ```
//!
//! Enumerated options (`negative_policy`, `method`) are kept as strings and parsed when the task is
//! run, so an unknown name surfaces as a configuration error of that run.
use crate::Kinetics::User_reactions::{Reaction, ReactionSpecies};
use crate::Kinetics::mass_action_IVP::NegativePolicy;
use crate::Kinetics::stoichiometry_analyzer::Network;
use crate::Thermodynamics::ChemEquilibrium::EquilibriumSolver::{EquilibriumMethod, SolverParams};
use crate::Thermodynamics::User_substances::{Compound, Phases};
use crate::errors::ChemError;
use serde::{Deserialize, Serialize};

fn default_temperature() -> f64 {
    298.15
}
fn default_one() -> f64 {
    1.0
}
fn default_step_size() -> f64 {
    1e-3
}
fn default_policy() -> String {
    NegativePolicy::ClampToZero.to_string()
}
fn default_method() -> String {
    "bgd".to_string()
}

/// compound with phase data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompoundInput {
    pub formula: String,
    #[serde(default)]
    pub melting_point: Option<f64>,
    #[serde(default)]
    pub boiling_point: Option<f64>,
    /// (temperature, phase) observations
    #[serde(default)]
    pub phases: Vec<(f64, Phases)>,
}

impl CompoundInput {
    pub fn to_compound(&self) -> Result<Compound, ChemError> {
        let mut compound = Compound::from_tagged(&self.formula)?
            .with_transition_points(self.melting_point, self.boiling_point);
        for (t, phase) in &self.phases {
            compound = compound.with_observation(*t, *phase);
        }
        Ok(compound)
    }
}

/// one species of a reaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeciesInput {
    pub formula: String,
    #[serde(default = "default_one")]
    pub coefficient: f64,
    #[serde(default = "default_one")]
    pub order: f64,
    #[serde(default)]
    pub concentration: f64,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReactionInput {
    #[serde(default)]
    pub reactants: Vec<SpeciesInput>,
    #[serde(default)]
    pub products: Vec<SpeciesInput>,
    #[serde(default)]
    pub kf: f64,
    #[serde(default)]
    pub kb: f64,
    /// equilibrium constant; kf/kb when omitted and kb > 0, otherwise 1
    #[serde(default)]
    pub K: Option<f64>,
    /// reaction temperature; the task temperature when omitted
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// options of the kinetics integrator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntegratorSettings {
    pub duration: f64,
    #[serde(default = "default_step_size")]
    pub step_size: f64,
    #[serde(default)]
    pub checkpoint_times: Vec<f64>,
    #[serde(default = "default_policy")]
    pub negative_policy: String,
}

impl IntegratorSettings {
    pub fn policy(&self) -> Result<NegativePolicy, ChemError> {
        self.negative_policy.parse()
    }
}

/// options of the equilibrium solver; omitted numbers take the defaults of the method
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverSettings {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub max_iter: Option<usize>,
    #[serde(default)]
    pub learning_rate: Option<f64>,
    #[serde(default)]
    pub tol: Option<f64>,
    #[serde(default)]
    pub backtrack_beta: Option<f64>,
    #[serde(default)]
    pub min_concentration: Option<f64>,
    /// seed of the stochastic gradient permutations
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            method: default_method(),
            max_iter: None,
            learning_rate: None,
            tol: None,
            backtrack_beta: None,
            min_concentration: None,
            seed: None,
        }
    }
}

impl SolverSettings {
    pub fn method(&self) -> Result<EquilibriumMethod, ChemError> {
        let method: EquilibriumMethod = self.method.parse()?;
        Ok(match method {
            EquilibriumMethod::StochasticGradient(_) => {
                EquilibriumMethod::stochastic_gradient(self.seed)
            }
            other => other,
        })
    }
    pub fn params(&self, method: &EquilibriumMethod) -> SolverParams {
        let defaults = SolverParams::default_for(method);
        SolverParams {
            max_iter: self.max_iter.unwrap_or(defaults.max_iter),
            learning_rate: self.learning_rate.unwrap_or(defaults.learning_rate),
            tol: self.tol.unwrap_or(defaults.tol),
            backtrack_beta: self.backtrack_beta.unwrap_or(defaults.backtrack_beta),
            min_concentration: self.min_concentration.unwrap_or(defaults.min_concentration),
        }
    }
}

/// everything needed to run a simulation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationTask {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub compounds: Vec<CompoundInput>,
    pub reactions: Vec<ReactionInput>,
    #[serde(default)]
    pub kinetics: Option<IntegratorSettings>,
    #[serde(default)]
    pub equilibrium: Option<SolverSettings>,
}

impl SimulationTask {
    /// compound by formula: from the compounds list if it is there, plain compound otherwise
    fn resolve_compound(&self, formula: &str) -> Result<Compound, ChemError> {
        let plain = Compound::from_tagged(formula)?;
        for input in &self.compounds {
            let mut known = input.to_compound()?;
            if known == plain {
                // a tag in the reaction notation overrides the listed data
                known.fixed_phase = plain.fixed_phase.or(known.fixed_phase);
                return Ok(known);
            }
        }
        Ok(plain)
    }
    fn species(&self, input: &SpeciesInput) -> Result<ReactionSpecies, ChemError> {
        Ok(ReactionSpecies::reactant(self.resolve_compound(&input.formula)?)
            .coefficient(input.coefficient)
            .rate_order(input.order)
            .concentration(input.concentration))
    }
    pub fn reactions(&self) -> Result<Vec<Reaction>, ChemError> {
        self.reactions
            .iter()
            .map(|r| {
                let reactants = r
                    .reactants
                    .iter()
                    .map(|s| self.species(s))
                    .collect::<Result<Vec<_>, _>>()?;
                let products = r
                    .products
                    .iter()
                    .map(|s| self.species(s))
                    .collect::<Result<Vec<_>, _>>()?;
                let mut reaction = Reaction::new(reactants, products)
                    .with_rate_constants(r.kf, r.kb)
                    .with_temperature(r.temperature.unwrap_or(self.temperature));
                if let Some(k) = r.K {
                    reaction = reaction.with_equilibrium_constant(k);
                }
                Ok(reaction)
            })
            .collect()
    }
    pub fn build_network(&self) -> Result<Network, ChemError> {
        Network::build(self.reactions()?, self.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TASK: &str = r#"{
        "temperature": 300.0,
        "compounds": [ { "formula": "H2O", "melting_point": 273.15, "boiling_point": 373.15 } ],
        "reactions": [
            { "reactants": [ { "formula": "A", "concentration": 1.0 } ],
              "products": [ { "formula": "B", "coefficient": 2.0 }, { "formula": "H2O" } ],
              "kf": 2.0, "kb": 0.5 }
        ],
        "kinetics": { "duration": 1.0, "checkpoint_times": [0.5] },
        "equilibrium": { "method": "sgd", "seed": 7, "tol": 1e-6 }
    }"#;

    #[test]
    fn test_task_from_json() {
        let task: SimulationTask = serde_json::from_str(TASK).unwrap();
        assert_eq!(task.reactions.len(), 1);
        let kinetics = task.kinetics.as_ref().unwrap();
        assert_relative_eq!(kinetics.step_size, 1e-3);
        assert_eq!(kinetics.policy().unwrap(), NegativePolicy::ClampToZero);
        let product = &task.reactions[0].products[0];
        assert_relative_eq!(product.coefficient, 2.0);
        assert_relative_eq!(product.order, 1.0);
        assert_relative_eq!(product.concentration, 0.0);
    }

    #[test]
    fn test_task_builds_network() {
        let task: SimulationTask = serde_json::from_str(TASK).unwrap();
        let network = task.build_network().unwrap();
        assert_eq!(network.species_names(), vec!["A", "B", "H2O"]);
        assert_relative_eq!(network.equilibrium_constants()[0], 4.0);
        assert_relative_eq!(network.reactions()[0].T, 300.0);
        // phase data from the compounds list reaches the network
        let water = &network.species()[2];
        assert_eq!(water.phase(300.0), Some(Phases::Liquid));
    }

    #[test]
    fn test_solver_settings_defaults() {
        let task: SimulationTask = serde_json::from_str(TASK).unwrap();
        let settings = task.equilibrium.unwrap();
        let method = settings.method().unwrap();
        assert_eq!(method, EquilibriumMethod::stochastic_gradient(Some(7)));
        let params = settings.params(&method);
        assert_eq!(params.max_iter, 5000);
        assert_relative_eq!(params.tol, 1e-6);
        assert_relative_eq!(params.learning_rate, 0.1);

        let newton = SolverSettings {
            method: "newton".to_string(),
            ..SolverSettings::default()
        };
        let method = newton.method().unwrap();
        let params = newton.params(&method);
        assert_eq!(params.max_iter, 200);
        assert_relative_eq!(params.learning_rate, 1.0);
    }

    #[test]
    fn test_unknown_names_are_configuration_errors() {
        let settings = SolverSettings {
            method: "simplex".to_string(),
            ..SolverSettings::default()
        };
        assert!(matches!(settings.method(), Err(ChemError::Configuration(_))));
        let kinetics = IntegratorSettings {
            duration: 1.0,
            step_size: 0.1,
            checkpoint_times: vec![],
            negative_policy: "ignore".to_string(),
        };
        assert!(matches!(kinetics.policy(), Err(ChemError::Configuration(_))));
    }

    #[test]
    fn test_explicit_equilibrium_constant_wins() {
        let json = r#"{ "reactions": [ { "reactants": [ { "formula": "A" } ],
                        "products": [ { "formula": "B" } ], "kf": 2.0, "kb": 1.0, "K": 10.0 } ] }"#;
        let task: SimulationTask = serde_json::from_str(json).unwrap();
        let reactions = task.reactions().unwrap();
        assert_relative_eq!(reactions[0].K, 10.0);
        assert_relative_eq!(reactions[0].T, 298.15);
    }
}
