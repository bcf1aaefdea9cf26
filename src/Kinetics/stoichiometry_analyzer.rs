//! # Stoichiometric network
//!
//! Aggregates a list of reactions into dense arrays indexed consistently against a species registry:
//! - stoichiometric matrix (reactions x species): +coefficient for a reactant, -coefficient for a product
//! - matrices of rate orders for the forward (reactant exponents) and backward (product exponents)
//!   rate laws
//! - pairs of rate constants (kf, kb) and the vector of equilibrium constants
//! - vector of concentrations ordered like the registry
//!
//! Reactions refer to species by their index in the registry. A species gets its index the first
//! time it is met (reactants of a reaction before its products, reactions in insertion order) and
//! keeps it when further reactions are added.
use crate::Kinetics::User_reactions::{Reaction, Role};
use crate::Thermodynamics::User_substances::{Compound, Phases};
use crate::errors::ChemError;
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;

/// index-based reference of a reaction to a registry species
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesRef {
    pub species: usize,
    pub coefficient: f64,
    pub rate_order: f64,
    pub role: Role,
}

/// deduplicated, insertion-ordered list of compounds
#[derive(Debug, Clone, Default)]
pub struct SpeciesRegistry {
    compounds: Vec<Compound>,
    index: HashMap<String, usize>,
}

impl SpeciesRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    /// returns index of the compound, registering it if it is new
    pub fn register(&mut self, compound: &Compound) -> usize {
        if let Some(&i) = self.index.get(compound.formula()) {
            return i;
        }
        let i = self.compounds.len();
        self.compounds.push(compound.clone());
        self.index.insert(compound.formula().to_string(), i);
        i
    }
    pub fn get_index(&self, formula: &str) -> Option<usize> {
        self.index.get(formula.trim()).copied()
    }
    pub fn compounds(&self) -> &[Compound] {
        &self.compounds
    }
    pub fn len(&self) -> usize {
        self.compounds.len()
    }
    pub fn is_empty(&self) -> bool {
        self.compounds.is_empty()
    }
}

/// reaction network with its derived arrays
#[derive(Debug, Clone)]
pub struct Network {
    reactions: Vec<Reaction>,
    reaction_refs: Vec<Vec<SpeciesRef>>,
    registry: SpeciesRegistry,
    /// stoichiometric matrix, reactions x species
    stecheo_matrx: DMatrix<f64>,
    /// forward rate orders, reactions x species
    order_fwd: DMatrix<f64>,
    /// backward rate orders, reactions x species
    order_bwd: DMatrix<f64>,
    rate_constants: Vec<(f64, f64)>,
    K: DVector<f64>,
    concentrations: DVector<f64>,
    T: f64,
}

impl Network {
    /// builds the network from a finished list of reactions. Initial concentrations of a species
    /// met in several reactions are summed.
    pub fn build(reactions: Vec<Reaction>, temperature: f64) -> Result<Self, ChemError> {
        for (i, reaction) in reactions.iter().enumerate() {
            reaction.validate().map_err(|e| match e {
                ChemError::Validation(msg) => ChemError::validation(format!("reaction {}: {}", i, msg)),
                other => other,
            })?;
        }
        let mut network = Self {
            reactions: Vec::new(),
            reaction_refs: Vec::new(),
            registry: SpeciesRegistry::new(),
            stecheo_matrx: DMatrix::zeros(0, 0),
            order_fwd: DMatrix::zeros(0, 0),
            order_bwd: DMatrix::zeros(0, 0),
            rate_constants: Vec::new(),
            K: DVector::zeros(0),
            concentrations: DVector::zeros(0),
            T: temperature,
        };
        network.reactions = reactions;
        network.derive_arrays(None);
        info!(
            "network built: {} reactions, {} species, T = {} K",
            network.n_reactions(),
            network.n_species(),
            temperature
        );
        Ok(network)
    }

    /// Appends a reaction and re-derives registry and arrays from the full reaction list.
    /// Current concentrations are kept; concentrations carried by the new reaction are added on
    /// top (a new species starts from its own initial concentration).
    /// On validation failure the network is left untouched.
    pub fn add_reaction(&mut self, reaction: Reaction) -> Result<(), ChemError> {
        reaction.validate()?;
        let previous = self.concentrations.clone();
        self.reactions.push(reaction);
        self.derive_arrays(Some(previous));
        info!(
            "reaction added: {} reactions, {} species",
            self.n_reactions(),
            self.n_species()
        );
        Ok(())
    }

    /// Re-derives every array from `self.reactions`. With `previous` the concentration vector of
    /// the already known species is carried over and only the last reaction contributes its
    /// initial concentrations.
    fn derive_arrays(&mut self, previous: Option<DVector<f64>>) {
        let mut registry = SpeciesRegistry::new();
        let mut reaction_refs = Vec::with_capacity(self.reactions.len());
        let mut initial: Vec<f64> = Vec::new();
        let last = self.reactions.len().saturating_sub(1);
        for (r, reaction) in self.reactions.iter().enumerate() {
            let contributes = previous.is_none() || r == last;
            let mut refs = Vec::with_capacity(reaction.reactants.len() + reaction.products.len());
            for s in reaction.species() {
                let j = registry.register(&s.compound);
                if j == initial.len() {
                    initial.push(0.0);
                } else {
                    debug!("species '{}' merged at index {}", s.compound, j);
                }
                if contributes {
                    initial[j] += s.concentration;
                }
                refs.push(SpeciesRef {
                    species: j,
                    coefficient: s.coefficient,
                    rate_order: s.rate_order,
                    role: s.role,
                });
            }
            reaction_refs.push(refs);
        }
        if let Some(previous) = previous {
            for (j, c) in previous.iter().enumerate() {
                initial[j] += c;
            }
        }

        let (n_r, n_s) = (self.reactions.len(), registry.len());
        let mut stecheo_matrx = DMatrix::zeros(n_r, n_s);
        let mut order_fwd = DMatrix::zeros(n_r, n_s);
        let mut order_bwd = DMatrix::zeros(n_r, n_s);
        for (r, refs) in reaction_refs.iter().enumerate() {
            for s in refs {
                match s.role {
                    Role::Reactant => {
                        stecheo_matrx[(r, s.species)] += s.coefficient;
                        order_fwd[(r, s.species)] += s.rate_order;
                    }
                    Role::Product => {
                        stecheo_matrx[(r, s.species)] -= s.coefficient;
                        order_bwd[(r, s.species)] += s.rate_order;
                    }
                }
            }
        }
        self.rate_constants = self.reactions.iter().map(|r| (r.kf, r.kb)).collect();
        self.K = DVector::from_iterator(n_r, self.reactions.iter().map(|r| r.K));
        self.stecheo_matrx = stecheo_matrx;
        self.order_fwd = order_fwd;
        self.order_bwd = order_bwd;
        self.concentrations = DVector::from_vec(initial);
        self.reaction_refs = reaction_refs;
        self.registry = registry;
    }

    /// overrides the concentration of a known species
    pub fn set_concentration(&mut self, formula: &str, value: f64) -> Result<(), ChemError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ChemError::validation(format!(
                "concentration of '{}' must be non-negative, got {}",
                formula, value
            )));
        }
        let j = self
            .species_index(formula)
            .ok_or_else(|| ChemError::validation(format!("unknown species '{}'", formula)))?;
        self.concentrations[j] = value;
        Ok(())
    }

    pub fn species(&self) -> &[Compound] {
        self.registry.compounds()
    }
    pub fn species_names(&self) -> Vec<String> {
        self.species().iter().map(|c| c.formula().to_string()).collect()
    }
    pub fn species_index(&self, formula: &str) -> Option<usize> {
        self.registry.get_index(formula)
    }
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }
    pub fn reaction_refs(&self) -> &[Vec<SpeciesRef>] {
        &self.reaction_refs
    }
    pub fn stoich_matrix(&self) -> &DMatrix<f64> {
        &self.stecheo_matrx
    }
    pub fn order_fwd(&self) -> &DMatrix<f64> {
        &self.order_fwd
    }
    pub fn order_bwd(&self) -> &DMatrix<f64> {
        &self.order_bwd
    }
    pub fn rate_constants(&self) -> &[(f64, f64)] {
        &self.rate_constants
    }
    pub fn equilibrium_constants(&self) -> &DVector<f64> {
        &self.K
    }
    pub fn concentrations(&self) -> &DVector<f64> {
        &self.concentrations
    }
    pub fn concentrations_mut(&mut self) -> &mut DVector<f64> {
        &mut self.concentrations
    }
    pub fn temperature(&self) -> f64 {
        self.T
    }
    pub fn n_species(&self) -> usize {
        self.registry.len()
    }
    pub fn n_reactions(&self) -> usize {
        self.reactions.len()
    }
    /// phases of all species at the network temperature
    pub fn phases(&self) -> Vec<Option<Phases>> {
        self.species().iter().map(|c| c.phase(self.T)).collect()
    }
}
