//! # User reactions
//!
//! Structured reactions as they come from the reaction-equation parsing layer: ordered lists of
//! reactants and products with stoichiometric coefficients, rate orders (exponents of the
//! mass-action rate law) and initial concentrations, plus the forward/backward rate constants and
//! the equilibrium constant of the reaction.
use crate::Thermodynamics::User_substances::Compound;
use crate::errors::ChemError;
use serde::{Deserialize, Serialize};

/// side of the reaction a species belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Reactant,
    Product,
}

/// one species of a reaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionSpecies {
    pub compound: Compound,
    /// stoichiometric coefficient, must be > 0
    pub coefficient: f64,
    /// exponent of the concentration in the rate law; may be zero or negative
    pub rate_order: f64,
    /// initial concentration, must be >= 0
    pub concentration: f64,
    pub role: Role,
}

impl ReactionSpecies {
    /// coefficient 1, rate order 1, zero concentration
    pub fn new(compound: Compound, role: Role) -> Self {
        Self {
            compound,
            coefficient: 1.0,
            rate_order: 1.0,
            concentration: 0.0,
            role,
        }
    }
    pub fn reactant(compound: Compound) -> Self {
        Self::new(compound, Role::Reactant)
    }
    pub fn product(compound: Compound) -> Self {
        Self::new(compound, Role::Product)
    }
    pub fn coefficient(mut self, coefficient: f64) -> Self {
        self.coefficient = coefficient;
        self
    }
    pub fn rate_order(mut self, rate_order: f64) -> Self {
        self.rate_order = rate_order;
        self
    }
    pub fn concentration(mut self, concentration: f64) -> Self {
        self.concentration = concentration;
        self
    }
    fn validate(&self) -> Result<(), ChemError> {
        let name = self.compound.formula();
        if !self.coefficient.is_finite() || self.coefficient <= 0.0 {
            return Err(ChemError::validation(format!(
                "stoichiometric coefficient of '{}' must be positive, got {}",
                name, self.coefficient
            )));
        }
        if !self.rate_order.is_finite() {
            return Err(ChemError::validation(format!(
                "rate order of '{}' must be finite, got {}",
                name, self.rate_order
            )));
        }
        if !self.concentration.is_finite() || self.concentration < 0.0 {
            return Err(ChemError::validation(format!(
                "concentration of '{}' must be non-negative, got {}",
                name, self.concentration
            )));
        }
        Ok(())
    }
}

/// reaction with kinetic and equilibrium constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub reactants: Vec<ReactionSpecies>,
    pub products: Vec<ReactionSpecies>,
    /// forward rate constant
    pub kf: f64,
    /// backward rate constant
    pub kb: f64,
    /// equilibrium constant
    pub K: f64,
    /// temperature (K)
    pub T: f64,
}

impl Reaction {
    /// reaction without rate constants, K = 1, T = 298.15 K
    pub fn new(reactants: Vec<ReactionSpecies>, products: Vec<ReactionSpecies>) -> Self {
        let reactants = reactants
            .into_iter()
            .map(|s| ReactionSpecies {
                role: Role::Reactant,
                ..s
            })
            .collect();
        let products = products
            .into_iter()
            .map(|s| ReactionSpecies {
                role: Role::Product,
                ..s
            })
            .collect();
        Self {
            reactants,
            products,
            kf: 0.0,
            kb: 0.0,
            K: 1.0,
            T: 298.15,
        }
    }
    /// sets kf and kb; if kb > 0 the equilibrium constant becomes kf/kb
    pub fn with_rate_constants(mut self, kf: f64, kb: f64) -> Self {
        self.kf = kf;
        self.kb = kb;
        if kb > 0.0 {
            self.K = kf / kb;
        }
        self
    }
    pub fn with_equilibrium_constant(mut self, K: f64) -> Self {
        self.K = K;
        self
    }
    pub fn with_temperature(mut self, T: f64) -> Self {
        self.T = T;
        self
    }
    /// reactants followed by products
    pub fn species(&self) -> impl Iterator<Item = &ReactionSpecies> {
        self.reactants.iter().chain(self.products.iter())
    }

    pub fn validate(&self) -> Result<(), ChemError> {
        if self.reactants.is_empty() && self.products.is_empty() {
            return Err(ChemError::validation("reaction references no species"));
        }
        for s in self.species() {
            s.validate()?;
        }
        for (name, k) in [("kf", self.kf), ("kb", self.kb)] {
            if !k.is_finite() || k < 0.0 {
                return Err(ChemError::validation(format!(
                    "rate constant {} must be non-negative, got {}",
                    name, k
                )));
            }
        }
        Ok(())
    }

    /// Sum of two reactions. Coefficients are netted per compound (reactants count positive,
    /// products negative); positive nets end up on the left, negative on the right, zero nets drop
    /// out. Rate orders reset to 1, concentrations to 0, rate constants to 0 and the equilibrium
    /// constant is the product K1*K2. Returns None if every species cancels.
    pub fn combine(&self, other: &Reaction) -> Option<Reaction> {
        let mut net: Vec<(Compound, f64)> = Vec::new();
        for s in self.species().chain(other.species()) {
            let signed = match s.role {
                Role::Reactant => s.coefficient,
                Role::Product => -s.coefficient,
            };
            match net.iter_mut().find(|(c, _)| *c == s.compound) {
                Some((_, total)) => *total += signed,
                None => net.push((s.compound.clone(), signed)),
            }
        }
        let mut reactants = Vec::new();
        let mut products = Vec::new();
        for (compound, total) in net {
            if total > 0.0 {
                reactants.push(ReactionSpecies::reactant(compound).coefficient(total));
            } else if total < 0.0 {
                products.push(ReactionSpecies::product(compound).coefficient(-total));
            }
        }
        if reactants.is_empty() && products.is_empty() {
            return None;
        }
        Some(
            Reaction::new(reactants, products)
                .with_equilibrium_constant(self.K * other.K)
                .with_temperature(self.T),
        )
    }
}
