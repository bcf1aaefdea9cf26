/// reactions as they come from the reaction parsing layer: reactants, products, stoichiometric
/// coefficients, rate orders, initial concentrations, rate and equilibrium constants.
/// # Examples
/// ```
/// use KiReact::Kinetics::User_reactions::{Reaction, ReactionSpecies};
/// use KiReact::Thermodynamics::User_substances::Compound;
/// let h2 = ReactionSpecies::reactant(Compound::new("H2").unwrap()).concentration(1.0);
/// let i2 = ReactionSpecies::reactant(Compound::new("I2").unwrap()).concentration(1.0);
/// let hi = ReactionSpecies::product(Compound::new("HI").unwrap()).coefficient(2.0);
/// let reaction = Reaction::new(vec![h2, i2], vec![hi]).with_rate_constants(0.5, 0.25);
/// assert!(reaction.validate().is_ok());
/// assert_eq!(reaction.K, 2.0);
/// ```
#[allow(non_snake_case)]
pub mod User_reactions;
/// The module takes a list of structured reactions and produces:
/// 1) registry of substances (deduplicated by formula, insertion order)
/// 2) a stoichiometric matrix reactions x substances
/// 3) matrices of rate orders of the forward and backward rate laws
/// 4) vectors of rate constants, equilibrium constants and concentrations
///
/// As a rule, the rate orders coincide with the stoichiometric coefficients of the substances;
/// for empirical reactions they may differ, and they are taken from the reaction data as is.
pub mod stoichiometry_analyzer;
/// fixed-step explicit integration of mass-action kinetics
pub mod mass_action_IVP;
