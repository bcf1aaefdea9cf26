/// compounds identified by formula, with phase data: melting point, boiling point, observations
///
/// # Examples
/// ```
/// use KiReact::Thermodynamics::User_substances::{Compound, Phases};
/// let water = Compound::new("H2O")
///     .unwrap()
///     .with_transition_points(Some(273.15), Some(373.15));
/// assert_eq!(water.phase(250.0), Some(Phases::Solid));
/// assert_eq!(water.phase(300.0), Some(Phases::Liquid));
/// assert_eq!(water.phase(400.0), Some(Phases::Gas));
/// let salt = Compound::from_tagged("NaCl.aq").unwrap();
/// assert_eq!(salt.formula(), "NaCl");
/// assert_eq!(salt.phase(298.15), Some(Phases::Aqueous));
/// ```
pub mod User_substances;
/// tests
mod User_substances_tests;
/// module for chemical equilibrium of reversible reactions
pub mod ChemEquilibrium;
