//! # User substances
//!
//! Compounds taking part in reactions. A compound is identified by its normalized chemical formula
//! only: two `Compound` values with the same formula are the same species no matter what phase data
//! they carry. Phase data (melting point, boiling point, explicit observations) is used by the
//! equilibrium solver to drop condensed species from the equilibrium expression.
use crate::errors::ChemError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

/// physical state of a substance at a given temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phases {
    Solid,
    Liquid,
    Gas,
    Aqueous,
}

impl Phases {
    /// condensed phases are excluded from equilibrium expressions
    pub fn is_condensed(&self) -> bool {
        matches!(self, Phases::Solid | Phases::Liquid)
    }
    /// short tag used in reaction notation: H2O.l, NaCl.aq
    pub fn tag(&self) -> &'static str {
        match self {
            Phases::Solid => "s",
            Phases::Liquid => "l",
            Phases::Gas => "g",
            Phases::Aqueous => "aq",
        }
    }
}

impl FromStr for Phases {
    type Err = ChemError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "solid" => Ok(Phases::Solid),
            "l" | "liquid" => Ok(Phases::Liquid),
            "g" | "gas" => Ok(Phases::Gas),
            "aq" | "aqueous" => Ok(Phases::Aqueous),
            other => Err(ChemError::configuration(format!(
                "unknown phase '{}', expected one of s, l, g, aq",
                other
            ))),
        }
    }
}

impl fmt::Display for Phases {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

fn formula_regex() -> &'static Regex {
    static FORMULA: OnceLock<Regex> = OnceLock::new();
    FORMULA.get_or_init(|| Regex::new(r"^[A-Za-z0-9+.\-()\[\]]+$").expect("valid formula regex"))
}

fn phase_tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"^(.+)\.(s|l|g|aq)$").expect("valid phase tag regex"))
}

/// chemical compound with optional phase data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Compound {
    /// normalized chemical formula, the identity key
    formula: String,
    /// melting point (K)
    pub melting_point: Option<f64>,
    /// boiling point (K)
    pub boiling_point: Option<f64>,
    /// explicit (temperature, phase) observations, exact temperature match wins
    pub phase_observations: Vec<(f64, Phases)>,
    /// phase fixed by a tag in reaction notation, valid at every temperature
    pub fixed_phase: Option<Phases>,
}

impl Compound {
    /// compound without any phase data
    pub fn new(formula: &str) -> Result<Self, ChemError> {
        Ok(Self {
            formula: normalize_formula(formula)?,
            melting_point: None,
            boiling_point: None,
            phase_observations: Vec::new(),
            fixed_phase: None,
        })
    }
    /// parses formulas in tagged notation: "H2O.l" is liquid water, "NaCl.aq" is dissolved salt.
    /// A formula without a tag is a plain compound.
    pub fn from_tagged(tagged: &str) -> Result<Self, ChemError> {
        let trimmed = tagged.trim();
        if let Some(caps) = phase_tag_regex().captures(trimmed) {
            let mut compound = Compound::new(&caps[1])?;
            compound.fixed_phase = Some(caps[2].parse()?);
            Ok(compound)
        } else {
            Compound::new(trimmed)
        }
    }
    pub fn with_transition_points(
        mut self,
        melting_point: Option<f64>,
        boiling_point: Option<f64>,
    ) -> Self {
        self.melting_point = melting_point;
        self.boiling_point = boiling_point;
        self
    }
    pub fn with_observation(mut self, temperature: f64, phase: Phases) -> Self {
        self.phase_observations.push((temperature, phase));
        self
    }
    pub fn formula(&self) -> &str {
        &self.formula
    }
    /// phase at temperature T:
    /// 1) exact match in the observation list
    /// 2) phase fixed by notation tag
    /// 3) melting/boiling rule: T <= mp solid, mp < T <= bp liquid, T > bp gas;
    ///    an unknown bound is treated as unbounded
    /// 4) None if nothing is known
    pub fn phase(&self, t: f64) -> Option<Phases> {
        if let Some((_, phase)) = self.phase_observations.iter().find(|(t_obs, _)| *t_obs == t) {
            return Some(*phase);
        }
        if let Some(phase) = self.fixed_phase {
            return Some(phase);
        }
        match (self.melting_point, self.boiling_point) {
            (None, None) => None,
            (mp, bp) => {
                let mp = mp.unwrap_or(f64::NEG_INFINITY);
                let bp = bp.unwrap_or(f64::INFINITY);
                if t <= mp {
                    Some(Phases::Solid)
                } else if t <= bp {
                    Some(Phases::Liquid)
                } else {
                    Some(Phases::Gas)
                }
            }
        }
    }
}

/// trims whitespace and checks the formula alphabet
pub fn normalize_formula(formula: &str) -> Result<String, ChemError> {
    let trimmed = formula.trim();
    if trimmed.is_empty() {
        return Err(ChemError::validation("empty chemical formula"));
    }
    if !formula_regex().is_match(trimmed) {
        return Err(ChemError::validation(format!(
            "invalid chemical formula '{}'",
            trimmed
        )));
    }
    Ok(trimmed.to_string())
}

impl PartialEq for Compound {
    fn eq(&self, other: &Self) -> bool {
        self.formula == other.formula
    }
}

impl Eq for Compound {}

impl Hash for Compound {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.formula.hash(state);
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.formula)
    }
}
