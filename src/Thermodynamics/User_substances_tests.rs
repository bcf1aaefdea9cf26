///////////////////////TESTS////////////////////////////////////////////
#[cfg(test)]
mod tests {

    use crate::Thermodynamics::User_substances::{Compound, Phases, normalize_formula};
    use crate::errors::ChemError;
    use std::collections::HashSet;

    #[test]
    fn test_identity_is_formula_only() {
        let plain = Compound::new("CO2").unwrap();
        let with_data = Compound::new(" CO2 ")
            .unwrap()
            .with_transition_points(Some(195.0), None)
            .with_observation(298.15, Phases::Gas);
        assert_eq!(plain, with_data);
        let set: HashSet<Compound> = [plain, with_data].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_ne!(Compound::new("CO").unwrap(), Compound::new("CO2").unwrap());
    }

    #[test]
    fn test_formula_validation() {
        assert_eq!(normalize_formula("  Fe2(SO4)3 ").unwrap(), "Fe2(SO4)3");
        assert!(normalize_formula("[Cu(NH3)4]+2").is_ok());
        assert!(matches!(normalize_formula("   "), Err(ChemError::Validation(_))));
        assert!(matches!(
            Compound::new("H2 O"),
            Err(ChemError::Validation(_))
        ));
        assert!(Compound::new("CH4;").is_err());
    }

    #[test]
    fn test_phase_from_transition_points() {
        let water = Compound::new("H2O")
            .unwrap()
            .with_transition_points(Some(273.15), Some(373.15));
        assert_eq!(water.phase(273.15), Some(Phases::Solid));
        assert_eq!(water.phase(373.15), Some(Phases::Liquid));
        assert_eq!(water.phase(373.16), Some(Phases::Gas));
    }

    #[test]
    fn test_phase_with_one_known_bound() {
        // no boiling point: liquid above melting forever
        let iron = Compound::new("Fe").unwrap().with_transition_points(Some(1811.0), None);
        assert_eq!(iron.phase(300.0), Some(Phases::Solid));
        assert_eq!(iron.phase(5000.0), Some(Phases::Liquid));
        // no melting point: never solid
        let gas = Compound::new("N2").unwrap().with_transition_points(None, Some(77.0));
        assert_eq!(gas.phase(50.0), Some(Phases::Liquid));
        assert_eq!(gas.phase(300.0), Some(Phases::Gas));
    }

    #[test]
    fn test_phase_unknown() {
        assert_eq!(Compound::new("X").unwrap().phase(300.0), None);
    }

    #[test]
    fn test_observation_takes_precedence() {
        let water = Compound::from_tagged("H2O.l")
            .unwrap()
            .with_transition_points(Some(273.15), Some(373.15))
            .with_observation(300.0, Phases::Gas);
        // exact match of the observation
        assert_eq!(water.phase(300.0), Some(Phases::Gas));
        // otherwise the tag wins over the transition points
        assert_eq!(water.phase(400.0), Some(Phases::Liquid));
        assert_eq!(water.phase(300.5), Some(Phases::Liquid));
    }

    #[test]
    fn test_tagged_notation() {
        let cases = [
            ("C.s", "C", Phases::Solid),
            ("Hg.l", "Hg", Phases::Liquid),
            ("O2.g", "O2", Phases::Gas),
            ("Na+.aq", "Na+", Phases::Aqueous),
        ];
        for (tagged, formula, phase) in cases {
            let c = Compound::from_tagged(tagged).unwrap();
            assert_eq!(c.formula(), formula);
            assert_eq!(c.fixed_phase, Some(phase));
        }
        let untagged = Compound::from_tagged("CH4").unwrap();
        assert_eq!(untagged.formula(), "CH4");
        assert_eq!(untagged.fixed_phase, None);
    }

    #[test]
    fn test_phase_names() {
        assert_eq!("solid".parse::<Phases>().unwrap(), Phases::Solid);
        assert_eq!("AQ".parse::<Phases>().unwrap(), Phases::Aqueous);
        assert!(matches!(
            "plasma".parse::<Phases>(),
            Err(ChemError::Configuration(_))
        ));
        assert!(Phases::Liquid.is_condensed());
        assert!(!Phases::Aqueous.is_condensed());
        assert_eq!(Phases::Gas.to_string(), "g");
        let json = serde_json::to_string(&Phases::Aqueous).unwrap();
        assert_eq!(json, "\"aqueous\"");
    }
}
