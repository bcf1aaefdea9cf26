/////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// TESTS
//////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use crate::Kinetics::User_reactions::{Reaction, ReactionSpecies};
    use crate::Kinetics::stoichiometry_analyzer::Network;
    use crate::Thermodynamics::ChemEquilibrium::EquilibriumEquations::EquilibriumEquations;
    use crate::Thermodynamics::ChemEquilibrium::EquilibriumSolver::{
        EquilibriumMethod, EquilibriumSolver, SolverParams,
    };
    use crate::Thermodynamics::User_substances::Compound;
    use crate::errors::ChemError;
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    fn sp(formula: &str) -> Compound {
        Compound::from_tagged(formula).unwrap()
    }

    /// A <=> nB with equilibrium constant k, starting from pure A
    fn single(n: f64, k: f64) -> Network {
        let a = ReactionSpecies::reactant(sp("A")).concentration(1.0);
        let b = ReactionSpecies::product(sp("B")).coefficient(n);
        let reaction = Reaction::new(vec![a], vec![b]).with_equilibrium_constant(k);
        Network::build(vec![reaction], 298.15).unwrap()
    }

    /// A <=> B (K = 2), B <=> C (K = 3): equilibrium is [1/9, 2/9, 6/9]
    fn chain() -> Network {
        let r1 = Reaction::new(
            vec![ReactionSpecies::reactant(sp("A")).concentration(1.0)],
            vec![ReactionSpecies::product(sp("B"))],
        )
        .with_equilibrium_constant(2.0);
        let r2 = Reaction::new(
            vec![ReactionSpecies::reactant(sp("B"))],
            vec![ReactionSpecies::product(sp("C"))],
        )
        .with_equilibrium_constant(3.0);
        Network::build(vec![r1, r2], 298.15).unwrap()
    }

    fn solve_with(method: EquilibriumMethod, network: &Network) -> (Vec<f64>, EquilibriumSolver) {
        let params = SolverParams::default_for(&method);
        let mut solver = EquilibriumSolver::new(method);
        solver.fit(network);
        let c = solver.solve(&params).unwrap();
        (c, solver)
    }

    fn all_methods() -> Vec<EquilibriumMethod> {
        vec![
            EquilibriumMethod::batch_gradient(),
            EquilibriumMethod::stochastic_gradient(Some(42)),
            EquilibriumMethod::newton(),
        ]
    }

    #[test]
    fn test_isomerization_all_methods() {
        let network = single(1.0, 3.0);
        for method in all_methods() {
            let name = method.to_string();
            let (c, solver) = solve_with(method, &network);
            assert_relative_eq!(c[0], 0.25, epsilon = 1e-6);
            assert_relative_eq!(c[1], 0.75, epsilon = 1e-6);
            let report = solver.report().unwrap();
            assert!(report.converged, "{} did not converge", name);
        }
    }

    #[test]
    fn test_dissociation_all_methods() {
        // B^2/A = 1 with A = 1 - y, B = 2y
        let y = (17.0f64.sqrt() - 1.0) / 8.0;
        let network = single(2.0, 1.0);
        for method in all_methods() {
            let (c, _) = solve_with(method, &network);
            assert_relative_eq!(c[0], 1.0 - y, epsilon = 1e-6);
            assert_relative_eq!(c[1], 2.0 * y, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_chain_newton() {
        let (c, solver) = solve_with(EquilibriumMethod::newton(), &chain());
        assert_relative_eq!(c[0], 1.0 / 9.0, epsilon = 1e-8);
        assert_relative_eq!(c[1], 2.0 / 9.0, epsilon = 1e-8);
        assert_relative_eq!(c[2], 6.0 / 9.0, epsilon = 1e-8);
        // mass is conserved along the extents
        assert_relative_eq!(c.iter().sum::<f64>(), 1.0, epsilon = 1e-10);
        assert_eq!(solver.extents().unwrap().len(), 2);
    }

    #[test]
    fn test_chain_gradient_methods() {
        let network = chain();
        // the coupled gradient stalls on this chain and uses up its iterations
        let method = EquilibriumMethod::batch_gradient();
        let max_iter = SolverParams::default_for(&method).max_iter;
        let (_, solver) = solve_with(method, &network);
        let report = solver.report().unwrap();
        assert!(!report.converged);
        assert_eq!(report.iterations, max_iter);

        // one reaction at a time reaches the equilibrium
        let (c, solver) = solve_with(EquilibriumMethod::stochastic_gradient(Some(1)), &network);
        assert!(solver.report().unwrap().converged);
        assert_relative_eq!(c[0], 1.0 / 9.0, epsilon = 1e-4);
        assert_relative_eq!(c[1], 2.0 / 9.0, epsilon = 1e-4);
        assert_relative_eq!(c[2], 6.0 / 9.0, epsilon = 1e-4);
    }

    #[test]
    fn test_condensed_species_are_excluded() {
        // CaCO3(s) <=> CaO(s) + CO2, K = [CO2] = 0.5
        let reaction = Reaction::new(
            vec![ReactionSpecies::reactant(sp("CaCO3.s")).concentration(1.0)],
            vec![
                ReactionSpecies::product(sp("CaO.s")),
                ReactionSpecies::product(sp("CO2.g")),
            ],
        )
        .with_equilibrium_constant(0.5);
        let network = Network::build(vec![reaction], 1000.0).unwrap();
        let (c, solver) = solve_with(EquilibriumMethod::newton(), &network);
        assert_eq!(
            solver.equations().unwrap().excluded,
            vec![true, true, false]
        );
        assert_relative_eq!(c[2], 0.5, epsilon = 1e-8);
        assert_relative_eq!(c[0], 0.5, epsilon = 1e-8);
        assert_relative_eq!(c[1], 0.5, epsilon = 1e-8);
    }

    #[test]
    fn test_equations_at_solution() {
        let eqs = EquilibriumEquations::from_network(&single(1.0, 3.0));
        let x = DVector::from_vec(vec![-0.75]);
        assert_relative_eq!(eqs.residual(&x, 1e-12)[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(eqs.residual_i(&x, 0, 1e-12), 0.0, epsilon = 1e-12);
        // J = -(1/cA + 1/cB)
        let expected = -(1.0 / 0.25 + 1.0 / 0.75);
        assert_relative_eq!(eqs.jacobian(&x, 1e-12)[(0, 0)], expected, epsilon = 1e-10);
        assert_relative_eq!(eqs.jacobian_row(&x, 0, 1e-12)[0], expected, epsilon = 1e-10);
        assert!(eqs.is_feasible(&x));
        assert!(!eqs.is_feasible(&DVector::from_vec(vec![-1.5])));
        assert_eq!(eqs.final_concentrations(&x), vec![0.25, 0.75]);
    }

    #[test]
    fn test_seeded_sgd_is_reproducible() {
        let network = chain();
        let (c1, _) = solve_with(EquilibriumMethod::stochastic_gradient(Some(7)), &network);
        let (c2, _) = solve_with(EquilibriumMethod::stochastic_gradient(Some(7)), &network);
        assert_eq!(c1, c2);
    }

    #[test]
    fn test_iteration_limit_is_not_an_error() {
        let method = EquilibriumMethod::batch_gradient();
        let params = SolverParams {
            max_iter: 1,
            ..SolverParams::default_for(&method)
        };
        let mut solver = EquilibriumSolver::new(method);
        solver.fit(&single(1.0, 3.0));
        let c = solver.solve(&params).unwrap();
        assert_eq!(c.len(), 2);
        assert!(c.iter().all(|v| *v >= 0.0));
        let report = solver.report().unwrap();
        assert!(!report.converged);
        assert_eq!(report.iterations, 1);
    }

    #[test]
    fn test_unfitted_solver() {
        let method = EquilibriumMethod::newton();
        let params = SolverParams::default_for(&method);
        let mut solver = EquilibriumSolver::new(method);
        assert!(!solver.is_fitted());
        assert!(matches!(solver.solve(&params), Err(ChemError::State(_))));
    }

    #[test]
    fn test_refit_resets_solution() {
        let (_, mut solver) = solve_with(EquilibriumMethod::newton(), &single(1.0, 3.0));
        assert!(solver.report().is_some());
        solver.fit(&chain());
        assert!(solver.report().is_none());
        assert!(solver.extents().is_none());
        assert_eq!(solver.equations().unwrap().n_reactions(), 2);
    }

    #[test]
    fn test_params_validation() {
        let method = EquilibriumMethod::batch_gradient();
        let defaults = SolverParams::default_for(&method);
        assert!(defaults.validate().is_ok());
        let bad = [
            SolverParams {
                max_iter: 0,
                ..defaults.clone()
            },
            SolverParams {
                learning_rate: -0.1,
                ..defaults.clone()
            },
            SolverParams {
                tol: 0.0,
                ..defaults.clone()
            },
            SolverParams {
                backtrack_beta: 1.0,
                ..defaults.clone()
            },
            SolverParams {
                min_concentration: f64::NAN,
                ..defaults.clone()
            },
        ];
        for params in bad {
            assert!(matches!(params.validate(), Err(ChemError::Configuration(_))));
        }
        let mut solver = EquilibriumSolver::new(method);
        solver.fit(&single(1.0, 3.0));
        let params = SolverParams {
            backtrack_beta: 0.0,
            ..defaults
        };
        assert!(matches!(solver.solve(&params), Err(ChemError::Configuration(_))));
    }

    #[test]
    fn test_method_names() {
        assert_eq!(
            "BGD".parse::<EquilibriumMethod>().unwrap(),
            EquilibriumMethod::batch_gradient()
        );
        assert_eq!(
            "stochastic_gradient".parse::<EquilibriumMethod>().unwrap(),
            EquilibriumMethod::stochastic_gradient(None)
        );
        assert_eq!(
            " newton ".parse::<EquilibriumMethod>().unwrap(),
            EquilibriumMethod::newton()
        );
        assert!(matches!(
            "lbfgs".parse::<EquilibriumMethod>(),
            Err(ChemError::Configuration(_))
        ));
        assert_eq!(EquilibriumMethod::newton().to_string(), "Newton");
        let newton = SolverParams::default_for(&EquilibriumMethod::newton());
        assert_eq!(newton.max_iter, 200);
        assert_relative_eq!(newton.tol, 1e-10);
    }
}
