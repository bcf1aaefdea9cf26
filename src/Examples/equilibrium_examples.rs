use crate::Kinetics::User_reactions::{Reaction, ReactionSpecies};
use crate::Kinetics::mass_action_IVP::{KineticsIntegrator, NegativePolicy};
use crate::Kinetics::stoichiometry_analyzer::Network;
use crate::Thermodynamics::ChemEquilibrium::EquilibriumSolver::{
    EquilibriumMethod, EquilibriumSolver, SolverParams,
};
use crate::Thermodynamics::User_substances::Compound;
use crate::Utils::output::{equilibrium_table, network_table, report_table};
use crate::errors::ChemError;

fn solve_and_print(network: &Network, method: EquilibriumMethod) -> Result<Vec<f64>, ChemError> {
    let params = SolverParams::default_for(&method);
    let name = method.to_string();
    let mut solver = EquilibriumSolver::new(method);
    solver.fit(network);
    let c = solver.solve(&params)?;
    equilibrium_table(network, &c).printstd();
    if let Some(report) = solver.report() {
        report_table(&name, report).printstd();
    }
    Ok(c)
}

pub fn equilibrium_examples(task: usize) -> Result<(), ChemError> {
    match task {
        0 => {
            // A <=> B, K = 3 by every method
            let a = ReactionSpecies::reactant(Compound::new("A")?).concentration(1.0);
            let b = ReactionSpecies::product(Compound::new("B")?);
            let reaction = Reaction::new(vec![a], vec![b]).with_equilibrium_constant(3.0);
            let network = Network::build(vec![reaction], 298.15)?;
            for method in ["bgd", "sgd", "newton"] {
                solve_and_print(&network, method.parse()?)?;
            }
        }
        1 => {
            // thermal decomposition of limestone: solids drop out, K = [CO2]
            let reaction = Reaction::new(
                vec![ReactionSpecies::reactant(Compound::from_tagged("CaCO3.s")?).concentration(1.0)],
                vec![
                    ReactionSpecies::product(Compound::from_tagged("CaO.s")?),
                    ReactionSpecies::product(Compound::from_tagged("CO2.g")?),
                ],
            )
            .with_equilibrium_constant(0.2);
            let network = Network::build(vec![reaction], 1100.0)?;
            network_table(&network).printstd();
            solve_and_print(&network, EquilibriumMethod::newton())?;
        }
        2 => {
            // N2O4 <=> 2NO2: long-time kinetics agree with the equilibrium solver
            let n2o4 = ReactionSpecies::reactant(Compound::new("N2O4")?).concentration(1.0);
            let no2 = ReactionSpecies::product(Compound::new("NO2")?)
                .coefficient(2.0)
                .rate_order(2.0);
            let reaction = Reaction::new(vec![n2o4], vec![no2]).with_rate_constants(0.8, 2.0);
            let network = Network::build(vec![reaction], 298.15)?;
            let c_eq = solve_and_print(&network, EquilibriumMethod::newton())?;
            let mut integrator = KineticsIntegrator::new();
            integrator.fit(network);
            let trajectory = integrator.integrate(20.0, 1e-3, &[], NegativePolicy::ClampToZero)?;
            println!(
                "kinetics at t = 20: {:?}, equilibrium solver: {:?}",
                trajectory.final_state.concentrations, c_eq
            );
        }
        3 => {
            // overall reaction from two steps: K = K1*K2
            let r1 = Reaction::new(
                vec![ReactionSpecies::reactant(Compound::new("A")?)],
                vec![ReactionSpecies::product(Compound::new("B")?)],
            )
            .with_equilibrium_constant(2.0);
            let r2 = Reaction::new(
                vec![ReactionSpecies::reactant(Compound::new("B")?)],
                vec![ReactionSpecies::product(Compound::new("C")?)],
            )
            .with_equilibrium_constant(3.0);
            let Some(overall) = r1.combine(&r2) else {
                println!("reactions cancel out");
                return Ok(());
            };
            let mut network = Network::build(vec![overall], 298.15)?;
            network.set_concentration("A", 1.0)?;
            network_table(&network).printstd();
            solve_and_print(&network, EquilibriumMethod::stochastic_gradient(Some(0)))?;
        }
        _ => {
            println!("Wrong task number");
        }
    }
    Ok(())
}
