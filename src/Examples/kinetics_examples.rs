use crate::Kinetics::User_reactions::{Reaction, ReactionSpecies};
use crate::Kinetics::mass_action_IVP::{KineticsIntegrator, NegativePolicy};
use crate::Kinetics::stoichiometry_analyzer::Network;
use crate::Thermodynamics::User_substances::Compound;
use crate::Utils::output::{network_table, trajectory_table};
use crate::errors::ChemError;

pub fn kin_examples(kintask: usize) -> Result<(), ChemError> {
    match kintask {
        0 => {
            // STOICHIOMETRIC ANALYSIS
            let a = ReactionSpecies::reactant(Compound::new("A")?).concentration(1.0);
            let b = ReactionSpecies::product(Compound::new("B")?).coefficient(2.0);
            let r1 = Reaction::new(vec![a], vec![b]).with_rate_constants(1.0, 0.1);
            let b = ReactionSpecies::reactant(Compound::new("B")?);
            let a = ReactionSpecies::product(Compound::new("A")?);
            let c = ReactionSpecies::product(Compound::new("C")?).coefficient(3.0);
            let r2 = Reaction::new(vec![b], vec![a, c]).with_rate_constants(0.5, 0.0);
            let mut network = Network::build(vec![r1, r2], 298.15)?;
            // empirical rate law: half order in A
            let a = ReactionSpecies::reactant(Compound::new("A")?).rate_order(0.5);
            let b = ReactionSpecies::reactant(Compound::new("B")?).coefficient(2.0);
            let d = ReactionSpecies::product(Compound::new("D")?);
            network.add_reaction(Reaction::new(vec![a, b], vec![d]).with_rate_constants(0.2, 0.0))?;
            println!("substances: {:?}", network.species_names());
            println!("stecheo_matrx {}", network.stoich_matrix());
            println!("forward rate orders {}", network.order_fwd());
            network_table(&network).printstd();
        }
        1 => {
            // reversible isomerization A <=> B: relaxation to [0.5, 0.5]
            let a = ReactionSpecies::reactant(Compound::new("A")?).concentration(1.0);
            let b = ReactionSpecies::product(Compound::new("B")?);
            let reaction = Reaction::new(vec![a], vec![b]).with_rate_constants(1.0, 1.0);
            let network = Network::build(vec![reaction], 298.15)?;
            let mut integrator = KineticsIntegrator::new();
            integrator.fit(network);
            let trajectory =
                integrator.integrate(5.0, 1e-3, &[0.5, 1.0, 2.0, 3.0, 4.0], NegativePolicy::ClampToZero)?;
            trajectory_table(&["A".to_string(), "B".to_string()], &trajectory).printstd();
        }
        2 => {
            // consecutive reactions A => B => C: intermediate B passes through a maximum
            let r1 = Reaction::new(
                vec![ReactionSpecies::reactant(Compound::new("A")?).concentration(1.0)],
                vec![ReactionSpecies::product(Compound::new("B")?)],
            )
            .with_rate_constants(1.0, 0.0);
            let r2 = Reaction::new(
                vec![ReactionSpecies::reactant(Compound::new("B")?)],
                vec![ReactionSpecies::product(Compound::new("C")?)],
            )
            .with_rate_constants(0.5, 0.0);
            let network = Network::build(vec![r1, r2], 298.15)?;
            let names = network.species_names();
            let mut integrator = KineticsIntegrator::new();
            integrator.fit(network);
            let (t_max, b_max) = integrator
                .trajectory(1e-3, NegativePolicy::ClampToZero)?
                .take(10_000)
                .map(|state| (state.time, state.concentrations[1]))
                .fold((0.0, 0.0), |best, (t, b)| if b > best.1 { (t, b) } else { best });
            // analytic: t_max = ln(k1/k2)/(k1 - k2) = 2 ln 2, B_max = 0.25
            println!("maximum of B: {:.4} at t = {:.3}", b_max, t_max);
            let times: Vec<f64> = (1..10).map(|i| i as f64).collect();
            let trajectory = integrator.integrate(10.0, 1e-3, &times, NegativePolicy::ClampToZero)?;
            println!("continued from t = 10 (times counted from the start of the call):");
            trajectory_table(&names, &trajectory).printstd();
        }
        3 => {
            // stiff step: the forward rate removes more A in one step than there is
            for policy in [
                NegativePolicy::ClampToZero,
                NegativePolicy::LeaveUnchanged,
                NegativePolicy::AllowNegative,
            ] {
                let a = ReactionSpecies::reactant(Compound::new("A")?).concentration(1.0);
                let b = ReactionSpecies::product(Compound::new("B")?);
                let reaction = Reaction::new(vec![a], vec![b]).with_rate_constants(15.0, 0.0);
                let mut integrator = KineticsIntegrator::new();
                integrator.fit(Network::build(vec![reaction], 298.15)?);
                let trajectory = integrator.integrate(0.3, 0.1, &[], policy)?;
                println!("{}: {:?}", policy, trajectory.final_state.concentrations);
            }
        }
        _ => {
            println!("Wrong task number");
        }
    }
    Ok(())
}
