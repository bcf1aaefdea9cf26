//! Tables of simulation results printed by the command line interface and the examples.
use crate::Kinetics::User_reactions::{Reaction, ReactionSpecies};
use crate::Kinetics::mass_action_IVP::Trajectory;
use crate::Kinetics::stoichiometry_analyzer::Network;
use crate::Thermodynamics::ChemEquilibrium::EquilibriumSolver::SolverReport;
use prettytable::{Cell, Row, Table, row};

fn side(species: &[ReactionSpecies]) -> String {
    species
        .iter()
        .map(|s| {
            let name = match s.compound.fixed_phase {
                Some(phase) => format!("{}.{}", s.compound, phase),
                None => s.compound.to_string(),
            };
            if s.coefficient == 1.0 {
                name
            } else {
                format!("{}{}", s.coefficient, name)
            }
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

/// "2H2 + O2 <=> 2H2O"; irreversible reactions (kb = 0 and kf > 0) get "=>"
pub fn reaction_equation(reaction: &Reaction) -> String {
    let arrow = if reaction.kb == 0.0 && reaction.kf > 0.0 {
        "=>"
    } else {
        "<=>"
    };
    format!(
        "{} {} {}",
        side(&reaction.reactants),
        arrow,
        side(&reaction.products)
    )
}

/// reactions with their constants
pub fn network_table(network: &Network) -> Table {
    let mut table = Table::new();
    table.add_row(row!["#", "Reaction", "kf", "kb", "K"]);
    for (i, reaction) in network.reactions().iter().enumerate() {
        table.add_row(Row::new(vec![
            Cell::new(&i.to_string()),
            Cell::new(&reaction_equation(reaction)),
            Cell::new(&format!("{:e}", reaction.kf)),
            Cell::new(&format!("{:e}", reaction.kb)),
            Cell::new(&format!("{:e}", network.equilibrium_constants()[i])),
        ]));
    }
    table
}

/// one row per checkpoint and a last row for the final state
pub fn trajectory_table(species: &[String], trajectory: &Trajectory) -> Table {
    let mut table = Table::new();
    let mut header = vec![Cell::new("t")];
    header.extend(species.iter().map(|s| Cell::new(s)));
    table.add_row(Row::new(header));
    for checkpoint in trajectory.all() {
        let mut cells = vec![Cell::new(&format!("{}", checkpoint.time))];
        cells.extend(
            checkpoint
                .concentrations
                .iter()
                .map(|c| Cell::new(&format!("{:.6e}", c))),
        );
        table.add_row(Row::new(cells));
    }
    table
}

/// initial and equilibrium concentrations with the phase at the network temperature
pub fn equilibrium_table(network: &Network, equilibrium: &[f64]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Species", "Phase", "Initial", "Equilibrium"]);
    let phases = network.phases();
    for (j, name) in network.species_names().iter().enumerate() {
        let phase = phases[j].map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
        table.add_row(Row::new(vec![
            Cell::new(name),
            Cell::new(&phase),
            Cell::new(&format!("{:.6e}", network.concentrations()[j])),
            Cell::new(&format!("{:.6e}", equilibrium[j])),
        ]));
    }
    table
}

pub fn report_table(method: &str, report: &SolverReport) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Method", "Iterations", "Converged", "|r|"]);
    table.add_row(row![
        method,
        report.iterations,
        report.converged,
        format!("{:e}", report.residual_norm)
    ]);
    table
}
