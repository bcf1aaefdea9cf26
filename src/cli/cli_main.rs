//! Non-interactive batch runner.
//!
//! ```text
//! kireact <task.json>     run the kinetics and/or equilibrium sections of the task
//! kireact examples        run the worked examples
//! kireact                 same as `examples`
//! ```
use crate::Examples::equilibrium_examples::equilibrium_examples;
use crate::Examples::kinetics_examples::kin_examples;
use crate::Kinetics::mass_action_IVP::{KineticsIntegrator, Trajectory};
use crate::Kinetics::stoichiometry_analyzer::Network;
use crate::Thermodynamics::ChemEquilibrium::EquilibriumSolver::{EquilibriumSolver, SolverReport};
use crate::Utils::load_from_file::load_task;
use crate::Utils::output::{equilibrium_table, network_table, report_table, trajectory_table};
use crate::errors::ChemError;
use crate::settings::SimulationTask;
use log::info;

/// results of one task
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// network as built from the task, before integration
    pub network: Network,
    pub trajectory: Option<Trajectory>,
    pub equilibrium: Option<(Vec<f64>, SolverReport)>,
}

/// Builds the network and runs every section present in the task. Both sections start from the
/// initial concentrations of the task.
pub fn run_task(task: &SimulationTask) -> Result<TaskOutcome, ChemError> {
    let network = task.build_network()?;
    let trajectory = match &task.kinetics {
        Some(settings) => {
            let policy = settings.policy()?;
            let mut integrator = KineticsIntegrator::new();
            integrator.fit(network.clone());
            Some(integrator.integrate(
                settings.duration,
                settings.step_size,
                &settings.checkpoint_times,
                policy,
            )?)
        }
        None => None,
    };
    let equilibrium = match &task.equilibrium {
        Some(settings) => {
            let method = settings.method()?;
            let params = settings.params(&method);
            let mut solver = EquilibriumSolver::new(method);
            solver.fit(&network);
            let c = solver.solve(&params)?;
            let report = solver
                .report()
                .cloned()
                .ok_or_else(|| ChemError::state("solver finished without a report"))?;
            Some((c, report))
        }
        None => None,
    };
    if trajectory.is_none() && equilibrium.is_none() {
        info!("task has neither kinetics nor equilibrium section, only the network is built");
    }
    Ok(TaskOutcome {
        network,
        trajectory,
        equilibrium,
    })
}

pub fn print_outcome(task: &SimulationTask, outcome: &TaskOutcome) {
    println!("____________________REACTIONS_________________________");
    network_table(&outcome.network).printstd();
    if let Some(trajectory) = &outcome.trajectory {
        println!("____________________KINETICS_________________________");
        trajectory_table(&outcome.network.species_names(), trajectory).printstd();
    }
    if let Some((c, report)) = &outcome.equilibrium {
        println!("____________________EQUILIBRIUM_________________________");
        equilibrium_table(&outcome.network, c).printstd();
        let method = task
            .equilibrium
            .as_ref()
            .map(|s| s.method.as_str())
            .unwrap_or("-");
        report_table(method, report).printstd();
    }
}

pub fn run_examples() -> Result<(), ChemError> {
    for task in 0..4 {
        kin_examples(task)?;
    }
    for task in 0..4 {
        equilibrium_examples(task)?;
    }
    Ok(())
}

/// `args` without the program name
pub fn run(args: &[String]) -> Result<(), ChemError> {
    match args.first().map(|s| s.as_str()) {
        None | Some("examples") => run_examples(),
        Some("-h") | Some("--help") => {
            println!("usage: kireact [<task.json> | examples]");
            Ok(())
        }
        Some(file_name) => {
            let task = load_task(file_name)?;
            let outcome = run_task(&task)?;
            print_outcome(&task, &outcome);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TASK: &str = r#"{
        "reactions": [
            { "reactants": [ { "formula": "A", "concentration": 1.0 } ],
              "products": [ { "formula": "B" } ],
              "kf": 1.0, "kb": 1.0 }
        ],
        "kinetics": { "duration": 10.0, "step_size": 0.001, "checkpoint_times": [1.0, 5.0] },
        "equilibrium": { "method": "newton" }
    }"#;

    #[test]
    fn test_run_task_both_sections() {
        let task: SimulationTask = serde_json::from_str(TASK).unwrap();
        let outcome = run_task(&task).unwrap();
        let trajectory = outcome.trajectory.unwrap();
        assert_eq!(trajectory.checkpoints.len(), 2);
        let (c, report) = outcome.equilibrium.unwrap();
        assert!(report.converged);
        // kinetics relax to the same state the solver finds for K = kf/kb
        for (kin, eq) in trajectory.final_state.concentrations.iter().zip(c.iter()) {
            assert_relative_eq!(*kin, *eq, epsilon = 1e-6);
        }
        // the network of the outcome keeps the initial state
        assert_relative_eq!(outcome.network.concentrations()[0], 1.0);
    }

    #[test]
    fn test_run_task_bad_policy() {
        let task: SimulationTask = serde_json::from_str(
            &TASK.replace("\"checkpoint_times\"", "\"negative_policy\": \"round\", \"checkpoint_times\""),
        )
        .unwrap();
        assert!(matches!(run_task(&task), Err(ChemError::Configuration(_))));
    }

    #[test]
    fn test_run_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TASK.as_bytes()).unwrap();
        let args = vec![file.path().to_str().unwrap().to_string()];
        assert!(run(&args).is_ok());
        assert!(matches!(
            run(&["no_such_task.json".to_string()]),
            Err(ChemError::Io(_))
        ));
    }
}
