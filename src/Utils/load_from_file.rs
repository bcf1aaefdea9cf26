use crate::errors::ChemError;
use crate::settings::SimulationTask;
use log::{error, info};
use std::fs;
use std::path::Path;

/// Parses a JSON task document. On a syntax or schema error the line, the column and the
/// offending line of the document are logged before the error is returned.
pub fn parse_task(document: &str) -> Result<SimulationTask, ChemError> {
    match serde_json::from_str::<SimulationTask>(document) {
        Ok(task) => {
            info!(
                "task parsed: {} compounds with phase data, {} reactions",
                task.compounds.len(),
                task.reactions.len()
            );
            Ok(task)
        }
        Err(e) => {
            let (line, column) = (e.line(), e.column());
            error!(
                "Error parsing task at line {}, column {}: {}",
                line, column, e
            );
            if let Some(problem_line) = document.lines().nth(line.saturating_sub(1)) {
                error!("Problematic line: {}", problem_line);
                if column >= 1 && column <= problem_line.len() {
                    error!("{}", " ".repeat(column - 1) + "^");
                }
            }
            Err(ChemError::Serde(e))
        }
    }
}

/// Reads a task file (see `settings` for the format).
pub fn load_task(file_name: &str) -> Result<SimulationTask, ChemError> {
    let path = Path::new(file_name);
    if !path.exists() {
        error!("File '{}' does not exist", file_name);
        return Err(ChemError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("file '{}' does not exist", file_name),
        )));
    }
    let document = fs::read_to_string(path)?;
    info!("loading task from '{}'", file_name);
    parse_task(&document)
}

/// Writes the task as pretty-printed JSON.
pub fn save_task(task: &SimulationTask, file_name: &str) -> Result<(), ChemError> {
    let document = serde_json::to_string_pretty(task)?;
    fs::write(file_name, document)?;
    info!("task saved to '{}'", file_name);
    Ok(())
}
