//! Error taxonomy shared by the network model, the kinetics integrator and the equilibrium solver.
use thiserror::Error;

/// error types for network construction, integration and equilibrium solving
#[derive(Debug, Error)]
pub enum ChemError {
    /// malformed network construction input: empty reaction, non-positive coefficient...
    #[error("Validation error: {0}")]
    Validation(String),
    /// integration or solving requested before `fit`
    #[error("State error: {0}")]
    State(String),
    /// unrecognized policy/method name or out-of-range numeric option
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to deserialize task data: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ChemError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ChemError::Validation(msg.into())
    }
    pub fn state(msg: impl Into<String>) -> Self {
        ChemError::State(msg.into())
    }
    pub fn configuration(msg: impl Into<String>) -> Self {
        ChemError::Configuration(msg.into())
    }
}
