// Simulation error types: construction errors, precondition violations, terminal episodes

use crate::simulation::EpisodeStatus;
use thiserror::Error;

/// Errors reported by the simulation core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Episode already finished ({0:?}); start a new episode")]
    EpisodeOver(EpisodeStatus),
}

pub type SimResult<T> = Result<T, SimError>;
