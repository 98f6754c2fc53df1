//! Errors raised while building a simulation.

use thiserror::Error;

/// An error raised while constructing a network, fleet or configuration.
///
/// Steady-state anomalies (blocked trains, over-capacity segments) are never
/// reported through this type; they surface as [Alert](crate::Alert)s instead.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The network description is malformed.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),
    /// A train description references something that does not exist.
    #[error("invalid train `{train}`: {reason}")]
    InvalidTrain { train: String, reason: String },
    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A JSON document could not be read or written.
    #[error("invalid JSON document")]
    Json(#[from] serde_json::Error),
}

impl SimulationError {
    pub(crate) fn topology(reason: impl Into<String>) -> Self {
        Self::InvalidTopology(reason.into())
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    pub(crate) fn train(train: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTrain {
            train: train.to_owned(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
