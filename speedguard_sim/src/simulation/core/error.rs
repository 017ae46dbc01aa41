// speedguard_sim/src/simulation/core/error.rs

use speedguard_core::error::ConfigError;
use thiserror::Error;

/// Why a location sensor could not deliver samples.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SensorError {
    #[error("location permission denied: allow location access for this app and start tracking again")]
    PermissionDenied,

    #[error("location sensor unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the alert player. Never fatal to a session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlertError {
    #[error("alert playback failed: {0}")]
    Playback(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("tracking is already running")]
    AlreadyRunning,

    #[error("tracking is not running")]
    NotRunning,

    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("session worker terminated abnormally: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to load scenario: {0}")]
    Load(#[from] figment::Error),

    #[error("invalid scenario: {0}")]
    Invalid(#[from] ConfigError),
}
