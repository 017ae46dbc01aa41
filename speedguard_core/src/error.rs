// speedguard_core/src/error.rs

use thiserror::Error;

/// Errors raised while building filters, pipelines or limits from user input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("noise covariance '{name}' must be finite and non-negative, got {value}")]
    InvalidNoise { name: &'static str, value: f64 },

    #[error("{value} km/h is not one of the selectable speed limits")]
    UnsupportedLimit { value: u32 },

    #[error("could not parse speed limit from '{0}'")]
    UnparsableLimit(String),

    #[error("parameter '{name}' must be finite and non-negative, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("parameter '{name}' must be in ({min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Errors for a single incoming sample. These never end the stream; the
/// caller drops the sample and waits for the next one.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SampleError {
    #[error("speed reading is not a finite number ({0})")]
    NonFiniteSpeed(f64),
}
