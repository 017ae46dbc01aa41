// speedguard_core/src/limit.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Kmh;

/// The limits a user can pick from, in km/h.
pub const LIMIT_PRESETS_KMH: [u32; 12] = [20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120, 130];

/// The active speed limit. `Disabled` is the "no limit" sentinel: while it is
/// selected the pipeline never raises an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawLimit", into = "RawLimit")]
pub enum SpeedLimit {
    #[default]
    Disabled,
    Kmh(u32),
}

impl SpeedLimit {
    /// Builds a limit from one of the presets.
    pub fn preset(kmh: u32) -> Result<Self, ConfigError> {
        if LIMIT_PRESETS_KMH.contains(&kmh) {
            Ok(SpeedLimit::Kmh(kmh))
        } else {
            Err(ConfigError::UnsupportedLimit { value: kmh })
        }
    }

    /// Every selectable value, sentinel first.
    pub fn all() -> impl Iterator<Item = SpeedLimit> {
        std::iter::once(SpeedLimit::Disabled).chain(LIMIT_PRESETS_KMH.iter().map(|&v| SpeedLimit::Kmh(v)))
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, SpeedLimit::Kmh(_))
    }

    pub fn as_kmh(self) -> Option<Kmh> {
        match self {
            SpeedLimit::Disabled => None,
            SpeedLimit::Kmh(v) => Some(v as Kmh),
        }
    }

    /// True when `speed` meets or exceeds an enabled limit.
    pub fn is_exceeded_by(self, speed: Kmh) -> bool {
        self.as_kmh().is_some_and(|limit| speed >= limit)
    }
}

impl fmt::Display for SpeedLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedLimit::Disabled => write!(f, "off"),
            SpeedLimit::Kmh(v) => write!(f, "{} km/h", v),
        }
    }
}

impl FromStr for SpeedLimit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "off" | "none" | "disabled" => Ok(SpeedLimit::Disabled),
            other => {
                let value = other
                    .trim_end_matches("km/h")
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| ConfigError::UnparsableLimit(trimmed.to_string()))?;
                SpeedLimit::preset(value)
            }
        }
    }
}

// --- Serde bridge ---
// TOML lets the user write either `limit = 60` or `limit = "off"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawLimit {
    Kmh(u32),
    Word(String),
}

impl TryFrom<RawLimit> for SpeedLimit {
    type Error = ConfigError;

    fn try_from(raw: RawLimit) -> Result<Self, Self::Error> {
        match raw {
            RawLimit::Kmh(v) => SpeedLimit::preset(v),
            RawLimit::Word(s) => s.parse(),
        }
    }
}

impl From<SpeedLimit> for RawLimit {
    fn from(limit: SpeedLimit) -> Self {
        match limit {
            SpeedLimit::Disabled => RawLimit::Word("off".to_string()),
            SpeedLimit::Kmh(v) => RawLimit::Kmh(v),
        }
    }
}
