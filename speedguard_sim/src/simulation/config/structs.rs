// speedguard_sim/src/simulation/config/structs.rs

use serde::{Deserialize, Serialize};
use speedguard_core::display::DEFAULT_HISTORY_LEN;
use speedguard_core::error::ConfigError;
use speedguard_core::estimation::filters::scalar_kalman::{
    DEFAULT_MEASUREMENT_NOISE, DEFAULT_PROCESS_NOISE,
};
use speedguard_core::estimation::filters::ScalarKalmanFilter;
use speedguard_core::limit::SpeedLimit;
use speedguard_core::messages::Sample;
use speedguard_core::pipeline::{
    PipelineConfig, DEFAULT_CALIBRATION_OFFSET_KMH, DEFAULT_COOLDOWN_MS, DEFAULT_DISPLAY_FLOOR_KMH,
};
use speedguard_core::types::{Millis, SpeedUnit};

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a `scenario.toml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: Simulation,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub sensor: SensorConfig,
}

impl ScenarioConfig {
    /// Checks everything serde cannot: noise ranges, pipeline constants,
    /// sensor rates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.filter.build()?;
        self.session.pipeline_config().validate()?;
        self.sensor.validate()
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// These map directly to the sections in a scenario.toml file.
// =========================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    /// Optional seed for the pseudo-random number generator for determinism.
    pub seed: Option<u64>,
    /// Pace samples at the sensor rate instead of replaying as fast as possible.
    #[serde(default)]
    pub realtime: bool,
}

/// Which clock the alert cool-down is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CooldownClock {
    /// Wall-clock time when the sample is processed.
    #[default]
    Wall,
    /// The sample's own timestamp. Lets accelerated replays behave like real drives.
    Sample,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SessionConfig {
    pub limit: SpeedLimit,
    pub cooldown_ms: Millis,
    pub calibration_offset_kmh: f64,
    pub display_floor_kmh: f64,
    pub speed_unit: SpeedUnit,
    pub cooldown_clock: CooldownClock,
    pub history_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            limit: SpeedLimit::Disabled,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            calibration_offset_kmh: DEFAULT_CALIBRATION_OFFSET_KMH,
            display_floor_kmh: DEFAULT_DISPLAY_FLOOR_KMH,
            speed_unit: SpeedUnit::default(),
            cooldown_clock: CooldownClock::default(),
            history_len: DEFAULT_HISTORY_LEN,
        }
    }
}

impl SessionConfig {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            speed_unit: self.speed_unit,
            calibration_offset_kmh: self.calibration_offset_kmh,
            display_floor_kmh: self.display_floor_kmh,
            cooldown_ms: self.cooldown_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FilterConfig {
    pub process_noise: f64,
    pub measurement_noise: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            process_noise: DEFAULT_PROCESS_NOISE,
            measurement_noise: DEFAULT_MEASUREMENT_NOISE,
        }
    }
}

impl FilterConfig {
    pub fn build(&self) -> Result<ScalarKalmanFilter<f64>, ConfigError> {
        ScalarKalmanFilter::with_noise(self.process_noise, self.measurement_noise)
    }
}

// =========================================================================
// == Sensors ==
// =========================================================================

// The `tag = "kind"` tells Serde to look for a `kind = "..."` field in the TOML
// to decide which variant to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
#[serde(rename_all = "PascalCase")] // "Synthetic" in TOML maps to Synthetic variant
pub enum SensorConfig {
    Synthetic(SyntheticSensorConfig),
    Scripted(ScriptedSensorConfig),
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig::Synthetic(SyntheticSensorConfig::default())
    }
}

impl SensorConfig {
    // Helper to get the string identifier for logging
    pub fn get_kind_str(&self) -> &str {
        match self {
            SensorConfig::Synthetic(_) => "Synthetic",
            SensorConfig::Scripted(_) => "Scripted",
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            SensorConfig::Synthetic(c) => c.validate(),
            SensorConfig::Scripted(_) => Ok(()),
        }
    }
}

/// Fastest fix rate a synthetic sensor may be configured with.
pub const MAX_RATE_HZ: f64 = 1_000.0;

/// Upper bound on the number of fixes one synthetic drive may produce.
pub const MAX_SYNTHETIC_FIXES: usize = 1_000_000;

/// One leg of a synthetic drive: hold `speed` (sensor units) for `duration_s`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSegment {
    pub duration_s: f64,
    pub speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SyntheticSensorConfig {
    /// Fixes per second.
    pub rate_hz: f64,
    /// Standard deviation of the Gaussian noise added to each speed, in sensor units.
    pub speed_noise_stddev: f64,
    /// Reported horizontal accuracy in metres.
    pub accuracy_m: f64,
    pub profile: Vec<ProfileSegment>,
    pub permission_granted: bool,
}

impl Default for SyntheticSensorConfig {
    fn default() -> Self {
        Self {
            rate_hz: 1.0,
            speed_noise_stddev: 0.5,
            accuracy_m: 5.0,
            profile: vec![
                ProfileSegment { duration_s: 5.0, speed: 0.0 },
                ProfileSegment { duration_s: 20.0, speed: 13.9 },
                ProfileSegment { duration_s: 15.0, speed: 19.4 },
                ProfileSegment { duration_s: 5.0, speed: 0.0 },
            ],
            permission_granted: true,
        }
    }
}

impl SyntheticSensorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rate_hz.is_finite() && self.rate_hz > 0.0 && self.rate_hz <= MAX_RATE_HZ) {
            return Err(ConfigError::OutOfRange {
                name: "rate_hz",
                value: self.rate_hz,
                min: 0.0,
                max: MAX_RATE_HZ,
            });
        }
        if !(self.speed_noise_stddev.is_finite() && self.speed_noise_stddev >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "speed_noise_stddev",
                value: self.speed_noise_stddev,
            });
        }
        for segment in &self.profile {
            if !(segment.duration_s.is_finite() && segment.duration_s >= 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name: "duration_s",
                    value: segment.duration_s,
                });
            }
            if !segment.speed.is_finite() {
                return Err(ConfigError::InvalidParameter {
                    name: "speed",
                    value: segment.speed,
                });
            }
        }
        let fixes = self.fix_count();
        if fixes > MAX_SYNTHETIC_FIXES {
            return Err(ConfigError::OutOfRange {
                name: "fix count",
                value: fixes as f64,
                min: 0.0,
                max: MAX_SYNTHETIC_FIXES as f64,
            });
        }
        Ok(())
    }

    /// Fixes in one segment at the configured rate.
    pub fn segment_fixes(&self, segment: &ProfileSegment) -> usize {
        (segment.duration_s * self.rate_hz).round().max(0.0) as usize
    }

    /// Total fixes the whole profile produces.
    pub fn fix_count(&self) -> usize {
        self.profile
            .iter()
            .map(|s| self.segment_fixes(s))
            .fold(0usize, usize::saturating_add)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ScriptedSensorConfig {
    pub samples: Vec<Sample>,
    /// Gap between samples when pacing in real time.
    pub interval_ms: Millis,
    pub permission_granted: bool,
}

impl Default for ScriptedSensorConfig {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            interval_ms: 1_000,
            permission_granted: true,
        }
    }
}
