// speedguard_core/src/pipeline/mod.rs

//! The per-sample path from a raw sensor reading to a display state and an
//! optional alert.

use tracing::{debug, trace};

use crate::display::{display_speed, SpeedZone};
use crate::error::{ConfigError, SampleError};
use crate::estimation::filters::ScalarKalmanFilter;
use crate::estimation::SpeedFilter;
use crate::limit::SpeedLimit;
use crate::messages::{AlertEvent, DisplayState, PipelineOutput, Sample};
use crate::types::{Kmh, Millis, SpeedUnit};

mod cooldown;

pub use cooldown::{AlertCooldown, DEFAULT_COOLDOWN_MS};

/// Added to the filtered speed. Chosen empirically against a reference
/// speedometer; not expected to hold for other devices.
pub const DEFAULT_CALIBRATION_OFFSET_KMH: Kmh = 1.0;
/// Below this the display shows zero.
pub const DEFAULT_DISPLAY_FLOOR_KMH: Kmh = 2.0;

/// Tunables of the sample pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub speed_unit: SpeedUnit,
    pub calibration_offset_kmh: Kmh,
    pub display_floor_kmh: Kmh,
    pub cooldown_ms: Millis,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            speed_unit: SpeedUnit::MetersPerSecond,
            calibration_offset_kmh: DEFAULT_CALIBRATION_OFFSET_KMH,
            display_floor_kmh: DEFAULT_DISPLAY_FLOOR_KMH,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.calibration_offset_kmh.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "calibration_offset_kmh",
                value: self.calibration_offset_kmh,
            });
        }
        if !self.display_floor_kmh.is_finite() || self.display_floor_kmh < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "display_floor_kmh",
                value: self.display_floor_kmh,
            });
        }
        Ok(())
    }
}

/// Owns one filter and one cool-down for the lifetime of a tracking session.
#[derive(Debug, Clone)]
pub struct SamplePipeline {
    config: PipelineConfig,
    filter: Box<dyn SpeedFilter>,
    cooldown: AlertCooldown,
}

impl SamplePipeline {
    pub fn new(config: PipelineConfig, filter: Box<dyn SpeedFilter>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            cooldown: AlertCooldown::new(config.cooldown_ms),
            config,
            filter,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn filter(&self) -> &dyn SpeedFilter {
        self.filter.as_ref()
    }

    pub fn cooldown(&self) -> &AlertCooldown {
        &self.cooldown
    }

    /// Pushes one sample through convert → filter → calibrate → display →
    /// limit check.
    ///
    /// `now_ms` is the time the cool-down is measured against. A non-finite
    /// speed is rejected before it can reach the filter; the caller should
    /// skip the cycle and keep consuming.
    pub fn process(
        &mut self,
        sample: &Sample,
        limit: SpeedLimit,
        now_ms: Millis,
    ) -> Result<PipelineOutput, SampleError> {
        if !sample.speed.is_finite() {
            return Err(SampleError::NonFiniteSpeed(sample.speed));
        }

        // 1. Clamp, then convert to km/h.
        let measured_kmh = self.config.speed_unit.to_kmh(sample.speed.max(0.0));

        // 2./3. Smooth and calibrate.
        let filtered_kmh = self.filter.update(measured_kmh);
        let calibrated_kmh = filtered_kmh + self.config.calibration_offset_kmh;

        // 4. Display value. The floor never feeds back into the alert decision.
        let state = DisplayState {
            current_speed: display_speed(calibrated_kmh, self.config.display_floor_kmh),
            accuracy: sample.accuracy.unwrap_or(0.0),
            timestamp: sample.timestamp.unwrap_or(0),
        };

        let shown = state.current_speed;
        trace!(measured_kmh, filtered_kmh, shown, "sample processed");

        // 5. Limit check with cool-down.
        let alert = if limit.is_exceeded_by(calibrated_kmh) {
            if self.cooldown.try_trigger(now_ms) {
                debug!(speed = calibrated_kmh, %limit, "speed limit exceeded, alert armed");
                Some(AlertEvent {
                    triggered_at: now_ms,
                    speed: calibrated_kmh,
                    limit,
                })
            } else {
                trace!(
                    remaining_ms = self.cooldown.remaining_ms(now_ms),
                    "over limit, alert cooling down"
                );
                None
            }
        } else {
            None
        };

        Ok(PipelineOutput {
            display: state,
            calibrated_kmh,
            zone: SpeedZone::classify(calibrated_kmh, limit),
            alert,
        })
    }
}

impl Default for SamplePipeline {
    fn default() -> Self {
        Self {
            config: PipelineConfig::default(),
            filter: Box::new(ScalarKalmanFilter::<f64>::new()),
            cooldown: AlertCooldown::default(),
        }
    }
}
