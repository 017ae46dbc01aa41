// speedguard_core/src/messages.rs

use serde::{Deserialize, Serialize};

use crate::display::SpeedZone;
use crate::limit::SpeedLimit;
use crate::types::{Kmh, Millis};

// =========================================================================
// == Sensor Input ==
// =========================================================================

/// One observation from the location sensor.
///
/// `speed` is in the sensor's native velocity unit. Platforms do not always
/// fill in accuracy or timestamp, so both are optional. The pipeline treats a
/// missing field as zero instead of dropping the sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    pub speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Millis>,
}

impl Sample {
    pub fn new(speed: f64, accuracy: f64, timestamp: Millis) -> Self {
        Self {
            speed,
            accuracy: Some(accuracy),
            timestamp: Some(timestamp),
        }
    }

    /// A sample carrying only a speed, as some sensors emit while warming up.
    pub fn speed_only(speed: f64) -> Self {
        Self {
            speed,
            ..Default::default()
        }
    }
}

// =========================================================================
// == Pipeline Output ==
// =========================================================================

/// What the display layer gets to see after every accepted sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DisplayState {
    /// km/h rounded to one decimal, forced to zero below the display floor.
    pub current_speed: Kmh,
    pub accuracy: f64,
    pub timestamp: Millis,
}

/// Signal for the alert player. Carries context for logging only; the player
/// itself is parameterless.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertEvent {
    pub triggered_at: Millis,
    pub speed: Kmh,
    pub limit: SpeedLimit,
}

/// The full result of pushing one sample through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOutput {
    pub display: DisplayState,
    /// Filtered and calibrated speed before rounding or flooring. This is the
    /// value compared against the limit.
    pub calibrated_kmh: Kmh,
    pub zone: SpeedZone,
    pub alert: Option<AlertEvent>,
}

/// The frame a session publishes to its display subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayFrame {
    pub state: DisplayState,
    pub zone: SpeedZone,
    pub limit: SpeedLimit,
}
