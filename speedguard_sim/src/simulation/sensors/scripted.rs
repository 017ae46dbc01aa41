// speedguard_sim/src/simulation/sensors/scripted.rs

use speedguard_core::messages::Sample;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use super::{spawn_feed, SampleSource};
use crate::simulation::config::ScriptedSensorConfig;
use crate::simulation::core::error::SensorError;

/// Replays a fixed list of samples taken from the scenario file, partial
/// ones included.
#[derive(Debug, Clone)]
pub struct ScriptedSensor {
    config: ScriptedSensorConfig,
    realtime: bool,
}

impl ScriptedSensor {
    pub fn new(config: ScriptedSensorConfig, realtime: bool) -> Self {
        Self { config, realtime }
    }
}

impl SampleSource for ScriptedSensor {
    fn name(&self) -> &str {
        "scripted"
    }

    fn open(&mut self) -> Result<mpsc::Receiver<Sample>, SensorError> {
        if !self.config.permission_granted {
            return Err(SensorError::PermissionDenied);
        }
        info!(
            samples = self.config.samples.len(),
            "Scripted location sensor started"
        );
        let pace = self
            .realtime
            .then(|| Duration::from_millis(self.config.interval_ms.max(1)));
        Ok(spawn_feed("scripted", self.config.samples.clone(), pace))
    }
}
