// speedguard_sim/src/simulation/sensors/synthetic.rs

use rand_distr::{Distribution, Normal};
use speedguard_core::clock::unix_time_ms;
use speedguard_core::messages::Sample;
use speedguard_core::types::Millis;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use super::{spawn_feed, SampleSource};
use crate::simulation::config::SyntheticSensorConfig;
use crate::simulation::core::error::SensorError;
use crate::simulation::core::prng::SimulationRng;

/// Simulates a phone GPS following a piecewise-constant speed profile with
/// Gaussian noise on every fix.
#[derive(Debug)]
pub struct SyntheticSensor {
    config: SyntheticSensorConfig,
    rng: SimulationRng,
    realtime: bool,
    start_ms: Option<Millis>,
}

impl SyntheticSensor {
    pub fn new(config: SyntheticSensorConfig, rng: SimulationRng, realtime: bool) -> Self {
        Self {
            config,
            rng,
            realtime,
            start_ms: None,
        }
    }

    /// Pins the timestamp of the first fix. Defaults to the wall clock at `open()`.
    pub fn with_start_ms(mut self, start_ms: Millis) -> Self {
        self.start_ms = Some(start_ms);
        self
    }

    fn period(&self) -> Result<Duration, SensorError> {
        Duration::try_from_secs_f64(1.0 / self.config.rate_hz)
            .map_err(|e| SensorError::Unavailable(format!("invalid fix rate {} Hz: {}", self.config.rate_hz, e)))
    }

    /// Produces the whole drive up front so a seed fully determines it.
    pub fn generate(&mut self, start_ms: Millis) -> Result<Vec<Sample>, SensorError> {
        self.config
            .validate()
            .map_err(|e| SensorError::Unavailable(e.to_string()))?;
        let noise = Normal::new(0.0, self.config.speed_noise_stddev)
            .map_err(|e| SensorError::Unavailable(format!("invalid speed noise: {}", e)))?;

        let period_ms = self.period()?.as_millis() as Millis;
        let mut t = start_ms;
        let mut samples = Vec::with_capacity(self.config.fix_count());

        for segment in &self.config.profile {
            for _ in 0..self.config.segment_fixes(segment) {
                let speed = segment.speed + noise.sample(&mut self.rng.0);
                samples.push(Sample::new(speed, self.config.accuracy_m, t));
                t = t.saturating_add(period_ms);
            }
        }
        Ok(samples)
    }
}

impl SampleSource for SyntheticSensor {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn open(&mut self) -> Result<mpsc::Receiver<Sample>, SensorError> {
        if !self.config.permission_granted {
            return Err(SensorError::PermissionDenied);
        }
        let start_ms = self.start_ms.unwrap_or_else(unix_time_ms);
        let samples = self.generate(start_ms)?;
        info!(
            fixes = samples.len(),
            rate_hz = self.config.rate_hz,
            realtime = self.realtime,
            "Synthetic location sensor started"
        );
        let pace = if self.realtime { Some(self.period()?) } else { None };
        Ok(spawn_feed("synthetic", samples, pace))
    }
}
