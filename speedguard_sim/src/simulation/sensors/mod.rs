// speedguard_sim/src/simulation/sensors/mod.rs

//! Location-sensor collaborators. Each one turns into a stream of `Sample`s
//! on a bounded channel; dropping the receiving end is how a subscription is
//! released.

use speedguard_core::messages::Sample;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::simulation::config::{ScenarioConfig, SensorConfig};
use crate::simulation::core::error::SensorError;
use crate::simulation::core::prng::SimulationRng;

pub mod channel;
pub mod scripted;
pub mod synthetic;

pub use channel::ChannelSensor;
pub use scripted::ScriptedSensor;
pub use synthetic::SyntheticSensor;

/// Buffer between a sensor task and the session worker.
pub const SENSOR_CHANNEL_CAPACITY: usize = 64;

/// The contract for anything that can feed a tracking session.
pub trait SampleSource: Send {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Subscribes to the sensor. Must be called from within a tokio runtime
    /// because producers run as tasks.
    fn open(&mut self) -> Result<mpsc::Receiver<Sample>, SensorError>;
}

/// Builds the sensor described by a scenario.
pub fn build_source(config: &ScenarioConfig) -> Box<dyn SampleSource> {
    let realtime = config.simulation.realtime;
    match &config.sensor {
        SensorConfig::Synthetic(synthetic) => Box::new(SyntheticSensor::new(
            synthetic.clone(),
            SimulationRng::from_seed_option(config.simulation.seed),
            realtime,
        )),
        SensorConfig::Scripted(scripted) => Box::new(ScriptedSensor::new(scripted.clone(), realtime)),
    }
}

/// Spawns a producer that feeds `samples` in order, optionally one per
/// `pace`. It stops early once the subscriber is gone.
pub(crate) fn spawn_feed(
    name: &'static str,
    samples: Vec<Sample>,
    pace: Option<Duration>,
) -> mpsc::Receiver<Sample> {
    let (tx, rx) = mpsc::channel(SENSOR_CHANNEL_CAPACITY);
    tokio::spawn(async move {
        let mut ticker = pace.map(tokio::time::interval);
        for sample in samples {
            if let Some(ticker) = ticker.as_mut() {
                ticker.tick().await;
            }
            if tx.send(sample).await.is_err() {
                debug!(sensor = name, "subscriber released, stopping feed");
                return;
            }
        }
        debug!(sensor = name, "feed exhausted");
    });
    rx
}
