// speedguard_sim/src/simulation/sensors/channel.rs

use speedguard_core::messages::Sample;
use tokio::sync::mpsc;

use super::{SampleSource, SENSOR_CHANNEL_CAPACITY};
use crate::simulation::core::error::SensorError;

/// Adapter for hosts that already receive fixes from a platform callback:
/// push them into the returned sender and hand this source to a session.
#[derive(Debug)]
pub struct ChannelSensor {
    receiver: Option<mpsc::Receiver<Sample>>,
}

impl ChannelSensor {
    pub fn new() -> (Self, mpsc::Sender<Sample>) {
        Self::with_capacity(SENSOR_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Sender<Sample>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { receiver: Some(rx) }, tx)
    }
}

impl SampleSource for ChannelSensor {
    fn name(&self) -> &str {
        "channel"
    }

    fn open(&mut self) -> Result<mpsc::Receiver<Sample>, SensorError> {
        self.receiver
            .take()
            .ok_or_else(|| SensorError::Unavailable("channel sensor can only be opened once".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_once() {
        let (mut sensor, tx) = ChannelSensor::new();
        let mut rx = sensor.open().unwrap();
        tx.send(Sample::speed_only(3.0)).await.unwrap();
        assert_eq!(rx.recv().await, Some(Sample::speed_only(3.0)));
        assert!(matches!(sensor.open(), Err(SensorError::Unavailable(_))));
    }
}
