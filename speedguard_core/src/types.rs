// speedguard_core/src/types.rs

use serde::{Deserialize, Serialize};

// --- Core Type Aliases ---
/// Milliseconds since the Unix epoch (or since an arbitrary origin for replays).
pub type Millis = u64;
/// A speed expressed in kilometres per hour.
pub type Kmh = f64;

// --- Sensor velocity units ---
/// The unit a location sensor reports its speed in.
///
/// Most platform location APIs deliver metres per second, which is the
/// default. Other units are here for sensors that do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedUnit {
    #[default]
    MetersPerSecond,
    KilometersPerHour,
    MilesPerHour,
    Knots,
}

impl SpeedUnit {
    /// Factor that converts one unit of this speed into km/h.
    pub const fn kmh_factor(self) -> f64 {
        match self {
            SpeedUnit::MetersPerSecond => 3.6,
            SpeedUnit::KilometersPerHour => 1.0,
            SpeedUnit::MilesPerHour => 1.609_344,
            SpeedUnit::Knots => 1.852,
        }
    }

    /// Converts a raw sensor reading into km/h.
    pub fn to_kmh(self, value: f64) -> Kmh {
        value * self.kmh_factor()
    }
}
