// speedguard_core/src/display/mod.rs

//! Turns filtered speeds into what the speedometer shows: a rounded number,
//! a colour zone, and a short rolling history for the chart.

use serde::Serialize;

use crate::limit::SpeedLimit;
use crate::types::Kmh;

mod history;

pub use history::{SpeedHistory, DEFAULT_HISTORY_LEN};

/// Fraction of the limit at which the speedometer turns amber.
pub const APPROACHING_RATIO: f64 = 0.9;

/// Colour-coded band of the speedometer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SpeedZone {
    /// Green: comfortably below the limit, or no limit selected.
    #[default]
    Normal,
    /// Amber: within the last 10 % below the limit.
    Approaching,
    /// Red: at or above the limit.
    Exceeded,
}

impl SpeedZone {
    /// Classifies the unfloored speed, the same value the alert decision uses.
    pub fn classify(speed: Kmh, limit: SpeedLimit) -> Self {
        match limit.as_kmh() {
            None => SpeedZone::Normal,
            Some(l) if speed >= l => SpeedZone::Exceeded,
            Some(l) if speed >= l * APPROACHING_RATIO => SpeedZone::Approaching,
            Some(_) => SpeedZone::Normal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeedZone::Normal => "normal",
            SpeedZone::Approaching => "approaching",
            SpeedZone::Exceeded => "exceeded",
        }
    }
}

/// Rounds to one decimal place, halves away from zero.
pub fn round_to_tenth(value: Kmh) -> Kmh {
    (value * 10.0).round() / 10.0
}

/// The number shown on the speedometer. Anything below `floor_kmh` is shown
/// as a flat zero so a parked device does not flicker.
///
/// The floor is compared before rounding: 1.96 against a floor of 2.0 shows
/// 0.0, not 2.0.
pub fn display_speed(calibrated: Kmh, floor_kmh: Kmh) -> Kmh {
    if calibrated < floor_kmh {
        0.0
    } else {
        round_to_tenth(calibrated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rounds_to_one_decimal() {
        assert_abs_diff_eq!(round_to_tenth(37.04), 37.0, epsilon = 1e-12);
        assert_abs_diff_eq!(round_to_tenth(37.06), 37.1, epsilon = 1e-12);
        assert_abs_diff_eq!(round_to_tenth(1.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn speeds_below_floor_display_as_zero() {
        assert_eq!(display_speed(1.0, 2.0), 0.0);
        assert_eq!(display_speed(1.99, 2.0), 0.0);
        assert_abs_diff_eq!(display_speed(2.0, 2.0), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(display_speed(54.26, 2.0), 54.3, epsilon = 1e-12);
    }

    #[test]
    fn floor_is_checked_before_rounding() {
        assert_eq!(display_speed(1.96, 2.0), 0.0);
        assert_abs_diff_eq!(display_speed(2.04, 2.0), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn zones_follow_the_limit() {
        let limit = SpeedLimit::Kmh(50);
        assert_eq!(SpeedZone::classify(30.0, limit), SpeedZone::Normal);
        assert_eq!(SpeedZone::classify(46.0, limit), SpeedZone::Approaching);
        assert_eq!(SpeedZone::classify(50.0, limit), SpeedZone::Exceeded);
        assert_eq!(SpeedZone::classify(500.0, SpeedLimit::Disabled), SpeedZone::Normal);
    }
}
