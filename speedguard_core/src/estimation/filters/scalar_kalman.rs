// speedguard_core/src/estimation/filters/scalar_kalman.rs

use num_traits::Float;
use std::any::Any;

use crate::error::ConfigError;
use crate::estimation::SpeedFilter;
use crate::types::Kmh;

/// Process noise covariance (Q) used when no override is given.
pub const DEFAULT_PROCESS_NOISE: f64 = 0.01;
/// Measurement noise covariance (R) used when no override is given.
pub const DEFAULT_MEASUREMENT_NOISE: f64 = 0.1;
/// Error covariance (P) of a freshly constructed filter.
pub const INITIAL_COVARIANCE: f64 = 1.0;

/// A one-dimensional recursive Kalman estimator.
///
/// The state is a single scalar with a random-walk process model, which is
/// all a speedometer needs to take the jitter out of consecutive fixes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarKalmanFilter<T = f64> {
    /// Measurement noise covariance (R).
    measurement_noise_r: T,
    /// Process noise covariance (Q).
    process_noise_q: T,
    /// Current error covariance (P).
    covariance_p: T,
    /// Current estimate (x).
    estimate_x: T,
    /// Gain used by the most recent update (K).
    gain_k: T,
}

/// Converts one of the f64 constants above into the filter's scalar type.
/// `Float::from` is infallible for every primitive float.
fn constant<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

impl<T: Float> ScalarKalmanFilter<T> {
    /// Creates a filter with the built-in noise constants.
    pub fn new() -> Self {
        Self::from_noise(
            constant(DEFAULT_PROCESS_NOISE),
            constant(DEFAULT_MEASUREMENT_NOISE),
        )
    }

    /// Creates a filter with custom process (`q`) and measurement (`r`) noise.
    pub fn with_noise(q: T, r: T) -> Result<Self, ConfigError> {
        Self::check_noise("process_noise", q)?;
        Self::check_noise("measurement_noise", r)?;
        Ok(Self::from_noise(q, r))
    }

    fn check_noise(name: &'static str, value: T) -> Result<(), ConfigError> {
        if value.is_finite() && value >= T::zero() {
            Ok(())
        } else {
            Err(ConfigError::InvalidNoise {
                name,
                value: value.to_f64().unwrap_or(f64::NAN),
            })
        }
    }

    fn from_noise(q: T, r: T) -> Self {
        Self {
            measurement_noise_r: r,
            process_noise_q: q,
            covariance_p: constant(INITIAL_COVARIANCE),
            estimate_x: T::zero(),
            gain_k: T::zero(),
        }
    }

    /// Runs one predict/correct cycle and returns the new estimate.
    pub fn update(&mut self, measurement: T) -> T {
        // 1. Predict: the random walk only grows the uncertainty.
        let p_pred = self.covariance_p + self.process_noise_q;

        // 2. Gain. With R = 0 and nothing left to predict the measurement is exact.
        let innovation_var = p_pred + self.measurement_noise_r;
        let k = if innovation_var > T::zero() {
            p_pred / innovation_var
        } else {
            T::one()
        };

        // 3./4. Correct the estimate and shrink the covariance.
        self.estimate_x = self.estimate_x + k * (measurement - self.estimate_x);
        self.covariance_p = (T::one() - k) * p_pred;
        self.gain_k = k;

        self.estimate_x
    }

    pub fn estimate(&self) -> T {
        self.estimate_x
    }

    pub fn covariance(&self) -> T {
        self.covariance_p
    }

    pub fn gain(&self) -> T {
        self.gain_k
    }

    pub fn process_noise(&self) -> T {
        self.process_noise_q
    }

    pub fn measurement_noise(&self) -> T {
        self.measurement_noise_r
    }

    /// Returns to the initial state while keeping the noise constants.
    pub fn reset(&mut self) {
        *self = Self::from_noise(self.process_noise_q, self.measurement_noise_r);
    }
}

impl<T: Float> Default for ScalarKalmanFilter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedFilter for ScalarKalmanFilter<f64> {
    fn update(&mut self, measurement: Kmh) -> Kmh {
        ScalarKalmanFilter::update(self, measurement)
    }

    fn estimate(&self) -> Kmh {
        self.estimate_x
    }

    fn reset(&mut self) {
        ScalarKalmanFilter::reset(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
