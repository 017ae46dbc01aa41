// speedguard_core/src/estimation/filters/mod.rs

pub mod scalar_kalman;

pub use scalar_kalman::ScalarKalmanFilter;
