// speedguard_core/src/estimation/mod.rs

use dyn_clone::DynClone;
use std::any::Any;
use std::fmt::Debug;

use crate::types::Kmh;

/// The contract for any algorithm that smooths the speed signal.
///
/// A session keeps a boxed prototype and clones a fresh instance every time
/// tracking starts, so implementations must be cheap to clone and must not
/// share state between clones.
pub trait SpeedFilter: DynClone + Debug + Send + Sync {
    /// Folds one measurement (km/h) into the estimate and returns the new
    /// estimate. Called once per sample, in arrival order.
    fn update(&mut self, measurement: Kmh) -> Kmh;

    /// Returns the current best estimate without consuming a measurement.
    fn estimate(&self) -> Kmh;

    /// Puts the filter back into its initial state.
    fn reset(&mut self);

    /// Allows for dynamic downcasting to access algorithm-specific methods if needed.
    fn as_any(&self) -> &dyn Any;
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn SpeedFilter>`.
dyn_clone::clone_trait_object!(SpeedFilter);

pub mod filters;
