// speedguard_sim/src/lib.rs

// This prelude is for convenience for other files WITHIN the speedguard_sim crate.
pub mod prelude;

// This module contains all the runtime-specific logic.
pub mod cli;
pub mod runner;
pub mod simulation;

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,speedguard_core=debug,speedguard_sim=debug";
