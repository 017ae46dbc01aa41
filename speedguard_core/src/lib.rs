// speedguard_core/src/lib.rs

// This file defines the public modules of the library.
pub mod clock;
pub mod display;
pub mod error;
pub mod estimation;
pub mod limit;
pub mod messages;
pub mod pipeline;
pub mod prelude;
pub mod types;
