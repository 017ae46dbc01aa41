// speedguard_sim/src/simulation/core/mod.rs

pub mod error;
pub mod prng;
pub mod session;
