// speedguard_sim/src/simulation/mod.rs

pub mod alerting;
pub mod config;
pub mod core;
pub mod display;
pub mod sensors;
