// speedguard_sim/src/prelude.rs

// Re-export the entire speedguard_core prelude so you can easily access
// pure types like `Sample`, `SpeedLimit`, `SpeedFilter`, etc.
pub use speedguard_core::prelude::*;

// Re-export common runtime types for easy access.
pub use crate::runner::{run_scenario, RunOptions};
pub use crate::simulation::alerting::{AlertSink, ConsoleAlertSink, SilentAlertSink};
pub use crate::simulation::config::{load_scenario, CooldownClock, ScenarioConfig};
pub use crate::simulation::core::error::{AlertError, ScenarioError, SensorError, SessionError};
pub use crate::simulation::core::session::{SessionSettings, SessionSummary, TrackingSession};
pub use crate::simulation::sensors::{ChannelSensor, SampleSource, ScriptedSensor, SyntheticSensor};
