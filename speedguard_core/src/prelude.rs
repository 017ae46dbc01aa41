// speedguard_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::clock::{unix_time_ms, Clock, ManualClock, SystemClock};
pub use crate::estimation::SpeedFilter;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::limit::{SpeedLimit, LIMIT_PRESETS_KMH};
pub use crate::messages::{AlertEvent, DisplayFrame, DisplayState, PipelineOutput, Sample};
pub use crate::types::{Kmh, Millis, SpeedUnit};

// --- Estimation and the per-sample pipeline ---
pub use crate::display::{SpeedHistory, SpeedZone};
pub use crate::estimation::filters::ScalarKalmanFilter;
pub use crate::pipeline::{AlertCooldown, PipelineConfig, SamplePipeline};

pub use crate::error::{ConfigError, SampleError};
