// speedguard_sim/src/cli.rs

use clap::Parser;
use speedguard_core::limit::SpeedLimit;
use std::path::PathBuf;

use crate::simulation::config::ScenarioConfig;

/// speedguard: smoothed speedometer with an over-limit warning.
///
/// Replays a simulated or scripted drive through the tracking pipeline and
/// prints the speedometer as it goes.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/city_drive.toml")]
    pub scenario: PathBuf,

    /// Override the scenario's speed limit (a preset in km/h, or "off").
    #[arg(short, long)]
    pub limit: Option<SpeedLimit>,

    /// Override the random seed of a synthetic drive.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Pace samples at the sensor rate instead of replaying as fast as possible.
    #[arg(long, default_value_t = false)]
    pub realtime: bool,

    /// Count alerts instead of ringing the terminal bell.
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Print the resolved scenario as TOML and exit.
    #[arg(long, default_value_t = false)]
    pub print_config: bool,
}

impl Cli {
    /// Folds command-line overrides into a loaded scenario.
    pub fn apply_overrides(&self, scenario: &mut ScenarioConfig) {
        if let Some(limit) = self.limit {
            scenario.session.limit = limit;
        }
        if let Some(seed) = self.seed {
            scenario.simulation.seed = Some(seed);
        }
        if self.realtime {
            scenario.simulation.realtime = true;
        }
    }
}
