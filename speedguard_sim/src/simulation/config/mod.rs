// speedguard_sim/src/simulation/config/mod.rs

//! This module handles loading and validating scenario configuration from
//! disk and the environment.

pub mod structs;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;
use tracing::info;

use crate::simulation::core::error::ScenarioError;
pub use structs::{
    CooldownClock, FilterConfig, ProfileSegment, ScenarioConfig, ScriptedSensorConfig,
    SensorConfig, SessionConfig, Simulation, SyntheticSensorConfig,
};

/// Prefix for environment overrides, e.g. `SPEEDGUARD_SESSION__LIMIT=80`.
pub const ENV_PREFIX: &str = "SPEEDGUARD_";

/// Builds the figment used for a scenario: the TOML file first, then
/// environment overrides on top.
pub fn scenario_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Loads, deserializes and validates a scenario. A missing file yields the
/// defaults, just like an empty one.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, ScenarioError> {
    info!("Loading scenario from: {}", path.display());
    let config: ScenarioConfig = scenario_figment(path).extract()?;
    config.validate()?;
    info!(
        limit = %config.session.limit,
        sensor = config.sensor.get_kind_str(),
        "Scenario loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use speedguard_core::error::ConfigError;
    use speedguard_core::limit::SpeedLimit;
    use speedguard_core::types::SpeedUnit;

    #[test]
    fn missing_file_gives_defaults() {
        Jail::expect_with(|_jail| {
            let config = load_scenario(Path::new("does_not_exist.toml")).unwrap();
            assert_eq!(config.session.limit, SpeedLimit::Disabled);
            assert_eq!(config.session.cooldown_ms, 5_000);
            assert_eq!(config.session.cooldown_clock, CooldownClock::Wall);
            assert!(matches!(config.sensor, SensorConfig::Synthetic(_)));
            Ok(())
        });
    }

    #[test]
    fn toml_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "scenario.toml",
                r#"
                [simulation]
                seed = 7

                [session]
                limit = 60
                speed_unit = "KilometersPerHour"
                cooldown_clock = "Sample"

                [sensor]
                kind = "Scripted"
                samples = [
                    { speed = 10.0, accuracy = 3.5, timestamp = 0 },
                    { speed = 11.0 },
                ]
                "#,
            )?;
            let config = load_scenario(Path::new("scenario.toml")).unwrap();
            assert_eq!(config.simulation.seed, Some(7));
            assert_eq!(config.session.limit, SpeedLimit::Kmh(60));
            assert_eq!(config.session.speed_unit, SpeedUnit::KilometersPerHour);
            // Unset fields keep their defaults.
            assert_eq!(config.session.display_floor_kmh, 2.0);
            match config.sensor {
                SensorConfig::Scripted(s) => {
                    assert_eq!(s.samples.len(), 2);
                    assert_eq!(s.samples[1].accuracy, None);
                    assert!(s.permission_granted);
                }
                other => panic!("expected scripted sensor, got {:?}", other),
            }
            Ok(())
        });
    }

    #[test]
    fn sentinel_limit_and_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file("scenario.toml", "[session]\nlimit = \"off\"\n")?;
            let config = load_scenario(Path::new("scenario.toml")).unwrap();
            assert_eq!(config.session.limit, SpeedLimit::Disabled);

            jail.set_env("SPEEDGUARD_SESSION__LIMIT", "90");
            let config = load_scenario(Path::new("scenario.toml")).unwrap();
            assert_eq!(config.session.limit, SpeedLimit::Kmh(90));
            Ok(())
        });
    }

    #[test]
    fn synthetic_rate_and_length_are_bounded() {
        Jail::expect_with(|jail| {
            jail.create_file("slow.toml", "[sensor]\nkind = \"Synthetic\"\nrate_hz = 1e-30\n")?;
            assert!(matches!(
                load_scenario(Path::new("slow.toml")),
                Err(ScenarioError::Invalid(ConfigError::OutOfRange { name: "rate_hz", .. }))
            ));

            jail.create_file("fast.toml", "[sensor]\nkind = \"Synthetic\"\nrate_hz = 1500.0\n")?;
            assert!(matches!(
                load_scenario(Path::new("fast.toml")),
                Err(ScenarioError::Invalid(ConfigError::OutOfRange { name: "rate_hz", .. }))
            ));

            jail.create_file(
                "endless.toml",
                "[sensor]\nkind = \"Synthetic\"\nrate_hz = 1000.0\n[[sensor.profile]]\nduration_s = 1e9\nspeed = 10.0\n",
            )?;
            assert!(matches!(
                load_scenario(Path::new("endless.toml")),
                Err(ScenarioError::Invalid(ConfigError::OutOfRange { name: "fix count", .. }))
            ));

            jail.create_file("fastest.toml", "[sensor]\nkind = \"Synthetic\"\nrate_hz = 1000.0\n")?;
            assert!(load_scenario(Path::new("fastest.toml")).is_ok());
            Ok(())
        });
    }

    #[test]
    fn unknown_fields_and_bad_values_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("typo.toml", "[session]\nlimitt = 60\n")?;
            assert!(matches!(
                load_scenario(Path::new("typo.toml")),
                Err(ScenarioError::Load(_))
            ));

            jail.create_file("odd_limit.toml", "[session]\nlimit = 65\n")?;
            assert!(load_scenario(Path::new("odd_limit.toml")).is_err());

            jail.create_file("noise.toml", "[filter]\nprocess_noise = -0.5\n")?;
            assert!(matches!(
                load_scenario(Path::new("noise.toml")),
                Err(ScenarioError::Invalid(_))
            ));

            jail.create_file("sensor_typo.toml", "[sensor]\nkind = \"Synthetic\"\nrate_hx = 5.0\n")?;
            assert!(matches!(
                load_scenario(Path::new("sensor_typo.toml")),
                Err(ScenarioError::Load(_))
            ));

            jail.create_file(
                "segment_typo.toml",
                "[sensor]\nkind = \"Synthetic\"\n[[sensor.profile]]\nduration_s = 5.0\nspeeed = 3.0\n",
            )?;
            assert!(matches!(
                load_scenario(Path::new("segment_typo.toml")),
                Err(ScenarioError::Load(_))
            ));

            jail.create_file("scripted_typo.toml", "[sensor]\nkind = \"Scripted\"\ninterval = 10\n")?;
            assert!(matches!(
                load_scenario(Path::new("scripted_typo.toml")),
                Err(ScenarioError::Load(_))
            ));
            Ok(())
        });
    }
}
