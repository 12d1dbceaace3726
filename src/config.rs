//! Configuration loading
//!
//! Layered configuration: built-in defaults, then an optional
//! `logicforge.toml` file (path overridable via `LOGICFORGE_CONFIG_PATH`),
//! then `LOGICFORGE_*` environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Simulation tunables consumed by the execution engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid side length; robot coordinates are clamped to [0, grid_size-1].
    pub grid_size: i32,
    /// Per-step suspension modeling visual execution time.
    pub step_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_size: 10,
            step_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Config {
    /// Load and validate configuration from file and environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var("LOGICFORGE_CONFIG_PATH")
            .unwrap_or_else(|_| "logicforge.toml".to_string());

        let settings = config::Config::builder()
            .add_source(config::File::from(std::path::Path::new(&path)).required(false))
            .add_source(config::Environment::with_prefix("LOGICFORGE").separator("__"))
            .build()
            .context("Failed to load configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.simulation.grid_size < 1 {
            anyhow::bail!(
                "simulation.grid_size must be at least 1, got {}",
                self.simulation.grid_size
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_simulator() {
        let config = Config::default();
        assert_eq!(config.simulation.grid_size, 10);
        assert_eq!(config.simulation.step_delay_ms, 1000);
    }

    #[test]
    fn grid_size_must_be_positive() {
        let config = Config {
            simulation: SimulationConfig {
                grid_size: 0,
                step_delay_ms: 1000,
            },
        };
        assert!(config.validate().is_err());
    }
}
