//! Configuration loading and typed config structures for a Skirmish run.
//!
//! The canonical configuration lives in `skirmish-config.yaml` at the
//! project root. Every field has a default, so a missing file, a missing
//! section, or a missing key all fall back to the values below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use skirmish_types::MapBounds;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but cannot drive a run.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What was wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `skirmish-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Grid dimensions.
    #[serde(default)]
    pub map: MapConfig,

    /// Timing of the run and its workers.
    #[serde(default)]
    pub run: RunConfig,

    /// Random population parameters.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Where battle narration goes.
    #[serde(default)]
    pub narration: NarrationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value cannot drive a run.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value cannot drive a run.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the coordinator cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            (self.map.width == 0, "map.width must be at least 1"),
            (self.map.height == 0, "map.height must be at least 1"),
            (
                self.run.duration_seconds == 0,
                "run.duration_seconds must be at least 1",
            ),
            (
                self.run.snapshot_interval_ms == 0,
                "run.snapshot_interval_ms must be at least 1",
            ),
            (
                self.run.tick_interval_ms == 0,
                "run.tick_interval_ms must be at least 1",
            ),
            (
                self.run.battle_poll_interval_ms == 0,
                "run.battle_poll_interval_ms must be at least 1",
            ),
        ];
        match checks.iter().find(|(failed, _)| *failed) {
            Some((_, reason)) => Err(ConfigError::Invalid {
                reason: (*reason).to_owned(),
            }),
            None => Ok(()),
        }
    }

    /// Map bounds for this run.
    pub const fn bounds(&self) -> MapBounds {
        MapBounds::new(self.map.width, self.map.height)
    }
}

/// Grid dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MapConfig {
    /// Number of columns.
    #[serde(default = "default_map_side")]
    pub width: u32,

    /// Number of rows.
    #[serde(default = "default_map_side")]
    pub height: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: default_map_side(),
            height: default_map_side(),
        }
    }
}

/// Run timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Wall-clock length of the run.
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: u64,

    /// Milliseconds between rendered snapshots.
    #[serde(default = "default_interval_ms")]
    pub snapshot_interval_ms: u64,

    /// Milliseconds between movement ticks.
    #[serde(default = "default_interval_ms")]
    pub tick_interval_ms: u64,

    /// Milliseconds the battle worker sleeps when its queue is empty.
    #[serde(default = "default_battle_poll_interval_ms")]
    pub battle_poll_interval_ms: u64,
}

impl RunConfig {
    /// Run length as a [`Duration`].
    pub const fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_seconds)
    }

    /// Snapshot interval as a [`Duration`].
    pub const fn snapshot_interval(&self) -> Duration {
        Duration::from_millis(self.snapshot_interval_ms)
    }

    /// Movement tick interval as a [`Duration`].
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Battle poll interval as a [`Duration`].
    pub const fn battle_poll_interval(&self) -> Duration {
        Duration::from_millis(self.battle_poll_interval_ms)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration_seconds: default_duration_seconds(),
            snapshot_interval_ms: default_interval_ms(),
            tick_interval_ms: default_interval_ms(),
            battle_poll_interval_ms: default_battle_poll_interval_ms(),
        }
    }
}

/// Population configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Number of agents spawned when no roster is given.
    #[serde(default = "default_initial_agents")]
    pub initial_agents: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_agents: default_initial_agents(),
        }
    }
}

/// Battle narration outputs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NarrationConfig {
    /// Print battle lines to stdout.
    #[serde(default = "default_true")]
    pub console: bool,

    /// Append battle events as JSON lines to this file.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            console: true,
            log_file: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_map_side() -> u32 {
    50
}

const fn default_duration_seconds() -> u64 {
    30
}

const fn default_interval_ms() -> u64 {
    1_000
}

const fn default_battle_poll_interval_ms() -> u64 {
    10
}

const fn default_initial_agents() -> u32 {
    50
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = SimulationConfig::default();
        assert_eq!(config.map.width, 50);
        assert_eq!(config.map.height, 50);
        assert_eq!(config.run.duration_seconds, 30);
        assert_eq!(config.run.snapshot_interval_ms, 1_000);
        assert_eq!(config.run.tick_interval_ms, 1_000);
        assert_eq!(config.run.battle_poll_interval_ms, 10);
        assert_eq!(config.population.initial_agents, 50);
        assert!(config.narration.console);
        assert!(config.narration.log_file.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
map:
  width: 20
  height: 10

run:
  duration_seconds: 5
  snapshot_interval_ms: 250
  tick_interval_ms: 100
  battle_poll_interval_ms: 2

population:
  initial_agents: 12

narration:
  console: false
  log_file: "battles.jsonl"

logging:
  level: "debug"
"#;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.bounds(), MapBounds::new(20, 10));
        assert_eq!(config.run.duration(), Duration::from_secs(5));
        assert_eq!(config.run.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.run.battle_poll_interval(), Duration::from_millis(2));
        assert_eq!(config.population.initial_agents, 12);
        assert!(!config.narration.console);
        assert_eq!(
            config.narration.log_file,
            Some(PathBuf::from("battles.jsonl"))
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn shipped_config_file_is_the_defaults() {
        let config = SimulationConfig::parse(include_str!("../../../skirmish-config.yaml")).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = SimulationConfig::parse("map:\n  width: 30\n").unwrap();
        assert_eq!(config.map.width, 30);
        assert_eq!(config.map.height, 50);
        assert_eq!(config.run, RunConfig::default());
    }

    #[test]
    fn zero_values_are_rejected() {
        for yaml in [
            "map:\n  width: 0\n",
            "map:\n  height: 0\n",
            "run:\n  duration_seconds: 0\n",
            "run:\n  tick_interval_ms: 0\n",
            "run:\n  battle_poll_interval_ms: 0\n",
            "run:\n  snapshot_interval_ms: 0\n",
        ] {
            let result = SimulationConfig::parse(yaml);
            assert!(
                matches!(result, Err(ConfigError::Invalid { .. })),
                "{yaml} should be invalid"
            );
        }
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let result = SimulationConfig::parse("map: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/skirmish-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
