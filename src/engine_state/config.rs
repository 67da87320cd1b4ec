//! Streaming configuration.
//!
//! Everything tunable about the pipeline lives in [`StreamingConfig`]. The defaults are
//! the reference tuning; a JSON file may override any subset of the fields.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::Duration;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file format: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// How the meshing loop treats a recorded eviction deadline.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Unload on the next pass that still finds the chunk out of view, whatever the
    /// deadline says.
    #[default]
    NextPass,
    /// Unload only once the recorded deadline has passed.
    Deadline,
}

/// Tuning for the chunk scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// World seed.
    pub seed: i32,
    /// Radius, in chunks, of the square region kept loaded around the observer.
    pub view_distance: i32,
    /// Period of the acquisition loop.
    pub acquisition_interval_ms: u64,
    /// Period of the meshing and eviction loop.
    pub meshing_interval_ms: u64,
    /// Wall-clock budget of one meshing tick.
    pub update_budget_ms: u64,
    /// Time recorded in an eviction deadline.
    pub eviction_timeout_ms: u64,
    pub eviction_policy: EvictionPolicy,
    /// Chunks within this many chunks of the observer are always treated as visible.
    pub near_radius: f32,
    /// Evicted chunks further than `view_distance + purge_margin` chunks are dropped.
    pub purge_margin: i32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        StreamingConfig {
            seed: 0,
            view_distance: 8,
            acquisition_interval_ms: 10,
            meshing_interval_ms: 5,
            update_budget_ms: 250,
            eviction_timeout_ms: 10_000,
            eviction_policy: EvictionPolicy::NextPass,
            near_radius: 2.5,
            purge_margin: 2,
        }
    }
}

impl StreamingConfig {
    /// Reads and validates a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading streaming config from: {}", path.display());
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parses and validates a JSON config. Missing fields keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: StreamingConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.view_distance < 1 {
            return Err(ConfigError::Invalid(format!(
                "view_distance must be at least 1, got {}",
                self.view_distance
            )));
        }
        if self.acquisition_interval_ms == 0 || self.meshing_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "loop intervals must be non-zero".to_string(),
            ));
        }
        if self.update_budget_ms == 0 {
            return Err(ConfigError::Invalid(
                "update_budget_ms must be non-zero".to_string(),
            ));
        }
        if self.near_radius.is_nan() || self.near_radius < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "near_radius must be non-negative, got {}",
                self.near_radius
            )));
        }
        if self.purge_margin < 0 {
            return Err(ConfigError::Invalid(format!(
                "purge_margin must be non-negative, got {}",
                self.purge_margin
            )));
        }
        Ok(())
    }

    pub fn acquisition_interval(&self) -> Duration {
        Duration::from_millis(self.acquisition_interval_ms)
    }

    pub fn meshing_interval(&self) -> Duration {
        Duration::from_millis(self.meshing_interval_ms)
    }

    pub fn update_budget(&self) -> Duration {
        Duration::from_millis(self.update_budget_ms)
    }

    pub fn eviction_timeout(&self) -> Duration {
        Duration::from_millis(self.eviction_timeout_ms)
    }

    /// Chunk distance beyond which evicted chunks are removed from the store.
    pub fn purge_distance(&self) -> i32 {
        self.view_distance + self.purge_margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = StreamingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.purge_distance(), 10);
        assert_eq!(config.update_budget(), Duration::from_millis(250));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = StreamingConfig::from_json_str(
            r#"{ "seed": 42, "view_distance": 4, "eviction_policy": "deadline" }"#,
        )
        .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.view_distance, 4);
        assert_eq!(config.eviction_policy, EvictionPolicy::Deadline);
        assert_eq!(config.meshing_interval_ms, 5);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            StreamingConfig::from_json_str(r#"{ "view_distance": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            StreamingConfig::from_json_str(r#"{ "view_distance": "far" }"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            StreamingConfig::from_json_file("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
