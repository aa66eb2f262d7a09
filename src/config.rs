//! Tracker configuration
//!
//! Stored as pretty-printed JSON. Every field has a default so partial or
//! missing files still load. Sampling and recording timings are fixed and
//! are not part of the configuration.

use crate::pose::EstimationOptions;
use crate::recorder::error::{TrackerError, TrackerResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default tracing filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "pose_trail=debug,tauri=info";

/// What to do when a sampling tick fires while an estimate is still running
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EstimationPolicy {
    /// Start another estimate regardless; requests may overlap without bound
    #[default]
    Overlapping,
    /// Skip the tick until the pending estimate completes
    SingleFlight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerConfig {
    pub estimation_policy: EstimationPolicy,
    /// Mirror keypoints horizontally (passed through to the estimator)
    pub flip_horizontal: bool,
    /// Tracing filter directive used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            estimation_policy: EstimationPolicy::default(),
            flip_horizontal: false,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl TrackerConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> TrackerResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: TrackerConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, falling back to defaults if it doesn't exist
    pub fn load_or_default(path: &Path) -> TrackerResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration, creating parent directories as needed
    pub fn save(&self, path: &Path) -> TrackerResult<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> TrackerResult<()> {
        if self.log_filter.trim().is_empty() {
            return Err(TrackerError::ConfigurationError(
                "logFilter must not be empty".to_string(),
            ));
        }

        tracing_subscriber::EnvFilter::try_new(&self.log_filter).map_err(|e| {
            TrackerError::ConfigurationError(format!(
                "Invalid logFilter '{}': {}",
                self.log_filter, e
            ))
        })?;

        Ok(())
    }

    /// Estimator options for every tick; at most one pose is ever requested
    pub fn estimation_options(&self) -> EstimationOptions {
        EstimationOptions {
            flip_horizontal: self.flip_horizontal,
            ..EstimationOptions::default()
        }
    }
}
