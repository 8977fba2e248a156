use crate::{Result, SweepError, DEFAULT_EXTENSION};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settings for one deletion run. The engine only ever reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of concurrent workers
    pub worker_count: usize,

    /// Retries allowed per file after the first attempt
    pub max_retries: u32,

    /// Time budget for a single delete attempt, in milliseconds
    pub attempt_timeout_ms: u64,

    /// File name suffix selecting the files to delete (e.g. ".rdp")
    pub extension: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            worker_count: 5,
            max_retries: 3,
            attempt_timeout_ms: 1000,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SweepError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(SweepError::InvalidConfig(
                "worker_count must be greater than zero".to_string(),
            ));
        }
        if self.attempt_timeout_ms == 0 {
            return Err(SweepError::InvalidConfig(
                "attempt_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
