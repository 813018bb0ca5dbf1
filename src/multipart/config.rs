//! Materialization and boundary settings.

use crate::base::error::MultipartError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for streaming-to-strict conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterializeConfig {
    /// Time allowed for reading one part's entity, in milliseconds
    /// (default: 5000). Measured from the start of that part.
    pub part_timeout_ms: u64,
    /// Upper bound on the buffer preallocated from a declared length
    /// (default: 64 KiB). Larger entities grow as chunks arrive.
    pub preallocate_limit: usize,
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            part_timeout_ms: 5000,
            preallocate_limit: 64 * 1024,
        }
    }
}

impl MaterializeConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-part timeout.
    pub fn part_timeout(mut self, timeout: Duration) -> Self {
        self.part_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the preallocation cap.
    pub fn preallocate_limit(mut self, limit: usize) -> Self {
        self.preallocate_limit = limit;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.part_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), MultipartError> {
        if self.part_timeout_ms == 0 {
            return Err(MultipartError::InvalidConfig(
                "part_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Load from a JSON document. Missing fields take their defaults.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self, MultipartError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MultipartError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Settings for random boundary generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Random bytes per boundary before base64 encoding (default: 18,
    /// giving 24 characters and 144 bits of entropy).
    pub random_bytes: usize,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self { random_bytes: 18 }
    }
}

impl BoundaryConfig {
    /// Largest byte count whose encoding still fits the 70 character limit.
    pub const MAX_RANDOM_BYTES: usize = 52;

    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of random bytes.
    pub fn random_bytes(mut self, n: usize) -> Self {
        self.random_bytes = n;
        self
    }

    pub fn validate(&self) -> Result<(), MultipartError> {
        if self.random_bytes == 0 || self.random_bytes > Self::MAX_RANDOM_BYTES {
            return Err(MultipartError::InvalidConfig(format!(
                "random_bytes must be between 1 and {}, got {}",
                Self::MAX_RANDOM_BYTES,
                self.random_bytes
            )));
        }
        Ok(())
    }

    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self, MultipartError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MultipartError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
