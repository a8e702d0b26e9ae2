//! Start-time configuration for the monitor
//!
//! The configuration is fixed for the lifetime of the process. It can be kept
//! in flash as a small postcard blob and decoded at boot.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

/// One sample per minute
pub const DEFAULT_SAMPLE_INTERVAL_MS: u32 = 60_000;

/// Readings strictly above this fire the high alert (°C)
pub const DEFAULT_HIGH_THRESHOLD_C: f32 = 30.0;

/// Readings strictly below this fire the low alert (°C)
pub const DEFAULT_LOW_THRESHOLD_C: f32 = 5.0;

/// 10 MiB of free space must remain on the card
pub const DEFAULT_CAPACITY_FLOOR_BYTES: u64 = 10 * 1024 * 1024;

/// GMT+1
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 3600;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MonitorConfig {
    /// Milliseconds between sampling cycles
    pub sample_interval_ms: u32,
    /// High alert threshold in °C
    pub high_threshold_c: f32,
    /// Low alert threshold in °C
    pub low_threshold_c: f32,
    /// The day's log is evicted when free space drops below this
    pub capacity_floor_bytes: u64,
    /// Offset applied to the network epoch to get local civil time
    pub utc_offset_secs: i32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            high_threshold_c: DEFAULT_HIGH_THRESHOLD_C,
            low_threshold_c: DEFAULT_LOW_THRESHOLD_C,
            capacity_floor_bytes: DEFAULT_CAPACITY_FLOOR_BYTES,
            utc_offset_secs: DEFAULT_UTC_OFFSET_SECS,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Sample interval must be greater than zero")]
    ZeroInterval,
    #[error("Threshold {name} is not a finite temperature")]
    NonFiniteThreshold { name: &'static str },
    #[error("Config could not be encoded")]
    Encode,
    #[error("Config blob is malformed")]
    Decode,
}

impl MonitorConfig {
    /// Reject configurations the monitor cannot run with.
    ///
    /// Inverted thresholds (`high < low`) are accepted: a reading between them
    /// satisfies both conditions and both alerts fire. See
    /// [`MonitorConfig::thresholds_inverted`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if !self.high_threshold_c.is_finite() {
            return Err(ConfigError::NonFiniteThreshold {
                name: "high_threshold_c",
            });
        }
        if !self.low_threshold_c.is_finite() {
            return Err(ConfigError::NonFiniteThreshold {
                name: "low_threshold_c",
            });
        }
        Ok(())
    }

    pub fn thresholds_inverted(&self) -> bool {
        self.high_threshold_c < self.low_threshold_c
    }

    /// Encode as a postcard blob for persistence
    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(|e| {
            log::error!("Failed to encode config: {:?}", e);
            ConfigError::Encode
        })
    }

    /// Decode and validate a blob written by [`MonitorConfig::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|e| {
            log::error!("Failed to decode config: {:?}", e);
            ConfigError::Decode
        })?;
        config.validate()?;
        Ok(config)
    }
}
