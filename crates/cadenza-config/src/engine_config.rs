//! Engine configuration file.
//!
//! ```toml
//! sample_rate = 48000
//! buffer_capacity = 96000
//! cache_capacity = 64
//! history_cap = 50
//! persist_processed = true
//!
//! [effects.reverb]
//! room_size = 0.7
//!
//! [effects.filter]
//! cutoff = 2500.0
//! filter_type = "highpass"
//! ```
//!
//! Every key is optional; omitted keys take the documented defaults.

use crate::ConfigError;
use cadenza_effects::{DEFAULT_MAX_CHAIN_LEN, EffectDefaults};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// Accepted sample rates in Hz.
pub const SAMPLE_RATE_RANGE: RangeInclusive<u32> = 8000..=192_000;

/// Accepted explicit buffer capacities in samples.
pub const BUFFER_CAPACITY_RANGE: RangeInclusive<usize> = 1024..=441_000;

/// Accepted chain length limits.
pub const MAX_CHAIN_LEN_RANGE: RangeInclusive<usize> = 1..=64;

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Default session sample rate in Hz.
    pub sample_rate: u32,
    /// Session buffer capacity in samples; one second when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_capacity: Option<usize>,
    /// Decoded files kept in the recency cache.
    pub cache_capacity: usize,
    /// Processing records kept per session.
    pub history_cap: usize,
    /// Longest accepted effect chain.
    pub max_chain_len: usize,
    /// Pending status events before new ones are dropped.
    pub event_queue_capacity: usize,
    /// Store processed audio after each effect.
    pub persist_processed: bool,
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Per-effect default parameters.
    pub effects: EffectDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_capacity: None,
            cache_capacity: 32,
            history_cap: 50,
            max_chain_len: DEFAULT_MAX_CHAIN_LEN,
            event_queue_capacity: 256,
            persist_processed: false,
            log_level: "info".to_string(),
            effects: EffectDefaults::default(),
        }
    }
}

impl EngineConfig {
    /// Buffer capacity sessions get by default.
    pub fn effective_buffer_capacity(&self) -> usize {
        self.buffer_capacity.unwrap_or(self.sample_rate as usize)
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every value against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SAMPLE_RATE_RANGE.contains(&self.sample_rate) {
            return Err(ConfigError::invalid(
                "sample_rate",
                format!("must be in {:?}, got {}", SAMPLE_RATE_RANGE, self.sample_rate),
            ));
        }
        if let Some(capacity) = self.buffer_capacity
            && !BUFFER_CAPACITY_RANGE.contains(&capacity)
        {
            return Err(ConfigError::invalid(
                "buffer_capacity",
                format!("must be in {:?}, got {}", BUFFER_CAPACITY_RANGE, capacity),
            ));
        }
        for (field, value) in [
            ("cache_capacity", self.cache_capacity),
            ("history_cap", self.history_cap),
            ("event_queue_capacity", self.event_queue_capacity),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be at least 1"));
            }
        }
        if !MAX_CHAIN_LEN_RANGE.contains(&self.max_chain_len) {
            return Err(ConfigError::invalid(
                "max_chain_len",
                format!("must be in {:?}, got {}", MAX_CHAIN_LEN_RANGE, self.max_chain_len),
            ));
        }
        self.effects
            .validate(self.sample_rate as f32)
            .map_err(|e| ConfigError::invalid("effects", e.to_string()))
    }
}
