//! Configuration for the cadenza audio engine.
//!
//! - [`EngineConfig`] - sample rate, buffer and cache sizes, history cap and
//!   per-effect defaults, loaded from TOML
//! - [`ChainPreset`] - a named, ordered list of effect specs
//! - [`paths`] - platform config and preset directories
//!
//! # Example
//!
//! ```rust,no_run
//! use cadenza_config::{EngineConfig, paths};
//!
//! let config = EngineConfig::load_or_default(paths::default_config_path()).unwrap();
//! println!("sessions hold {} samples", config.effective_buffer_capacity());
//! ```

mod engine_config;
mod error;
mod preset;

/// Platform-specific paths for configuration and presets.
pub mod paths;

pub use engine_config::{
    BUFFER_CAPACITY_RANGE, EngineConfig, MAX_CHAIN_LEN_RANGE, SAMPLE_RATE_RANGE,
};
pub use error::ConfigError;
pub use paths::{default_config_path, find_preset, user_config_dir, user_presets_dir};
pub use preset::ChainPreset;
