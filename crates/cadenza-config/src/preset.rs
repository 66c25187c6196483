//! Named effect chains stored as TOML.

use crate::ConfigError;
use cadenza_effects::{EffectSpec, validate_chain};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A saved effect chain.
///
/// # TOML Format
///
/// ```toml
/// name = "Vocal Polish"
/// description = "Gentle compression, presence lift, small room"
///
/// [[effects]]
/// type = "compression"
/// threshold_db = -18.0
/// ratio = 3.0
///
/// [[effects]]
/// type = "equalizer"
/// high_gain_db = 3.0
///
/// [[effects]]
/// type = "reverb"
/// room_size = 0.3
/// wet_level = 0.2
/// ```
///
/// Parameters omitted from an entry take the effect's built-in default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainPreset {
    /// Name of the preset.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Effects in processing order.
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
}

impl ChainPreset {
    /// Create an empty preset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            effects: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append an effect.
    pub fn with_effect(mut self, effect: impl Into<EffectSpec>) -> Self {
        self.effects.push(effect.into());
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating parent directories.
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

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks chain length and every effect's parameters.
    pub fn validate(&self, sample_rate: f32, max_len: usize) -> Result<(), ConfigError> {
        validate_chain(&self.effects, sample_rate, max_len)
            .map_err(|e| ConfigError::invalid(format!("preset '{}'", self.name), e.to_string()))
    }

    /// Number of effects.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Returns `true` if the preset has no effects.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
