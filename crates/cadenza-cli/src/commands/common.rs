//! Shared CLI helpers used across multiple commands.

use cadenza_config::{ChainPreset, find_preset};
use std::path::PathBuf;

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid parameter format: '{}' (expected key=value)",
            s
        ));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}

/// Load a chain preset by name or path.
///
/// Names are looked up in the user preset directory first, then treated as
/// a file path.
pub fn load_preset(name: &str) -> anyhow::Result<ChainPreset> {
    if let Some(path) = find_preset(name) {
        return Ok(ChainPreset::load(&path)?);
    }

    let path = PathBuf::from(name);
    if path.exists() {
        return Ok(ChainPreset::load(&path)?);
    }

    anyhow::bail!(
        "Preset '{}' not found in {} or as a file",
        name,
        cadenza_config::user_presets_dir().display()
    )
}

/// Formats a linear level in dBFS.
pub fn db(linear: f32) -> String {
    format!("{:.1} dB", cadenza_core::linear_to_db(linear))
}
