//! Error types for effect construction and validation.

use thiserror::Error;

/// Errors raised while building or validating an effect.
///
/// Every variant is raised before any sample is touched, so a failed call
/// leaves the caller's buffer unmodified.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    /// Effect name is not one of the known kinds
    #[error("unknown effect: {0}")]
    UnknownEffect(String),

    /// Key is not a parameter of the effect
    #[error("unknown parameter '{param}' for effect '{effect}'")]
    UnknownParameter {
        /// Effect the key was given for.
        effect: String,
        /// Offending key.
        param: String,
    },

    /// Value lies outside the parameter's documented range
    #[error("invalid value {value} for '{effect}.{param}': {reason}")]
    InvalidParameter {
        /// Effect the value was given for.
        effect: String,
        /// Parameter name.
        param: String,
        /// Rejected value.
        value: f32,
        /// Human-readable range description.
        reason: String,
    },

    /// Text could not be parsed as a value
    #[error("cannot parse '{value}' for parameter '{param}'")]
    MalformedValue {
        /// Parameter name.
        param: String,
        /// Raw text.
        value: String,
    },

    /// Chain exceeds the configured maximum
    #[error("effect chain has {len} effects, at most {max} allowed")]
    ChainTooLong {
        /// Requested length.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Chain has no effects
    #[error("effect chain is empty")]
    EmptyChain,
}

impl EffectError {
    /// Create an invalid parameter error.
    pub fn invalid(
        effect: impl Into<String>,
        param: impl Into<String>,
        value: f32,
        reason: impl Into<String>,
    ) -> Self {
        EffectError::InvalidParameter {
            effect: effect.into(),
            param: param.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Create an unknown parameter error.
    pub fn unknown_parameter(effect: impl Into<String>, param: impl Into<String>) -> Self {
        EffectError::UnknownParameter {
            effect: effect.into(),
            param: param.into(),
        }
    }
}
