//! CLI command implementations.

pub mod analyze;
pub mod common;
pub mod config;
pub mod effects;
pub mod files;
pub mod process;
