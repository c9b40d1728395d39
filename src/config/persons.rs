//! Person configuration loading from config.toml
//!
//! The persons listed in config.toml are seeded into the database at startup so the group
//! exists before the first purchase is recorded. Seeding is idempotent by name.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Persons to seed
    #[serde(default)]
    pub persons: Vec<PersonConfig>,
}

/// Configuration for a single person
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PersonConfig {
    /// Display name of the person
    pub name: String,
}

/// Loads person configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads person configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}
