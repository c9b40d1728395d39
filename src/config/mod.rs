/// Ledger edit permissions from environment variables
pub mod access;

/// Database configuration and connection management
pub mod database;

/// Person configuration loading from config.toml
pub mod persons;
