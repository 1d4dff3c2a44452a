/// Database configuration and connection management
pub mod database;

/// Rate table loading from config.toml
pub mod rates;
