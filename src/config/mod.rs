/// Database configuration and connection management
pub mod database;

/// Recharge policy (minimum amount, step, gateway delay) from config.toml
pub mod recharge;
