//! Recharge policy loading from config.toml
//!
//! The policy carries the business constants of the recharge workflow: the
//! minimum rechargeable amount, the increment amounts must be a multiple of,
//! and the simulated payment-gateway delay. All values have defaults, and a
//! missing config.toml simply yields the default policy.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Recharge workflow policy; defaults apply when the section is absent
    #[serde(default)]
    pub recharge: RechargePolicy,
}

/// Business constants governing the recharge workflow
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RechargePolicy {
    /// Minimum rechargeable amount in rupees
    pub min_amount: f64,
    /// Amounts must be a whole multiple of this increment
    pub amount_step: f64,
    /// Simulated payment-gateway latency in milliseconds
    pub gateway_delay_ms: u64,
}

impl Default for RechargePolicy {
    fn default() -> Self {
        Self {
            min_amount: 10.0,
            amount_step: 10.0,
            gateway_delay_ms: 2000,
        }
    }
}

/// Loads the recharge policy from a TOML file.
///
/// A missing file is not an error - the default policy is returned so the
/// application works out of the box.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_policy<P: AsRef<Path>>(path: P) -> Result<RechargePolicy> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(RechargePolicy::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    let config: Config = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    Ok(config.recharge)
}

/// Loads the recharge policy from the default location (./config.toml)
pub fn load_default_policy() -> Result<RechargePolicy> {
    load_policy("config.toml")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_recharge_policy() {
        let toml_str = r"
            [recharge]
            min_amount = 50.0
            amount_step = 25.0
            gateway_delay_ms = 100
        ";

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.recharge.min_amount, 50.0);
        assert_eq!(config.recharge.amount_step, 25.0);
        assert_eq!(config.recharge.gateway_delay_ms, 100);
    }

    #[test]
    fn test_partial_policy_falls_back_to_defaults() {
        let toml_str = r"
            [recharge]
            gateway_delay_ms = 0
        ";

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.recharge.min_amount, 10.0);
        assert_eq!(config.recharge.amount_step, 10.0);
        assert_eq!(config.recharge.gateway_delay_ms, 0);
    }

    #[test]
    fn test_missing_section_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.recharge, RechargePolicy::default());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let policy = load_policy("does-not-exist.toml").unwrap();
        assert_eq!(policy, RechargePolicy::default());
    }
}
