//! Venue configuration loading from config.toml
//!
//! This module loads the server settings and the fixed-date holiday list from a TOML
//! configuration file. Both sections are optional; a missing file or section falls
//! back to the built-in defaults (loopback bind address and the Brazilian national
//! holidays).

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Fixed-date holidays to seed every year
    #[serde(default = "default_holidays")]
    pub holidays: Vec<HolidayConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            holidays: default_holidays(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Number of years after the current one to seed holidays for
    #[serde(default = "default_holiday_years_ahead")]
    pub holiday_years_ahead: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            holiday_years_ahead: default_holiday_years_ahead(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}

const fn default_holiday_years_ahead() -> u8 {
    1
}

/// Configuration for a single fixed-date holiday
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HolidayConfig {
    /// Name of the holiday
    pub name: String,
    /// Month, 1-12
    pub month: u32,
    /// Day of month
    pub day: u32,
    /// National (true) or regional (false)
    #[serde(default = "national")]
    pub is_national: bool,
}

const fn national() -> bool {
    true
}

/// Brazilian fixed-date national holidays.
#[must_use]
pub fn default_holidays() -> Vec<HolidayConfig> {
    [
        ("Confraternização Universal", 1, 1),
        ("Tiradentes", 4, 21),
        ("Dia do Trabalhador", 5, 1),
        ("Independência do Brasil", 9, 7),
        ("Nossa Senhora Aparecida", 10, 12),
        ("Finados", 11, 2),
        ("Proclamação da República", 11, 15),
        ("Natal", 12, 25),
    ]
    .into_iter()
    .map(|(name, month, day)| HolidayConfig {
        name: name.to_string(),
        month,
        day,
        is_national: true,
    })
    .collect()
}

/// Loads venue configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from the default location (./config.toml), using the built-in
/// defaults when the file does not exist.
pub fn load_default_config() -> Result<Config> {
    let path = Path::new("config.toml");
    if !path.exists() {
        tracing::info!("No config.toml found, using defaults");
        return Ok(Config::default());
    }
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_venue_config() {
        let toml_str = r#"
            [server]
            bind_address = "0.0.0.0:8080"

            [[holidays]]
            name = "Aniversário da cidade"
            month = 1
            day = 25
            is_national = false

            [[holidays]]
            name = "Natal"
            month = 12
            day = 25
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.server.holiday_years_ahead, 1);
        assert_eq!(config.holidays.len(), 2);
        assert!(!config.holidays[0].is_national);
        assert!(config.holidays[1].is_national);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:3000");
        assert_eq!(config.holidays, default_holidays());
        assert_eq!(config.holidays.len(), 8);
    }
}
