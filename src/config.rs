//! Configuration management for Kairos
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files.

use crate::error::{KairosError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_tick_interval_secs() -> u64 {
    300
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Vehicle API connection configuration
    pub vehicle: VehicleApiConfig,

    /// Completion-time window configuration
    pub window: WindowConfig,

    /// Target state-of-charge bounds
    pub soc: SocConfig,

    /// Seconds between controller ticks
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Vehicle API connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleApiConfig {
    /// Base URL of the connected-vehicle API
    pub base_url: String,

    /// API access token
    pub access_token: String,

    /// Vehicle identification number
    pub vin: String,
}

/// Desired completion-time window, relative to session start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Earliest acceptable completion, hours after start
    pub min_charge_hours: f64,

    /// Latest acceptable completion, hours after start
    pub max_charge_hours: f64,
}

/// Target state-of-charge bounds (percent, multiples of 5)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocConfig {
    /// Lowest target SoC the controller may set
    pub min_target_soc: u8,

    /// Highest target SoC the controller may set
    pub max_target_soc: u8,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file (or directory for daily rotation)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Default for VehicleApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.connected-vehicle.example".to_string(),
            access_token: String::new(),
            vin: String::new(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            min_charge_hours: 24.0,
            max_charge_hours: 48.0,
        }
    }
}

impl Default for SocConfig {
    fn default() -> Self {
        Self {
            min_target_soc: 50,
            max_target_soc: 70,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/kairos.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vehicle: VehicleApiConfig::default(),
            window: WindowConfig::default(),
            soc: SocConfig::default(),
            tick_interval_secs: default_tick_interval_secs(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        let default_paths = [
            "kairos_config.yaml",
            "/data/kairos_config.yaml",
            "/etc/kairos/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.vehicle.base_url.is_empty() {
            return Err(KairosError::validation(
                "vehicle.base_url",
                "Base URL cannot be empty",
            ));
        }

        if self.vehicle.vin.is_empty() {
            return Err(KairosError::validation(
                "vehicle.vin",
                "VIN cannot be empty",
            ));
        }

        if self.window.min_charge_hours <= 0.0 {
            return Err(KairosError::validation(
                "window.min_charge_hours",
                "Must be positive",
            ));
        }

        if self.window.max_charge_hours <= self.window.min_charge_hours {
            return Err(KairosError::validation(
                "window.max_charge_hours",
                "Must be greater than min_charge_hours",
            ));
        }

        if self.soc.min_target_soc % 5 != 0 || self.soc.max_target_soc % 5 != 0 {
            return Err(KairosError::validation(
                "soc",
                "Target SoC bounds must be multiples of 5",
            ));
        }

        if self.soc.min_target_soc < 10 {
            return Err(KairosError::validation(
                "soc.min_target_soc",
                "Must be at least 10",
            ));
        }

        if self.soc.max_target_soc > 100 {
            return Err(KairosError::validation(
                "soc.max_target_soc",
                "Must not exceed 100",
            ));
        }

        if self.soc.min_target_soc >= self.soc.max_target_soc {
            return Err(KairosError::validation(
                "soc.min_target_soc",
                "Must be less than max_target_soc",
            ));
        }

        if self.tick_interval_secs == 0 {
            return Err(KairosError::validation(
                "tick_interval_secs",
                "Must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.window.min_charge_hours, 24.0);
        assert_eq!(config.window.max_charge_hours, 48.0);
        assert_eq!(config.soc.min_target_soc, 50);
        assert_eq!(config.soc.max_target_soc, 70);
        assert_eq!(config.tick_interval_secs, 300);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.vehicle.vin = "WBA00000000000000".to_string();
        assert!(config.validate().is_ok());

        // Test inverted window
        config.window.max_charge_hours = 12.0;
        assert!(config.validate().is_err());

        // Reset and test off-grid SoC bound
        config = Config::default();
        config.vehicle.vin = "WBA00000000000000".to_string();
        config.soc.max_target_soc = 72;
        assert!(config.validate().is_err());

        // Empty VIN is rejected
        config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let deserialized: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.soc.max_target_soc, deserialized.soc.max_target_soc);
        assert_eq!(config.tick_interval_secs, deserialized.tick_interval_secs);
    }
}
