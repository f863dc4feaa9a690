//! Configuration management for the `StoreCheck` application
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::StoreCheckError;
use crate::geo::Coordinates;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `StoreCheck` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreCheckConfig {
    /// Business catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Initial map view
    #[serde(default)]
    pub map: MapConfig,
    /// Simulated device location
    #[serde(default)]
    pub geolocation: GeolocationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Catalog configuration settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON catalog file; the embedded list is used when unset
    pub path: Option<PathBuf>,
}

/// Map configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Latitude of the initial map center
    #[serde(default = "default_center_latitude")]
    pub center_latitude: f64,
    /// Longitude of the initial map center
    #[serde(default = "default_center_longitude")]
    pub center_longitude: f64,
    /// Zoom of the initial map view
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: f64,
    /// Display width in pixels
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
}

/// Geolocation configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    /// Whether the platform offers a location capability
    #[serde(default = "default_geolocation_supported")]
    pub supported: bool,
    /// Simulated device latitude
    pub latitude: Option<f64>,
    /// Simulated device longitude
    pub longitude: Option<f64>,
    /// Time a fix takes, in milliseconds
    #[serde(default)]
    pub latency_ms: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_center_latitude() -> f64 {
    13.736_717
}

fn default_center_longitude() -> f64 {
    100.523_186
}

fn default_initial_zoom() -> f64 {
    10.0
}

fn default_viewport_width() -> u32 {
    1024
}

fn default_geolocation_supported() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_latitude: default_center_latitude(),
            center_longitude: default_center_longitude(),
            initial_zoom: default_initial_zoom(),
            viewport_width: default_viewport_width(),
        }
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            supported: default_geolocation_supported(),
            latitude: None,
            longitude: None,
            latency_ms: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl MapConfig {
    #[must_use]
    pub fn center(&self) -> Coordinates {
        Coordinates::new(self.center_latitude, self.center_longitude)
    }
}

impl GeolocationConfig {
    /// Simulated device position, when both axes are configured
    #[must_use]
    pub fn position(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }
}

impl StoreCheckConfig {
    /// Load configuration from `config_path`, else the default location,
    /// then apply environment overrides
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path
            .or_else(Self::get_config_path)
            .unwrap_or_else(|| PathBuf::from("config.toml"));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. STORECHECK_MAP__VIEWPORT_WIDTH=375
        builder = builder.add_source(
            Environment::with_prefix("STORECHECK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: StoreCheckConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        let dir = dirs::config_dir()?;
        Some(dir.join("storecheck").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.map.viewport_width == 0 {
            self.map.viewport_width = default_viewport_width();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_coordinates()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_coordinates(&self) -> Result<()> {
        if !self.map.center().is_valid() {
            let center = self.map.center();
            let message = format!("Map center {center} is not a valid coordinate");
            return Err(StoreCheckError::config(message).into());
        }

        match (self.geolocation.latitude, self.geolocation.longitude) {
            (Some(_), Some(_)) | (None, None) => {}
            _ => {
                let message = "Simulated geolocation needs both latitude and longitude";
                return Err(StoreCheckError::config(message).into());
            }
        }

        if let Some(position) = self.geolocation.position().filter(|p| !p.is_valid()) {
            let message = format!("Simulated position {position} is not a valid coordinate");
            return Err(StoreCheckError::config(message).into());
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if !(0.0..=22.0).contains(&self.map.initial_zoom) {
            let message = "Initial zoom must be between 0 and 22";
            return Err(StoreCheckError::config(message).into());
        }

        if !(1..=10_000).contains(&self.map.viewport_width) {
            let message = "Viewport width must be between 1 and 10000 pixels";
            return Err(StoreCheckError::config(message).into());
        }

        if self.geolocation.latency_ms > 60_000 {
            let message = "Geolocation latency cannot exceed 60000 ms";
            return Err(StoreCheckError::config(message).into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            let level = &self.logging.level;
            let allowed = valid_log_levels.join(", ");
            let message = format!("Invalid log level '{level}'. Must be one of: {allowed}");
            return Err(StoreCheckError::config(message).into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            let format = &self.logging.format;
            let allowed = valid_log_formats.join(", ");
            let message = format!("Invalid log format '{format}'. Must be one of: {allowed}");
            return Err(StoreCheckError::config(message).into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn validation_error(config: &StoreCheckConfig) -> String {
        config.validate().unwrap_err().to_string()
    }

    #[test]
    fn test_default_config() {
        let config = StoreCheckConfig::default();
        assert_eq!(
            config.map.center(),
            Coordinates::new(13.736_717, 100.523_186)
        );
        assert_eq!(config.map.initial_zoom, 10.0);
        assert_eq!(config.map.viewport_width, 1024);
        assert!(config.geolocation.supported);
        assert!(config.geolocation.position().is_none());
        assert!(config.catalog.path.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = StoreCheckConfig::default();
        config.logging.level = "loud".to_string();
        assert!(validation_error(&config).contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_half_position() {
        let mut config = StoreCheckConfig::default();
        config.geolocation.latitude = Some(13.8);
        let message = validation_error(&config);
        assert!(message.contains("both latitude and longitude"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = StoreCheckConfig::default();
        config.map.initial_zoom = 30.0;
        assert!(validation_error(&config).contains("zoom"));

        let mut config = StoreCheckConfig::default();
        config.geolocation.latency_ms = 120_000;
        assert!(validation_error(&config).contains("latency"));

        let mut config = StoreCheckConfig::default();
        config.map.viewport_width = 0;
        assert!(validation_error(&config).contains("Viewport width"));
    }

    #[test]
    fn test_apply_defaults_repairs_zero_width() {
        let mut config = StoreCheckConfig::default();
        config.map.viewport_width = 0;
        config.logging.format.clear();
        config.apply_defaults();
        assert_eq!(config.map.viewport_width, 1024);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_toml_file() {
        let name = format!("storecheck-test-{}.toml", std::process::id());
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[map]\nviewport_width = 375\n").unwrap();
        writeln!(file, "[geolocation]\nlatitude = 13.80\nlongitude = 100.50").unwrap();

        let config = StoreCheckConfig::load_from_path(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.map.viewport_width, 375);
        assert_eq!(config.map.initial_zoom, 10.0);
        assert_eq!(
            config.geolocation.position(),
            Some(Coordinates::new(13.80, 100.50))
        );
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = StoreCheckConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("storecheck"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
