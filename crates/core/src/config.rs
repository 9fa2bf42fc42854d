//! Engine configuration supplied by the host.
//!
//! Configuration can be loaded from a TOML file, environment variables, or
//! created programmatically.

use crate::error::ConfigError;
use std::fs;
use std::path::Path;

/// Host-level settings for a takeoff session
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Real units per pixel used while the drawing is uncalibrated
    pub fallback_scale: Option<f64>,
    /// Unit tag paired with the fallback scale
    pub fallback_unit: String,
    /// Page new measurements are placed on
    pub page_index: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fallback_scale: None,
            fallback_unit: "ft".to_string(),
            page_index: 0,
        }
    }
}

impl EngineConfig {
    /// Sets the fallback scale and unit.
    pub fn with_fallback(mut self, scale: f64, unit: impl Into<String>) -> Self {
        self.fallback_scale = Some(scale);
        self.fallback_unit = unit.into();
        self
    }

    /// Sets the starting page.
    pub fn with_page(mut self, page_index: u16) -> Self {
        self.page_index = page_index;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TAKEOFF_FALLBACK_SCALE`: real units per pixel before calibration
    /// - `TAKEOFF_FALLBACK_UNIT`: unit tag for the fallback scale (default: ft)
    /// - `TAKEOFF_PAGE`: starting page index (default: 0)
    ///
    /// # Errors
    /// Returns an error if any environment variable contains an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().merge_env()
    }

    /// Overrides fields from environment variables that are set.
    pub fn merge_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(val) = std::env::var("TAKEOFF_FALLBACK_SCALE") {
            self.fallback_scale = Some(
                val.trim()
                    .parse::<f64>()
                    .map_err(|_| ConfigError::InvalidValue("TAKEOFF_FALLBACK_SCALE".to_string()))?,
            );
        }

        if let Ok(val) = std::env::var("TAKEOFF_FALLBACK_UNIT") {
            self.fallback_unit = val.trim().to_string();
        }

        if let Ok(val) = std::env::var("TAKEOFF_PAGE") {
            self.page_index = val
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue("TAKEOFF_PAGE".to_string()))?;
        }

        self.validate()
    }

    /// Loads configuration from a TOML file.
    ///
    /// Expected file format:
    /// ```toml
    /// fallback_scale = 0.25
    /// fallback_unit = "ft"
    /// page_index = 0
    /// ```
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if let Some(scale) = self.fallback_scale {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(ConfigError::InvalidValue("fallback_scale".to_string()));
            }
        }
        if self.fallback_unit.is_empty() {
            return Err(ConfigError::InvalidValue("fallback_unit".to_string()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        std::env::remove_var("TAKEOFF_FALLBACK_SCALE");
        std::env::remove_var("TAKEOFF_FALLBACK_UNIT");
        std::env::remove_var("TAKEOFF_PAGE");
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.fallback_scale, None);
        assert_eq!(config.fallback_unit, "ft");
        assert_eq!(config.page_index, 0);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default().with_fallback(0.5, "m").with_page(3);
        assert_eq!(config.fallback_scale, Some(0.5));
        assert_eq!(config.fallback_unit, "m");
        assert_eq!(config.page_index, 3);
    }

    #[test]
    fn test_from_toml() {
        let config = EngineConfig::from_toml(
            r#"
            # drawing defaults
            fallback_scale = 0.25
            fallback_unit = "m"
            "#,
        )
        .unwrap();
        assert_eq!(config.fallback_scale, Some(0.25));
        assert_eq!(config.fallback_unit, "m");
        assert_eq!(config.page_index, 0);
    }

    #[test]
    fn test_from_toml_rejects_bad_scale() {
        assert!(matches!(
            EngineConfig::from_toml("fallback_scale = -1.0"),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml("fallback_scale = \"wide\""),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_index = 2").unwrap();
        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.page_index, 2);

        assert!(matches!(
            EngineConfig::from_file("/nonexistent/takeoff.toml"),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        std::env::set_var("TAKEOFF_FALLBACK_SCALE", "0.1");
        std::env::set_var("TAKEOFF_FALLBACK_UNIT", "m");
        std::env::set_var("TAKEOFF_PAGE", "4");

        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.fallback_scale, Some(0.1));
        assert_eq!(config.fallback_unit, "m");
        assert_eq!(config.page_index, 4);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid() {
        clear_env();
        std::env::set_var("TAKEOFF_PAGE", "first");
        assert!(matches!(
            EngineConfig::from_env(),
            Err(ConfigError::InvalidValue(key)) if key == "TAKEOFF_PAGE"
        ));
        clear_env();
    }
}
