//! Configuration for the profiling engine.
//!
//! Only presentation knobs live here. The outlier fence multiplier and the
//! strong-correlation cutoff are fixed rules and are deliberately not part of
//! the configuration.

use serde::{Deserialize, Serialize};

/// Configuration for [`DataProfiler`](crate::DataProfiler).
///
/// # Example
///
/// ```rust,ignore
/// use lex_profiling::ProfilerConfig;
///
/// let config = ProfilerConfig::builder()
///     .top_categories(10)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Number of categories kept in each categorical frequency table.
    /// Default: 5
    pub top_categories: usize,

    /// Decimal places used when rounding reported statistics.
    /// Default: 3
    pub decimal_places: u32,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            top_categories: 5,
            decimal_places: 3,
        }
    }
}

impl ProfilerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ProfilerConfigBuilder {
        ProfilerConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.top_categories == 0 {
            return Err(ConfigValidationError::InvalidTopCategories(
                self.top_categories,
            ));
        }

        if self.decimal_places > 12 {
            return Err(ConfigValidationError::InvalidDecimalPlaces(
                self.decimal_places,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid top categories: {0} (must be at least 1)")]
    InvalidTopCategories(usize),

    #[error("Invalid decimal places: {0} (must be at most 12)")]
    InvalidDecimalPlaces(u32),
}

/// Builder for [`ProfilerConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ProfilerConfigBuilder {
    top_categories: Option<usize>,
    decimal_places: Option<u32>,
}

impl ProfilerConfigBuilder {
    /// Set how many categories each frequency table keeps.
    pub fn top_categories(mut self, n: usize) -> Self {
        self.top_categories = Some(n);
        self
    }

    /// Set the rounding precision for reported statistics.
    pub fn decimal_places(mut self, places: u32) -> Self {
        self.decimal_places = Some(places);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ProfilerConfig` or an error if validation fails.
    pub fn build(self) -> Result<ProfilerConfig, ConfigValidationError> {
        let defaults = ProfilerConfig::default();
        let config = ProfilerConfig {
            top_categories: self.top_categories.unwrap_or(defaults.top_categories),
            decimal_places: self.decimal_places.unwrap_or(defaults.decimal_places),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProfilerConfig::default();
        assert_eq!(config.top_categories, 5);
        assert_eq!(config.decimal_places, 3);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = ProfilerConfig::builder()
            .top_categories(10)
            .decimal_places(2)
            .build()
            .unwrap();
        assert_eq!(config.top_categories, 10);
        assert_eq!(config.decimal_places, 2);
    }

    #[test]
    fn test_validation_zero_top_categories() {
        let result = ProfilerConfig::builder().top_categories(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidTopCategories(0)
        ));
    }

    #[test]
    fn test_validation_decimal_places() {
        let result = ProfilerConfig::builder().decimal_places(20).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidDecimalPlaces(20)
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: ProfilerConfig = serde_json::from_str(r#"{"top_categories": 3}"#).unwrap();
        assert_eq!(config.top_categories, 3);
        assert_eq!(config.decimal_places, 3);
    }
}
