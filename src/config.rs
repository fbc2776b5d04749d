//! Converter configuration.

use serde::Deserialize;

use crate::error::ConvertResult;
use crate::escape::FieldQuoting;

/// Default bound on parenthesis nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options shared by every conversion a [`crate::Converter`] runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    /// Deepest parenthesis nesting accepted before a syntax error.
    pub max_depth: usize,

    /// How field names that collide with SQL keywords are quoted.
    pub field_quoting: FieldQuoting,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            field_quoting: FieldQuoting::None,
        }
    }
}

impl ConverterConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder::default()
    }

    /// Load a configuration from TOML text. Missing keys keep their defaults.
    ///
    /// ```
    /// use lucene_sql::config::ConverterConfig;
    /// use lucene_sql::escape::FieldQuoting;
    ///
    /// let config = ConverterConfig::from_toml_str("max_depth = 8\nfield_quoting = \"ansi\"").unwrap();
    /// assert_eq!(config.max_depth, 8);
    /// assert_eq!(config.field_quoting, FieldQuoting::Ansi);
    /// ```
    pub fn from_toml_str(text: &str) -> ConvertResult<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Builder for [`ConverterConfig`].
#[derive(Debug, Default)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    /// Set the nesting limit.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set the field quoting style.
    pub fn field_quoting(mut self, quoting: FieldQuoting) -> Self {
        self.config.field_quoting = quoting;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ConverterConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let config = ConverterConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.field_quoting, FieldQuoting::None);
        assert_eq!(ConverterConfig::from_toml_str("").unwrap(), config);
    }

    #[test]
    fn test_builder() {
        let config = ConverterConfig::builder()
            .max_depth(3)
            .field_quoting(FieldQuoting::Backtick)
            .build();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.field_quoting, FieldQuoting::Backtick);
    }

    #[test]
    fn test_partial_toml() {
        let config = ConverterConfig::from_toml_str("field_quoting = \"backtick\"").unwrap();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.field_quoting, FieldQuoting::Backtick);
    }

    #[test]
    fn test_invalid_toml() {
        let err = ConverterConfig::from_toml_str("max_depth = \"deep\"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = ConverterConfig::from_toml_str("dialect = \"mysql\"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
