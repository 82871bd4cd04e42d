//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// How increment/decrement treat values that are not numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArithmeticMode {
    /// Fall back to a plain `set` with the update's raw value.
    #[default]
    Lenient,
    /// Reject the whole update list.
    Strict,
}

/// Configuration for a traversal controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Arithmetic behaviour for increment/decrement on non-numeric values.
    pub arithmetic: ArithmeticMode,

    /// Run the graph validation pass when a controller is created and refuse
    /// graphs with errors.
    pub validate_on_load: bool,

    /// Maximum characters of node text used for branch map labels.
    pub label_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            arithmetic: ArithmeticMode::Lenient,
            validate_on_load: true,
            label_length: 40,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn strict() -> Self {
        Self {
            arithmetic: ArithmeticMode::Strict,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.arithmetic, ArithmeticMode::Lenient);
        assert!(config.validate_on_load);
        assert_eq!(config.label_length, 40);
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str(r#"arithmetic = "strict""#).unwrap();
        assert_eq!(config, EngineConfig::strict());

        let config = EngineConfig::from_toml_str("validate_on_load = false\nlabel_length = 12").unwrap();
        assert!(!config.validate_on_load);
        assert_eq!(config.label_length, 12);
        assert_eq!(config.arithmetic, ArithmeticMode::Lenient);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(EngineConfig::from_toml_str(r#"arithmetic = "chaotic""#).is_err());
    }
}
