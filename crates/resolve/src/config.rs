//! Resolver configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Leading character that makes a name library-private
    pub private_prefix: char,
    /// Built-in name of the untyped type
    pub dynamic_type_name: String,
    /// Built-in name of the empty return type
    pub void_type_name: String,
    /// Warn on `<V>{...}` map literals that mean `<String, V>{...}`
    pub warn_legacy_map_literal: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            private_prefix: '_',
            dynamic_type_name: "dynamic".to_string(),
            void_type_name: "void".to_string(),
            warn_legacy_map_literal: false,
        }
    }
}

impl ResolverConfig {
    pub fn from_json_str(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn is_private(&self, name: &str) -> bool {
        name.starts_with(self.private_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert!(config.is_private("_hidden"));
        assert!(!config.is_private("visible"));
        assert!(!config.warn_legacy_map_literal);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ResolverConfig::from_json_str(r#"{ "warn_legacy_map_literal": true }"#).unwrap();
        assert!(config.warn_legacy_map_literal);
        assert_eq!(config.private_prefix, '_');
        assert_eq!(config.dynamic_type_name, "dynamic");
    }

    #[test]
    fn test_custom_private_prefix() {
        let config = ResolverConfig::from_json_str(r#"{ "private_prefix": "$" }"#).unwrap();
        assert!(config.is_private("$x"));
        assert!(!config.is_private("_x"));
    }
}
