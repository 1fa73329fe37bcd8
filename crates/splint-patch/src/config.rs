//! Patch enable/disable configuration
//!
//! A TOML `[patches]` table keyed by patch name. A patch is enabled unless
//! its key is explicitly set to `false`; unknown keys and a missing table
//! both mean "everything enabled".

use std::collections::HashMap;

use serde::Deserialize;

/// User configuration gating which patches install
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatchConfig {
    #[serde(default)]
    patches: HashMap<String, bool>,
}

impl PatchConfig {
    /// Parse a configuration document
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Whether the named patch should install
    pub fn is_enabled(&self, name: &str) -> bool {
        self.patches.get(name).copied().unwrap_or(true)
    }

    /// Override a patch's enabled state programmatically
    pub fn set_enabled(&mut self, name: &str, enabled: bool) {
        self.patches.insert(name.to_string(), enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_everything() {
        let config = PatchConfig::default();
        assert!(config.is_enabled("fixed_step_start"));
        assert!(config.is_enabled("anything"));
    }

    #[test]
    fn test_explicit_false_disables() {
        let config = PatchConfig::from_toml(
            r#"
            [patches]
            fixed_step_start = false
            other_fix = true
            "#,
        )
        .unwrap();

        assert!(!config.is_enabled("fixed_step_start"));
        assert!(config.is_enabled("other_fix"));
        assert!(config.is_enabled("unlisted"));
    }

    #[test]
    fn test_empty_document() {
        let config = PatchConfig::from_toml("").unwrap();
        assert!(config.is_enabled("fixed_step_start"));
    }

    #[test]
    fn test_set_enabled() {
        let mut config = PatchConfig::default();
        config.set_enabled("fixed_step_start", false);
        assert!(!config.is_enabled("fixed_step_start"));
    }
}
