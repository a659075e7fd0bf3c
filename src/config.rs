//! Runtime configuration
//!
//! Every heuristic threshold lives here so the path builder, matcher and
//! controller agree on the same numbers.

use crate::utils::{Result, TrawlError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Overlay and flash colors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightColors {
    /// Hovered or locked element
    pub primary: String,
    /// Every element matched by the current pattern
    pub matches: String,
    /// The bound list root
    pub root: String,
    /// Outline applied briefly by the extractor
    pub flash: String,
}

impl Default for HighlightColors {
    fn default() -> Self {
        Self {
            primary: "rgba(66, 133, 244, 0.35)".to_string(),
            matches: "rgba(52, 168, 83, 0.25)".to_string(),
            root: "rgba(251, 188, 5, 0.6)".to_string(),
            flash: "#ff6d00".to_string(),
        }
    }
}

/// Configuration for selection and extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrawlConfig {
    /// Ids at least this long are not used in selectors
    pub id_max_len: usize,
    /// Classes at least this long are not used in selectors
    pub class_max_len: usize,
    /// A class is "rare" when fewer elements than this carry it
    pub rare_class_limit: usize,
    /// Ancestor levels checked by the fallback matcher
    pub fallback_depth: usize,
    /// Ancestor levels tried when promoting a hovered node
    pub promotion_levels: usize,
    /// How long the extractor keeps matches outlined
    pub flash_duration_ms: u64,
    /// Characters of text carried in hover previews
    pub preview_text_limit: usize,
    /// Layout viewport width
    pub viewport_width: f32,
    /// User agent for page fetches
    pub user_agent: String,
    pub colors: HighlightColors,
}

impl Default for TrawlConfig {
    fn default() -> Self {
        Self {
            id_max_len: 20,
            class_max_len: 20,
            rare_class_limit: 5,
            fallback_depth: 3,
            promotion_levels: 3,
            flash_duration_ms: 2000,
            preview_text_limit: 100,
            viewport_width: 1920.0,
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
            colors: HighlightColors::default(),
        }
    }
}

impl TrawlConfig {
    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TrawlError::Config(e.to_string()))
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| TrawlError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Load from the file named by `TRAWL_CONFIG`, or fall back to defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var("TRAWL_CONFIG") {
            Ok(path) if !path.is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrawlConfig::default();
        assert_eq!(config.id_max_len, 20);
        assert_eq!(config.rare_class_limit, 5);
        assert_eq!(config.fallback_depth, 3);
        assert_eq!(config.flash_duration_ms, 2000);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TrawlConfig::from_json(r#"{"rare_class_limit": 3, "colors": {"flash": "red"}}"#)
            .unwrap();
        assert_eq!(config.rare_class_limit, 3);
        assert_eq!(config.colors.flash, "red");
        assert_eq!(config.colors.root, HighlightColors::default().root);
        assert_eq!(config.class_max_len, 20);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = TrawlConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, TrawlError::Config(_)));
    }
}
