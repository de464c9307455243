//! Host configuration.
//!
//! [`HostConfig`] collects the tunables of the controllers. It can be
//! loaded from TOML or JSON; every field has a default, so a partial file
//! only overrides what it names.
//!
//! ```toml
//! query_param = "editor"
//! decoration_opacity = 0.4
//! split_weights = [1, 3]
//! selection_modifier = "alt"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use vizhost_widgets::{
    DEFAULT_INDENT, DEFAULT_ROW_HEIGHT, DEFAULT_SPLIT_WEIGHTS, DiffRenderOptions, EditorSettings,
    KeyCode, TreeOptions,
};

use crate::error::ConfigError;

/// Key that must be held for a selection to count as user intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKey {
    #[default]
    Ctrl,
    Shift,
    Alt,
    Meta,
}

impl ModifierKey {
    #[must_use]
    pub fn matches(self, code: &KeyCode) -> bool {
        matches!(
            (self, code),
            (Self::Ctrl, KeyCode::Ctrl)
                | (Self::Shift, KeyCode::Shift)
                | (Self::Alt, KeyCode::Alt)
                | (Self::Meta, KeyCode::Meta)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Query parameter that selects the editor.
    pub query_param: String,
    /// Opacity of injected decoration rules.
    pub decoration_opacity: f64,
    /// Width weights of tree and editor in the AST viewer.
    pub split_weights: [u32; 2],
    pub tree_row_height: u32,
    pub tree_indent: u32,
    pub selection_modifier: ModifierKey,
    /// Used when a diff payload does not say.
    pub hide_unchanged_regions: bool,
    /// Scroll to a selection that arrived from the host.
    pub reveal_external_selection: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            query_param: "editor".to_owned(),
            decoration_opacity: vizhost_style::DEFAULT_DECORATION_OPACITY,
            split_weights: DEFAULT_SPLIT_WEIGHTS,
            tree_row_height: DEFAULT_ROW_HEIGHT,
            tree_indent: DEFAULT_INDENT,
            selection_modifier: ModifierKey::Ctrl,
            hide_unchanged_regions: true,
            reveal_external_selection: true,
        }
    }
}

impl HostConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.query_param.is_empty() {
            errors.push("query_param must not be empty".into());
        }
        if !(0.0..=1.0).contains(&self.decoration_opacity) {
            errors.push(format!(
                "decoration_opacity must be in [0, 1], got {}",
                self.decoration_opacity
            ));
        }
        if self.split_weights == [0, 0] {
            errors.push("split_weights must not both be 0".into());
        }
        if self.tree_row_height == 0 {
            errors.push("tree_row_height must be > 0".into());
        }
        errors
    }

    /// [`validate`](Self::validate) as a `Result`.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    #[must_use]
    pub fn tree_options(&self) -> TreeOptions {
        TreeOptions {
            row_height: self.tree_row_height,
            indent: self.tree_indent,
        }
    }

    /// Diff options, with the payload's flag taking precedence.
    #[must_use]
    pub fn diff_options(&self, hide_unchanged_regions: Option<bool>) -> DiffRenderOptions {
        DiffRenderOptions {
            hide_unchanged_regions: hide_unchanged_regions.unwrap_or(self.hide_unchanged_regions),
            ..DiffRenderOptions::default()
        }
    }

    #[must_use]
    pub fn editor_settings(&self) -> EditorSettings {
        EditorSettings {
            diff: self.diff_options(None),
            decoration_opacity: self.decoration_opacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = HostConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.split_weights, [1, 2]);
        assert_eq!(config.tree_options(), TreeOptions::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = HostConfig::from_toml_str(
            "decoration_opacity = 0.25\nselection_modifier = \"alt\"\n",
        )
        .unwrap();
        assert_eq!(config.decoration_opacity, 0.25);
        assert_eq!(config.selection_modifier, ModifierKey::Alt);
        assert_eq!(config.query_param, "editor");
    }

    #[test]
    fn json_and_validation() {
        let config =
            HostConfig::from_json_str(r#"{"decoration_opacity": 2.0, "tree_row_height": 0}"#)
                .unwrap();
        assert_eq!(config.validate().len(), 2);
        assert!(matches!(
            config.validated(),
            Err(ConfigError::Validation(errors)) if errors.len() == 2
        ));
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        assert!(matches!(
            HostConfig::from_toml_str("split_weights = 3"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn payload_flag_wins() {
        let config = HostConfig::default();
        assert!(!config.diff_options(Some(false)).hide_unchanged_regions);
        assert!(config.diff_options(None).hide_unchanged_regions);
    }

    #[test]
    fn modifier_matching() {
        assert!(ModifierKey::Ctrl.matches(&KeyCode::Ctrl));
        assert!(!ModifierKey::Ctrl.matches(&KeyCode::Other("a".into())));
    }
}
