//! Configuration for an editing session.

use std::time::Duration;

use cad_schema::Rgb;
use command_graph::history::HistoryConfig;
use command_graph::types::ReorderPolicy;
use serde::{Deserialize, Serialize};

/// Settings for the preview pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Quiet period after the last edit before a kernel request is sent.
    pub debounce_ms: u64,
    /// Whether the selected command is part of the request fingerprint, so
    /// that changing only the selection triggers a new preview.
    pub fingerprint_includes_selection: bool,
    /// Schedule a preview after every edit. When off, only explicit
    /// preview requests reach the kernel.
    pub live_preview: bool,
    /// Color used when the document carries none.
    pub default_color: Rgb,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            fingerprint_includes_selection: false,
            live_preview: true,
            default_color: Rgb::default(),
        }
    }
}

impl PreviewConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Everything an [`crate::session::EditSession`] can be tuned with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub preview: PreviewConfig,
    pub reorder: ReorderPolicy,
}

impl EditorConfig {
    /// Previews only on explicit request.
    pub fn manual_preview() -> Self {
        Self {
            preview: PreviewConfig {
                live_preview: false,
                ..PreviewConfig::default()
            },
            ..Self::default()
        }
    }

    /// Short debounce and selection-aware previews, for a viewer that
    /// highlights the selected command.
    pub fn responsive() -> Self {
        Self {
            preview: PreviewConfig {
                debounce_ms: 250,
                fingerprint_includes_selection: true,
                ..PreviewConfig::default()
            },
            ..Self::default()
        }
    }

    /// Reorders renumber references and history keeps a bounded depth.
    pub fn strict(max_history: usize) -> Self {
        Self {
            history: HistoryConfig::bounded(max_history),
            reorder: ReorderPolicy::Renumber,
            ..Self::default()
        }
    }

    /// Parse a config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Errors from loading configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid editor config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_editor_behavior() {
        let config = EditorConfig::default();
        assert_eq!(config.preview.debounce(), Duration::from_secs(1));
        assert!(config.preview.live_preview);
        assert!(!config.preview.fingerprint_includes_selection);
        assert_eq!(config.reorder, ReorderPolicy::KeepIndices);
        assert_eq!(config.history.max_depth, None);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config =
            EditorConfig::from_json(r#"{ "preview": { "debounce_ms": 300 }, "reorder": "renumber" }"#)
                .unwrap();
        assert_eq!(config.preview.debounce_ms, 300);
        assert!(config.preview.live_preview);
        assert_eq!(config.reorder, ReorderPolicy::Renumber);
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = EditorConfig::from_json(r#"{ "preview": { "debounce_ms": "soon" } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn presets() {
        assert!(!EditorConfig::manual_preview().preview.live_preview);
        assert!(EditorConfig::responsive().preview.fingerprint_includes_selection);
        let strict = EditorConfig::strict(20);
        assert_eq!(strict.history.max_depth, Some(20));
        assert_eq!(strict.reorder, ReorderPolicy::Renumber);
    }
}
