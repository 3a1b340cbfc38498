//! Application configuration management

use std::path::PathBuf;

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::chat::{ChatMode, Composer, Model};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Editor settings
    pub editor: EditorConfig,
    /// UI settings
    pub ui: UiConfig,
    /// AI chat settings
    pub chat: ChatConfig,
}

/// Editor-specific settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Font size in pixels
    pub font_size: f32,
    /// Show the formatting toolbar above documents
    pub show_toolbar: bool,
}

/// UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme (light/dark)
    pub theme: String,
    /// Sidebar width
    pub sidebar_width: f32,
    /// Outline / chat panel width
    pub right_panel_width: f32,
    /// Whether the right panel is shown at startup
    pub right_panel_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Delay before the simulated reply arrives
    pub reply_delay_ms: u64,
    pub default_mode: ChatMode,
    pub default_composer: Composer,
    pub default_model: Model,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            show_toolbar: true,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            sidebar_width: 260.0,
            right_panel_width: 320.0,
            right_panel_visible: true,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: 1000,
            default_mode: ChatMode::Agent,
            default_composer: Composer::Composer1,
            default_model: Model::Gpt4,
        }
    }
}

impl UiConfig {
    pub fn is_dark(&self) -> bool {
        self.theme != "light"
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "inkdesk", "Inkdesk")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_json(&content)
    }

    /// Parse configuration, filling missing fields with defaults
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = AppConfig::from_json(r#"{ "ui": { "theme": "light" }, "chat": { "default_model": "claude-3-opus" } }"#)
            .unwrap();
        assert_eq!(config.ui.theme, "light");
        assert!(!config.ui.is_dark());
        assert_eq!(config.ui.sidebar_width, 260.0);
        assert_eq!(config.chat.default_model, Model::Claude3Opus);
        assert_eq!(config.chat.reply_delay_ms, 1000);
        assert_eq!(config.editor, EditorConfig::default());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(AppConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_serialized_form_reloads() {
        let mut config = AppConfig::default();
        config.chat.default_mode = ChatMode::Chat;
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""default_mode":"chat""#));
        assert_eq!(AppConfig::from_json(&json).unwrap(), config);
    }
}
