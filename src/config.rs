/// Compose options
///
/// User-tunable limits for the composer, stored as JSON in the platform
/// config directory. Missing or unreadable files fall back to defaults
/// that match the classic compose dialog: PNG/JPEG/BMP attachments, at
/// most five per post, captions up to 2200 characters.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::accept::AcceptRule;

/// All user-configurable composer limits.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ComposeOptions {
    /// MIME types accepted as attachments
    pub allowed_mime_types: Vec<String>,

    /// Maximum number of attachments per post
    pub max_attachments: usize,

    /// Maximum caption length, in characters, after trimming
    pub caption_max_chars: usize,

    /// When true, a post cannot be submitted while any attachment
    /// failed to produce a preview. The classic dialog submits anyway,
    /// so this defaults to false.
    pub require_previews_for_submit: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            allowed_mime_types: vec![
                "image/png".to_string(),
                "image/jpeg".to_string(),
                "image/bmp".to_string(),
            ],
            max_attachments: 5,
            caption_max_chars: 2200,
            require_previews_for_submit: false,
        }
    }
}

impl ComposeOptions {
    /// Build the accept rule for one selection event.
    pub fn accept_rule(&self) -> AcceptRule {
        AcceptRule::new(self.allowed_mime_types.iter().cloned(), self.max_attachments)
    }

    /// Convert to JSON string for storage
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load options from the config file, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(options) => options,
                Err(e) => {
                    eprintln!("⚠️  Ignoring invalid config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Where the config file lives:
    /// - Linux: ~/.config/post-composer/config.json
    /// - macOS: ~/Library/Application Support/post-composer/config.json
    /// - Windows: %APPDATA%\post-composer\config.json
    fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("post-composer");
        path.push("config.json");
        Some(path)
    }
}
