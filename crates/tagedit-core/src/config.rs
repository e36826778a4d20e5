use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::sanitize::TrimSanitizer;

/// Project-level settings read from `.tagedit/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub sanitize: SanitizeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    /// Message shown under the name field when it is blank.
    #[serde(default = "default_required_message")]
    pub required_message: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            required_message: default_required_message(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeConfig {
    /// Collapse runs of internal whitespace to a single space.
    #[serde(default)]
    pub collapse_whitespace: bool,
}

impl EditorConfig {
    /// Sanitizer matching the `[sanitize]` table.
    #[must_use]
    pub const fn sanitizer(&self) -> TrimSanitizer {
        TrimSanitizer {
            collapse_whitespace: self.sanitize.collapse_whitespace,
        }
    }
}

/// Load `.tagedit/config.toml` under `project_root`, falling back to defaults
/// when the file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(project_root: &Path) -> Result<EditorConfig> {
    let path = project_root.join(".tagedit/config.toml");
    if !path.exists() {
        return Ok(EditorConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<EditorConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn default_required_message() -> String {
    "Name cannot be empty".to_string()
}
