use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());

pub const DEFAULT_PRIMARY_COLOR: &str = "#3b82f6";
pub const DEFAULT_SECONDARY_COLOR: &str = "#6b7280";

/// Theme configuration stored in the domain's `theme_config` column.
/// Field names stay camelCase on the wire and in JSONB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    pub primary_color: String,
    pub secondary_color: String,
    pub logo_url: Option<String>,
    /// Name of the Keycloak login theme to use
    pub login_theme: Option<String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_string(),
            logo_url: None,
            login_theme: None,
        }
    }
}

impl ThemeConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !HEX_COLOR_RE.is_match(&self.primary_color) {
            return Err(AppError::Validation(format!(
                "primaryColor must be a hex color like {}, got '{}'",
                DEFAULT_PRIMARY_COLOR, self.primary_color
            )));
        }
        if !HEX_COLOR_RE.is_match(&self.secondary_color) {
            return Err(AppError::Validation(format!(
                "secondaryColor must be a hex color like {}, got '{}'",
                DEFAULT_SECONDARY_COLOR, self.secondary_color
            )));
        }
        Ok(())
    }

    /// Parse a stored JSONB blob, falling back to defaults when the
    /// column is NULL or holds an unexpected shape.
    pub fn from_stored(value: Option<&serde_json::Value>) -> Self {
        value
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }
}

// ── Tests ────────────────────────────────────────────────────
