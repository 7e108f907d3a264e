//! Stylesheet system for overlay colour palettes
//!
//! Overlays, markers and the heatmap refer to symbolic colour tokens such as
//! `state-incident` or `heat-hot`. A stylesheet resolves those tokens to
//! concrete colours so the same process view can be rendered with different
//! schemes.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing stylesheets
#[derive(Error, Debug)]
pub enum StylesheetError {
    #[error("Failed to read stylesheet file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse stylesheet TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A stylesheet mapping symbolic colors to concrete values
#[derive(Debug, Clone)]
pub struct Stylesheet {
    /// Optional name for the stylesheet
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Color mappings: token name -> hex color
    pub colors: HashMap<String, String>,
}

/// TOML structure for deserializing stylesheets
#[derive(Deserialize)]
struct TomlStylesheet {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    colors: HashMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

/// Default palette used by operations dashboards
const DEFAULT_PALETTE: &str = r##"
[colors]
# Diagram shapes
shape-stroke = "#22242a"
shape-fill = "#ffffff"
shape-background = "#f7f8fa"

# Token state badges
state-active = "#10d070"
state-incident = "#ff3d3d"
state-canceled = "#62626e"
state-completed = "#4d90ff"

# Pending modification badges
badge-new = "#10d070"
badge-cancelled = "#ff3d3d"
badge-background = "#ffffff"

# Target values
target-badge = "#f5a623"
tooltip-background = "#393a41"
highlight = "#4d90ff"

# Heatmap gradient endpoints
heat-cold = "#4d90ff"
heat-hot = "#ff3d3d"

# Text
text-1 = "#22242a"
text-2 = "#62626e"
text-light = "#ffffff"
"##;

impl Stylesheet {
    /// Load stylesheet from TOML file
    pub fn from_file(path: &Path) -> Result<Self, StylesheetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load stylesheet from TOML string
    pub fn from_str(content: &str) -> Result<Self, StylesheetError> {
        let parsed: TomlStylesheet = toml::from_str(content)?;

        Ok(Stylesheet {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            colors: parsed.colors,
        })
    }

    /// Resolve a symbolic color token to a concrete value
    ///
    /// Returns None if the token is not defined in this stylesheet.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.colors.get(token).map(|s| s.as_str())
    }

    /// Resolve a symbolic color token with fallback to default palette
    ///
    /// Fallback order:
    /// 1. Check this stylesheet for exact token
    /// 2. Check default palette for exact token
    /// 3. Use category default (state → #62626e, heat → #ff3d3d, etc.)
    pub fn resolve_or_default(&self, token: &str) -> String {
        if let Some(color) = self.resolve(token) {
            return color.to_string();
        }

        let default = Self::default();
        if let Some(color) = default.resolve(token) {
            return color.to_string();
        }

        if token.starts_with("shape") {
            return "#22242a".to_string();
        }
        if token.starts_with("state") {
            return "#62626e".to_string();
        }
        if token.starts_with("badge") {
            return "#ffffff".to_string();
        }
        if token.starts_with("heat") {
            return "#ff3d3d".to_string();
        }
        if token.starts_with("text") {
            return "#22242a".to_string();
        }

        // Unknown category - return dark gray
        "#333333".to_string()
    }

    fn empty() -> Self {
        Self {
            name: None,
            description: None,
            colors: HashMap::new(),
        }
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        // An unparsable built-in palette degrades to category fallbacks
        Self::from_str(DEFAULT_PALETTE).unwrap_or_else(|_| Self::empty())
    }
}
