//! Rendering of documents to text.

use crate::error::SerializeError;
use crate::model::ApiDocument;

/// Output encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Compact JSON (canonical).
    #[default]
    Json,
    /// YAML.
    Yaml,
}

impl Format {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// The `Content-Type` to serve this encoding with.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Yaml => "application/yaml",
        }
    }
}

/// Render a document. Deterministic: maps are key-ordered and tags keep
/// their stored order.
pub fn serialize(doc: &ApiDocument, format: Format) -> Result<String, SerializeError> {
    match format {
        Format::Json => Ok(serde_json::to_string(doc)?),
        Format::Yaml => Ok(serde_yaml::to_string(doc)?),
    }
}
