use thiserror::Error;

/// Errors produced while parsing an API description.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The root has no `openapi` field (Swagger 2.0, AsyncAPI, arbitrary YAML).
    #[error("not an OpenAPI 3.x document")]
    UnknownFormat,

    /// The `openapi` field names a version we do not read.
    #[error("unsupported OpenAPI version: {0} (only 3.x supported)")]
    UnsupportedVersion(String),

    /// YAML/JSON syntax error.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Well-formed text with the wrong shape (e.g. `paths` is a list).
    #[error("invalid document structure: {0}")]
    Structure(String),
}

/// Errors produced while rendering a document.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML encoding failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
