//! OpenAPI 3.x document model for the Portico gateway.
//!
//! Reads YAML/JSON API descriptions into [`ApiDocument`], keeping paths and
//! component entries as raw JSON values so they can be moved between
//! documents untouched. Auto-detects the encoding: JSON is parsed as YAML.

pub mod error;
pub mod model;
pub mod parser;
pub mod serializer;

pub use error::{ParseError, SerializeError};
pub use model::{ApiDocument, Bucket, Components, Info, RawDocument, SecurityRequirement, Tag};
pub use parser::{parse_document, parse_raw};
pub use serializer::{serialize, Format};
