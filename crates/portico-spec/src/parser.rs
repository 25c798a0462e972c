use serde_json::Value;

use crate::error::ParseError;
use crate::model::{ApiDocument, Components, RawDocument};

/// Top-level keys whose `null` value means "absent" (e.g. `paths:` with no entries).
const NULLABLE_ROOT_KEYS: &[&str] = &["info", "paths", "tags", "components", "security"];

/// Parse an OpenAPI 3.x document from a YAML or JSON string.
pub fn parse_document(input: &str) -> Result<ApiDocument, ParseError> {
    // Parse YAML (also handles JSON since JSON is valid YAML)
    let root: Value =
        serde_yaml::from_str(input).map_err(|e| ParseError::Syntax(e.to_string()))?;

    let mut root_obj = match root {
        Value::Object(obj) => obj,
        _ => return Err(ParseError::Structure("document root must be an object".into())),
    };

    detect_version(&mut root_obj)?;

    for key in NULLABLE_ROOT_KEYS {
        if root_obj.get(*key).is_some_and(Value::is_null) {
            root_obj.remove(*key);
        }
    }

    check_object(&root_obj, "info")?;
    check_paths(&root_obj)?;
    check_tags(&root_obj)?;
    check_components(&root_obj)?;

    serde_json::from_value(Value::Object(root_obj))
        .map_err(|e| ParseError::Structure(e.to_string()))
}

/// Parse fetched text, logging and discarding anything that is not a usable document.
pub fn parse_raw(raw: &RawDocument) -> Option<ApiDocument> {
    match parse_document(&raw.text) {
        Ok(doc) => {
            tracing::debug!(
                source = %raw.source_location,
                paths = doc.paths.len(),
                "parsed upstream document"
            );
            Some(doc)
        }
        Err(e) => {
            portico_telemetry::log_source_parse_failed!(
                source = %raw.source_location,
                error = %e,
                "discarding unparseable upstream document"
            );
            None
        }
    }
}

/// Require an `openapi: 3.x` root field.
///
/// An unquoted YAML version such as `3.0` arrives as a number; it is checked
/// in its textual form and stored back as a string.
fn detect_version(root: &mut serde_json::Map<String, Value>) -> Result<(), ParseError> {
    let version = match root.get("openapi") {
        Some(Value::String(version)) => version.clone(),
        Some(Value::Number(version)) => version.to_string(),
        Some(other) => return Err(ParseError::UnsupportedVersion(other.to_string())),
        None => return Err(ParseError::UnknownFormat),
    };

    if !version.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(version));
    }
    root.insert("openapi".to_string(), Value::String(version));
    Ok(())
}

fn check_object(root: &serde_json::Map<String, Value>, key: &str) -> Result<(), ParseError> {
    match root.get(key) {
        None | Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(ParseError::Structure(format!("'{}' must be an object", key))),
    }
}

fn check_paths(root: &serde_json::Map<String, Value>) -> Result<(), ParseError> {
    check_object(root, "paths")?;
    let Some(paths) = root.get("paths").and_then(Value::as_object) else {
        return Ok(());
    };

    for (path, item) in paths {
        if !item.is_object() {
            return Err(ParseError::Structure(format!(
                "path item for '{}' must be an object",
                path
            )));
        }
    }
    Ok(())
}

fn check_tags(root: &serde_json::Map<String, Value>) -> Result<(), ParseError> {
    let tags = match root.get("tags") {
        None => return Ok(()),
        Some(Value::Array(tags)) => tags,
        Some(_) => return Err(ParseError::Structure("'tags' must be an array".into())),
    };

    for (i, tag) in tags.iter().enumerate() {
        let has_name = tag
            .as_object()
            .and_then(|t| t.get("name"))
            .is_some_and(Value::is_string);
        if !has_name {
            return Err(ParseError::Structure(format!(
                "tag #{} must be an object with a string 'name'",
                i
            )));
        }
    }
    Ok(())
}

fn check_components(root: &serde_json::Map<String, Value>) -> Result<(), ParseError> {
    check_object(root, "components")?;
    let Some(components) = root.get("components").and_then(Value::as_object) else {
        return Ok(());
    };

    for name in Components::BUCKET_NAMES {
        match components.get(name) {
            None | Some(Value::Null) | Some(Value::Object(_)) => {}
            Some(_) => {
                return Err(ParseError::Structure(format!(
                    "'components.{}' must be an object",
                    name
                )))
            }
        }
    }
    Ok(())
}
