use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// One named component bucket: local name -> raw component object.
pub type Bucket = BTreeMap<String, Value>;

/// A security requirement: scheme name -> required scopes.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// Document text retrieved from an upstream, not yet parsed.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Where the text was fetched from.
    pub source_location: Url,
    /// The response body as received.
    pub text: String,
}

/// An OpenAPI 3.x document, reduced to the parts the gateway merges.
///
/// Path items and component entries stay as raw JSON values. Fields the
/// gateway does not merge (`servers`, `externalDocs`, root `x-*` keys) are
/// dropped on parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDocument {
    /// The `openapi` version string (e.g. "3.0.1").
    pub openapi: String,

    #[serde(default)]
    pub info: Info,

    /// Global security requirements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,

    /// Path template -> path item object.
    #[serde(default)]
    pub paths: BTreeMap<String, serde_json::Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl ApiDocument {
    /// An empty document with the given metadata.
    pub fn new(openapi: impl Into<String>, info: Info) -> Self {
        Self {
            openapi: openapi.into(),
            info,
            security: Vec::new(),
            tags: Vec::new(),
            paths: BTreeMap::new(),
            components: None,
        }
    }
}

/// The `info` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Everything else (`contact`, `license`, `x-*`), kept verbatim.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Info {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
            extensions: BTreeMap::new(),
        }
    }
}

/// A tag declaration. Tags are identified by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `externalDocs` and `x-*` keys, kept verbatim.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// The `components` object.
///
/// Each bucket is independent: a name only has to be unique within its own
/// bucket. A bucket is `None` when the document does not declare it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<Bucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<Bucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Bucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<Bucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_bodies: Option<Bucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Bucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Bucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<Bucket>,
}

impl Components {
    /// Wire names of the buckets, in the order [`Self::buckets_mut`] yields them.
    pub const BUCKET_NAMES: [&'static str; 8] = [
        "schemas",
        "securitySchemes",
        "parameters",
        "responses",
        "requestBodies",
        "headers",
        "links",
        "callbacks",
    ];

    /// All buckets, mutably, in [`Self::BUCKET_NAMES`] order.
    pub fn buckets_mut(&mut self) -> [&mut Option<Bucket>; 8] {
        [
            &mut self.schemas,
            &mut self.security_schemes,
            &mut self.parameters,
            &mut self.responses,
            &mut self.request_bodies,
            &mut self.headers,
            &mut self.links,
            &mut self.callbacks,
        ]
    }

    /// Take the buckets apart, in [`Self::BUCKET_NAMES`] order.
    pub fn into_buckets(self) -> [Option<Bucket>; 8] {
        [
            self.schemas,
            self.security_schemes,
            self.parameters,
            self.responses,
            self.request_bodies,
            self.headers,
            self.links,
            self.callbacks,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn components_serialize_camel_case_and_skip_absent_buckets() {
        let mut components = Components::default();
        components.security_schemes = Some(Bucket::from([(
            "bearerAuth".to_string(),
            json!({"type": "http"}),
        )]));

        let value = serde_json::to_value(&components).unwrap();
        assert_eq!(value, json!({"securitySchemes": {"bearerAuth": {"type": "http"}}}));
    }

    #[test]
    fn bucket_accessors_line_up_with_names() {
        let mut components = Components::default();
        for bucket in components.buckets_mut() {
            *bucket = Some(Bucket::new());
        }
        let value = serde_json::to_value(&components).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        for name in Components::BUCKET_NAMES {
            assert!(keys.contains(&name), "missing bucket {}", name);
        }
        assert_eq!(keys.len(), Components::BUCKET_NAMES.len());
    }

    #[test]
    fn tag_keeps_unknown_fields() {
        let tag: Tag = serde_json::from_value(json!({
            "name": "users",
            "externalDocs": {"url": "https://example.com"}
        }))
        .unwrap();
        assert_eq!(tag.name, "users");
        assert!(tag.description.is_none());
        assert!(tag.extensions.contains_key("externalDocs"));
    }
}
