//! Merging of parsed upstream documents into one gateway document.
//!
//! Precedence rules:
//! - paths and component entries: the later source overwrites the earlier
//!   one on an identical key, silently;
//! - tags: the first occurrence of a name wins, later ones are dropped;
//! - `bearerAuth`: always the gateway's own scheme, whatever the sources say.
//!
//! Callers that need stable collision outcomes must feed sources in a stable
//! order (see [`crate::MergeOrder`]).

use std::collections::{BTreeMap, HashSet};

use portico_spec::{ApiDocument, Bucket, Components, Info, SecurityRequirement, Tag};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::registry::SourceSpec;

/// Name of the security scheme injected into every merged document.
pub const BEARER_SCHEME_NAME: &str = "bearerAuth";

/// `openapi` version declared by merged documents.
pub const MERGED_OPENAPI_VERSION: &str = "3.0.1";

/// Title and version of the merged document. Never taken from sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergedInfo {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_title() -> String {
    "API Gateway (Merged)".to_string()
}

fn default_version() -> String {
    "v1".to_string()
}

impl Default for MergedInfo {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_version(),
        }
    }
}

/// Merge documents in the order given.
pub fn merge<I>(parsed: I, info: &MergedInfo) -> ApiDocument
where
    I: IntoIterator<Item = (SourceSpec, ApiDocument)>,
{
    let mut merged = ApiDocument::new(
        MERGED_OPENAPI_VERSION,
        Info::new(info.title.clone(), info.version.clone()),
    );
    let mut components = Components::default();
    let mut seen_tags = HashSet::new();

    for (source, doc) in parsed {
        merge_paths(&mut merged.paths, &source.prefix, doc.paths);
        merge_tags(&mut merged.tags, &mut seen_tags, doc.tags);
        if let Some(src) = doc.components {
            merge_components(&mut components, src);
        }
    }

    inject_bearer_auth(&mut merged, components);
    merged
}

fn merge_paths(
    dst: &mut BTreeMap<String, Map<String, Value>>,
    prefix: &str,
    paths: BTreeMap<String, Map<String, Value>>,
) {
    for (path, item) in paths {
        dst.insert(format!("{}{}", prefix, path), item);
    }
}

fn merge_tags(dst: &mut Vec<Tag>, seen: &mut HashSet<String>, tags: Vec<Tag>) {
    for tag in tags {
        if seen.insert(tag.name.clone()) {
            dst.push(tag);
        }
    }
}

fn merge_components(dst: &mut Components, src: Components) {
    for (dst_bucket, src_bucket) in dst.buckets_mut().into_iter().zip(src.into_buckets()) {
        if let Some(entries) = src_bucket {
            dst_bucket.get_or_insert_with(Bucket::new).extend(entries);
        }
    }
}

fn inject_bearer_auth(merged: &mut ApiDocument, mut components: Components) {
    components.security_schemes.get_or_insert_with(Bucket::new).insert(
        BEARER_SCHEME_NAME.to_string(),
        json!({
            "type": "http",
            "scheme": "bearer",
            "bearerFormat": "JWT"
        }),
    );

    let requirement: SecurityRequirement =
        BTreeMap::from([(BEARER_SCHEME_NAME.to_string(), Vec::new())]);
    merged.security = vec![requirement];
    merged.components = Some(components);
}
