//! Upstream sources and their path prefixes.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::RegistryError;

/// Maps an upstream origin (e.g. `http://localhost:8081`) to the prefix its
/// paths get in the merged document (e.g. `/user`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrefixRule {
    pub origin: String,
    pub prefix: String,
}

impl PrefixRule {
    pub fn new(origin: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            prefix: prefix.into(),
        }
    }
}

/// One upstream document location and the prefix for its paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub location: Url,
    pub prefix: String,
}

impl SourceSpec {
    pub fn new(location: Url, prefix: impl Into<String>) -> Self {
        Self {
            location,
            prefix: prefix.into(),
        }
    }
}

/// The configured sources, in configuration order.
///
/// Built once at startup and never mutated.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<SourceSpec>,
}

impl SourceRegistry {
    /// Resolve each location's prefix against `rules` and build the registry.
    pub fn new<S: AsRef<str>>(locations: &[S], rules: &[PrefixRule]) -> Result<Self, RegistryError> {
        let mut sources = Vec::with_capacity(locations.len());

        for location in locations {
            let location = location.as_ref();
            let url = Url::parse(location).map_err(|source| RegistryError::InvalidUrl {
                url: location.to_string(),
                source,
            })?;

            if !matches!(url.scheme(), "http" | "https") {
                return Err(RegistryError::UnsupportedScheme {
                    url: location.to_string(),
                    scheme: url.scheme().to_string(),
                });
            }

            let prefix = resolve_prefix(&url, rules).to_string();
            sources.push(SourceSpec::new(url, prefix));
        }

        Ok(Self { sources })
    }

    pub fn sources(&self) -> &[SourceSpec] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Prefix of the first rule whose origin string starts the location's origin.
///
/// Configuration order breaks ties; no rule matching means no prefix.
pub fn resolve_prefix<'a>(location: &Url, rules: &'a [PrefixRule]) -> &'a str {
    let origin = location.origin().ascii_serialization();
    rules
        .iter()
        .find(|rule| origin.starts_with(&rule.origin))
        .map(|rule| rule.prefix.as_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<PrefixRule> {
        vec![
            PrefixRule::new("http://localhost:8081", "/user"),
            PrefixRule::new("http://localhost:8082", "/court-management"),
            PrefixRule::new("http://localhost:8083", "/booking"),
        ]
    }

    #[test]
    fn resolves_prefix_by_origin() {
        let registry = SourceRegistry::new(
            &[
                "http://localhost:8081/v3/api-docs",
                "http://localhost:8083/v3/api-docs",
            ],
            &rules(),
        )
        .unwrap();

        let prefixes: Vec<&str> = registry.sources().iter().map(|s| s.prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["/user", "/booking"]);
    }

    #[test]
    fn unmatched_origin_gets_empty_prefix() {
        let registry =
            SourceRegistry::new(&["http://inventory.internal/v3/api-docs"], &rules()).unwrap();
        assert_eq!(registry.sources()[0].prefix, "");
    }

    #[test]
    fn first_configured_rule_wins() {
        let rules = vec![
            PrefixRule::new("http://localhost", "/first"),
            PrefixRule::new("http://localhost:8081", "/longer"),
        ];
        let url = Url::parse("http://localhost:8081/v3/api-docs").unwrap();
        assert_eq!(resolve_prefix(&url, &rules), "/first");
    }

    #[test]
    fn path_is_not_part_of_the_match() {
        let rules = vec![PrefixRule::new("http://localhost:8081/v3", "/user")];
        let url = Url::parse("http://localhost:8081/v3/api-docs").unwrap();
        assert_eq!(resolve_prefix(&url, &rules), "");
    }

    #[test]
    fn keeps_configuration_order_and_shared_prefixes() {
        let rules = vec![PrefixRule::new("http://localhost", "/shared")];
        let registry = SourceRegistry::new(
            &[
                "http://localhost:9002/docs",
                "http://localhost:9001/docs",
            ],
            &rules,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.sources()[0].location.port(), Some(9002));
        assert!(registry.sources().iter().all(|s| s.prefix == "/shared"));
    }

    #[test]
    fn rejects_invalid_url() {
        let result = SourceRegistry::new(&["not a url"], &rules());
        assert!(matches!(result, Err(RegistryError::InvalidUrl { .. })));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let result = SourceRegistry::new(&["file:///etc/openapi.yaml"], &rules());
        assert!(matches!(
            result,
            Err(RegistryError::UnsupportedScheme { scheme, .. }) if scheme == "file"
        ));
    }
}
