//! Gateway configuration file (`portico.yaml`).
//!
//! ```yaml
//! listen: 0.0.0.0:8080
//! sources:
//!   - http://localhost:8081/v3/api-docs
//!   - http://localhost:8083/v3/api-docs
//! prefixes:
//!   - { origin: "http://localhost:8081", prefix: /user }
//!   - { origin: "http://localhost:8083", prefix: /booking }
//! merge_order: configured
//! auth:
//!   public_paths: [/auth/login]
//! routes:
//!   - { prefix: /user, upstream: "http://localhost:8081", strip_prefix: true }
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use portico_aggregator::{
    Aggregator, FetchConfig, HttpFetcher, MergeOrder, MergedInfo, PrefixRule, RegistryError,
    SourceRegistry,
};
use portico_auth::{AdmissionGate, CredentialError, CredentialValidator, DEFAULT_PUBLIC_PREFIX};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::forward::{Forwarder, Route};

/// Errors loading configuration or building components from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("no signing secret configured (set auth.secret, PORTICO_JWT_SECRET or --jwt-secret)")]
    MissingSecret,

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("invalid route '{prefix}': {reason}")]
    InvalidRoute { prefix: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Upstream document locations, in configuration order.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Origin -> prefix rules; the first matching rule wins.
    #[serde(default)]
    pub prefixes: Vec<PrefixRule>,

    #[serde(default)]
    pub merge_order: MergeOrder,

    #[serde(default)]
    pub fetch: FetchSettings,

    #[serde(default)]
    pub info: MergedInfo,

    #[serde(default)]
    pub auth: AuthSettings,

    /// Forwarding table for proxied traffic; the first matching prefix wins.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchSettings {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSettings {
    /// HMAC signing secret. Usually supplied through the environment instead.
    #[serde(default)]
    pub secret: Option<String>,

    /// Path prefixes admitted without a credential.
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_public_paths() -> Vec<String> {
    vec![DEFAULT_PUBLIC_PREFIX.to_string()]
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            secret: None,
            public_paths: default_public_paths(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub prefix: String,
    pub upstream: String,
    #[serde(default)]
    pub strip_prefix: bool,
}

impl GatewayConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from YAML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Replace the file's secret when one is given on the command line or
    /// in the environment.
    pub fn with_secret_override(mut self, secret: Option<String>) -> Self {
        if let Some(secret) = secret {
            self.auth.secret = Some(secret);
        }
        self
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_millis(self.fetch.timeout_ms),
            connect_timeout: Duration::from_millis(self.fetch.connect_timeout_ms),
        }
    }

    pub fn build_registry(&self) -> Result<SourceRegistry, ConfigError> {
        Ok(SourceRegistry::new(&self.sources, &self.prefixes)?)
    }

    pub fn build_aggregator(&self) -> Result<Aggregator, ConfigError> {
        let fetcher = HttpFetcher::new(&self.fetch_config())
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Aggregator::new(self.build_registry()?, fetcher)
            .with_merge_order(self.merge_order)
            .with_info(self.info.clone()))
    }

    pub fn build_validator(&self) -> Result<CredentialValidator, ConfigError> {
        let secret = self
            .auth
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;
        Ok(CredentialValidator::from_secret(secret)?)
    }

    pub fn build_gate(&self) -> Result<AdmissionGate, ConfigError> {
        let validator = self.build_validator()?;
        Ok(AdmissionGate::new(
            std::sync::Arc::new(validator),
            self.auth.public_paths.clone(),
        ))
    }

    pub fn build_forwarder(&self) -> Result<Forwarder, ConfigError> {
        let mut routes = Vec::with_capacity(self.routes.len());
        for route in &self.routes {
            routes.push(route.to_route()?);
        }
        Forwarder::new(routes).map_err(|e| ConfigError::HttpClient(e.to_string()))
    }
}

impl RouteConfig {
    fn to_route(&self) -> Result<Route, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidRoute {
            prefix: self.prefix.clone(),
            reason,
        };

        if !self.prefix.starts_with('/') {
            return Err(invalid("prefix must start with '/'".to_string()));
        }
        let upstream = Url::parse(&self.upstream).map_err(|e| invalid(e.to_string()))?;
        if !matches!(upstream.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "unsupported upstream scheme '{}'",
                upstream.scheme()
            )));
        }

        Ok(Route::new(self.prefix.clone(), upstream, self.strip_prefix))
    }
}
