use thiserror::Error;

/// Errors building the source registry from configuration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A source location is not a valid URL.
    #[error("invalid source URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A source location uses a scheme other than http/https.
    #[error("unsupported scheme '{scheme}' in source URL '{url}' (expected http or https)")]
    UnsupportedScheme { url: String, scheme: String },
}

/// Reasons a single source could not be retrieved.
///
/// These never leave the fetcher: they are logged and the source is skipped.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or body read failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("upstream returned HTTP {0}")]
    Status(u16),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err)
        }
    }
}
