//! Prefix-routed forwarding of admitted requests to upstream services.

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use http::header::{self, HeaderMap};
use http_body_util::LengthLimitError;
use reqwest::Client;
use url::Url;

use crate::error::ProblemDetails;

/// Largest request body buffered for forwarding.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Headers that describe one connection and are not forwarded.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
];

/// Whether `path` has a `.` or `..` segment, literal or percent-encoded.
///
/// Such paths are refused outright: the upstream URL would resolve them and
/// land outside the prefix the admission gate matched.
pub fn has_dot_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}

/// One forwarding rule.
#[derive(Debug, Clone)]
pub struct Route {
    prefix: String,
    upstream: Url,
    strip_prefix: bool,
}

impl Route {
    pub fn new(prefix: impl Into<String>, upstream: Url, strip_prefix: bool) -> Self {
        Self {
            prefix: prefix.into(),
            upstream,
            strip_prefix,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `path` is the prefix itself or lies below it.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix.ends_with('/'),
            None => false,
        }
    }

    /// Upstream URL for a matched path and optional query.
    pub fn target(&self, path: &str, query: Option<&str>) -> Url {
        let forwarded = if self.strip_prefix {
            match path.strip_prefix(self.prefix.as_str()) {
                Some(rest) if rest.starts_with('/') => rest.to_string(),
                Some(rest) => format!("/{}", rest),
                None => path.to_string(),
            }
        } else {
            path.to_string()
        };

        let mut url = self.upstream.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}{}", base, forwarded));
        url.set_query(query);
        url
    }
}

/// Sends admitted requests to the first route whose prefix matches.
#[derive(Debug, Clone)]
pub struct Forwarder {
    routes: Vec<Route>,
    client: Client,
}

impl Forwarder {
    /// Build a forwarder with its own client: no redirects followed, bodies
    /// passed through without decompression.
    pub fn new(routes: Vec<Route>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .no_gzip()
            .build()?;
        Ok(Self { routes, client })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route_for(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(path))
    }

    /// Forward a request and relay the upstream response.
    ///
    /// Method, headers (minus hop-by-hop), query and body pass through
    /// unchanged, including `Authorization`.
    pub async fn forward(&self, request: Request) -> Response {
        let path = request.uri().path().to_string();
        if has_dot_segment(&path) {
            return ProblemDetails::bad_request("path must not contain dot segments")
                .into_response();
        }
        let Some(route) = self.route_for(&path) else {
            return ProblemDetails::not_found(format!("no route for '{}'", path)).into_response();
        };
        let target = route.target(&path, request.uri().query());

        let (parts, body) = request.into_parts();
        let body = match to_bytes(body, MAX_BODY_BYTES).await {
            Ok(body) => body,
            Err(e) if exceeds_limit(&e) => {
                return ProblemDetails::payload_too_large(format!(
                    "request body exceeds {} bytes",
                    MAX_BODY_BYTES
                ))
                .into_response();
            }
            Err(e) => {
                return ProblemDetails::bad_request(format!("failed to read request body: {}", e))
                    .into_response();
            }
        };

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        headers.remove(header::CONTENT_LENGTH);

        let upstream = self
            .client
            .request(parts.method, target.clone())
            .headers(headers)
            .body(body)
            .send()
            .await;

        match upstream {
            Ok(response) => relay(response),
            Err(e) => {
                portico_telemetry::log_forward_failed!(
                    route = %route.prefix(),
                    target = %target,
                    error = %e,
                    "upstream request failed"
                );
                ProblemDetails::bad_gateway(format!("upstream for '{}' is unavailable", route.prefix()))
                    .into_response()
            }
        }
    }
}

fn exceeds_limit(err: &axum::Error) -> bool {
    std::error::Error::source(err).is_some_and(|source| source.is::<LengthLimitError>())
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_by_hop(&mut headers);

    let mut response = Body::from_stream(upstream.bytes_stream()).into_response();
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(prefix: &str, upstream: &str, strip: bool) -> Route {
        Route::new(prefix, upstream.parse().unwrap(), strip)
    }

    #[test]
    fn prefix_matches_on_segment_boundary() {
        let r = route("/user", "http://localhost:8081", false);
        assert!(r.matches("/user"));
        assert!(r.matches("/user/profiles"));
        assert!(!r.matches("/users"));
        assert!(!r.matches("/booking/user"));
    }

    #[test]
    fn target_keeps_path_by_default() {
        let r = route("/user", "http://localhost:8081", false);
        let url = r.target("/user/profiles", Some("page=2"));
        assert_eq!(url.as_str(), "http://localhost:8081/user/profiles?page=2");
    }

    #[test]
    fn target_strips_prefix_when_asked() {
        let r = route("/user", "http://localhost:8081/api/", true);
        assert_eq!(
            r.target("/user/profiles", None).as_str(),
            "http://localhost:8081/api/profiles"
        );
        assert_eq!(r.target("/user", None).as_str(), "http://localhost:8081/api/");
    }

    #[test]
    fn first_matching_route_wins() {
        let forwarder = Forwarder::new(vec![
            route("/user/admin", "http://admin", false),
            route("/user", "http://users", false),
        ])
        .unwrap();
        assert_eq!(forwarder.route_for("/user/admin/x").unwrap().prefix(), "/user/admin");
        assert_eq!(forwarder.route_for("/user/x").unwrap().prefix(), "/user");
        assert!(forwarder.route_for("/other").is_none());
    }

    #[test]
    fn dot_segments_are_detected() {
        for path in [
            "/auth/login/../me",
            "/auth/login/%2e%2e/me",
            "/auth/login/%2E./me",
            "/auth/./login",
            "/auth/login/..",
            "/auth/login\\..\\me",
        ] {
            assert!(has_dot_segment(path), "missed {:?}", path);
        }
        for path in ["/auth/login", "/files/a..b", "/files/.hidden", "/v1.2/items"] {
            assert!(!has_dot_segment(path), "flagged {:?}", path);
        }
    }

    #[test]
    fn hop_by_hop_headers_are_removed() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, "close".parse().unwrap());
        headers.insert(header::HOST, "gateway".parse().unwrap());
        headers.insert("keep-alive", "timeout=5".parse().unwrap());
        headers.insert(header::AUTHORIZATION, "Bearer x".parse().unwrap());
        strip_hop_by_hop(&mut headers);
        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(header::AUTHORIZATION));
    }
}
