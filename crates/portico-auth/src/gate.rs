//! Per-request admission decision for routed traffic.

use std::sync::Arc;

use http::header::AUTHORIZATION;
use http::Request;

use crate::credential::CredentialValidator;

/// Scheme prefix of an acceptable `Authorization` header. Case-sensitive.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Path prefix served without a credential when none is configured.
pub const DEFAULT_PUBLIC_PREFIX: &str = "/auth/login";

/// Outcome of [`AdmissionGate::admit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Public path, forwarded without inspecting credentials.
    Bypassed,
    /// Not forwarded. Answered with 401 and an empty body.
    Unauthorized(RejectReason),
    /// Valid credential; forwarded unchanged.
    Authorized { subject: String },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Admission::Unauthorized(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingHeader,
    NotBearer,
    InvalidCredential,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingHeader => "missing_header",
            RejectReason::NotBearer => "not_bearer",
            RejectReason::InvalidCredential => "invalid_credential",
        }
    }
}

/// Decides whether a request may be forwarded.
///
/// Stateless apart from the shared validator; safe to call concurrently.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    validator: Arc<CredentialValidator>,
    public_prefixes: Vec<String>,
}

impl AdmissionGate {
    /// Build a gate. An empty `public_prefixes` falls back to
    /// [`DEFAULT_PUBLIC_PREFIX`].
    pub fn new(validator: Arc<CredentialValidator>, public_prefixes: Vec<String>) -> Self {
        let public_prefixes = if public_prefixes.is_empty() {
            vec![DEFAULT_PUBLIC_PREFIX.to_string()]
        } else {
            public_prefixes
        };
        Self {
            validator,
            public_prefixes,
        }
    }

    pub fn validator(&self) -> &CredentialValidator {
        &self.validator
    }

    /// Whether `path` starts with any public prefix.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Decide on a request given its path and raw `Authorization` value.
    pub fn admit(&self, path: &str, authorization: Option<&str>) -> Admission {
        if self.is_public(path) {
            portico_telemetry::log_admission_bypassed!(path = %path, "public path");
            return Admission::Bypassed;
        }

        let admission = match extract_token(authorization) {
            Err(reason) => Admission::Unauthorized(reason),
            Ok(token) if !self.validator.validate(token) => {
                Admission::Unauthorized(RejectReason::InvalidCredential)
            }
            Ok(token) => match self.validator.subject_of(token) {
                Ok(subject) => Admission::Authorized { subject },
                Err(_) => Admission::Unauthorized(RejectReason::InvalidCredential),
            },
        };

        match &admission {
            Admission::Unauthorized(reason) => {
                portico_telemetry::log_admission_rejected!(
                    path = %path,
                    reason = reason.as_str(),
                    "request rejected"
                );
            }
            Admission::Authorized { subject } => {
                tracing::debug!(path = %path, subject = %subject, "request admitted");
            }
            Admission::Bypassed => {}
        }

        admission
    }

    /// [`Self::admit`] for an HTTP request.
    ///
    /// A header value that is not visible ASCII counts as a non-bearer header.
    pub fn admit_request<B>(&self, request: &Request<B>) -> Admission {
        let authorization = request
            .headers()
            .get(AUTHORIZATION)
            .map(|value| value.to_str().unwrap_or(""));
        self.admit(request.uri().path(), authorization)
    }
}

fn extract_token(authorization: Option<&str>) -> Result<&str, RejectReason> {
    let header = authorization.ok_or(RejectReason::MissingHeader)?;
    header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(RejectReason::NotBearer)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn gate() -> AdmissionGate {
        let validator = CredentialValidator::from_secret(SECRET).unwrap();
        AdmissionGate::new(Arc::new(validator), Vec::new())
    }

    fn bearer(gate: &AdmissionGate, subject: &str) -> String {
        format!("{}{}", BEARER_PREFIX, gate.validator().issue(subject).unwrap())
    }

    #[test]
    fn login_path_bypasses_even_with_bad_header() {
        let gate = gate();
        assert_eq!(
            gate.admit("/auth/login", Some("Bearer garbage")),
            Admission::Bypassed
        );
        assert_eq!(gate.admit("/auth/login/refresh", None), Admission::Bypassed);
    }

    #[test]
    fn missing_header_is_rejected() {
        assert_eq!(
            gate().admit("/user/profiles", None),
            Admission::Unauthorized(RejectReason::MissingHeader)
        );
    }

    #[test]
    fn other_scheme_is_rejected() {
        let gate = gate();
        assert_eq!(
            gate.admit("/user/profiles", Some("Basic dXNlcjpwYXNz")),
            Admission::Unauthorized(RejectReason::NotBearer)
        );
        // Scheme match is case-sensitive.
        let token = gate.validator().issue("alice").unwrap();
        assert_eq!(
            gate.admit("/user/profiles", Some(&format!("bearer {}", token))),
            Admission::Unauthorized(RejectReason::NotBearer)
        );
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert_eq!(
            gate().admit("/user/profiles", Some("Bearer garbage")),
            Admission::Unauthorized(RejectReason::InvalidCredential)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let gate = gate();
        let issued = chrono::Utc::now().timestamp() - 7200;
        let token = gate.validator().issue_at("alice", issued).unwrap();
        let admission = gate.admit("/user/profiles", Some(&format!("Bearer {}", token)));
        assert!(!admission.is_allowed());
    }

    #[test]
    fn valid_token_is_admitted_with_subject() {
        let gate = gate();
        let header = bearer(&gate, "alice");
        assert_eq!(
            gate.admit("/booking/bookings", Some(&header)),
            Admission::Authorized {
                subject: "alice".to_string()
            }
        );
    }

    #[test]
    fn configured_prefixes_replace_default() {
        let validator = CredentialValidator::from_secret(SECRET).unwrap();
        let gate = AdmissionGate::new(
            Arc::new(validator),
            vec!["/public".to_string(), "/auth/register".to_string()],
        );
        assert!(gate.is_public("/public/status"));
        assert!(gate.is_public("/auth/register"));
        assert!(!gate.is_public("/auth/login"));
    }

    #[test]
    fn admit_request_reads_path_and_header() {
        let gate = gate();
        let header = bearer(&gate, "bob");
        let request = Request::builder()
            .uri("http://gateway/user/profiles?page=2")
            .header(AUTHORIZATION, header)
            .body(())
            .unwrap();
        assert_eq!(
            gate.admit_request(&request),
            Admission::Authorized {
                subject: "bob".to_string()
            }
        );

        let anonymous = Request::builder().uri("/auth/login").body(()).unwrap();
        assert_eq!(gate.admit_request(&anonymous), Admission::Bypassed);
    }
}
