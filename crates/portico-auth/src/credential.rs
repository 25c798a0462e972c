//! HMAC-signed bearer credentials (JWT).

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `iss` claim of every credential this gateway issues.
pub const ISSUER: &str = "api-gateway";

/// Lifetime of an issued credential.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Shortest secret accepted for HMAC-SHA256.
pub const MIN_SECRET_LEN: usize = 32;

/// Registered claims carried by a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user name).
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Issued at (Unix timestamp, seconds).
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds).
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum CredentialError {
    /// The configured secret is too short for any HMAC-SHA variant.
    #[error("signing secret is {0} bytes, at least {MIN_SECRET_LEN} are required")]
    WeakSecret(usize),

    #[error("failed to sign credential: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// Malformed, wrongly signed, or expired. Deliberately not more specific.
    #[error("invalid credential")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Issues and checks credentials with one process-wide key.
///
/// The key is derived once in [`Self::from_secret`]; the validator is then
/// read-only and can be shared across threads behind an `Arc`.
pub struct CredentialValidator {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for CredentialValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialValidator")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl CredentialValidator {
    /// Derive the signing key from a secret.
    ///
    /// The HMAC variant follows the secret length: 64+ bytes sign with HS512,
    /// 48+ with HS384, 32+ with HS256. Tokens signed with any variant the key
    /// is long enough for are accepted.
    pub fn from_secret(secret: &str) -> Result<Self, CredentialError> {
        let bytes = secret.as_bytes();
        let algorithm = algorithm_for_key_len(bytes.len())
            .ok_or(CredentialError::WeakSecret(bytes.len()))?;

        let mut validation = Validation::new(algorithm);
        validation.algorithms = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512]
            .into_iter()
            .filter(|alg| bytes.len() >= min_key_len(*alg))
            .collect();
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            validation,
        })
    }

    /// The algorithm new credentials are signed with.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Issue a credential for `subject`, valid for one hour from now.
    pub fn issue(&self, subject: &str) -> Result<String, CredentialError> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    /// Issue a credential as if the current time were `issued_at`.
    pub fn issue_at(&self, subject: &str, issued_at: i64) -> Result<String, CredentialError> {
        let claims = Claims {
            sub: subject.to_string(),
            iss: ISSUER.to_string(),
            iat: issued_at,
            exp: issued_at + TOKEN_TTL_SECS,
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(CredentialError::Signing)
    }

    /// Decode and verify a credential.
    pub fn verify(&self, token: &str) -> Result<Claims, CredentialError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(CredentialError::Invalid)
    }

    /// Whether `token` is well-formed, correctly signed and unexpired.
    pub fn validate(&self, token: &str) -> bool {
        match self.verify(token) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = ?e, "credential failed validation");
                false
            }
        }
    }

    /// The subject of a credential already checked with [`Self::validate`].
    ///
    /// Fails on anything [`Self::validate`] would reject.
    pub fn subject_of(&self, token: &str) -> Result<String, CredentialError> {
        self.verify(token).map(|claims| claims.sub)
    }
}

fn min_key_len(algorithm: Algorithm) -> usize {
    match algorithm {
        Algorithm::HS512 => 64,
        Algorithm::HS384 => 48,
        _ => MIN_SECRET_LEN,
    }
}

fn algorithm_for_key_len(len: usize) -> Option<Algorithm> {
    [Algorithm::HS512, Algorithm::HS384, Algorithm::HS256]
        .into_iter()
        .find(|alg| len >= min_key_len(*alg))
}
