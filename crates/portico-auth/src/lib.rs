//! Bearer credentials and request admission for the Portico gateway.
//!
//! [`CredentialValidator`] signs and verifies HMAC JWTs with a key derived
//! once at startup. [`AdmissionGate`] decides, per request, whether to let it
//! through, reject it, or skip the check for public paths.

pub mod credential;
pub mod gate;

pub use credential::{
    Claims, CredentialError, CredentialValidator, ISSUER, MIN_SECRET_LEN, TOKEN_TTL_SECS,
};
pub use gate::{Admission, AdmissionGate, RejectReason, BEARER_PREFIX, DEFAULT_PUBLIC_PREFIX};
