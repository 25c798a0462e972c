//! Portico API gateway.
//!
//! Serves one merged OpenAPI document built from every configured upstream
//! and forwards all other traffic to routed services behind a bearer
//! admission gate.

pub mod api;
pub mod config;
pub mod error;
pub mod forward;
pub mod server;

pub use config::{ConfigError, GatewayConfig};
pub use error::ProblemDetails;
pub use forward::{Forwarder, Route};
