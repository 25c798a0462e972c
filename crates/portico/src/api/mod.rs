//! HTTP surface of the gateway.

mod admission;
mod docs;
mod health;
mod router;


pub use router::{create_router, AppState};
