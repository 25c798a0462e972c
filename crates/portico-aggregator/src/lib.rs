//! Aggregation of upstream OpenAPI documents.
//!
//! ```text
//! SourceRegistry -> DocumentFetcher -> parse_raw -> merge -> serialize
//! ```
//!
//! Every call to [`Aggregator::aggregate`] re-fetches all sources; nothing is
//! cached between passes. Failed sources are logged and left out.

pub mod error;
pub mod fetcher;
pub mod merger;
pub mod pipeline;
pub mod registry;

pub use error::{FetchError, RegistryError};
pub use fetcher::{DocumentFetcher, FetchConfig, HttpFetcher};
pub use merger::{merge, MergedInfo, BEARER_SCHEME_NAME, MERGED_OPENAPI_VERSION};
pub use pipeline::{Aggregator, MergeOrder};
pub use registry::{PrefixRule, SourceRegistry, SourceSpec};
