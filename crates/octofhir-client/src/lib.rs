//! HTTP FHIR client for the cohort search.
//!
//! [`HttpResourceClient`] implements [`octofhir_cohort::ResourceClient`] over
//! the FHIR REST API using JSON. Connection details live in an explicit
//! [`ClientConfig`] built from a URL or one of the [`ServerPreset`]s.

mod bundle;
pub mod config;
pub mod http;

pub use bundle::decode_page;
pub use config::{AuthHeader, ClientConfig, PreferReturn, ServerPreset};
pub use http::HttpResourceClient;
