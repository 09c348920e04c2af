//! Model-registry boundary.
//!
//! This crate defines the stage model, version metadata, the registry client
//! trait and its error type. The only concrete implementation here is the
//! HTTP client for an MLflow-style registry REST API; in-memory fakes for
//! tests live in `mdk-testkit`.

mod client;
mod http;
mod types;

pub use client::{RegistryClient, RegistryError};
pub use http::HttpRegistryClient;
pub use types::{ModelRef, ModelVersion, Stage};
