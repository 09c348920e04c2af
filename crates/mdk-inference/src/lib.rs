//! Batch-scoring boundary.
//!
//! Defines the scored-batch result type, the inference-runner trait and its
//! error type, plus the HTTP implementation for a scoring service. The
//! runner is given a model locator and the name of a reference table; how
//! features are looked up and joined is the scoring service's concern.

mod http;
mod runner;

pub use http::HttpInferenceRunner;
pub use runner::{InferenceError, InferenceRunner, ScoredBatch, PREDICTION_COL};
