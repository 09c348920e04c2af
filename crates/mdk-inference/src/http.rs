use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::runner::{InferenceError, InferenceRunner, ScoredBatch};

/// Inference runner backed by a batch-scoring HTTP service.
///
/// The service owns model loading and feature lookup; this client posts the
/// model locator and reference-table name to `/invocations` and decodes the
/// scored batch from the response.
pub struct HttpInferenceRunner {
    base_url: String,
    http: reqwest::Client,
}

impl HttpInferenceRunner {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl InferenceRunner for HttpInferenceRunner {
    async fn run_batch(
        &self,
        model_uri: &str,
        reference_table: &str,
    ) -> Result<ScoredBatch, InferenceError> {
        let url = format!("{}/invocations", self.base_url);
        debug!(%url, %model_uri, %reference_table, "scoring request");

        let resp = self
            .http
            .post(&url)
            .json(&json!({
                "model_uri": model_uri,
                "reference_table": reference_table,
            }))
            .send()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            // The scoring service distinguishes the two resolvable causes;
            // anything else is decoded from the status line.
            return Err(match status.as_u16() {
                404 if message.contains("model") => InferenceError::ModelNotFound {
                    model_uri: model_uri.to_string(),
                },
                404 => InferenceError::DatasetMissing {
                    reference_table: reference_table.to_string(),
                },
                code => InferenceError::Transport(format!("status {code}: {message}")),
            });
        }

        let batch: ScoredBatch = resp
            .json()
            .await
            .map_err(|e| InferenceError::Decode(e.to_string()))?;
        batch.validate()?;
        Ok(batch)
    }
}
