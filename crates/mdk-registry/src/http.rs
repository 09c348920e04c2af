use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::{RegistryClient, RegistryError};
use crate::types::{ModelVersion, Stage};

/// Registry client speaking an MLflow-style REST API.
pub struct HttpRegistryClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpRegistryClient {
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

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/2.0/mlflow/{path}", self.base_url)
    }

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, RegistryError> {
        let url = self.endpoint(path);
        debug!(%url, "registry request");
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RegistryError::Api {
                code: Some(status.as_u16()),
                message,
            });
        }
        Ok(resp)
    }
}

#[derive(Deserialize)]
struct LatestVersionsResponse {
    #[serde(default)]
    model_versions: Vec<WireModelVersion>,
}

#[derive(Deserialize)]
struct WireModelVersion {
    name: String,
    version: String,
    current_stage: String,
}

impl WireModelVersion {
    fn into_model_version(self) -> Result<ModelVersion, RegistryError> {
        // The wire stage is capitalized ("Staging"); normalise before parsing.
        let stage = Stage::parse(&self.current_stage.to_lowercase()).ok_or_else(|| {
            RegistryError::Decode(format!("unknown stage: {}", self.current_stage))
        })?;
        Ok(ModelVersion {
            name: self.name,
            version: self.version,
            stage,
        })
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn latest_version(
        &self,
        name: &str,
        stage: Stage,
    ) -> Result<ModelVersion, RegistryError> {
        let resp = self
            .post_json(
                "registered-models/get-latest-versions",
                json!({ "name": name, "stages": [stage.as_str()] }),
            )
            .await?;

        let parsed: LatestVersionsResponse = resp
            .json()
            .await
            .map_err(|e| RegistryError::Decode(e.to_string()))?;

        let wire = parsed
            .model_versions
            .into_iter()
            .next()
            .ok_or(RegistryError::NotFound {
                name: name.to_string(),
                stage,
            })?;
        wire.into_model_version()
    }

    async fn transition_stage(
        &self,
        name: &str,
        version: &str,
        new_stage: Stage,
        archive_existing: bool,
    ) -> Result<(), RegistryError> {
        self.post_json(
            "model-versions/transition-stage",
            json!({
                "name": name,
                "version": version,
                "stage": new_stage.as_str(),
                "archive_existing_versions": archive_existing,
            }),
        )
        .await?;
        Ok(())
    }
}
