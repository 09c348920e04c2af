use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::store::{
    ActiveRun, ExperimentId, ExperimentRef, RunStatus, TrackingError, TrackingStore,
};

/// Tracking store speaking an MLflow-style tracking REST API.
pub struct HttpTrackingStore {
    base_url: String,
    http: reqwest::Client,
}

impl HttpTrackingStore {
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
    ) -> Result<reqwest::Response, TrackingError> {
        let url = self.endpoint(path);
        debug!(%url, "tracking request");
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TrackingError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TrackingError::Api {
                code: Some(status.as_u16()),
                message,
            });
        }
        Ok(resp)
    }

    async fn get_experiment_by_id(&self, id: i64) -> Result<Option<ExperimentId>, TrackingError> {
        let url = self.endpoint("experiments/get");
        let resp = self
            .http
            .get(&url)
            .query(&[("experiment_id", id.to_string())])
            .send()
            .await
            .map_err(|e| TrackingError::Transport(e.to_string()))?;

        if resp.status().as_u16() == 404 {
            return Ok(None);
        }
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TrackingError::Api {
                code: Some(status.as_u16()),
                message,
            });
        }

        let parsed: ExperimentResponse = resp
            .json()
            .await
            .map_err(|e| TrackingError::Decode(e.to_string()))?;
        Ok(Some(ExperimentId(parsed.experiment.experiment_id)))
    }

    async fn get_experiment_by_path(
        &self,
        path: &str,
    ) -> Result<Option<ExperimentId>, TrackingError> {
        let url = self.endpoint("experiments/get-by-name");
        let resp = self
            .http
            .get(&url)
            .query(&[("experiment_name", path)])
            .send()
            .await
            .map_err(|e| TrackingError::Transport(e.to_string()))?;

        if resp.status().as_u16() == 404 {
            return Ok(None);
        }
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TrackingError::Api {
                code: Some(status.as_u16()),
                message,
            });
        }

        let parsed: ExperimentResponse = resp
            .json()
            .await
            .map_err(|e| TrackingError::Decode(e.to_string()))?;
        Ok(Some(ExperimentId(parsed.experiment.experiment_id)))
    }

    async fn create_experiment(&self, path: &str) -> Result<ExperimentId, TrackingError> {
        let resp = self
            .post_json("experiments/create", json!({ "name": path }))
            .await?;
        let parsed: CreateExperimentResponse = resp
            .json()
            .await
            .map_err(|e| TrackingError::Decode(e.to_string()))?;
        Ok(ExperimentId(parsed.experiment_id))
    }
}

#[derive(Deserialize)]
struct ExperimentResponse {
    experiment: WireExperiment,
}

#[derive(Deserialize)]
struct WireExperiment {
    experiment_id: String,
}

#[derive(Deserialize)]
struct CreateExperimentResponse {
    experiment_id: String,
}

#[derive(Deserialize)]
struct CreateRunResponse {
    run: WireRun,
}

#[derive(Deserialize)]
struct WireRun {
    info: WireRunInfo,
}

#[derive(Deserialize)]
struct WireRunInfo {
    run_id: String,
}

#[async_trait]
impl TrackingStore for HttpTrackingStore {
    async fn set_experiment(
        &self,
        experiment: &ExperimentRef,
    ) -> Result<ExperimentId, TrackingError> {
        match experiment {
            // A nonexistent id is an error.
            ExperimentRef::ById(id) => self
                .get_experiment_by_id(*id)
                .await?
                .ok_or_else(|| TrackingError::ExperimentNotFound(format!("id={id}"))),
            // A nonexistent path is created on first use.
            ExperimentRef::ByPath(path) => match self.get_experiment_by_path(path).await? {
                Some(id) => Ok(id),
                None => self.create_experiment(path).await,
            },
        }
    }

    async fn start_run(
        &self,
        experiment: &ExperimentId,
        run_name: &str,
    ) -> Result<ActiveRun, TrackingError> {
        let resp = self
            .post_json(
                "runs/create",
                json!({
                    "experiment_id": experiment.0,
                    "run_name": run_name,
                    "start_time": Utc::now().timestamp_millis(),
                }),
            )
            .await?;
        let parsed: CreateRunResponse = resp
            .json()
            .await
            .map_err(|e| TrackingError::Decode(e.to_string()))?;
        Ok(ActiveRun {
            run_id: parsed.run.info.run_id,
            run_name: run_name.to_string(),
        })
    }

    async fn log_metrics(
        &self,
        run: &ActiveRun,
        metrics: &BTreeMap<String, f64>,
    ) -> Result<(), TrackingError> {
        let ts = Utc::now().timestamp_millis();
        let entries: Vec<_> = metrics
            .iter()
            .map(|(key, value)| json!({ "key": key, "value": value, "timestamp": ts }))
            .collect();
        self.post_json(
            "runs/log-batch",
            json!({ "run_id": run.run_id, "metrics": entries }),
        )
        .await?;
        Ok(())
    }

    async fn end_run(&self, run: &ActiveRun, status: RunStatus) -> Result<(), TrackingError> {
        self.post_json(
            "runs/update",
            json!({
                "run_id": run.run_id,
                "status": status.as_str(),
                "end_time": Utc::now().timestamp_millis(),
            }),
        )
        .await?;
        Ok(())
    }
}
