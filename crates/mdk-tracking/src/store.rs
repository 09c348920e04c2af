use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// How the caller names the experiment that metric logging is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperimentRef {
    /// Numeric experiment id. Selecting a nonexistent id is an error.
    ById(i64),
    /// Case-sensitive experiment path. Created on first use if absent.
    ByPath(String),
}

impl fmt::Display for ExperimentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentRef::ById(id) => write!(f, "id={id}"),
            ExperimentRef::ByPath(path) => write!(f, "path={path}"),
        }
    }
}

/// Resolved experiment identifier, opaque to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentId(pub String);

/// Handle to an open tracking run. Obtained from [`TrackingStore::start_run`]
/// and consumed by `log_metrics` / `end_run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRun {
    pub run_id: String,
    pub run_name: String,
}

/// Terminal status recorded when a run is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Finished,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Finished => "FINISHED",
            RunStatus::Failed => "FAILED",
        }
    }
}

/// Errors a [`TrackingStore`] implementation may return.
#[derive(Debug)]
pub enum TrackingError {
    /// The referenced experiment id does not exist.
    ExperimentNotFound(String),
    /// Network or transport failure.
    Transport(String),
    /// The tracking store returned an application-level error.
    Api { code: Option<u16>, message: String },
    /// A response payload could not be decoded.
    Decode(String),
}

impl fmt::Display for TrackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingError::ExperimentNotFound(which) => {
                write!(f, "experiment not found: {which}")
            }
            TrackingError::Transport(msg) => write!(f, "transport error: {msg}"),
            TrackingError::Api {
                code: Some(c),
                message,
            } => write!(f, "tracking api error code={c}: {message}"),
            TrackingError::Api {
                code: None,
                message,
            } => write!(f, "tracking api error: {message}"),
            TrackingError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for TrackingError {}

/// Experiment-tracking contract.
///
/// Implementations must be object-safe (`Box<dyn TrackingStore>`) and
/// `Send + Sync`.
#[async_trait]
pub trait TrackingStore: Send + Sync {
    /// Resolve the experiment all subsequent logging is attributed to.
    ///
    /// `ById` fails when the id does not exist; `ByPath` creates the
    /// experiment on first use.
    async fn set_experiment(
        &self,
        experiment: &ExperimentRef,
    ) -> Result<ExperimentId, TrackingError>;

    /// Open a named run under `experiment`.
    async fn start_run(
        &self,
        experiment: &ExperimentId,
        run_name: &str,
    ) -> Result<ActiveRun, TrackingError>;

    /// Log a batch of metric values against an open run.
    async fn log_metrics(
        &self,
        run: &ActiveRun,
        metrics: &BTreeMap<String, f64>,
    ) -> Result<(), TrackingError>;

    /// Close a run with a terminal status.
    async fn end_run(&self, run: &ActiveRun, status: RunStatus) -> Result<(), TrackingError>;
}

#[async_trait]
impl<T: TrackingStore + ?Sized> TrackingStore for std::sync::Arc<T> {
    async fn set_experiment(
        &self,
        experiment: &ExperimentRef,
    ) -> Result<ExperimentId, TrackingError> {
        (**self).set_experiment(experiment).await
    }

    async fn start_run(
        &self,
        experiment: &ExperimentId,
        run_name: &str,
    ) -> Result<ActiveRun, TrackingError> {
        (**self).start_run(experiment, run_name).await
    }

    async fn log_metrics(
        &self,
        run: &ActiveRun,
        metrics: &BTreeMap<String, f64>,
    ) -> Result<(), TrackingError> {
        (**self).log_metrics(run, metrics).await
    }

    async fn end_run(&self, run: &ActiveRun, status: RunStatus) -> Result<(), TrackingError> {
        (**self).end_run(run, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experiment_ref_display_names_the_selector() {
        assert_eq!(ExperimentRef::ById(42).to_string(), "id=42");
        assert_eq!(
            ExperimentRef::ByPath("/teams/churn".into()).to_string(),
            "path=/teams/churn"
        );
    }

    #[test]
    fn run_status_wire_strings() {
        assert_eq!(RunStatus::Finished.as_str(), "FINISHED");
        assert_eq!(RunStatus::Failed.as_str(), "FAILED");
    }
}
