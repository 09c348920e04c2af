use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use mdk_tracking::{
    ActiveRun, ExperimentId, ExperimentRef, RunStatus, TrackingError, TrackingStore,
};

/// One run as the fake tracking store saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRun {
    pub run_id: String,
    pub run_name: String,
    pub logged: Vec<BTreeMap<String, f64>>,
    pub status: Option<RunStatus>,
}

struct TrackingState {
    experiments_seen: Vec<ExperimentRef>,
    known_ids: Option<Vec<i64>>,
    runs: Vec<RecordedRun>,
    fail_log_metrics: bool,
    total_calls: usize,
}

/// In-memory tracking store recording every call.
pub struct MemoryTracking {
    inner: Mutex<TrackingState>,
}

impl MemoryTracking {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TrackingState {
                experiments_seen: Vec::new(),
                known_ids: None,
                runs: Vec::new(),
                fail_log_metrics: false,
                total_calls: 0,
            }),
        }
    }

    /// Restrict `ById` selection to this id set; ids outside it resolve to
    /// ExperimentNotFound like the real store.
    pub fn known_experiment_ids(&self, ids: &[i64]) {
        self.inner.lock().unwrap().known_ids = Some(ids.to_vec());
    }

    /// Every subsequent log_metrics call fails.
    pub fn fail_log_metrics(&self) {
        self.inner.lock().unwrap().fail_log_metrics = true;
    }

    pub fn experiments_seen(&self) -> Vec<ExperimentRef> {
        self.inner.lock().unwrap().experiments_seen.clone()
    }

    pub fn runs(&self) -> Vec<RecordedRun> {
        self.inner.lock().unwrap().runs.clone()
    }

    /// Total number of trait calls received, across all methods. Zero means
    /// the orchestrator never reached the tracking store.
    pub fn total_calls(&self) -> usize {
        self.inner.lock().unwrap().total_calls
    }
}

impl Default for MemoryTracking {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrackingStore for MemoryTracking {
    async fn set_experiment(
        &self,
        experiment: &ExperimentRef,
    ) -> Result<ExperimentId, TrackingError> {
        let mut state = self.inner.lock().unwrap();
        state.total_calls += 1;
        state.experiments_seen.push(experiment.clone());

        match experiment {
            ExperimentRef::ById(id) => {
                if let Some(known) = &state.known_ids {
                    if !known.contains(id) {
                        return Err(TrackingError::ExperimentNotFound(format!("id={id}")));
                    }
                }
                Ok(ExperimentId(id.to_string()))
            }
            ExperimentRef::ByPath(path) => Ok(ExperimentId(path.clone())),
        }
    }

    async fn start_run(
        &self,
        _experiment: &ExperimentId,
        run_name: &str,
    ) -> Result<ActiveRun, TrackingError> {
        let mut state = self.inner.lock().unwrap();
        state.total_calls += 1;
        let run_id = format!("run-{}", state.runs.len() + 1);
        state.runs.push(RecordedRun {
            run_id: run_id.clone(),
            run_name: run_name.to_string(),
            logged: Vec::new(),
            status: None,
        });
        Ok(ActiveRun {
            run_id,
            run_name: run_name.to_string(),
        })
    }

    async fn log_metrics(
        &self,
        run: &ActiveRun,
        metrics: &BTreeMap<String, f64>,
    ) -> Result<(), TrackingError> {
        let mut state = self.inner.lock().unwrap();
        state.total_calls += 1;
        if state.fail_log_metrics {
            return Err(TrackingError::Api {
                code: Some(500),
                message: "metric storage unavailable".to_string(),
            });
        }
        let rec = state
            .runs
            .iter_mut()
            .find(|r| r.run_id == run.run_id)
            .ok_or_else(|| TrackingError::Api {
                code: None,
                message: format!("unknown run: {}", run.run_id),
            })?;
        rec.logged.push(metrics.clone());
        Ok(())
    }

    async fn end_run(&self, run: &ActiveRun, status: RunStatus) -> Result<(), TrackingError> {
        let mut state = self.inner.lock().unwrap();
        state.total_calls += 1;
        let rec = state
            .runs
            .iter_mut()
            .find(|r| r.run_id == run.run_id)
            .ok_or_else(|| TrackingError::Api {
                code: None,
                message: format!("unknown run: {}", run.run_id),
            })?;
        rec.status = Some(status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_experiment_run_and_metrics() {
        let tracking = MemoryTracking::new();
        let exp = tracking
            .set_experiment(&ExperimentRef::ById(7))
            .await
            .unwrap();
        let run = tracking.start_run(&exp, "model_comparison").await.unwrap();

        let mut metrics = BTreeMap::new();
        metrics.insert("staging_roc_auc".to_string(), 0.85);
        tracking.log_metrics(&run, &metrics).await.unwrap();
        tracking.end_run(&run, RunStatus::Finished).await.unwrap();

        let runs = tracking.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].run_name, "model_comparison");
        assert_eq!(runs[0].logged.len(), 1);
        assert_eq!(runs[0].status, Some(RunStatus::Finished));
        assert_eq!(tracking.total_calls(), 4);
    }

    #[tokio::test]
    async fn unknown_id_fails_when_id_set_is_restricted() {
        let tracking = MemoryTracking::new();
        tracking.known_experiment_ids(&[1, 2]);
        let err = tracking
            .set_experiment(&ExperimentRef::ById(9))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackingError::ExperimentNotFound(_)));
    }
}
