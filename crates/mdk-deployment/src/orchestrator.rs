use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use mdk_eval::{Evaluator, MetricSet};
use mdk_inference::{InferenceRunner, ScoredBatch, PREDICTION_COL};
use mdk_registry::{ModelRef, RegistryClient, RegistryError, Stage};
use mdk_tracking::{ActiveRun, RunStatus, TrackingStore};

use crate::config::DeploymentConfig;
use crate::decision::{decide, PromotionDecision};
use crate::error::DeployError;
use crate::report::{DeploymentReport, StageOutcome};

/// Name under which comparison runs appear in the tracking store.
pub const RUN_NAME: &str = "model_comparison";

/// Executes the end-to-end comparison-and-promotion workflow exactly once
/// per invocation.
///
/// Collaborators are injected as trait objects; the orchestrator owns no
/// state beyond its configuration, and model references are resolved fresh
/// on every run.
pub struct ModelDeployment {
    config: DeploymentConfig,
    registry: Box<dyn RegistryClient>,
    tracking: Box<dyn TrackingStore>,
    scorer: Box<dyn InferenceRunner>,
    evaluator: Box<dyn Evaluator>,
}

impl ModelDeployment {
    pub fn new(
        config: DeploymentConfig,
        registry: Box<dyn RegistryClient>,
        tracking: Box<dyn TrackingStore>,
        scorer: Box<dyn InferenceRunner>,
        evaluator: Box<dyn Evaluator>,
    ) -> Self {
        Self {
            config,
            registry,
            tracking,
            scorer,
            evaluator,
        }
    }

    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    /// Run one comparison.
    ///
    /// Sequence: select experiment, open the tracking run, score staging and
    /// production against the reference table, compute the comparison metric
    /// per stage (logging the full metric map as a side effect), apply the
    /// promotion policy, transition registry state. The registry transition
    /// is the last step and is invoked at most once; it is never retried.
    /// The tracking run is closed FINISHED or FAILED on every exit path.
    pub async fn run(&self) -> Result<DeploymentReport, DeployError> {
        // Validated before any external call.
        let experiment = self.config.experiment()?;
        let experiment_id = self.tracking.set_experiment(&experiment).await?;
        let run = self.tracking.start_run(&experiment_id, RUN_NAME).await?;

        match self.compare_and_promote(&run).await {
            Ok(report) => {
                self.tracking.end_run(&run, RunStatus::Finished).await?;
                Ok(report)
            }
            Err(err) => {
                // The originating error wins; a close failure is only logged.
                if let Err(close_err) = self.tracking.end_run(&run, RunStatus::Failed).await {
                    warn!(%close_err, "failed to close tracking run");
                }
                Err(err)
            }
        }
    }

    async fn compare_and_promote(&self, run: &ActiveRun) -> Result<DeploymentReport, DeployError> {
        let staging_batch = self.score_stage(Stage::Staging).await?;
        let production_batch = self.score_stage(Stage::Production).await?;

        let (staging_value, staging_metrics) = self
            .compute_metric(run, &staging_batch, Stage::Staging)
            .await?;
        info!(
            metric = %self.config.comparison_metric,
            value = staging_value,
            "candidate staging model"
        );

        let (production_value, production_metrics) = self
            .compute_metric(run, &production_batch, Stage::Production)
            .await?;
        info!(
            metric = %self.config.comparison_metric,
            value = production_value,
            "current production model"
        );

        info!(
            metric = %self.config.comparison_metric,
            higher_is_better = self.config.higher_is_better,
            "applying promotion policy"
        );
        let decision = decide(staging_value, production_value, self.config.higher_is_better);

        // The decision always acts on the most recent staging version; if
        // none exists the run fails here, before any transition.
        let candidate = self
            .registry
            .latest_version(&self.config.model_registry_name, Stage::Staging)
            .await
            .map_err(|e| match e {
                RegistryError::NotFound { name, stage } => {
                    DeployError::Resolution { model: name, stage }
                }
                other => DeployError::Registry(other),
            })?;

        match decision {
            PromotionDecision::Promote => {
                info!(
                    version = %candidate.version,
                    "candidate outperforms production: promoting; existing production will be archived"
                );
                self.registry
                    .transition_stage(
                        &self.config.model_registry_name,
                        &candidate.version,
                        Stage::Production,
                        true,
                    )
                    .await
                    .map_err(DeployError::Transition)?;
            }
            PromotionDecision::Archive => {
                info!(
                    version = %candidate.version,
                    "candidate does not outperform production: archiving candidate"
                );
                self.registry
                    .transition_stage(
                        &self.config.model_registry_name,
                        &candidate.version,
                        Stage::Archived,
                        false,
                    )
                    .await
                    .map_err(DeployError::Transition)?;
            }
        }

        Ok(DeploymentReport {
            report_id: Uuid::new_v4(),
            created_at_utc: Utc::now(),
            model_registry_name: self.config.model_registry_name.clone(),
            reference_table: self.config.reference_table.clone(),
            comparison_metric: self.config.comparison_metric.clone(),
            higher_is_better: self.config.higher_is_better,
            staging: StageOutcome {
                comparison_value: staging_value,
                metrics: staging_metrics.prefixed_map(),
            },
            production: StageOutcome {
                comparison_value: production_value,
                metrics: production_metrics.prefixed_map(),
            },
            decision,
            candidate_version: candidate.version,
        })
    }

    /// Build the model locator for `stage` and score it against the
    /// reference table. Runner failures propagate unchanged.
    async fn score_stage(&self, stage: Stage) -> Result<ScoredBatch, DeployError> {
        let model_ref = ModelRef::new(&self.config.model_registry_name, stage);
        let model_uri = model_ref.uri();
        info!(%model_uri, reference_table = %self.config.reference_table, "computing batch inference");
        Ok(self
            .scorer
            .run_batch(&model_uri, &self.config.reference_table)
            .await?)
    }

    /// Evaluate one stage's scored batch, log the full stage-prefixed metric
    /// map, and extract the comparison metric with a checked lookup.
    async fn compute_metric(
        &self,
        run: &ActiveRun,
        batch: &ScoredBatch,
        stage: Stage,
    ) -> Result<(f64, MetricSet), DeployError> {
        let y_true = batch.column(&self.config.label_col)?;
        let y_score = batch.column(PREDICTION_COL)?;

        let metrics = self.evaluator.evaluate(y_true, y_score, stage)?;
        self.tracking
            .log_metrics(run, &metrics.prefixed_map())
            .await?;

        let value = metrics.get(&self.config.comparison_metric)?;
        Ok((value, metrics))
    }
}
