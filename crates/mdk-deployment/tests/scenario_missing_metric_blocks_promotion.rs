use std::sync::Arc;

use mdk_deployment::{DeployError, DeploymentConfig, ModelDeployment};
use mdk_inference::{ScoredBatch, PREDICTION_COL};
use mdk_registry::Stage;
use mdk_testkit::{FixedEvaluator, MemoryRegistry, MemoryTracking, TableScorer};
use mdk_tracking::RunStatus;

fn sample_batch() -> ScoredBatch {
    ScoredBatch::new(vec!["c1".into(), "c2".into()])
        .with_column("churn", vec![1.0, 0.0])
        .with_column(PREDICTION_COL, vec![0.8, 0.3])
}

/// A comparison metric absent from the evaluator's output (misspelled or
/// unsupported) is a checked MetricNotFound failure: no promotion decision
/// is attempted and no transition happens.
#[tokio::test]
async fn absent_comparison_metric_is_metric_not_found() {
    let config = DeploymentConfig {
        model_registry_name: "churn_model".into(),
        reference_table: "churn_reference".into(),
        label_col: "churn".into(),
        // The evaluator below only produces "accuracy".
        comparison_metric: "roc_auc".into(),
        higher_is_better: true,
        experiment_id: Some(7),
        experiment_path: None,
    };

    let registry = Arc::new(MemoryRegistry::new());
    registry.seed_version("churn_model", 4, Stage::Production);
    registry.seed_version("churn_model", 5, Stage::Staging);

    let tracking = Arc::new(MemoryTracking::new());
    let scorer = Arc::new(TableScorer::new());
    scorer.set_batch("models:/churn_model/staging", sample_batch());
    scorer.set_batch("models:/churn_model/production", sample_batch());

    let evaluator = FixedEvaluator::new()
        .with_metric(Stage::Staging, "accuracy", 0.9)
        .with_metric(Stage::Production, "accuracy", 0.8);

    let deployment = ModelDeployment::new(
        config,
        Box::new(registry.clone()),
        Box::new(tracking.clone()),
        Box::new(scorer),
        Box::new(evaluator),
    );

    let err = deployment.run().await.unwrap_err();

    match err {
        DeployError::MetricNotFound { stage, metric } => {
            assert_eq!(stage, Stage::Staging);
            assert_eq!(metric, "roc_auc");
        }
        other => panic!("expected MetricNotFound, got: {other}"),
    }

    // The full metric map was still logged before the lookup failed.
    let runs = tracking.runs();
    assert_eq!(runs[0].logged.len(), 1);
    assert_eq!(runs[0].logged[0].get("staging_accuracy"), Some(&0.9));

    // No transition happened and the run closed FAILED.
    assert!(registry.transitions().is_empty());
    assert_eq!(registry.stage_of("churn_model", 5), Some(Stage::Staging));
    assert_eq!(runs[0].status, Some(RunStatus::Failed));
}

/// Metric-logging failures are fatal: the error propagates and nothing is
/// transitioned.
#[tokio::test]
async fn metric_log_failure_aborts_the_run() {
    let config = DeploymentConfig {
        model_registry_name: "churn_model".into(),
        reference_table: "churn_reference".into(),
        label_col: "churn".into(),
        comparison_metric: "roc_auc".into(),
        higher_is_better: true,
        experiment_id: Some(7),
        experiment_path: None,
    };

    let registry = Arc::new(MemoryRegistry::new());
    registry.seed_version("churn_model", 5, Stage::Staging);

    let tracking = Arc::new(MemoryTracking::new());
    tracking.fail_log_metrics();

    let scorer = Arc::new(TableScorer::new());
    scorer.set_batch("models:/churn_model/staging", sample_batch());
    scorer.set_batch("models:/churn_model/production", sample_batch());

    let evaluator = FixedEvaluator::new()
        .with_metric(Stage::Staging, "roc_auc", 0.9)
        .with_metric(Stage::Production, "roc_auc", 0.8);

    let deployment = ModelDeployment::new(
        config,
        Box::new(registry.clone()),
        Box::new(tracking.clone()),
        Box::new(scorer),
        Box::new(evaluator),
    );

    let err = deployment.run().await.unwrap_err();
    assert!(matches!(err, DeployError::Tracking(_)), "got: {err}");
    assert!(registry.transitions().is_empty());
    assert_eq!(tracking.runs()[0].status, Some(RunStatus::Failed));
}
