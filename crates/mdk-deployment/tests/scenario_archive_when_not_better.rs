use std::sync::Arc;

use mdk_deployment::{DeploymentConfig, ModelDeployment, PromotionDecision};
use mdk_inference::{ScoredBatch, PREDICTION_COL};
use mdk_registry::Stage;
use mdk_testkit::{FixedEvaluator, MemoryRegistry, MemoryTracking, TableScorer};
use mdk_tracking::RunStatus;

fn config(higher_is_better: bool) -> DeploymentConfig {
    DeploymentConfig {
        model_registry_name: "churn_model".into(),
        reference_table: "churn_reference".into(),
        label_col: "churn".into(),
        comparison_metric: "roc_auc".into(),
        higher_is_better,
        experiment_id: Some(7),
        experiment_path: None,
    }
}

fn sample_batch() -> ScoredBatch {
    ScoredBatch::new(vec!["c1".into(), "c2".into()])
        .with_column("churn", vec![1.0, 0.0])
        .with_column(PREDICTION_COL, vec![0.8, 0.3])
}

async fn run_with_metrics(
    staging: f64,
    production: f64,
    higher_is_better: bool,
) -> (Arc<MemoryRegistry>, Arc<MemoryTracking>, PromotionDecision) {
    let registry = Arc::new(MemoryRegistry::new());
    registry.seed_version("churn_model", 4, Stage::Production);
    registry.seed_version("churn_model", 5, Stage::Staging);

    let tracking = Arc::new(MemoryTracking::new());
    let scorer = Arc::new(TableScorer::new());
    scorer.set_batch("models:/churn_model/staging", sample_batch());
    scorer.set_batch("models:/churn_model/production", sample_batch());

    let evaluator = FixedEvaluator::new()
        .with_metric(Stage::Staging, "roc_auc", staging)
        .with_metric(Stage::Production, "roc_auc", production);

    let deployment = ModelDeployment::new(
        config(higher_is_better),
        Box::new(registry.clone()),
        Box::new(tracking.clone()),
        Box::new(scorer),
        Box::new(evaluator),
    );

    let report = deployment.run().await.unwrap();
    (registry, tracking, report.decision)
}

/// A worse candidate is archived; production is untouched.
#[tokio::test]
async fn worse_candidate_is_archived() {
    let (registry, tracking, decision) = run_with_metrics(0.80, 0.85, true).await;

    assert_eq!(decision, PromotionDecision::Archive);
    assert_eq!(registry.stage_of("churn_model", 5), Some(Stage::Archived));
    assert_eq!(registry.stage_of("churn_model", 4), Some(Stage::Production));

    let transitions = registry.transitions();
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].new_stage, Stage::Archived);
    assert!(!transitions[0].archive_existing);

    assert_eq!(tracking.runs()[0].status, Some(RunStatus::Finished));
}

/// Equal metrics are "no improvement" in both directions: ties never promote.
#[tokio::test]
async fn tie_archives_the_candidate() {
    let (registry, _, decision) = run_with_metrics(0.80, 0.80, true).await;
    assert_eq!(decision, PromotionDecision::Archive);
    assert_eq!(registry.stage_of("churn_model", 4), Some(Stage::Production));

    let (registry, _, decision) = run_with_metrics(0.80, 0.80, false).await;
    assert_eq!(decision, PromotionDecision::Archive);
    assert_eq!(registry.stage_of("churn_model", 4), Some(Stage::Production));
}

/// With a lower-is-better metric (e.g. log_loss) the comparison inverts.
#[tokio::test]
async fn lower_is_better_promotes_the_lower_value() {
    let (registry, _, decision) = run_with_metrics(0.10, 0.20, false).await;
    assert_eq!(decision, PromotionDecision::Promote);
    assert_eq!(registry.stage_of("churn_model", 5), Some(Stage::Production));
    assert_eq!(registry.stage_of("churn_model", 4), Some(Stage::Archived));

    let (registry, _, decision) = run_with_metrics(0.20, 0.10, false).await;
    assert_eq!(decision, PromotionDecision::Archive);
    assert_eq!(registry.stage_of("churn_model", 5), Some(Stage::Archived));
}

/// A NaN comparison metric (e.g. single-class reference data) can never
/// promote the candidate.
#[tokio::test]
async fn nan_metric_archives_the_candidate() {
    let (registry, _, decision) = run_with_metrics(f64::NAN, 0.80, true).await;
    assert_eq!(decision, PromotionDecision::Archive);
    assert_eq!(registry.stage_of("churn_model", 4), Some(Stage::Production));
}
