use serde::{Deserialize, Serialize};

use mdk_tracking::ExperimentRef;

use crate::error::DeployError;

/// Immutable description of one comparison-and-promotion run.
///
/// At least one of `experiment_id` / `experiment_path` must be set; this is
/// checked at use time, before any external call. When both are present the
/// id wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Name the model is registered under in the model registry.
    pub model_registry_name: String,
    /// Queryable table both model versions are scored against.
    pub reference_table: String,
    /// Name of the label column in the scored result.
    pub label_col: String,
    /// The single evaluation metric the promotion decision is made on.
    pub comparison_metric: String,
    /// Whether a higher comparison-metric value means a better model.
    #[serde(default = "default_higher_is_better")]
    pub higher_is_better: bool,
    #[serde(default)]
    pub experiment_id: Option<i64>,
    #[serde(default)]
    pub experiment_path: Option<String>,
}

fn default_higher_is_better() -> bool {
    true
}

impl DeploymentConfig {
    /// The experiment metric logging is attributed to.
    pub fn experiment(&self) -> Result<ExperimentRef, DeployError> {
        if let Some(id) = self.experiment_id {
            return Ok(ExperimentRef::ById(id));
        }
        if let Some(path) = &self.experiment_path {
            return Ok(ExperimentRef::ByPath(path.clone()));
        }
        Err(DeployError::Config(
            "no experiment identifier supplied".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> DeploymentConfig {
        DeploymentConfig {
            model_registry_name: "churn_model".into(),
            reference_table: "churn_reference".into(),
            label_col: "churn".into(),
            comparison_metric: "roc_auc".into(),
            higher_is_better: true,
            experiment_id: None,
            experiment_path: None,
        }
    }

    #[test]
    fn experiment_id_wins_over_path() {
        let mut cfg = base_config();
        cfg.experiment_id = Some(7);
        cfg.experiment_path = Some("/teams/churn".into());
        assert_eq!(cfg.experiment().unwrap(), ExperimentRef::ById(7));
    }

    #[test]
    fn path_is_used_when_id_absent() {
        let mut cfg = base_config();
        cfg.experiment_path = Some("/teams/churn".into());
        assert_eq!(
            cfg.experiment().unwrap(),
            ExperimentRef::ByPath("/teams/churn".into())
        );
    }

    #[test]
    fn missing_both_is_a_config_error() {
        let cfg = base_config();
        let err = cfg.experiment().unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: no experiment identifier supplied"
        );
    }

    #[test]
    fn higher_is_better_defaults_to_true() {
        let cfg: DeploymentConfig = serde_json::from_value(serde_json::json!({
            "model_registry_name": "churn_model",
            "reference_table": "churn_reference",
            "label_col": "churn",
            "comparison_metric": "roc_auc",
            "experiment_id": 7,
        }))
        .unwrap();
        assert!(cfg.higher_is_better);
    }
}
