use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use mdk_registry::Stage;

/// Errors produced at the evaluation boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// `y_true` and `y_score` differ in length.
    LengthMismatch { y_true: usize, y_score: usize },
    /// Evaluation over an empty batch is undefined.
    Empty,
    /// The requested metric is absent from the evaluator's output
    /// (misspelled or unsupported by the evaluator).
    MetricNotFound { stage: Stage, metric: String },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::LengthMismatch { y_true, y_score } => write!(
                f,
                "length mismatch: {y_true} true labels vs {y_score} scores"
            ),
            EvalError::Empty => write!(f, "cannot evaluate an empty batch"),
            EvalError::MetricNotFound { stage, metric } => {
                write!(f, "metric not found: {}_{metric}", stage.as_str())
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Evaluation metrics for one stage.
///
/// Values are stored under their plain metric names; the stage is carried
/// alongside so lookups and the logged map are both stage-aware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    stage: Stage,
    values: BTreeMap<String, f64>,
}

impl MetricSet {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            values: BTreeMap::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Checked lookup of a single metric.
    pub fn get(&self, name: &str) -> Result<f64, EvalError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::MetricNotFound {
                stage: self.stage,
                metric: name.to_string(),
            })
    }

    /// Stage-prefixed view for tracking-store logging, e.g. `staging_roc_auc`.
    pub fn prefixed_map(&self) -> BTreeMap<String, f64> {
        self.values
            .iter()
            .map(|(name, value)| (format!("{}_{name}", self.stage.as_str()), *value))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Evaluation contract: true labels and model scores in, one [`MetricSet`]
/// per stage out.
pub trait Evaluator: Send + Sync {
    fn evaluate(
        &self,
        y_true: &[f64],
        y_score: &[f64],
        stage: Stage,
    ) -> Result<MetricSet, EvalError>;
}

impl<T: Evaluator + ?Sized> Evaluator for std::sync::Arc<T> {
    fn evaluate(
        &self,
        y_true: &[f64],
        y_score: &[f64],
        stage: Stage,
    ) -> Result<MetricSet, EvalError> {
        (**self).evaluate(y_true, y_score, stage)
    }
}
