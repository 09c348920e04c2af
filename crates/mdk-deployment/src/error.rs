use std::fmt;

use mdk_eval::EvalError;
use mdk_inference::InferenceError;
use mdk_registry::{RegistryError, Stage};
use mdk_tracking::TrackingError;

/// Errors a comparison-and-promotion run can fail with.
///
/// Nothing is retried or recovered locally; every variant aborts the run.
/// The tracking-run scope is still closed (FAILED) before the error reaches
/// the caller.
#[derive(Debug)]
pub enum DeployError {
    /// Invalid deployment configuration; raised before any external call.
    Config(String),
    /// No model version exists at a requested stage.
    Resolution { model: String, stage: Stage },
    /// Registry lookup failed for a reason other than an empty stage.
    Registry(RegistryError),
    /// Batch inference failed; surfaced unchanged from the runner.
    Inference(InferenceError),
    /// Evaluation could not run (length mismatch, empty batch).
    Eval(EvalError),
    /// The requested comparison metric is absent from the evaluator output.
    MetricNotFound { stage: Stage, metric: String },
    /// The registry rejected the stage transition; registry state unchanged.
    Transition(RegistryError),
    /// Experiment selection, run lifecycle or metric logging failed.
    Tracking(TrackingError),
}

impl fmt::Display for DeployError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployError::Config(msg) => write!(f, "configuration error: {msg}"),
            DeployError::Resolution { model, stage } => {
                write!(f, "no version of {model} at stage {stage}")
            }
            DeployError::Registry(err) => write!(f, "registry lookup failed: {err}"),
            DeployError::Inference(err) => write!(f, "inference failed: {err}"),
            DeployError::Eval(err) => write!(f, "evaluation failed: {err}"),
            DeployError::MetricNotFound { stage, metric } => {
                write!(f, "comparison metric not found: {}_{metric}", stage.as_str())
            }
            DeployError::Transition(err) => write!(f, "stage transition rejected: {err}"),
            DeployError::Tracking(err) => write!(f, "tracking failed: {err}"),
        }
    }
}

impl std::error::Error for DeployError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeployError::Registry(err) | DeployError::Transition(err) => Some(err),
            DeployError::Inference(err) => Some(err),
            DeployError::Eval(err) => Some(err),
            DeployError::Tracking(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InferenceError> for DeployError {
    fn from(err: InferenceError) -> Self {
        DeployError::Inference(err)
    }
}

impl From<TrackingError> for DeployError {
    fn from(err: TrackingError) -> Self {
        DeployError::Tracking(err)
    }
}

impl From<EvalError> for DeployError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::MetricNotFound { stage, metric } => {
                DeployError::MetricNotFound { stage, metric }
            }
            other => DeployError::Eval(other),
        }
    }
}
