use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Column carrying the model's scores in every [`ScoredBatch`].
pub const PREDICTION_COL: &str = "prediction";

/// Result of scoring one model against the reference dataset.
///
/// One row per reference-dataset primary key. Columns carry the joined label
/// column and the `prediction` column (plus any features the scoring service
/// chose to echo back). Column access is checked: a missing column is a
/// schema mismatch, not a panic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredBatch {
    /// Primary keys of the reference dataset, as opaque strings.
    pub keys: Vec<String>,
    /// Named float columns, each the same length as `keys`.
    pub columns: BTreeMap<String, Vec<f64>>,
}

impl ScoredBatch {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            keys,
            columns: BTreeMap::new(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.columns.insert(name.into(), values);
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Checked column access.
    pub fn column(&self, name: &str) -> Result<&[f64], InferenceError> {
        self.columns
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| InferenceError::SchemaMismatch {
                missing_column: name.to_string(),
            })
    }

    /// Every column must have exactly one value per key.
    pub fn validate(&self) -> Result<(), InferenceError> {
        for (name, values) in &self.columns {
            if values.len() != self.keys.len() {
                return Err(InferenceError::Decode(format!(
                    "column {name} has {} values for {} keys",
                    values.len(),
                    self.keys.len()
                )));
            }
        }
        Ok(())
    }
}

/// Errors an [`InferenceRunner`] implementation may return.
///
/// All of these are fatal for a comparison run; nothing is retried.
#[derive(Debug)]
pub enum InferenceError {
    /// No loadable model behind the given locator (e.g. empty stage).
    ModelNotFound { model_uri: String },
    /// The reference table does not exist or is unreadable.
    DatasetMissing { reference_table: String },
    /// A required column is absent from the scored result.
    SchemaMismatch { missing_column: String },
    /// Network or transport failure.
    Transport(String),
    /// A response payload could not be decoded.
    Decode(String),
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceError::ModelNotFound { model_uri } => {
                write!(f, "model not found: {model_uri}")
            }
            InferenceError::DatasetMissing { reference_table } => {
                write!(f, "reference table missing or unreadable: {reference_table}")
            }
            InferenceError::SchemaMismatch { missing_column } => {
                write!(f, "schema mismatch: missing column {missing_column}")
            }
            InferenceError::Transport(msg) => write!(f, "transport error: {msg}"),
            InferenceError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for InferenceError {}

/// Batch-inference contract.
///
/// Implementations must be object-safe (`Box<dyn InferenceRunner>`) and
/// `Send + Sync`.
#[async_trait]
pub trait InferenceRunner: Send + Sync {
    /// Score the model behind `model_uri` against `reference_table`.
    ///
    /// Returns one row per reference primary key with the joined label
    /// column and a `prediction` column. Failures propagate unchanged to the
    /// caller; there is no retry at this boundary.
    async fn run_batch(
        &self,
        model_uri: &str,
        reference_table: &str,
    ) -> Result<ScoredBatch, InferenceError>;
}

#[async_trait]
impl<T: InferenceRunner + ?Sized> InferenceRunner for std::sync::Arc<T> {
    async fn run_batch(
        &self,
        model_uri: &str,
        reference_table: &str,
    ) -> Result<ScoredBatch, InferenceError> {
        (**self).run_batch(model_uri, reference_table).await
    }
}
