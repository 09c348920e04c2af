use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use mdk_inference::{InferenceError, InferenceRunner, ScoredBatch};

struct ScorerState {
    batches: BTreeMap<String, ScoredBatch>,
    calls: Vec<(String, String)>,
    missing_table: Option<String>,
}

/// Inference runner returning canned scored batches keyed by model locator.
///
/// An unknown locator behaves like an empty registry stage
/// (`ModelNotFound`); `fail_with_missing_table` makes every call fail like
/// an unreadable reference table.
pub struct TableScorer {
    inner: Mutex<ScorerState>,
}

impl TableScorer {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ScorerState {
                batches: BTreeMap::new(),
                calls: Vec::new(),
                missing_table: None,
            }),
        }
    }

    pub fn set_batch(&self, model_uri: &str, batch: ScoredBatch) {
        self.inner
            .lock()
            .unwrap()
            .batches
            .insert(model_uri.to_string(), batch);
    }

    pub fn fail_with_missing_table(&self, reference_table: &str) {
        self.inner.lock().unwrap().missing_table = Some(reference_table.to_string());
    }

    /// `(model_uri, reference_table)` pairs, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().calls.clone()
    }
}

impl Default for TableScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceRunner for TableScorer {
    async fn run_batch(
        &self,
        model_uri: &str,
        reference_table: &str,
    ) -> Result<ScoredBatch, InferenceError> {
        let mut state = self.inner.lock().unwrap();
        state
            .calls
            .push((model_uri.to_string(), reference_table.to_string()));

        if let Some(table) = &state.missing_table {
            return Err(InferenceError::DatasetMissing {
                reference_table: table.clone(),
            });
        }

        state
            .batches
            .get(model_uri)
            .cloned()
            .ok_or_else(|| InferenceError::ModelNotFound {
                model_uri: model_uri.to_string(),
            })
    }
}
