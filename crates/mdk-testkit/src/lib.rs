//! In-memory fakes of the deployment collaborators for scenario tests.
//!
//! Each fake records the calls it receives and supports injecting the
//! failure its real counterpart can produce, so scenario tests can assert
//! both the decision itself and which external calls were (not) made.

mod registry;
mod scorer;
mod tracking;

pub use registry::{MemoryRegistry, TransitionRecord};
pub use scorer::TableScorer;
pub use tracking::{MemoryTracking, RecordedRun};

use std::collections::BTreeMap;

use mdk_eval::{EvalError, Evaluator, MetricSet};
use mdk_registry::Stage;

/// Evaluator returning canned per-stage metric values, ignoring the scored
/// inputs. Useful for driving the promotion policy to a known decision.
pub struct FixedEvaluator {
    by_stage: BTreeMap<Stage, BTreeMap<String, f64>>,
}

impl FixedEvaluator {
    pub fn new() -> Self {
        Self {
            by_stage: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, stage: Stage, name: &str, value: f64) -> Self {
        self.by_stage
            .entry(stage)
            .or_default()
            .insert(name.to_string(), value);
        self
    }
}

impl Default for FixedEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for FixedEvaluator {
    fn evaluate(
        &self,
        y_true: &[f64],
        y_score: &[f64],
        stage: Stage,
    ) -> Result<MetricSet, EvalError> {
        if y_true.len() != y_score.len() {
            return Err(EvalError::LengthMismatch {
                y_true: y_true.len(),
                y_score: y_score.len(),
            });
        }
        let mut set = MetricSet::new(stage);
        if let Some(values) = self.by_stage.get(&stage) {
            for (name, value) in values {
                set.insert(name.clone(), *value);
            }
        }
        Ok(set)
    }
}
