//! Model evaluation.
//!
//! [`MetricSet`] replaces string-keyed dictionary access with a typed,
//! checked lookup: a missing comparison metric is a
//! [`EvalError::MetricNotFound`], not a runtime key error. The
//! stage-prefixed map (`staging_roc_auc`, ...) exists only at the
//! tracking-store logging boundary.

mod classification;
mod metrics;

pub use classification::BinaryClassificationEvaluator;
pub use metrics::{EvalError, Evaluator, MetricSet};
