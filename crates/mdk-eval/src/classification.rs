use mdk_registry::Stage;

use crate::metrics::{EvalError, Evaluator, MetricSet};

/// Probability clamp for log-loss, matching the usual sklearn epsilon.
const LOG_LOSS_EPS: f64 = 1e-15;

/// Default evaluator for binary classifiers scored with probabilities.
///
/// Produces accuracy, precision, recall, f1 (at the configured decision
/// threshold), roc_auc (rank-based, tie-aware) and log_loss. True labels are
/// 0/1; any value above 0.5 counts as the positive class so float-typed
/// label columns decode cleanly.
pub struct BinaryClassificationEvaluator {
    threshold: f64,
}

impl BinaryClassificationEvaluator {
    pub fn new() -> Self {
        Self { threshold: 0.5 }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for BinaryClassificationEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for BinaryClassificationEvaluator {
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
        if y_true.is_empty() {
            return Err(EvalError::Empty);
        }

        let labels: Vec<bool> = y_true.iter().map(|&v| v > 0.5).collect();
        let predicted: Vec<bool> = y_score.iter().map(|&s| s > self.threshold).collect();

        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut tn = 0usize;
        let mut fn_ = 0usize;
        for (&truth, &pred) in labels.iter().zip(predicted.iter()) {
            match (truth, pred) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (false, false) => tn += 1,
                (true, false) => fn_ += 1,
            }
        }

        let total = labels.len() as f64;
        let accuracy = (tp + tn) as f64 / total;
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        let mut set = MetricSet::new(stage);
        set.insert("accuracy", accuracy);
        set.insert("precision", precision);
        set.insert("recall", recall);
        set.insert("f1", f1);
        set.insert("roc_auc", roc_auc(&labels, y_score));
        set.insert("log_loss", log_loss(&labels, y_score));
        Ok(set)
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

/// Area under the ROC curve via the rank-sum statistic with average ranks
/// for tied scores. NaN when only one class is present — downstream
/// comparison treats NaN as "no improvement", so a degenerate reference
/// dataset can never promote a candidate.
fn roc_auc(labels: &[bool], scores: &[f64]) -> f64 {
    let n_pos = labels.iter().filter(|&&l| l).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return f64::NAN;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Average ranks across ties.
    let mut ranks = vec![0.0f64; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = labels
        .iter()
        .zip(ranks.iter())
        .filter(|(&l, _)| l)
        .map(|(_, &r)| r)
        .sum();

    let n_pos_f = n_pos as f64;
    (pos_rank_sum - n_pos_f * (n_pos_f + 1.0) / 2.0) / (n_pos_f * n_neg as f64)
}

fn log_loss(labels: &[bool], scores: &[f64]) -> f64 {
    let n = labels.len() as f64;
    let sum: f64 = labels
        .iter()
        .zip(scores.iter())
        .map(|(&l, &p)| {
            let p = p.clamp(LOG_LOSS_EPS, 1.0 - LOG_LOSS_EPS);
            if l {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    sum / n
}
