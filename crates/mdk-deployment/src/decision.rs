use serde::{Deserialize, Serialize};

/// Outcome of the promotion policy for the staging candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionDecision {
    /// Candidate moves to production; prior production version(s) are
    /// archived in the same registry call.
    Promote,
    /// Candidate is archived; production is untouched.
    Archive,
}

impl PromotionDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromotionDecision::Promote => "promote",
            PromotionDecision::Archive => "archive",
        }
    }
}

/// The promotion policy. Pure and total in exactly these three inputs.
///
/// Ties never promote, in either direction. NaN metrics compare as "no
/// improvement" and therefore archive the candidate.
pub fn decide(
    staging_metric: f64,
    production_metric: f64,
    higher_is_better: bool,
) -> PromotionDecision {
    let improved = if higher_is_better {
        staging_metric > production_metric
    } else {
        staging_metric < production_metric
    };
    if improved {
        PromotionDecision::Promote
    } else {
        PromotionDecision::Archive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_is_better_promotes_strict_improvement() {
        assert_eq!(decide(0.85, 0.80, true), PromotionDecision::Promote);
        assert_eq!(decide(0.80, 0.85, true), PromotionDecision::Archive);
    }

    #[test]
    fn ties_never_promote() {
        assert_eq!(decide(0.80, 0.80, true), PromotionDecision::Archive);
        assert_eq!(decide(0.80, 0.80, false), PromotionDecision::Archive);
    }

    #[test]
    fn lower_is_better_inverts_the_comparison() {
        assert_eq!(decide(0.10, 0.20, false), PromotionDecision::Promote);
        assert_eq!(decide(0.20, 0.10, false), PromotionDecision::Archive);
    }

    #[test]
    fn nan_metrics_archive() {
        assert_eq!(decide(f64::NAN, 0.80, true), PromotionDecision::Archive);
        assert_eq!(decide(0.80, f64::NAN, true), PromotionDecision::Archive);
        assert_eq!(decide(f64::NAN, f64::NAN, false), PromotionDecision::Archive);
    }

    #[test]
    fn decision_is_deterministic_for_unchanged_inputs() {
        for _ in 0..3 {
            assert_eq!(decide(0.85, 0.80, true), PromotionDecision::Promote);
        }
    }
}
