use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decision::PromotionDecision;

/// Per-stage evaluation outcome carried in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutcome {
    /// Value of the comparison metric for this stage.
    pub comparison_value: f64,
    /// Full stage-prefixed metric map as logged to the tracking store.
    pub metrics: BTreeMap<String, f64>,
}

/// Serializable record of one comparison-and-promotion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub report_id: Uuid,
    pub created_at_utc: DateTime<Utc>,
    pub model_registry_name: String,
    pub reference_table: String,
    pub comparison_metric: String,
    pub higher_is_better: bool,
    pub staging: StageOutcome,
    pub production: StageOutcome,
    pub decision: PromotionDecision,
    /// The staging version the decision acted on.
    pub candidate_version: String,
}

/// Write the report as pretty-printed JSON to `out_dir/deployment_report.json`.
/// Returns the path written.
pub fn write_report_json(out_dir: &Path, report: &DeploymentReport) -> io::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join("deployment_report.json");
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    std::fs::write(&path, json)?;
    Ok(path)
}
