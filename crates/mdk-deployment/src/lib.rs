//! Deployment orchestrator: compare the staging candidate against the
//! production incumbent on a shared reference dataset and promote or archive
//! the candidate.

mod config;
mod decision;
mod error;
mod orchestrator;
mod report;

pub use config::DeploymentConfig;
pub use decision::{decide, PromotionDecision};
pub use error::DeployError;
pub use orchestrator::{ModelDeployment, RUN_NAME};
pub use report::{write_report_json, DeploymentReport, StageOutcome};
