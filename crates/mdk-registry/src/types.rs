use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a registered model version.
///
/// `Staging` is the candidate under evaluation, `Production` the version
/// currently serving, `Archived` a retired version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Staging,
    Production,
    Archived,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Staging => "staging",
            Stage::Production => "production",
            Stage::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Stage> {
        match s {
            "staging" => Some(Stage::Staging),
            "production" => Some(Stage::Production),
            "archived" => Some(Stage::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for one registered model version as returned by the registry.
///
/// `version` is kept as the registry's opaque identifier string; ordering of
/// versions is the registry's concern (`latest_version` already returns the
/// most recent one per stage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVersion {
    pub name: String,
    pub version: String,
    pub stage: Stage,
}

/// A `(registry name, stage)` pair. Resolved fresh on every run; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub name: String,
    pub stage: Stage,
}

impl ModelRef {
    pub fn new(name: impl Into<String>, stage: Stage) -> Self {
        Self {
            name: name.into(),
            stage,
        }
    }

    /// Loadable model locator, e.g. `models:/churn/staging`.
    pub fn uri(&self) -> String {
        format!("models:/{}/{}", self.name, self.stage.as_str())
    }
}
