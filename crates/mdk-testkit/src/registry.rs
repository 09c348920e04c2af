use std::sync::Mutex;

use async_trait::async_trait;

use mdk_registry::{ModelVersion, RegistryClient, RegistryError, Stage};

/// One applied (or attempted) stage transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecord {
    pub name: String,
    pub version: String,
    pub new_stage: Stage,
    pub archive_existing: bool,
}

struct RegistryState {
    versions: Vec<ModelVersion>,
    transitions: Vec<TransitionRecord>,
    reject_transitions: Option<String>,
}

/// In-memory model registry seeded with versions.
///
/// `latest_version` returns the highest numeric version in a stage;
/// `transition_stage` applies the archive-existing semantics atomically
/// under one lock, mirroring the registry's single-call contract.
pub struct MemoryRegistry {
    inner: Mutex<RegistryState>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryState {
                versions: Vec::new(),
                transitions: Vec::new(),
                reject_transitions: None,
            }),
        }
    }

    pub fn seed_version(&self, name: &str, version: u32, stage: Stage) {
        let mut state = self.inner.lock().unwrap();
        state.versions.push(ModelVersion {
            name: name.to_string(),
            version: version.to_string(),
            stage,
        });
    }

    /// Every subsequent transition is rejected with this message; registry
    /// state stays unchanged, as the real registry guarantees.
    pub fn reject_transitions(&self, message: &str) {
        self.inner.lock().unwrap().reject_transitions = Some(message.to_string());
    }

    pub fn stage_of(&self, name: &str, version: u32) -> Option<Stage> {
        let version = version.to_string();
        self.inner
            .lock()
            .unwrap()
            .versions
            .iter()
            .find(|v| v.name == name && v.version == version)
            .map(|v| v.stage)
    }

    pub fn transitions(&self) -> Vec<TransitionRecord> {
        self.inner.lock().unwrap().transitions.clone()
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn version_number(v: &str) -> u64 {
    v.parse().unwrap_or(0)
}

#[async_trait]
impl RegistryClient for MemoryRegistry {
    async fn latest_version(
        &self,
        name: &str,
        stage: Stage,
    ) -> Result<ModelVersion, RegistryError> {
        let state = self.inner.lock().unwrap();
        state
            .versions
            .iter()
            .filter(|v| v.name == name && v.stage == stage)
            .max_by_key(|v| version_number(&v.version))
            .cloned()
            .ok_or(RegistryError::NotFound {
                name: name.to_string(),
                stage,
            })
    }

    async fn transition_stage(
        &self,
        name: &str,
        version: &str,
        new_stage: Stage,
        archive_existing: bool,
    ) -> Result<(), RegistryError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(message) = &state.reject_transitions {
            return Err(RegistryError::Api {
                code: Some(409),
                message: message.clone(),
            });
        }

        if !state
            .versions
            .iter()
            .any(|v| v.name == name && v.version == version)
        {
            return Err(RegistryError::NotFound {
                name: name.to_string(),
                stage: new_stage,
            });
        }

        if archive_existing {
            for v in state
                .versions
                .iter_mut()
                .filter(|v| v.name == name && v.stage == new_stage && v.version != version)
            {
                v.stage = Stage::Archived;
            }
        }
        for v in state
            .versions
            .iter_mut()
            .filter(|v| v.name == name && v.version == version)
        {
            v.stage = new_stage;
        }

        state.transitions.push(TransitionRecord {
            name: name.to_string(),
            version: version.to_string(),
            new_stage,
            archive_existing,
        });
        Ok(())
    }
}
