use std::fmt;

use async_trait::async_trait;

use crate::types::{ModelVersion, Stage};

/// Errors a [`RegistryClient`] implementation may return.
#[derive(Debug)]
pub enum RegistryError {
    /// No version of the model exists at the requested stage.
    NotFound { name: String, stage: Stage },
    /// Network or transport failure.
    Transport(String),
    /// The registry returned an application-level error. This includes a
    /// rejected stage transition (e.g. concurrent modification); in that
    /// case the registry state is unchanged.
    Api { code: Option<u16>, message: String },
    /// A response payload could not be decoded.
    Decode(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::NotFound { name, stage } => {
                write!(f, "no model version found: name={name} stage={stage}")
            }
            RegistryError::Transport(msg) => write!(f, "transport error: {msg}"),
            RegistryError::Api {
                code: Some(c),
                message,
            } => write!(f, "registry api error code={c}: {message}"),
            RegistryError::Api {
                code: None,
                message,
            } => write!(f, "registry api error: {message}"),
            RegistryError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Model-registry contract.
///
/// Implementations must be object-safe (`Box<dyn RegistryClient>`) and
/// `Send + Sync` so the orchestrator can hold them across await points.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Most recent version of `name` registered under `stage`.
    ///
    /// Exactly one version is returned; if several versions sit in the same
    /// stage only the most recent one is visible here. Returns
    /// [`RegistryError::NotFound`] when the stage is empty.
    async fn latest_version(&self, name: &str, stage: Stage)
        -> Result<ModelVersion, RegistryError>;

    /// Transition `version` of `name` to `new_stage`.
    ///
    /// With `archive_existing` set, every other version currently in
    /// `new_stage` is archived as part of the same registry call, so at most
    /// one version occupies production at a time.
    async fn transition_stage(
        &self,
        name: &str,
        version: &str,
        new_stage: Stage,
        archive_existing: bool,
    ) -> Result<(), RegistryError>;
}

#[async_trait]
impl<T: RegistryClient + ?Sized> RegistryClient for std::sync::Arc<T> {
    async fn latest_version(
        &self,
        name: &str,
        stage: Stage,
    ) -> Result<ModelVersion, RegistryError> {
        (**self).latest_version(name, stage).await
    }

    async fn transition_stage(
        &self,
        name: &str,
        version: &str,
        new_stage: Stage,
        archive_existing: bool,
    ) -> Result<(), RegistryError> {
        (**self)
            .transition_stage(name, version, new_stage, archive_existing)
            .await
    }
}
