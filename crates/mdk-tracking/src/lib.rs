//! Experiment-tracking boundary.
//!
//! Experiment selection is explicit: the orchestrator resolves an
//! [`ExperimentRef`] to an [`ExperimentId`] once and passes run handles to
//! every call that logs, rather than relying on ambient process-wide state.
//! The run handle must be closed (FINISHED or FAILED) on every exit path;
//! that contract is the orchestrator's, enforced in `mdk-deployment`.

mod http;
mod store;

pub use http::HttpTrackingStore;
pub use store::{
    ActiveRun, ExperimentId, ExperimentRef, RunStatus, TrackingError, TrackingStore,
};
