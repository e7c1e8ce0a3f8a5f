//! Error taxonomy for the oracle engine.
//!
//! Lookup failures (unknown workflow, unknown journey, missing elemental
//! responder) are fatal to the triggering call and bubble to the caller.
//! Upstream failures (generation, memory, safety) are recovered locally by
//! the dispatcher and journey runner into in-band diagnostic results; they
//! only appear as `Err` at the collaborator boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    /// No workflow template registered under this id.
    #[error("unknown workflow: {0}")]
    WorkflowNotFound(String),

    /// No journey registered under this id.
    #[error("unknown journey: {0}")]
    JourneyNotFound(String),

    /// No responder registered for an element the classifier can return.
    /// Programming error: the pool builder is supposed to make this
    /// unrepresentable.
    #[error("no responder registered for element: {0}")]
    ResponderMissing(String),

    /// A collaborator (generation, memory, safety, facet) failed.
    #[error("upstream service failure: {0}")]
    Upstream(String),
}

impl OracleError {
    /// Wraps any collaborator error as an upstream failure.
    pub fn upstream(err: impl std::fmt::Display) -> Self {
        OracleError::Upstream(err.to_string())
    }
}
