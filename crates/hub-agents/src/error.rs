//! Workflow error taxonomy.
//!
//! The split follows the degradation rules of the routing design:
//!
//! | Failure                         | Handling                                |
//! |---------------------------------|-----------------------------------------|
//! | KB / account / memory-read call | degrade to "no data", log, continue     |
//! | memory write                    | swallowed at the call site, logged      |
//! | text generation on any step     | fatal to the run (no fabricated answer) |
//! | resolver cycle cap exceeded     | fatal to the run (`Stalled`)            |
//!
//! Only the fatal cases appear here; the degradable ones are handled where
//! the collaborator is called and never cross a step boundary. A failed run
//! never returns a partially-filled state as if it were a completed
//! resolution — callers get an `Err` and may retry when `is_retriable()`.

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::session::SessionError;
use routing::state_machine::{IllegalTransition, WorkflowState};

/// Unified error type for a workflow run.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The text-generation gateway failed on an agent call. Fatal to the
    /// step — no silent fallback answer is fabricated.
    #[error("text generation failed at the {step} step: {source}")]
    Generation {
        step: &'static str,
        #[source]
        source: GatewayError,
    },

    /// Gateway output did not match the step's schema.
    #[error("{step} output failed schema parsing: {message}")]
    ParseFailure { step: &'static str, message: String },

    /// The supervisor kept routing back to the resolver past the cycle cap.
    /// Treated as a policy misconfiguration, not a normal control path.
    #[error("workflow stalled: resolver cycle exceeded {cap} passes")]
    Stalled { cap: u32 },

    /// The engine attempted an edge outside the routing graph.
    #[error(transparent)]
    Transition(#[from] IllegalTransition),

    /// The caller cancelled the run between steps.
    #[error("run cancelled before the {state} step")]
    Cancelled { state: WorkflowState },

    /// Session snapshot could not be saved or loaded.
    #[error("session store failure: {0}")]
    Session(#[from] SessionError),

    /// A step ran before the field it depends on was populated. Indicates
    /// an engine ordering bug, never user input.
    #[error("workflow state missing {field} before the {step} step")]
    MissingField {
        step: &'static str,
        field: &'static str,
    },

    /// No checkpoint exists for the requested thread id.
    #[error("no session found for thread '{0}'")]
    UnknownSession(String),

    /// The stored session is already at a terminal node.
    #[error("session for thread '{0}' already finished")]
    SessionFinished(String),
}

impl WorkflowError {
    pub(crate) fn generation(step: &'static str, source: GatewayError) -> Self {
        Self::Generation { step, source }
    }

    pub(crate) fn parse(step: &'static str, err: impl std::fmt::Display) -> Self {
        Self::ParseFailure {
            step,
            message: err.to_string(),
        }
    }

    /// Whether a fresh run with the same inputs could plausibly succeed.
    ///
    /// Gateway and parse failures are transient (network, backend, model
    /// output variance); a stalled or illegally-transitioning run points at
    /// a logic problem that a retry will only repeat.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Generation { .. } | Self::ParseFailure { .. } | Self::Session(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_failure_is_retriable() {
        let err = WorkflowError::generation("intake", GatewayError::EmptyResponse);
        assert!(err.is_retriable());
        assert!(err.to_string().contains("intake"));
    }

    #[test]
    fn stalled_is_terminal() {
        let err = WorkflowError::Stalled { cap: 10 };
        assert!(!err.is_retriable());
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn cancellation_is_not_retriable() {
        let err = WorkflowError::Cancelled {
            state: WorkflowState::Resolver,
        };
        assert!(!err.is_retriable());
        assert!(err.to_string().contains("resolver"));
    }
}
