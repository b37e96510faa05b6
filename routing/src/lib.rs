//! Deterministic routing core for the ticket workflow.
//!
//! This crate holds everything that can be decided without a network call:
//! - the shared domain vocabulary ([`types`])
//! - the workflow state machine with an auditable transition log
//!   ([`state_machine`])
//! - the supervisor decision table ([`policy`])
//! - the resolver confidence scoring heuristics ([`scoring`])
//!
//! All decisions in this crate are deterministic — no LLM calls, no I/O.
//! The orchestration layer (`hub-agents`) drives these pieces and owns the
//! external collaborators.

pub mod policy;
pub mod scoring;
pub mod state_machine;
pub mod types;

pub use policy::{decide, SupervisorDecision};
pub use scoring::{build_kb_query, score_confidence, ConfidenceReport};
pub use state_machine::{IllegalTransition, StateMachine, TransitionRecord, WorkflowState};
