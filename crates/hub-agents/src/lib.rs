//! Agent orchestration for confidence-gated support-ticket routing.
//!
//! A ticket flows intake → classifier → supervisor, then cycles through the
//! resolver under supervisor control until it is either resolved with high
//! confidence or handed to a human via the escalation step. The deterministic
//! pieces (state machine, supervisor table, confidence scoring) live in the
//! `routing` crate; this crate owns the async engine, the collaborator
//! traits and HTTP clients, the agent prompt/parse layers, and the session
//! store.

pub mod agents;
pub mod clients;
pub mod config;
pub mod error;
pub mod gateway;
pub mod prompts;
pub mod resolver;
pub mod services;
pub mod session;
pub mod state;
pub mod workflow;

pub use config::HubConfig;
pub use error::WorkflowError;
pub use state::{Ticket, TicketState};
pub use workflow::{Collaborators, WorkflowEngine};
