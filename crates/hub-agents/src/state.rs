//! Shared ticket state threaded through the workflow.
//!
//! Each step writes exactly one field of [`TicketState`] and may read any
//! field written by an earlier step. Steps return a [`StateUpdate`] — a named
//! partial update — which the engine merges shallowly by field; a step never
//! copies fields it did not change.

use serde::{Deserialize, Serialize};

use routing::policy::SupervisorDecision;
use routing::types::{Channel, Complexity, IssueType, ResolutionStatus, Sentiment, Urgency};

/// One customer-reported issue, immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub owner_id: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub channel: Channel,
    #[serde(default)]
    pub tags: String,
    pub content: String,
}

/// Intake step output: the normalized view of the raw ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeReport {
    pub summary: String,
    pub normalized_issue: String,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default = "default_language")]
    pub suspected_language: String,
}

fn default_language() -> String {
    "en".into()
}

/// Classifier step output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default)]
    pub issue_type: IssueType,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub should_escalate_immediately: bool,
    #[serde(default)]
    pub rationale: String,
}

/// Resolver step output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub status: ResolutionStatus,
    pub answer: String,
    pub confidence: f64,
    #[serde(default)]
    pub used_kb_articles: Vec<String>,
    #[serde(default)]
    pub notes_for_human: String,
}

/// Escalation step output: the structured handoff for a human agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationReport {
    pub summary_for_human: String,
    #[serde(default)]
    pub recommended_department: String,
    #[serde(default)]
    pub proposed_next_steps: Vec<String>,
    #[serde(default)]
    pub include_prior_resolution_notes: bool,
}

/// The mutable record threaded through one workflow run.
///
/// Invariants maintained by the engine: `classification` is populated before
/// the supervisor is ever evaluated; `resolution` is absent on the first
/// supervisor evaluation; `escalation` is populated iff the run terminated
/// through the escalation node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketState {
    pub ticket: Ticket,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intake: Option<IntakeReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor: Option<SupervisorDecision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation: Option<EscalationReport>,
}

/// A named partial update produced by one step.
#[derive(Debug, Clone)]
pub enum StateUpdate {
    Intake(IntakeReport),
    Classification(Classification),
    Resolution(Resolution),
    Supervisor(SupervisorDecision),
    Escalation(EscalationReport),
}

impl TicketState {
    /// Initialize state with only the ticket populated.
    pub fn new(ticket: Ticket) -> Self {
        Self {
            ticket,
            intake: None,
            classification: None,
            resolution: None,
            supervisor: None,
            escalation: None,
        }
    }

    /// Merge one step's partial update into the running state.
    pub fn apply(&mut self, update: StateUpdate) {
        match update {
            StateUpdate::Intake(report) => self.intake = Some(report),
            StateUpdate::Classification(classification) => {
                self.classification = Some(classification)
            }
            StateUpdate::Resolution(resolution) => self.resolution = Some(resolution),
            StateUpdate::Supervisor(decision) => self.supervisor = Some(decision),
            StateUpdate::Escalation(report) => self.escalation = Some(report),
        }
    }
}
