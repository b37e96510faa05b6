//! Ticket workflow state machine — explicit nodes and legal transition guards.
//!
//! The workflow engine calls `advance()` to move between nodes. Each call
//! validates that the transition is an edge of the routing graph and records
//! it in the transition log, so a finished (or failed) run can be replayed
//! node by node. Supervisor fan-out is the only conditional edge set; every
//! other edge is fixed.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// The nodes of the ticket routing graph.
///
/// Every run starts at `Intake` and terminates at either `Done` or `Failed`.
/// `Escalation` always flows into `Done`, which guarantees at most one
/// escalation and one terminal per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Normalizing the raw ticket (summary, sentiment, language).
    Intake,
    /// Assigning issue type, urgency, and complexity.
    Classifier,
    /// Deciding the next routing target from the current state.
    Supervisor,
    /// Attempting an automated, confidence-gated resolution.
    Resolver,
    /// Drafting the structured human handoff.
    Escalation,
    /// Run finished normally — terminal.
    Done,
    /// Run aborted (stalled, cancelled, or a fatal step error) — terminal.
    Failed,
}

impl WorkflowState {
    /// Whether this is a terminal node (no further transitions allowed).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intake => write!(f, "intake"),
            Self::Classifier => write!(f, "classifier"),
            Self::Supervisor => write!(f, "supervisor"),
            Self::Resolver => write!(f, "resolver"),
            Self::Escalation => write!(f, "escalation"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Legal edges of the routing graph:
/// ```text
/// Intake → Classifier
/// Classifier → Supervisor
/// Supervisor → Resolver | Escalation | Done
/// Resolver → Supervisor
/// Escalation → Done
/// ```
/// Any non-terminal node may additionally transition to `Failed`.
fn is_legal_transition(from: WorkflowState, to: WorkflowState) -> bool {
    use WorkflowState::*;

    if to == Failed && !from.is_terminal() {
        return true;
    }

    matches!(
        (from, to),
        (Intake, Classifier)
            | (Classifier, Supervisor)
            | (Supervisor, Resolver)
            | (Supervisor, Escalation)
            | (Supervisor, Done)
            | (Resolver, Supervisor)
            | (Escalation, Done)
    )
}

/// A single recorded node transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The node transitioned from.
    pub from: WorkflowState,
    /// The node transitioned to.
    pub to: WorkflowState,
    /// Resolver pass count at the time of transition (0 before the first
    /// resolver entry).
    pub resolver_pass: u32,
    /// Milliseconds since the state machine was created.
    pub elapsed_ms: u64,
    /// Optional context about why this transition happened (the supervisor's
    /// reason string, an error summary, …).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Error returned when an illegal transition is attempted.
#[derive(Debug, Clone)]
pub struct IllegalTransition {
    pub from: WorkflowState,
    pub to: WorkflowState,
}

impl fmt::Display for IllegalTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal workflow transition: {} → {}", self.from, self.to)
    }
}

impl std::error::Error for IllegalTransition {}

/// The workflow state machine.
///
/// Tracks the current node, enforces legal transitions, and keeps a complete
/// log for replay and diagnostics. The resolver↔supervisor back-edge is the
/// only cycle; the engine bounds it with a pass counter mirrored here.
pub struct StateMachine {
    current: WorkflowState,
    resolver_pass: u32,
    created_at: Instant,
    transitions: Vec<TransitionRecord>,
}

impl StateMachine {
    /// Create a new state machine starting at `Intake`.
    pub fn new() -> Self {
        Self::starting_at(WorkflowState::Intake)
    }

    /// Create a state machine positioned at an arbitrary node.
    ///
    /// Used when resuming a checkpointed run; the transition log starts
    /// empty because the prior run's log lived in that run's machine.
    pub fn starting_at(state: WorkflowState) -> Self {
        Self {
            current: state,
            resolver_pass: 0,
            created_at: Instant::now(),
            transitions: Vec::new(),
        }
    }

    /// Get the current node.
    pub fn current(&self) -> WorkflowState {
        self.current
    }

    /// Get the resolver pass count.
    pub fn resolver_pass(&self) -> u32 {
        self.resolver_pass
    }

    /// Set the resolver pass count (called by the engine on each resolver entry).
    pub fn set_resolver_pass(&mut self, pass: u32) {
        self.resolver_pass = pass;
    }

    /// Attempt to advance to the next node.
    ///
    /// Returns `Err(IllegalTransition)` if the edge is not part of the
    /// routing graph.
    pub fn advance(
        &mut self,
        to: WorkflowState,
        reason: Option<&str>,
    ) -> Result<(), IllegalTransition> {
        if !is_legal_transition(self.current, to) {
            return Err(IllegalTransition {
                from: self.current,
                to,
            });
        }

        let record = TransitionRecord {
            from: self.current,
            to,
            resolver_pass: self.resolver_pass,
            elapsed_ms: self.created_at.elapsed().as_millis() as u64,
            reason: reason.map(String::from),
        };

        tracing::debug!(
            from = %self.current,
            to = %to,
            resolver_pass = self.resolver_pass,
            "workflow transition"
        );

        self.transitions.push(record);
        self.current = to;
        Ok(())
    }

    /// Transition to `Failed` from any non-terminal node.
    pub fn fail(&mut self, reason: &str) -> Result<(), IllegalTransition> {
        self.advance(WorkflowState::Failed, Some(reason))
    }

    /// Whether the machine is in a terminal node.
    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    /// Get the full transition log.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// Whether a given node was ever visited during this run.
    pub fn visited(&self, state: WorkflowState) -> bool {
        self.current == state || self.transitions.iter().any(|t| t.from == state || t.to == state)
    }

    /// Get a one-line summary of the run's path.
    pub fn summary(&self) -> String {
        let path: Vec<String> = self.transitions.iter().map(|t| t.to.to_string()).collect();
        format!(
            "intake → {} ({}ms, {} transitions)",
            self.current,
            self.created_at.elapsed().as_millis(),
            self.transitions.len(),
        ) + if path.is_empty() {
            String::new()
        } else {
            format!(" [{}]", path.join(" → "))
        }
        .as_str()
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let sm = StateMachine::new();
        assert_eq!(sm.current(), WorkflowState::Intake);
        assert!(!sm.is_terminal());
        assert_eq!(sm.transitions().len(), 0);
    }

    #[test]
    fn test_resolved_path() {
        let mut sm = StateMachine::new();

        sm.advance(WorkflowState::Classifier, None).unwrap();
        sm.advance(WorkflowState::Supervisor, None).unwrap();
        sm.advance(WorkflowState::Resolver, Some("no resolution yet"))
            .unwrap();
        sm.set_resolver_pass(1);
        sm.advance(WorkflowState::Supervisor, None).unwrap();
        sm.advance(WorkflowState::Done, Some("resolved with high confidence"))
            .unwrap();

        assert!(sm.is_terminal());
        assert_eq!(sm.current(), WorkflowState::Done);
        assert_eq!(sm.transitions().len(), 5);
    }

    #[test]
    fn test_escalation_path_ends_at_done() {
        let mut sm = StateMachine::new();

        sm.advance(WorkflowState::Classifier, None).unwrap();
        sm.advance(WorkflowState::Supervisor, None).unwrap();
        sm.advance(WorkflowState::Resolver, None).unwrap();
        sm.set_resolver_pass(1);
        sm.advance(WorkflowState::Supervisor, None).unwrap();
        sm.advance(WorkflowState::Escalation, Some("resolver requested escalation"))
            .unwrap();
        sm.advance(WorkflowState::Done, None).unwrap();

        assert!(sm.is_terminal());
        assert!(sm.visited(WorkflowState::Escalation));
    }

    #[test]
    fn test_resolver_cycle_is_legal() {
        let mut sm = StateMachine::new();
        sm.advance(WorkflowState::Classifier, None).unwrap();
        sm.advance(WorkflowState::Supervisor, None).unwrap();

        for pass in 1..=3 {
            sm.advance(WorkflowState::Resolver, None).unwrap();
            sm.set_resolver_pass(pass);
            sm.advance(WorkflowState::Supervisor, None).unwrap();
        }
        assert_eq!(sm.resolver_pass(), 3);
        assert_eq!(sm.current(), WorkflowState::Supervisor);
    }

    #[test]
    fn test_failure_from_any_non_terminal_state() {
        for state in [
            WorkflowState::Intake,
            WorkflowState::Classifier,
            WorkflowState::Supervisor,
            WorkflowState::Resolver,
            WorkflowState::Escalation,
        ] {
            let mut sm = StateMachine::starting_at(state);
            assert!(sm.fail("test failure").is_ok());
            assert_eq!(sm.current(), WorkflowState::Failed);
            assert!(sm.is_terminal());
        }
    }

    #[test]
    fn test_cannot_transition_from_terminal() {
        let mut sm = StateMachine::starting_at(WorkflowState::Escalation);
        sm.advance(WorkflowState::Done, None).unwrap();

        let err = sm.advance(WorkflowState::Resolver, None).unwrap_err();
        assert_eq!(err.from, WorkflowState::Done);
        assert_eq!(err.to, WorkflowState::Resolver);

        assert!(sm.fail("nope").is_err());
    }

    #[test]
    fn test_illegal_skip_transition() {
        let mut sm = StateMachine::new();

        // Intake cannot jump straight to the supervisor.
        let err = sm.advance(WorkflowState::Supervisor, None).unwrap_err();
        assert_eq!(err.from, WorkflowState::Intake);
        assert_eq!(err.to, WorkflowState::Supervisor);
    }

    #[test]
    fn test_escalation_cannot_reenter_resolver() {
        let mut sm = StateMachine::starting_at(WorkflowState::Escalation);
        assert!(sm.advance(WorkflowState::Resolver, None).is_err());
        assert!(sm.advance(WorkflowState::Supervisor, None).is_err());
    }

    #[test]
    fn test_transition_record_has_reason() {
        let mut sm = StateMachine::new();
        sm.advance(WorkflowState::Classifier, Some("intake complete"))
            .unwrap();

        let record = &sm.transitions()[0];
        assert_eq!(record.from, WorkflowState::Intake);
        assert_eq!(record.to, WorkflowState::Classifier);
        assert_eq!(record.reason.as_deref(), Some("intake complete"));
    }

    #[test]
    fn test_transition_record_serde_roundtrip() {
        let record = TransitionRecord {
            from: WorkflowState::Supervisor,
            to: WorkflowState::Escalation,
            resolver_pass: 1,
            elapsed_ms: 12345,
            reason: Some("resolver requested escalation".into()),
        };

        let json = serde_json::to_string(&record).unwrap();
        let restored: TransitionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.from, WorkflowState::Supervisor);
        assert_eq!(restored.to, WorkflowState::Escalation);
        assert_eq!(restored.resolver_pass, 1);
        assert_eq!(restored.elapsed_ms, 12345);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(WorkflowState::Intake.to_string(), "intake");
        assert_eq!(WorkflowState::Failed.to_string(), "failed");
    }

    #[test]
    fn test_summary() {
        let mut sm = StateMachine::new();
        sm.advance(WorkflowState::Classifier, None).unwrap();
        sm.fail("test").unwrap();
        let summary = sm.summary();
        assert!(summary.contains("failed"));
        assert!(summary.contains("2 transitions"));
    }
}
