//! Workflow engine: runs one ticket through the routing graph.
//!
//! The engine owns no global state. All collaborators — the text-generation
//! gateway and the three data services — arrive as injected trait objects in
//! a [`Collaborators`] bundle, and the supervisor policy is itself a trait
//! so tests can force pathological routing. One call to
//! [`WorkflowEngine::run_ticket`] executes nodes sequentially until a
//! terminal node, checkpointing the shared state into the session store
//! after every merged update.
//!
//! The resolver↔supervisor back-edge is the only cycle in the graph and is
//! bounded by `resolver_cycle_cap`; exceeding it surfaces
//! [`WorkflowError::Stalled`] rather than looping.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::agents::{run_classifier, run_escalation, run_intake};
use crate::config::HubConfig;
use crate::error::WorkflowError;
use crate::gateway::TextGateway;
use crate::resolver::run_resolver;
use crate::services::{AccountService, KnowledgeService, MemoryService};
use crate::session::{InMemorySessionStore, SessionStore};
use crate::state::{Classification, Resolution, StateUpdate, Ticket, TicketState};
use routing::policy::{self, ResolutionSignal, SupervisorDecision};
use routing::state_machine::{StateMachine, WorkflowState};
use routing::types::NextStep;

/// The external collaborators a run depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub gateway: Arc<dyn TextGateway>,
    pub knowledge: Arc<dyn KnowledgeService>,
    pub accounts: Arc<dyn AccountService>,
    pub memory: Arc<dyn MemoryService>,
}

/// Supervisor decision mechanism.
///
/// The default implementation is the deterministic table in
/// [`routing::policy`]; tests substitute stubs to exercise engine behavior
/// under misconfigured policies.
pub trait SupervisorPolicy: Send + Sync {
    fn decide(
        &self,
        classification: &Classification,
        resolution: Option<&Resolution>,
    ) -> SupervisorDecision;
}

/// The deterministic routing table.
pub struct TablePolicy;

impl SupervisorPolicy for TablePolicy {
    fn decide(
        &self,
        classification: &Classification,
        resolution: Option<&Resolution>,
    ) -> SupervisorDecision {
        policy::decide(
            classification.urgency,
            classification.complexity,
            resolution.map(|res| ResolutionSignal {
                status: res.status,
                confidence: res.confidence,
            }),
        )
    }
}

/// Runs tickets through the routing graph.
pub struct WorkflowEngine {
    deps: Collaborators,
    config: HubConfig,
    sessions: Arc<dyn SessionStore>,
    policy: Arc<dyn SupervisorPolicy>,
}

impl WorkflowEngine {
    pub fn new(deps: Collaborators, config: HubConfig) -> Self {
        Self {
            deps,
            config,
            sessions: Arc::new(InMemorySessionStore::new()),
            policy: Arc::new(TablePolicy),
        }
    }

    /// Replace the session store (e.g. with a durable backend).
    pub fn with_session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Replace the supervisor policy.
    pub fn with_policy(mut self, policy: Arc<dyn SupervisorPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Run one ticket to completion under a fresh session key.
    ///
    /// Re-invoking with the same key and a different ticket is undefined;
    /// callers must use a fresh key per logical ticket.
    pub async fn run_ticket(
        &self,
        ticket: Ticket,
        thread_id: &str,
    ) -> Result<TicketState, WorkflowError> {
        self.run_ticket_with_cancellation(ticket, thread_id, CancellationToken::new())
            .await
    }

    /// Run one ticket, aborting between steps once `cancel` fires.
    pub async fn run_ticket_with_cancellation(
        &self,
        ticket: Ticket,
        thread_id: &str,
        cancel: CancellationToken,
    ) -> Result<TicketState, WorkflowError> {
        let state = TicketState::new(ticket);
        self.sessions.save(thread_id, &state).await?;
        self.drive(StateMachine::new(), state, thread_id, cancel)
            .await
    }

    /// Inspect the latest checkpoint for a thread.
    pub async fn snapshot(&self, thread_id: &str) -> Result<Option<TicketState>, WorkflowError> {
        Ok(self
            .sessions
            .load(thread_id)
            .await?
            .map(|snapshot| snapshot.state))
    }

    /// Resume an interrupted run from its latest checkpoint.
    pub async fn resume(&self, thread_id: &str) -> Result<TicketState, WorkflowError> {
        let snapshot = self
            .sessions
            .load(thread_id)
            .await?
            .ok_or_else(|| WorkflowError::UnknownSession(thread_id.to_string()))?;

        let Some(node) = next_node(&snapshot.state) else {
            return Err(WorkflowError::SessionFinished(thread_id.to_string()));
        };

        info!(thread_id, resume_at = %node, "resuming checkpointed run");
        self.drive(
            StateMachine::starting_at(node),
            snapshot.state,
            thread_id,
            CancellationToken::new(),
        )
        .await
    }

    async fn drive(
        &self,
        mut machine: StateMachine,
        mut state: TicketState,
        thread_id: &str,
        cancel: CancellationToken,
    ) -> Result<TicketState, WorkflowError> {
        let cap = self.config.resolver_cycle_cap;
        let mut resolver_passes = 0u32;

        loop {
            if cancel.is_cancelled() {
                let node = machine.current();
                return Err(self
                    .abort(
                        &mut machine,
                        &state,
                        thread_id,
                        WorkflowError::Cancelled { state: node },
                    )
                    .await);
            }

            match machine.current() {
                WorkflowState::Intake => {
                    let report =
                        match run_intake(self.deps.gateway.as_ref(), &state.ticket).await {
                            Ok(report) => report,
                            Err(err) => {
                                return Err(self
                                    .abort(&mut machine, &state, thread_id, err)
                                    .await)
                            }
                        };
                    state.apply(StateUpdate::Intake(report));
                    self.sessions.save(thread_id, &state).await?;
                    machine.advance(WorkflowState::Classifier, None)?;
                }

                WorkflowState::Classifier => {
                    let Some(intake) = state.intake.clone() else {
                        return Err(WorkflowError::MissingField {
                            step: "classifier",
                            field: "intake",
                        });
                    };
                    let classification = match run_classifier(
                        self.deps.gateway.as_ref(),
                        &state.ticket,
                        &intake,
                    )
                    .await
                    {
                        Ok(classification) => classification,
                        Err(err) => {
                            return Err(self.abort(&mut machine, &state, thread_id, err).await)
                        }
                    };
                    state.apply(StateUpdate::Classification(classification));
                    self.sessions.save(thread_id, &state).await?;
                    machine.advance(WorkflowState::Supervisor, None)?;
                }

                WorkflowState::Supervisor => {
                    let Some(classification) = state.classification.as_ref() else {
                        return Err(WorkflowError::MissingField {
                            step: "supervisor",
                            field: "classification",
                        });
                    };
                    let decision = self.policy.decide(classification, state.resolution.as_ref());
                    info!(
                        thread_id,
                        next_step = %decision.next_step,
                        reason = %decision.reason,
                        "supervisor decision"
                    );

                    let next_step = decision.next_step;
                    let reason = decision.reason.clone();
                    state.apply(StateUpdate::Supervisor(decision));
                    self.sessions.save(thread_id, &state).await?;

                    match next_step {
                        NextStep::Resolver => {
                            if resolver_passes >= cap {
                                return Err(self
                                    .abort(
                                        &mut machine,
                                        &state,
                                        thread_id,
                                        WorkflowError::Stalled { cap },
                                    )
                                    .await);
                            }
                            resolver_passes += 1;
                            machine.set_resolver_pass(resolver_passes);
                            machine.advance(WorkflowState::Resolver, Some(&reason))?;
                        }
                        NextStep::Escalation => {
                            machine.advance(WorkflowState::Escalation, Some(&reason))?;
                        }
                        NextStep::Done => {
                            machine.advance(WorkflowState::Done, Some(&reason))?;
                            info!(thread_id, path = %machine.summary(), "run complete");
                            return Ok(state);
                        }
                    }
                }

                WorkflowState::Resolver => {
                    let resolution =
                        match run_resolver(&self.deps, &self.config, &state).await {
                            Ok(resolution) => resolution,
                            Err(err) => {
                                return Err(self
                                    .abort(&mut machine, &state, thread_id, err)
                                    .await)
                            }
                        };
                    state.apply(StateUpdate::Resolution(resolution));
                    self.sessions.save(thread_id, &state).await?;
                    machine.advance(WorkflowState::Supervisor, None)?;
                }

                WorkflowState::Escalation => {
                    let report =
                        match run_escalation(self.deps.gateway.as_ref(), &state).await {
                            Ok(report) => report,
                            Err(err) => {
                                return Err(self
                                    .abort(&mut machine, &state, thread_id, err)
                                    .await)
                            }
                        };
                    state.apply(StateUpdate::Escalation(report));
                    self.sessions.save(thread_id, &state).await?;
                    machine.advance(WorkflowState::Done, Some("escalation handed off"))?;
                    info!(thread_id, path = %machine.summary(), "run complete");
                    return Ok(state);
                }

                WorkflowState::Done | WorkflowState::Failed => {
                    // drive() returns on every edge into a terminal node.
                    return Err(WorkflowError::Transition(
                        routing::state_machine::IllegalTransition {
                            from: machine.current(),
                            to: machine.current(),
                        },
                    ));
                }
            }
        }
    }

    /// Mark the run failed and checkpoint the partial state for inspection.
    ///
    /// The session keeps the partial state, but the caller receives an error
    /// — a failed run is never presented as a completed resolution.
    async fn abort(
        &self,
        machine: &mut StateMachine,
        state: &TicketState,
        thread_id: &str,
        err: WorkflowError,
    ) -> WorkflowError {
        if machine.fail(&err.to_string()).is_err() {
            warn!(thread_id, "run already terminal while aborting");
        }
        if let Err(save_err) = self.sessions.save(thread_id, state).await {
            warn!(thread_id, error = %save_err, "failed to checkpoint aborted run");
        }
        warn!(thread_id, error = %err, path = %machine.summary(), "run failed");
        err
    }
}

/// Infer where a checkpointed run should resume.
///
/// Returns `None` when the stored state already reached a terminal outcome.
/// A run that died inside the resolver cycle resumes at the supervisor,
/// which re-derives its decision from the checkpointed fields.
fn next_node(state: &TicketState) -> Option<WorkflowState> {
    if state.escalation.is_some() {
        return None;
    }
    if let Some(supervisor) = &state.supervisor {
        if supervisor.next_step == NextStep::Done {
            return None;
        }
    }
    Some(if state.intake.is_none() {
        WorkflowState::Intake
    } else if state.classification.is_none() {
        WorkflowState::Classifier
    } else {
        WorkflowState::Supervisor
    })
}
