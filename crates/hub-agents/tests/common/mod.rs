//! Shared stub collaborators for the workflow integration tests.
//!
//! Each stub is deliberately dumb: canned data in, recorded calls out, with
//! per-step failure switches so individual tests can break exactly one
//! collaborator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use hub_agents::gateway::{GatewayError, TextGateway};
use hub_agents::prompts;
use hub_agents::services::{
    AccountService, KnowledgeService, MemoryEntry, MemoryService, Reservation, ServiceError,
    UserProfile,
};
use hub_agents::state::{Classification, Resolution, Ticket};
use hub_agents::workflow::{Collaborators, SupervisorPolicy};
use routing::policy::SupervisorDecision;
use routing::types::{Channel, KbHit, NextStep};

// ── Gateway stub ──────────────────────────────────────────────────────

pub struct StubGateway {
    pub intake: serde_json::Value,
    pub classification: serde_json::Value,
    pub escalation: serde_json::Value,
    pub answer: String,
    /// Step name ("intake", "classifier", "escalation", "resolver") that
    /// should fail with a transport error.
    pub fail_step: Option<&'static str>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl Default for StubGateway {
    fn default() -> Self {
        Self {
            intake: json!({
                "summary": "User cannot log in and gets no reset email.",
                "normalized_issue": "login failure, password reset email not received",
                "sentiment": "frustrated",
                "suspected_language": "en",
            }),
            classification: json!({
                "issue_type": "login",
                "urgency": "medium",
                "complexity": "low",
                "should_escalate_immediately": false,
                "rationale": "standard login problem",
            }),
            escalation: json!({
                "summary_for_human": "Automated resolution was not confident enough.",
                "recommended_department": "account support",
                "proposed_next_steps": ["verify the user's email address", "reset manually"],
                "include_prior_resolution_notes": true,
            }),
            answer: "Please use the password reset link we just sent you.".into(),
            fail_step: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

fn role_of(preamble: &str) -> &'static str {
    if preamble == prompts::INTAKE_PREAMBLE {
        "intake"
    } else if preamble == prompts::CLASSIFIER_PREAMBLE {
        "classifier"
    } else if preamble == prompts::ESCALATION_PREAMBLE {
        "escalation"
    } else {
        "resolver"
    }
}

impl StubGateway {
    fn record(&self, role: &'static str) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(role);
        if self.fail_step == Some(role) {
            return Err(GatewayError::Http(format!("stub {role} failure")));
        }
        Ok(())
    }

    pub fn call_count(&self, role: &'static str) -> usize {
        self.calls.lock().unwrap().iter().filter(|r| **r == role).count()
    }
}

#[async_trait]
impl TextGateway for StubGateway {
    async fn generate_json(
        &self,
        preamble: &str,
        _prompt: &str,
    ) -> Result<serde_json::Value, GatewayError> {
        let role = role_of(preamble);
        self.record(role)?;
        Ok(match role {
            "intake" => self.intake.clone(),
            "classifier" => self.classification.clone(),
            "escalation" => self.escalation.clone(),
            other => json!({ "error": format!("unexpected json call for {other}") }),
        })
    }

    async fn generate_text(&self, preamble: &str, _prompt: &str) -> Result<String, GatewayError> {
        let role = role_of(preamble);
        self.record(role)?;
        Ok(self.answer.clone())
    }
}

// ── Knowledge stub ────────────────────────────────────────────────────

#[derive(Default)]
pub struct FixedKb {
    pub hits: Vec<KbHit>,
    pub fail: bool,
    pub searches: AtomicUsize,
}

impl FixedKb {
    pub fn with_hits(hits: Vec<KbHit>) -> Self {
        Self {
            hits,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KnowledgeService for FixedKb {
    async fn kb_search(&self, _query: &str, limit: usize) -> Result<Vec<KbHit>, ServiceError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ServiceError::Http("stub kb outage".into()));
        }
        Ok(self.hits.iter().take(limit).cloned().collect())
    }

    async fn kb_get(&self, article_id: &str) -> Result<Option<KbHit>, ServiceError> {
        if self.fail {
            return Err(ServiceError::Http("stub kb outage".into()));
        }
        Ok(self.hits.iter().find(|h| h.article_id == article_id).cloned())
    }
}

// ── Account stub ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct StubAccounts {
    pub profile: Option<UserProfile>,
    pub reservations: Vec<Reservation>,
    pub fail: bool,
}

#[async_trait]
impl AccountService for StubAccounts {
    async fn get_user(
        &self,
        _external_user_id: &str,
    ) -> Result<Option<UserProfile>, ServiceError> {
        if self.fail {
            return Err(ServiceError::Http("stub account outage".into()));
        }
        Ok(self.profile.clone())
    }

    async fn get_user_reservations(
        &self,
        _external_user_id: &str,
    ) -> Result<Vec<Reservation>, ServiceError> {
        if self.fail {
            return Err(ServiceError::Http("stub account outage".into()));
        }
        Ok(self.reservations.clone())
    }
}

// ── Memory stub ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingMemory {
    pub writes: Mutex<Vec<(String, String, serde_json::Value)>>,
    pub fail_writes: bool,
    pub fail_search: bool,
}

impl RecordingMemory {
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

#[async_trait]
impl MemoryService for RecordingMemory {
    async fn write(
        &self,
        external_user_id: &str,
        content: &str,
        _ticket_id: Option<&str>,
        metadata: Option<serde_json::Value>,
    ) -> Result<MemoryEntry, ServiceError> {
        if self.fail_writes {
            return Err(ServiceError::Http("stub memory outage".into()));
        }
        self.writes.lock().unwrap().push((
            external_user_id.to_string(),
            content.to_string(),
            metadata.clone().unwrap_or(serde_json::Value::Null),
        ));
        Ok(MemoryEntry {
            memory_id: format!("mem-{}", self.write_count()),
            external_user_id: external_user_id.to_string(),
            ticket_id: None,
            content: content.to_string(),
            metadata: metadata.unwrap_or(serde_json::Value::Null),
            created_at: Some(Utc::now()),
        })
    }

    async fn search(
        &self,
        _external_user_id: &str,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<MemoryEntry>, ServiceError> {
        if self.fail_search {
            return Err(ServiceError::Http("stub memory outage".into()));
        }
        Ok(Vec::new())
    }
}

// ── Policy stubs ──────────────────────────────────────────────────────

/// Misconfigured policy that never leaves the resolver cycle.
pub struct AlwaysResolver;

impl SupervisorPolicy for AlwaysResolver {
    fn decide(
        &self,
        _classification: &Classification,
        _resolution: Option<&Resolution>,
    ) -> SupervisorDecision {
        SupervisorDecision {
            next_step: NextStep::Resolver,
            reason: "stub: always retry".into(),
        }
    }
}

// ── Builders ──────────────────────────────────────────────────────────

pub fn login_ticket() -> Ticket {
    Ticket {
        ticket_id: "tck-100".into(),
        owner_id: "cp-user-7".into(),
        owner_name: "Ada".into(),
        channel: Channel::Chat,
        tags: "login".into(),
        content: "Hi, I can't log in to my CultPass account and I don't get the reset email."
            .into(),
    }
}

pub fn short_ticket(content: &str) -> Ticket {
    Ticket {
        ticket_id: "tck-200".into(),
        owner_id: "cp-user-7".into(),
        owner_name: "Ada".into(),
        channel: Channel::Email,
        tags: String::new(),
        content: content.into(),
    }
}

pub fn kb_hit(article_id: &str, title: &str, content: &str, score: f64) -> KbHit {
    KbHit {
        article_id: article_id.into(),
        title: title.into(),
        content: content.into(),
        tags: None,
        score,
    }
}

pub fn collaborators(
    gateway: Arc<StubGateway>,
    knowledge: Arc<FixedKb>,
    memory: Arc<RecordingMemory>,
) -> Collaborators {
    Collaborators {
        gateway,
        knowledge,
        accounts: Arc::new(StubAccounts::default()),
        memory,
    }
}
