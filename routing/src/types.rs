//! Shared domain vocabulary for ticket routing.
//!
//! These enums are the wire form used across the workflow state, the agent
//! JSON contracts, and the supervisor policy. They serialize as snake_case
//! strings so gateway output parses directly into them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Channel a ticket arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Chat,
    Email,
    #[default]
    Other,
}

/// Sentiment detected by the intake step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    #[default]
    Neutral,
    Frustrated,
    Angry,
    Positive,
}

/// Issue category assigned by the classifier step.
///
/// `Other` doubles as the catch-all for unrecognized gateway output so a
/// creative label does not fail the whole classification parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Login,
    Billing,
    Reservation,
    Subscription,
    Technical,
    Refund,
    #[default]
    #[serde(other)]
    Other,
}

/// Urgency assigned by the classifier step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    Low,
    Medium,
    High,
}

/// Complexity assigned by the classifier step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    #[default]
    Low,
    Medium,
    High,
}

/// Outcome of a resolver pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Resolved,
    NeedsEscalation,
}

/// Routing target chosen by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    Resolver,
    Escalation,
    Done,
}

/// One ranked knowledge-base search hit.
///
/// `score` is the count of distinct query words found in the article text.
/// Hits are ordered by score descending, then title ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbHit {
    pub article_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub score: f64,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat => write!(f, "chat"),
            Self::Email => write!(f, "email"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neutral => write!(f, "neutral"),
            Self::Frustrated => write!(f, "frustrated"),
            Self::Angry => write!(f, "angry"),
            Self::Positive => write!(f, "positive"),
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => write!(f, "login"),
            Self::Billing => write!(f, "billing"),
            Self::Reservation => write!(f, "reservation"),
            Self::Subscription => write!(f, "subscription"),
            Self::Technical => write!(f, "technical"),
            Self::Refund => write!(f, "refund"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved => write!(f, "resolved"),
            Self::NeedsEscalation => write!(f, "needs_escalation"),
        }
    }
}

impl fmt::Display for NextStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolver => write!(f, "resolver"),
            Self::Escalation => write!(f, "escalation"),
            Self::Done => write!(f, "done"),
        }
    }
}
