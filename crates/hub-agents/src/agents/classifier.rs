//! Classifier agent: assign issue type, urgency, complexity, and an
//! immediate-escalation flag.

use crate::error::WorkflowError;
use crate::gateway::TextGateway;
use crate::prompts;
use crate::state::{Classification, IntakeReport, Ticket};

pub async fn run_classifier(
    gateway: &dyn TextGateway,
    ticket: &Ticket,
    intake: &IntakeReport,
) -> Result<Classification, WorkflowError> {
    let prompt = format!(
        "Ticket content: {}\nNormalized issue: {}\nSentiment: {}\nChannel: {}\nTags: {}\n\n\
         Return ONLY JSON.",
        ticket.content, intake.normalized_issue, intake.sentiment, ticket.channel, ticket.tags,
    );

    let value = gateway
        .generate_json(prompts::CLASSIFIER_PREAMBLE, &prompt)
        .await
        .map_err(|e| WorkflowError::generation("classifier", e))?;

    let classification: Classification =
        serde_json::from_value(value).map_err(|e| WorkflowError::parse("classifier", e))?;

    tracing::debug!(
        issue_type = %classification.issue_type,
        urgency = %classification.urgency,
        complexity = %classification.complexity,
        "classification complete"
    );
    Ok(classification)
}
