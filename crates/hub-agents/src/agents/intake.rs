//! Intake agent: normalize the raw ticket into a summary, a cleaned-up
//! issue statement, a sentiment, and a suspected language.

use crate::error::WorkflowError;
use crate::gateway::TextGateway;
use crate::prompts;
use crate::state::{IntakeReport, Ticket};

pub async fn run_intake(
    gateway: &dyn TextGateway,
    ticket: &Ticket,
) -> Result<IntakeReport, WorkflowError> {
    let prompt = format!(
        "Ticket content: {}\nChannel: {}\nTags: {}\nOwner name: {}\n\n\
         Return ONLY the JSON object.",
        ticket.content, ticket.channel, ticket.tags, ticket.owner_name,
    );

    let value = gateway
        .generate_json(prompts::INTAKE_PREAMBLE, &prompt)
        .await
        .map_err(|e| WorkflowError::generation("intake", e))?;

    let report: IntakeReport =
        serde_json::from_value(value).map_err(|e| WorkflowError::parse("intake", e))?;

    tracing::debug!(
        sentiment = %report.sentiment,
        language = %report.suspected_language,
        "intake complete"
    );
    Ok(report)
}
