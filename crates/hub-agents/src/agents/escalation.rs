//! Escalation agent: draft the structured human handoff from everything
//! the earlier steps learned about the ticket.

use crate::error::WorkflowError;
use crate::gateway::TextGateway;
use crate::prompts;
use crate::state::{EscalationReport, TicketState};

pub async fn run_escalation(
    gateway: &dyn TextGateway,
    state: &TicketState,
) -> Result<EscalationReport, WorkflowError> {
    let intake_summary = state
        .intake
        .as_ref()
        .map(|intake| intake.summary.as_str())
        .unwrap_or("");
    let sentiment = state
        .intake
        .as_ref()
        .map(|intake| intake.sentiment)
        .unwrap_or_default();
    let classification = state
        .classification
        .as_ref()
        .map(|c| serde_json::to_string(c).unwrap_or_default())
        .unwrap_or_default();
    let resolver_notes = state
        .resolution
        .as_ref()
        .map(|resolution| resolution.notes_for_human.as_str())
        .unwrap_or("");

    let prompt = format!(
        "Ticket content: {}\nIntake summary: {}\nSentiment: {}\nClassification: {}\n\
         Resolver notes: {}\n\nReturn ONLY JSON.",
        state.ticket.content, intake_summary, sentiment, classification, resolver_notes,
    );

    let value = gateway
        .generate_json(prompts::ESCALATION_PREAMBLE, &prompt)
        .await
        .map_err(|e| WorkflowError::generation("escalation", e))?;

    let report: EscalationReport =
        serde_json::from_value(value).map_err(|e| WorkflowError::parse("escalation", e))?;

    tracing::info!(
        department = %report.recommended_department,
        steps = report.proposed_next_steps.len(),
        "escalation handoff drafted"
    );
    Ok(report)
}
