//! Resolver step: confidence-gated automated resolution.
//!
//! The pass runs in order: build the KB query, search the knowledge base,
//! score confidence (`routing::scoring`), and only if the verdict is
//! resolvable draft an answer grounded in the retrieved articles. Account
//! profile, reservations, and prior memories enrich the answer prompt on a
//! best-effort basis — any of those lookups failing degrades to an empty
//! context fragment. The memory write after a successful resolution is
//! likewise best effort: logged, never propagated.
//!
//! Only the answer-drafting gateway call can fail this step.

use serde_json::json;

use crate::error::WorkflowError;
use crate::state::{Resolution, TicketState};
use crate::workflow::Collaborators;
use crate::{config::HubConfig, prompts};
use routing::scoring::{build_kb_query, score_confidence};
use routing::types::{KbHit, ResolutionStatus};

/// Answer sent when the confidence gate blocks automated resolution.
const HANDOFF_ANSWER: &str = "I'm not fully confident I can resolve this automatically based on \
     the available knowledge. A human support agent should review this ticket.";

/// Internal note attached to an automated resolution.
const RESOLVED_NOTES: &str = "Resolved automatically using KB content. If the user replies that \
     this didn't help, escalate.";

/// How many top hits are excerpted into the answer prompt.
const KB_EXCERPT_HITS: usize = 3;

/// Run one resolver pass over the current state.
pub async fn run_resolver(
    deps: &Collaborators,
    config: &HubConfig,
    state: &TicketState,
) -> Result<Resolution, WorkflowError> {
    let ticket = &state.ticket;
    let normalized_issue = state
        .intake
        .as_ref()
        .map(|intake| intake.normalized_issue.as_str())
        .unwrap_or("");
    let classification = state.classification.clone().unwrap_or_default();

    let query = build_kb_query(&ticket.content, normalized_issue);

    // KB search: an error or unparseable payload degrades to zero hits.
    let hits: Vec<KbHit> = if query.is_empty() {
        Vec::new()
    } else {
        match deps
            .knowledge
            .kb_search(&query, config.kb_result_limit)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(error = %e, "kb search failed, treating as no hits");
                Vec::new()
            }
        }
    };

    let report = score_confidence(&query, &hits, &ticket.content);
    let used_kb_articles: Vec<String> = hits.iter().map(|hit| hit.article_id.clone()).collect();

    tracing::debug!(
        ticket_id = %ticket.ticket_id,
        hits = report.hit_count,
        confidence = report.confidence,
        lexical_overlap = report.lexical_overlap,
        resolvable = report.resolvable,
        "resolver confidence computed"
    );

    if !report.resolvable {
        let salient = report
            .salient_overlap
            .map(|overlap| format!("{overlap:.2}"))
            .unwrap_or_else(|| "n/a".into());
        return Ok(Resolution {
            status: ResolutionStatus::NeedsEscalation,
            answer: HANDOFF_ANSWER.into(),
            confidence: report.confidence,
            used_kb_articles,
            notes_for_human: format!(
                "KB search returned no strong matches ({} hits, confidence {:.2}, \
                 lexical overlap {:.2}, salient overlap {}). Please review the issue \
                 manually and consider updating the KB.",
                report.hit_count, report.confidence, report.lexical_overlap, salient,
            ),
        });
    }

    // Best-effort enrichment: each fragment stays empty on failure.
    let user_issue = if normalized_issue.is_empty() {
        ticket.content.as_str()
    } else {
        normalized_issue
    };
    let account_snippet = account_context(deps, &ticket.owner_id).await;
    let memory_snippet = memory_context(deps, &ticket.owner_id, user_issue).await;

    let kb_snippet: String = hits
        .iter()
        .take(KB_EXCERPT_HITS)
        .map(|hit| format!("Title: {}\nContent:\n{}\n", hit.title, hit.content))
        .collect::<Vec<_>>()
        .join("\n---\n\n");

    let prompt = format!(
        "User issue (normalized): {user_issue}\n\n\
         Issue type: {}\nUrgency: {}\nComplexity: {}\n\n\
         {account_snippet}{memory_snippet}\
         Relevant knowledge base articles:\n{kb_snippet}\n\n\
         Using ONLY the information above, draft a final answer to the user. \
         Do NOT mention internal tools or KB article IDs. Just explain what the \
         user should do or what we can do for them.",
        classification.issue_type, classification.urgency, classification.complexity,
    );

    let answer = deps
        .gateway
        .generate_text(prompts::RESOLVER_PREAMBLE, &prompt)
        .await
        .map_err(|e| WorkflowError::generation("resolver", e))?;

    let resolution = Resolution {
        status: ResolutionStatus::Resolved,
        answer,
        confidence: report.confidence,
        used_kb_articles,
        notes_for_human: RESOLVED_NOTES.into(),
    };

    store_resolution_memory(deps, state, &resolution, user_issue).await;

    Ok(resolution)
}

/// Account profile and reservations, formatted for the answer prompt.
/// Best effort: a failed or empty lookup contributes nothing.
async fn account_context(deps: &Collaborators, owner_id: &str) -> String {
    let mut snippet = String::new();
    if owner_id.is_empty() {
        return snippet;
    }

    match deps.accounts.get_user(owner_id).await {
        Ok(Some(profile)) => {
            if let Ok(rendered) = serde_json::to_string(&profile) {
                snippet.push_str(&format!("User profile: {rendered}\n\n"));
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "account lookup failed, continuing without profile"),
    }

    match deps.accounts.get_user_reservations(owner_id).await {
        Ok(reservations) if !reservations.is_empty() => {
            if let Ok(rendered) = serde_json::to_string(&reservations) {
                snippet.push_str(&format!("Current reservations: {rendered}\n\n"));
            }
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(error = %e, "reservation lookup failed, continuing without reservations")
        }
    }

    snippet
}

/// Prior-memory search results, formatted for the answer prompt.
async fn memory_context(deps: &Collaborators, owner_id: &str, user_issue: &str) -> String {
    if owner_id.is_empty() {
        return String::new();
    }

    match deps.memory.search(owner_id, user_issue, 5).await {
        Ok(memories) if !memories.is_empty() => {
            let rendered: Vec<String> = memories.iter().map(|m| m.content.clone()).collect();
            format!("Relevant prior memories: {}\n\n", rendered.join(" | "))
        }
        Ok(_) => String::new(),
        Err(e) => {
            tracing::warn!(error = %e, "memory search failed, continuing without memories");
            String::new()
        }
    }
}

/// Best-effort write of a memory entry summarizing the resolution.
///
/// The swallow scope is exactly this call: the outcome is logged either way
/// and never alters the resolver's return value.
async fn store_resolution_memory(
    deps: &Collaborators,
    state: &TicketState,
    resolution: &Resolution,
    user_issue: &str,
) {
    let ticket = &state.ticket;
    if ticket.owner_id.is_empty() {
        return;
    }

    let content = format!(
        "Resolved issue: {user_issue}\nAnswer: {}",
        resolution.answer
    );
    let metadata = json!({
        "issue_type": state
            .classification
            .as_ref()
            .map(|c| c.issue_type.to_string()),
        "kb_articles": resolution.used_kb_articles,
        "confidence": resolution.confidence,
    });

    match deps
        .memory
        .write(
            &ticket.owner_id,
            &content,
            Some(&ticket.ticket_id),
            Some(metadata),
        )
        .await
    {
        Ok(entry) => tracing::debug!(memory_id = %entry.memory_id, "stored resolution memory"),
        Err(e) => tracing::warn!(error = %e, "memory write failed, resolution unaffected"),
    }
}
