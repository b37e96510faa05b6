//! Supervisor decision table — deterministic routing over the current state.
//!
//! All decisions in this module are deterministic — no LLM calls. The table
//! is evaluated in order; the first matching rule wins:
//!
//! 1. No resolver attempt yet               → `resolver`
//! 2. Resolver asked for escalation          → `escalation`
//! 3. Resolved with confidence ≥ 0.7         → `done`
//! 4. Resolved but low confidence:
//!      urgency high AND complexity high     → `escalation`
//!      otherwise                            → `resolver`

use serde::{Deserialize, Serialize};

use crate::types::{Complexity, NextStep, ResolutionStatus, Urgency};

/// Confidence at or above which a resolved ticket is accepted as done.
pub const ACCEPT_CONFIDENCE: f64 = 0.7;

/// The supervisor's routing choice plus a human-readable justification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorDecision {
    pub next_step: NextStep,
    pub reason: String,
}

/// Compact view of a resolver outcome, as much as the table needs.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionSignal {
    pub status: ResolutionStatus,
    pub confidence: f64,
}

/// Evaluate the supervisor table for one ticket.
///
/// `resolution` is `None` before the first resolver pass; the classifier
/// fields are always populated by the time this runs.
pub fn decide(
    urgency: Urgency,
    complexity: Complexity,
    resolution: Option<ResolutionSignal>,
) -> SupervisorDecision {
    let decision = match resolution {
        None => SupervisorDecision {
            next_step: NextStep::Resolver,
            reason: "no resolver attempt yet".into(),
        },
        Some(res) if res.status == ResolutionStatus::NeedsEscalation => SupervisorDecision {
            next_step: NextStep::Escalation,
            reason: format!(
                "resolver requested escalation (confidence {:.2})",
                res.confidence
            ),
        },
        Some(res) if res.confidence >= ACCEPT_CONFIDENCE => SupervisorDecision {
            next_step: NextStep::Done,
            reason: format!("resolved with confidence {:.2}", res.confidence),
        },
        Some(res) => {
            // Resolved but below the acceptance bar: hard tickets go to a
            // human, the rest get another resolver pass.
            if urgency == Urgency::High && complexity == Complexity::High {
                SupervisorDecision {
                    next_step: NextStep::Escalation,
                    reason: format!(
                        "low-confidence resolution ({:.2}) on a high-urgency, high-complexity ticket",
                        res.confidence
                    ),
                }
            } else {
                SupervisorDecision {
                    next_step: NextStep::Resolver,
                    reason: format!(
                        "low-confidence resolution ({:.2}), retrying automated resolution",
                        res.confidence
                    ),
                }
            }
        }
    };

    tracing::debug!(
        next_step = %decision.next_step,
        urgency = %urgency,
        complexity = %complexity,
        "supervisor decision"
    );
    decision
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(confidence: f64) -> Option<ResolutionSignal> {
        Some(ResolutionSignal {
            status: ResolutionStatus::Resolved,
            confidence,
        })
    }

    fn needs_escalation(confidence: f64) -> Option<ResolutionSignal> {
        Some(ResolutionSignal {
            status: ResolutionStatus::NeedsEscalation,
            confidence,
        })
    }

    #[test]
    fn no_resolution_routes_to_resolver() {
        let d = decide(Urgency::High, Complexity::High, None);
        assert_eq!(d.next_step, NextStep::Resolver);
    }

    #[test]
    fn needs_escalation_routes_to_escalation_regardless_of_confidence() {
        for confidence in [0.0, 0.4, 0.95] {
            let d = decide(Urgency::Low, Complexity::Low, needs_escalation(confidence));
            assert_eq!(d.next_step, NextStep::Escalation);
        }
    }

    #[test]
    fn high_confidence_resolution_is_done() {
        let d = decide(Urgency::High, Complexity::High, resolved(0.9));
        assert_eq!(d.next_step, NextStep::Done);
    }

    #[test]
    fn confidence_exactly_at_threshold_is_done() {
        let d = decide(Urgency::Low, Complexity::Low, resolved(ACCEPT_CONFIDENCE));
        assert_eq!(d.next_step, NextStep::Done);
    }

    #[test]
    fn low_confidence_hard_ticket_escalates() {
        let d = decide(Urgency::High, Complexity::High, resolved(0.5));
        assert_eq!(d.next_step, NextStep::Escalation);
    }

    #[test]
    fn low_confidence_easy_ticket_retries_resolver() {
        let d = decide(Urgency::Low, Complexity::Low, resolved(0.5));
        assert_eq!(d.next_step, NextStep::Resolver);

        // High urgency alone is not enough to escalate.
        let d = decide(Urgency::High, Complexity::Medium, resolved(0.5));
        assert_eq!(d.next_step, NextStep::Resolver);

        // Neither is high complexity alone.
        let d = decide(Urgency::Medium, Complexity::High, resolved(0.5));
        assert_eq!(d.next_step, NextStep::Resolver);
    }

    #[test]
    fn full_table_over_urgency_and_complexity() {
        for urgency in [Urgency::Low, Urgency::Medium, Urgency::High] {
            for complexity in [Complexity::Low, Complexity::Medium, Complexity::High] {
                let d = decide(urgency, complexity, resolved(0.6));
                let expect = if urgency == Urgency::High && complexity == Complexity::High {
                    NextStep::Escalation
                } else {
                    NextStep::Resolver
                };
                assert_eq!(d.next_step, expect, "urgency={urgency} complexity={complexity}");
            }
        }
    }

    #[test]
    fn reason_is_always_populated() {
        let cases = [
            decide(Urgency::Low, Complexity::Low, None),
            decide(Urgency::Low, Complexity::Low, needs_escalation(0.2)),
            decide(Urgency::Low, Complexity::Low, resolved(0.9)),
            decide(Urgency::High, Complexity::High, resolved(0.5)),
        ];
        for d in cases {
            assert!(!d.reason.is_empty());
        }
    }
}
