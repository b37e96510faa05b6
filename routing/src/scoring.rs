//! Resolver confidence scoring — pure heuristics over KB search results.
//!
//! Three lexical signals gate whether an automated answer is trustworthy
//! enough to send:
//!
//! - **match strength**: the top hit's score, mapped into a base confidence
//! - **lexical overlap**: top score relative to the query length
//! - **salient overlap**: fraction of the ticket's content words that appear
//!   anywhere in the top hits, a relevance sanity check independent of the
//!   raw score
//!
//! The same inputs always produce the same report; there is no hidden state.
//!
//! Note on zero-score hits: a non-empty hit list whose top score is 0.0 goes
//! through the overlap path (base floor 0.5, then clamped to 0.4 by the
//! lexical rule) rather than the 0.2 no-hit floor. Intentional: do not merge
//! the two branches.

use serde::{Deserialize, Serialize};

use crate::types::KbHit;

/// Confidence assigned when the KB returns no hits at all.
pub const NO_HIT_CONFIDENCE: f64 = 0.2;
/// Ceiling applied when either overlap guard fires.
pub const LOW_OVERLAP_CEILING: f64 = 0.4;
/// Base confidence is clamped into this band before the overlap guards run.
const BASE_CONFIDENCE_FLOOR: f64 = 0.5;
const BASE_CONFIDENCE_CEILING: f64 = 0.95;
/// Lexical overlap below this clamps confidence to `LOW_OVERLAP_CEILING`.
const LEXICAL_OVERLAP_FLOOR: f64 = 0.25;
/// Lexical overlap required for a resolvable verdict.
const LEXICAL_RESOLVABLE_FLOOR: f64 = 0.3;
/// Salient overlap below this clamps confidence and blocks resolution.
const SALIENT_OVERLAP_FLOOR: f64 = 0.4;
/// Confidence required for a resolvable verdict.
const RESOLVABLE_CONFIDENCE_FLOOR: f64 = 0.5;
/// Salient tokens shorter than this are discarded.
const SALIENT_MIN_LEN: usize = 4;
/// How many top hits contribute to the salient-overlap haystack.
const SALIENT_HAYSTACK_HITS: usize = 3;

/// Function words excluded from the salient-token set: pronouns, articles,
/// and common auxiliaries that survive the length-4 filter.
const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "also", "arent", "aren't", "because", "been", "before", "being",
    "cannot", "cant", "can't", "could", "couldnt", "couldn't", "didnt", "didn't", "does",
    "doesnt", "doesn't", "dont", "don't", "else", "even", "every", "from", "have", "having",
    "hello", "here", "into", "just", "like", "mine", "more", "most", "much", "myself", "need",
    "only", "onto", "ours", "over", "please", "really", "shall", "should", "shouldnt",
    "shouldn't", "some", "still", "such", "than", "thanks", "thank", "that", "their", "theirs",
    "them", "then", "there", "these", "they", "this", "those", "under", "upon", "very", "want",
    "well", "were", "what", "when", "where", "which", "while", "will", "with", "wont", "won't",
    "would", "wouldnt", "wouldn't", "your", "yours",
];

/// Scoring outcome for one resolver pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceReport {
    /// Final confidence in [0.0, 0.95]; exactly 0.2 when there were no hits.
    pub confidence: f64,
    /// Top score divided by the query word count (0.0 with no hits).
    pub lexical_overlap: f64,
    /// Fraction of salient tokens found in the top hits; `None` when the
    /// ticket text yields no salient tokens.
    pub salient_overlap: Option<f64>,
    /// Number of KB hits the report was computed from.
    pub hit_count: usize,
    /// Whether the resolver may attempt an automated answer.
    pub resolvable: bool,
}

/// Build the KB query from the raw ticket content and the intake's
/// normalized issue.
///
/// The normalized issue is appended only when it contributes at least one
/// word not already substring-contained (case-insensitively) in the raw
/// content, so the query never repeats itself but still benefits from
/// intake cleanup. Appending inflates the lexical-overlap denominator, so
/// the novelty test is per word, not on the whole phrase.
pub fn build_kb_query(raw_content: &str, normalized_issue: &str) -> String {
    let raw = raw_content.trim();
    let normalized = normalized_issue.trim();

    if normalized.is_empty() {
        return raw.to_string();
    }
    if raw.is_empty() {
        return normalized.to_string();
    }

    let raw_lower = raw.to_lowercase();
    let adds_new_words = normalized
        .to_lowercase()
        .split_whitespace()
        .any(|word| !raw_lower.contains(word));
    if adds_new_words {
        format!("{raw} {normalized}")
    } else {
        raw.to_string()
    }
}

/// Compute the confidence report for one resolver pass.
///
/// Pure: identical `(query, hits, raw_content)` inputs always yield an
/// identical report. `hits` must already be in service order (score
/// descending, title ascending); only the first hit's score and the top
/// three hits' text are consulted.
pub fn score_confidence(query: &str, hits: &[KbHit], raw_content: &str) -> ConfidenceReport {
    if hits.is_empty() {
        let salient_overlap = if salient_tokens(raw_content).is_empty() {
            None
        } else {
            Some(0.0)
        };
        return ConfidenceReport {
            confidence: NO_HIT_CONFIDENCE,
            lexical_overlap: 0.0,
            salient_overlap,
            hit_count: 0,
            resolvable: false,
        };
    }

    let top_score = hits[0].score;
    let base_confidence =
        (top_score / 2.0 + 0.3).clamp(BASE_CONFIDENCE_FLOOR, BASE_CONFIDENCE_CEILING);

    let query_words = query.split_whitespace().count().max(1);
    let lexical_overlap = top_score / query_words as f64;

    let mut confidence = if lexical_overlap < LEXICAL_OVERLAP_FLOOR {
        base_confidence.min(LOW_OVERLAP_CEILING)
    } else {
        base_confidence
    };

    let salient = salient_tokens(raw_content);
    let salient_overlap = if salient.is_empty() {
        None
    } else {
        let haystack: String = hits
            .iter()
            .take(SALIENT_HAYSTACK_HITS)
            .map(|hit| format!("{}\n{}\n", hit.title, hit.content))
            .collect::<String>()
            .to_lowercase();
        let found = salient
            .iter()
            .filter(|token| haystack.contains(token.as_str()))
            .count();
        Some(found as f64 / salient.len() as f64)
    };

    if let Some(overlap) = salient_overlap {
        if overlap < SALIENT_OVERLAP_FLOOR {
            confidence = confidence.min(LOW_OVERLAP_CEILING);
        }
    }

    let resolvable = confidence >= RESOLVABLE_CONFIDENCE_FLOOR
        && lexical_overlap >= LEXICAL_RESOLVABLE_FLOOR
        && salient_overlap.map_or(true, |overlap| overlap >= SALIENT_OVERLAP_FLOOR);

    ConfidenceReport {
        confidence,
        lexical_overlap,
        salient_overlap,
        hit_count: hits.len(),
        resolvable,
    }
}

/// Extract salient tokens from the raw ticket text: whitespace-tokenized,
/// trailing `?,.!` stripped, lowercased, length ≥ 4, not a stop word.
fn salient_tokens(raw_content: &str) -> Vec<String> {
    raw_content
        .split_whitespace()
        .map(|token| token.trim_end_matches(['?', ',', '.', '!']).to_lowercase())
        .filter(|token| token.chars().count() >= SALIENT_MIN_LEN)
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
        .collect()
}
