//! External data collaborators: knowledge lookup, accounts, long-term memory.
//!
//! Each collaborator is a trait the engine receives at construction; the
//! HTTP-backed implementations live in [`crate::clients`] and tests inject
//! doubles. Failure handling is the caller's job: every lookup degrades to
//! "no data" and the memory write is best effort, so implementations just
//! surface [`ServiceError`] and never decide policy.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use routing::types::KbHit;

/// Errors from a data-service call.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("service returned HTTP {0}")]
    Status(u16),

    #[error("service returned malformed data: {0}")]
    Malformed(String),
}

/// Combined user view returned by the account service.
///
/// Both halves are optional: the external product record and the core
/// support-hub record may each be missing for a given id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub external_user: Option<serde_json::Value>,
    #[serde(default)]
    pub core_user: Option<serde_json::Value>,
    #[serde(default)]
    pub reservation_count: u64,
    #[serde(default)]
    pub ticket_count: u64,
}

/// One reservation with its experience context flattened in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: String,
    #[serde(default)]
    pub experience_id: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub experience_title: Option<String>,
    #[serde(default)]
    pub experience_location: Option<String>,
}

/// One stored long-term memory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub memory_id: String,
    pub external_user_id: String,
    #[serde(default)]
    pub ticket_id: Option<String>,
    pub content: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Keyword search over the knowledge-article store.
///
/// `kb_search` returns hits ordered by score descending, tie-broken by
/// title ascending, where score is the count of distinct query words found
/// in the article text.
#[async_trait]
pub trait KnowledgeService: Send + Sync {
    async fn kb_search(&self, query: &str, limit: usize) -> Result<Vec<KbHit>, ServiceError>;
    async fn kb_get(&self, article_id: &str) -> Result<Option<KbHit>, ServiceError>;
}

/// Read access to user and reservation records.
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn get_user(&self, external_user_id: &str)
        -> Result<Option<UserProfile>, ServiceError>;
    async fn get_user_reservations(
        &self,
        external_user_id: &str,
    ) -> Result<Vec<Reservation>, ServiceError>;
}

/// Free-text long-term memory per user, most-recent-first on search.
#[async_trait]
pub trait MemoryService: Send + Sync {
    async fn write(
        &self,
        external_user_id: &str,
        content: &str,
        ticket_id: Option<&str>,
        metadata: Option<serde_json::Value>,
    ) -> Result<MemoryEntry, ServiceError>;

    async fn search(
        &self,
        external_user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryEntry>, ServiceError>;
}

/// One article in the in-memory knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbArticle {
    pub article_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Option<String>,
}

/// In-memory [`KnowledgeService`] for tests and local runs.
///
/// Implements the service scoring contract directly: an article's score is
/// the number of distinct query words found (case-insensitively) in its
/// title, content, and tags; zero-score articles are omitted; results sort
/// by score descending, then title ascending.
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeBase {
    articles: Vec<KbArticle>,
}

impl InMemoryKnowledgeBase {
    pub fn new(articles: Vec<KbArticle>) -> Self {
        Self { articles }
    }
}

#[async_trait]
impl KnowledgeService for InMemoryKnowledgeBase {
    async fn kb_search(&self, query: &str, limit: usize) -> Result<Vec<KbHit>, ServiceError> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut words: Vec<&str> = query.split_whitespace().collect();
        words.sort_unstable();
        words.dedup();

        let mut hits: Vec<KbHit> = self
            .articles
            .iter()
            .filter_map(|article| {
                let text = format!(
                    "{}\n{}\n{}",
                    article.title,
                    article.content,
                    article.tags.as_deref().unwrap_or("")
                )
                .to_lowercase();
                let score = words.iter().filter(|word| text.contains(*word)).count();
                (score > 0).then(|| KbHit {
                    article_id: article.article_id.clone(),
                    title: article.title.clone(),
                    content: article.content.clone(),
                    tags: article.tags.clone(),
                    score: score as f64,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.title.cmp(&b.title))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn kb_get(&self, article_id: &str) -> Result<Option<KbHit>, ServiceError> {
        Ok(self
            .articles
            .iter()
            .find(|article| article.article_id == article_id)
            .map(|article| KbHit {
                article_id: article.article_id.clone(),
                title: article.title.clone(),
                content: article.content.clone(),
                tags: article.tags.clone(),
                score: 0.0,
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb() -> InMemoryKnowledgeBase {
        InMemoryKnowledgeBase::new(vec![
            KbArticle {
                article_id: "kb-1".into(),
                title: "Password reset".into(),
                content: "Use the password reset link sent to your email.".into(),
                tags: Some("login,password".into()),
            },
            KbArticle {
                article_id: "kb-2".into(),
                title: "Billing cycles".into(),
                content: "Subscriptions renew monthly on the signup date.".into(),
                tags: Some("billing".into()),
            },
            KbArticle {
                article_id: "kb-3".into(),
                title: "Account recovery".into(),
                content: "Recover your account with the reset email flow.".into(),
                tags: None,
            },
        ])
    }

    #[tokio::test]
    async fn search_scores_by_distinct_word_hits() {
        let hits = kb().kb_search("password reset email", 5).await.unwrap();
        assert_eq!(hits[0].article_id, "kb-1");
        assert_eq!(hits[0].score, 3.0);
    }

    #[tokio::test]
    async fn duplicate_query_words_count_once() {
        let hits = kb().kb_search("reset reset reset", 5).await.unwrap();
        assert_eq!(hits[0].score, 1.0);
    }

    #[tokio::test]
    async fn ties_break_by_title_ascending() {
        let hits = kb().kb_search("reset", 5).await.unwrap();
        let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["Account recovery", "Password reset"]);
    }

    #[tokio::test]
    async fn zero_score_articles_are_omitted() {
        let hits = kb().kb_search("paranormal haunting", 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn empty_query_returns_no_hits() {
        let hits = kb().kb_search("   ", 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn limit_truncates_results() {
        let hits = kb().kb_search("reset", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn get_finds_article_by_id() {
        let article = kb().kb_get("kb-2").await.unwrap().unwrap();
        assert_eq!(article.title, "Billing cycles");
        assert!(kb().kb_get("kb-99").await.unwrap().is_none());
    }
}
