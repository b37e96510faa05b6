//! HTTP clients for the knowledge, account, and memory services.
//!
//! Each service exposes its tools as JSON POST endpoints named after the
//! tool (`/kb_search`, `/account_get_user`, `/memory_write`, …). The clients
//! surface transport and decode problems as [`ServiceError`]; degradation
//! policy stays with the caller.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::services::{
    AccountService, KnowledgeService, MemoryEntry, MemoryService, Reservation, ServiceError,
    UserProfile,
};
use routing::types::KbHit;

fn build_http(timeout: Duration) -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ServiceError::Http(e.to_string()))
}

async fn post_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    base_url: &str,
    tool: &str,
    body: serde_json::Value,
) -> Result<T, ServiceError> {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), tool);
    let response = http
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| ServiceError::Http(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ServiceError::Status(response.status().as_u16()));
    }

    response
        .json()
        .await
        .map_err(|e| ServiceError::Malformed(e.to_string()))
}

/// HTTP-backed [`KnowledgeService`].
pub struct HttpKnowledgeService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpKnowledgeService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            http: build_http(timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl KnowledgeService for HttpKnowledgeService {
    async fn kb_search(&self, query: &str, limit: usize) -> Result<Vec<KbHit>, ServiceError> {
        post_json(
            &self.http,
            &self.base_url,
            "kb_search",
            json!({ "query": query, "limit": limit }),
        )
        .await
    }

    async fn kb_get(&self, article_id: &str) -> Result<Option<KbHit>, ServiceError> {
        post_json(
            &self.http,
            &self.base_url,
            "kb_get",
            json!({ "article_id": article_id }),
        )
        .await
    }
}

/// HTTP-backed [`AccountService`].
pub struct HttpAccountService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAccountService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            http: build_http(timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl AccountService for HttpAccountService {
    async fn get_user(
        &self,
        external_user_id: &str,
    ) -> Result<Option<UserProfile>, ServiceError> {
        post_json(
            &self.http,
            &self.base_url,
            "account_get_user",
            json!({ "external_user_id": external_user_id }),
        )
        .await
    }

    async fn get_user_reservations(
        &self,
        external_user_id: &str,
    ) -> Result<Vec<Reservation>, ServiceError> {
        post_json(
            &self.http,
            &self.base_url,
            "account_get_user_reservations",
            json!({ "external_user_id": external_user_id }),
        )
        .await
    }
}

/// HTTP-backed [`MemoryService`].
pub struct HttpMemoryService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpMemoryService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            http: build_http(timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl MemoryService for HttpMemoryService {
    async fn write(
        &self,
        external_user_id: &str,
        content: &str,
        ticket_id: Option<&str>,
        metadata: Option<serde_json::Value>,
    ) -> Result<MemoryEntry, ServiceError> {
        post_json(
            &self.http,
            &self.base_url,
            "memory_write",
            json!({
                "external_user_id": external_user_id,
                "content": content,
                "ticket_id": ticket_id,
                "metadata": metadata,
            }),
        )
        .await
    }

    async fn search(
        &self,
        external_user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryEntry>, ServiceError> {
        post_json(
            &self.http,
            &self.base_url,
            "memory_search",
            json!({
                "external_user_id": external_user_id,
                "query": query,
                "limit": limit,
            }),
        )
        .await
    }
}
