//! The `WebClient` port: the one external-network seam in the engine.
//!
//! Grounded on the teacher's `infrastructure/claude` client traits (retry and
//! rate-limit wrapped around a narrow async trait) generalized here to plain
//! web fetch/search, since this engine has no LLM dependency of its own.
//! Concrete adapters live in `adapters::web`; this module only defines the
//! shape ArtifactVerifier and ExtrapolationModel depend on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;

/// The four evidence kinds `EvidenceRequest` may ask for, per spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    ArtifactVerify,
    TrajectorySearch,
    QualityEvidence,
    VectorProbability,
}

#[derive(Debug, Clone)]
pub struct EvidenceRequest {
    pub kind: EvidenceKind,
    pub query_or_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct EvidenceResponse {
    pub pages: Vec<WebPage>,
    pub results: Vec<SearchResult>,
    /// Set when the request degraded (timeout, rate limited, fetch failed)
    /// rather than returning an empty-but-successful result.
    pub degraded: bool,
    pub degradation_reason: Option<String>,
}

/// A fetched web page, trimmed to what ArtifactVerifier needs.
#[derive(Debug, Clone)]
pub struct WebPage {
    pub url: String,
    pub title: Option<String>,
    pub text: String,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
    /// Best-effort publish/update timestamp parsed out of the page, if any.
    pub content_timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

/// One hit from a `Search` call.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// The narrow network seam: fetch a page, run a search, or request
/// evidence for one of the four kinds above. Implementations own their own
/// rate limiting, retry, and caching (see `adapters::web::http_client`).
#[async_trait]
pub trait WebClient: Send + Sync {
    async fn fetch_page(&self, url: &str) -> DomainResult<Option<WebPage>>;

    async fn search(&self, query: &str, limit: usize) -> DomainResult<Vec<SearchResult>>;

    /// Default implementation dispatches to `fetch_page`/`search`; adapters
    /// may override for a single round-trip optimization.
    async fn request_evidence(&self, request: EvidenceRequest) -> DomainResult<EvidenceResponse> {
        match request.kind {
            EvidenceKind::ArtifactVerify => match self.fetch_page(&request.query_or_url).await? {
                Some(page) => Ok(EvidenceResponse { pages: vec![page], ..Default::default() }),
                None => Ok(EvidenceResponse {
                    degraded: true,
                    degradation_reason: Some("page unreachable".to_string()),
                    ..Default::default()
                }),
            },
            _ => {
                let results = self.search(&request.query_or_url, 5).await?;
                Ok(EvidenceResponse { results, ..Default::default() })
            }
        }
    }
}
