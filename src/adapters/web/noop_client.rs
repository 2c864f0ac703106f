//! `NoopWebClient`: the typed "no web client" object from spec.md §9.
//! Always reports pages as inaccessible and searches as empty, so the
//! pipeline's scorers never need to branch on whether a client exists.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::ports::{SearchResult, WebClient, WebPage};

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWebClient;

#[async_trait]
impl WebClient for NoopWebClient {
    async fn fetch_page(&self, _url: &str) -> DomainResult<Option<WebPage>> {
        Ok(None)
    }

    async fn search(&self, _query: &str, _limit: usize) -> DomainResult<Vec<SearchResult>> {
        Ok(Vec::new())
    }
}
