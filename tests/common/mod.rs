//! Shared test helpers: a scripted `WebClient` double for artifact and
//! extrapolation scenarios, plus a couple of trajectory-building shortcuts.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ouroboros_engine::domain::errors::DomainResult;
use ouroboros_engine::domain::ports::{SearchResult, WebClient, WebPage};

/// A `WebClient` that answers a fixed set of URLs with canned pages and
/// otherwise reports the page as unreachable, mirroring what a real fetch
/// looks like once the corresponding `fetch_page` call has already
/// succeeded or failed.
#[derive(Default)]
pub struct ScriptedWebClient {
    pages: Mutex<HashMap<String, WebPage>>,
}

impl ScriptedWebClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: impl Into<String>, page: WebPage) -> Self {
        self.pages.lock().unwrap().insert(url.into(), page);
        self
    }
}

#[async_trait]
impl WebClient for ScriptedWebClient {
    async fn fetch_page(&self, url: &str) -> DomainResult<Option<WebPage>> {
        Ok(self.pages.lock().unwrap().get(url).cloned())
    }

    async fn search(&self, _query: &str, _limit: usize) -> DomainResult<Vec<SearchResult>> {
        Ok(Vec::new())
    }
}

/// Builds the page described by scenario S4: a substantive, on-topic,
/// timestamp-plausible woodworking write-up.
pub fn woodworking_post(content_timestamp: DateTime<Utc>) -> WebPage {
    let mut words: Vec<String> = "in my workshop this weekend I finally finished the woodworking \
        project I had been planning for months turning a pile of rough boards \
        into a proper bookshelf"
        .split_whitespace()
        .map(str::to_string)
        .collect();
    while words.len() < 55 {
        words.push(format!("detail{}", words.len()));
    }
    WebPage {
        url: "https://medium.com/u/post".to_string(),
        title: Some("My First Woodworking Project".to_string()),
        text: words.join(" "),
        fetched_at: Utc::now(),
        content_timestamp: Some(content_timestamp),
    }
}
