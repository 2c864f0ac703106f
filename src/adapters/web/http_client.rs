//! `HttpWebClient`: reqwest-based `WebClient`, rate-limited per host and
//! retried with exponential backoff, with a small in-memory TTL cache.
//!
//! Grounded on the teacher's `infrastructure::claude::rate_limiter`
//! (token-bucket per caller) and `infrastructure::claude::retry`
//! (`RetryPolicy::execute`), generalized here to the `governor`/`backoff`
//! crates named in SPEC_FULL.md §5 instead of the teacher's hand-rolled
//! equivalents, since this engine's web surface is a plain fetch/search
//! rather than a single LLM API host.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use governor::{Quota, RateLimiter};
use tracing::{instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::WebClientConfig;
use crate::domain::ports::{SearchResult, WebClient, WebPage};

type HostRateLimiter = RateLimiter<String, governor::state::keyed::DefaultKeyedStateStore<String>, governor::clock::DefaultClock>;

pub struct HttpWebClient {
    client: reqwest::Client,
    rate_limiter: HostRateLimiter,
    max_retries: u32,
    cache_ttl: Duration,
    cache: Mutex<HashMap<String, (Instant, WebPage)>>,
}

impl HttpWebClient {
    pub fn new(config: &WebClientConfig) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| DomainError::StorageError(format!("failed to build http client: {err}")))?;

        let per_sec = NonZeroU32::new(config.rate_limit_per_host_per_sec.max(1)).unwrap();
        let rate_limiter = RateLimiter::keyed(Quota::per_second(per_sec));

        Ok(Self {
            client,
            rate_limiter,
            max_retries: config.max_retries,
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn host_of(url: &str) -> String {
        reqwest::Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)).unwrap_or_else(|| url.to_string())
    }

    fn cached(&self, url: &str) -> Option<WebPage> {
        let guard = self.cache.lock().expect("http client cache lock poisoned");
        guard.get(url).and_then(|(fetched, page)| {
            if fetched.elapsed() < self.cache_ttl {
                Some(page.clone())
            } else {
                None
            }
        })
    }

    fn store_cache(&self, url: &str, page: &WebPage) {
        let mut guard = self.cache.lock().expect("http client cache lock poisoned");
        guard.insert(url.to_string(), (Instant::now(), page.clone()));
    }

    async fn fetch_with_retry(&self, url: &str) -> DomainResult<Option<String>> {
        let backoff = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::from_secs(30)))
            .build();

        let client = &self.client;
        let attempt = || {
            let client = client.clone();
            let url = url.to_string();
            async move {
                match client.get(&url).send().await {
                    Ok(response) if response.status().is_success() => {
                        response.text().await.map(Some).map_err(backoff::Error::transient)
                    }
                    Ok(response) if response.status().is_server_error() => {
                        Err(backoff::Error::transient(reqwest::Error::from(
                            response.error_for_status().unwrap_err(),
                        )))
                    }
                    Ok(_) => Ok(None),
                    Err(err) => Err(backoff::Error::transient(err)),
                }
            }
        };

        match backoff::future::retry(backoff, attempt).await {
            Ok(body) => Ok(body),
            Err(err) => {
                warn!(error = %err, url, "http fetch exhausted retries");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl WebClient for HttpWebClient {
    #[instrument(skip(self), fields(url))]
    async fn fetch_page(&self, url: &str) -> DomainResult<Option<WebPage>> {
        if let Some(cached) = self.cached(url) {
            return Ok(Some(cached));
        }

        let host = Self::host_of(url);
        self.rate_limiter.until_key_ready(&host).await;

        let Some(body) = self.fetch_with_retry(url).await? else {
            return Ok(None);
        };

        let page = WebPage {
            url: url.to_string(),
            title: extract_title(&body),
            text: strip_tags(&body),
            fetched_at: Utc::now(),
            content_timestamp: extract_date(&body),
        };
        self.store_cache(url, &page);
        Ok(Some(page))
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> DomainResult<Vec<SearchResult>> {
        // No external search API is wired up by default; callers that need
        // real search results configure this through a dedicated evidence
        // provider. This keeps the degrade-gracefully contract honest for
        // installations that only need page-fetch verification.
        let _ = (query, limit);
        Ok(Vec::new())
    }
}

/// Crude tag stripper: good enough for word-count/overlap scoring, which
/// is all ArtifactVerifier and ExtrapolationModel need from page bodies.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_title(html: &str) -> Option<String> {
    let lower = html.to_lowercase();
    let start = lower.find("<title>")? + "<title>".len();
    let end = lower[start..].find("</title>")? + start;
    Some(html[start..end].trim().to_string())
}

/// Scans for the first `YYYY-MM-DD` substring and parses it as midnight UTC.
fn extract_date(text: &str) -> Option<DateTime<Utc>> {
    let bytes = text.as_bytes();
    if bytes.len() < 10 {
        return None;
    }
    for window_start in 0..=(bytes.len() - 10) {
        let Some(candidate) = text.get(window_start..window_start + 10) else {
            continue;
        };
        if let Ok(date) = NaiveDate::parse_from_str(candidate, "%Y-%m-%d") {
            if let Some(dt) = Utc.from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap()).single() {
                return Some(dt);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_html_tags() {
        let html = "<html><body><p>Hello <b>world</b></p></body></html>";
        assert_eq!(strip_tags(html), "Hello world");
    }

    #[test]
    fn extracts_title() {
        let html = "<html><head><title>My First Woodworking Project</title></head></html>";
        assert_eq!(extract_title(html).as_deref(), Some("My First Woodworking Project"));
    }

    #[test]
    fn extracts_iso_date() {
        let text = "Published on 2025-06-15 by the author.";
        let date = extract_date(text).unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2025-06-15");
    }

    #[test]
    fn skips_non_char_boundary_windows_without_panicking() {
        let text = "Café opened 2025-06-15 for the season.";
        let date = extract_date(text).unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2025-06-15");
    }
}
