//! ArtifactVerifier: verify a user-submitted URL as substantive, timely,
//! and relevant. Formulas reproduced verbatim from spec.md §4.8.

use std::sync::Arc;

use tracing::instrument;

use crate::domain::models::{tokenize, Artifact, ArtifactStatus, ArtifactVerification, Experience};
use crate::domain::ports::{WebClient, WebPage};

pub struct ArtifactVerifier {
    web_client: Arc<dyn WebClient>,
}

impl ArtifactVerifier {
    pub fn new(web_client: Arc<dyn WebClient>) -> Self {
        Self { web_client }
    }

    /// `Verify(artifact, experience) -> ArtifactVerification`.
    #[instrument(skip(self, artifact, experience), fields(url = %artifact.url))]
    pub async fn verify(&self, artifact: &Artifact, experience: &Experience) -> ArtifactVerification {
        let page = match self.web_client.fetch_page(&artifact.url).await {
            Ok(Some(page)) => page,
            Ok(None) => {
                return ArtifactVerification::inaccessible(artifact.id, "url not accessible");
            }
            Err(err) => {
                return ArtifactVerification::inaccessible(artifact.id, format!("fetch failed: {err}"));
            }
        };

        let substantive = Self::is_substantive(&page);
        let timestamp_plausible = Self::is_timestamp_plausible(&page, experience);
        let relevance = Self::relevance(&page, artifact, experience);
        let status = Self::decide_status(substantive, timestamp_plausible, relevance);

        ArtifactVerification {
            artifact_id: artifact.id,
            url_accessible: true,
            content_summary: Self::summarize(&page),
            content_substantive: substantive,
            timestamp_plausible,
            relevance_score: relevance,
            verified_at: chrono::Utc::now(),
            status,
            notes: format!(
                "substantive={substantive} timestamp_plausible={timestamp_plausible} relevance={relevance:.2}"
            ),
        }
    }

    /// Word count >= 50 and unique-word ratio >= 0.20.
    fn is_substantive(page: &WebPage) -> bool {
        let words: Vec<&str> = page.text.split_whitespace().collect();
        if words.len() < 50 {
            return false;
        }
        let unique: std::collections::HashSet<String> =
            words.iter().map(|w| w.to_lowercase()).collect();
        let ratio = unique.len() as f64 / words.len() as f64;
        ratio >= 0.20
    }

    /// If a publish date was extracted, require `|pub - experience.ts| <=
    /// 365 days`; otherwise give benefit of the doubt.
    fn is_timestamp_plausible(page: &WebPage, experience: &Experience) -> bool {
        match page.content_timestamp {
            Some(published) => {
                let delta = (published - experience.created_at).num_seconds().abs() as f64 / 86_400.0;
                delta <= 365.0
            }
            None => true,
        }
    }

    /// Token-intersect recall against the page body, with a title bonus.
    fn relevance(page: &WebPage, artifact: &Artifact, experience: &Experience) -> f64 {
        let query_text = format!("{} {} {}", experience.description, experience.context, artifact.user_claim);
        let query_tokens = tokenize(&query_text);
        if query_tokens.is_empty() {
            return 0.0;
        }
        let body_tokens = tokenize(&page.text);
        let overlap = query_tokens.intersection(&body_tokens).count();
        let recall = overlap as f64 / query_tokens.len() as f64;

        let title_bonus = page.title.as_ref().map_or(0.0, |title| {
            let title_tokens = tokenize(title);
            if title_tokens.is_empty() {
                return 0.0;
            }
            let title_overlap = query_tokens.intersection(&title_tokens).count();
            (0.15 * (title_overlap as f64 / title_tokens.len() as f64)).min(0.15)
        });

        (recall + title_bonus).clamp(0.0, 1.0)
    }

    fn decide_status(substantive: bool, timestamp_plausible: bool, relevance: f64) -> ArtifactStatus {
        if !substantive || relevance < 0.10 {
            ArtifactStatus::Unverified
        } else if !timestamp_plausible {
            ArtifactStatus::Suspicious
        } else if relevance >= 0.30 {
            ArtifactStatus::Verified
        } else {
            ArtifactStatus::Unverified
        }
    }

    fn summarize(page: &WebPage) -> String {
        page.text.chars().take(240).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::web::NoopWebClient;

    fn page(text: &str, title: Option<&str>) -> WebPage {
        WebPage {
            url: "https://medium.com/u/post".to_string(),
            title: title.map(str::to_string),
            text: text.to_string(),
            fetched_at: chrono::Utc::now(),
            content_timestamp: None,
        }
    }

    #[test]
    fn short_page_is_not_substantive() {
        assert!(!ArtifactVerifier::is_substantive(&page("too short", None)));
    }

    #[test]
    fn long_varied_page_is_substantive() {
        let words: Vec<String> = (0..60).map(|i| format!("word{i}")).collect();
        let text = words.join(" ");
        assert!(ArtifactVerifier::is_substantive(&page(&text, None)));
    }

    #[tokio::test]
    async fn inaccessible_without_client_response() {
        let verifier = ArtifactVerifier::new(Arc::new(NoopWebClient));
        let experience = Experience::new("u1", "Built a woodworking project", "c", 0.8);
        let artifact = Artifact::new(experience.id, "u1", "https://example.com", "claim", None);
        let result = verifier.verify(&artifact, &experience).await;
        assert_eq!(result.status, ArtifactStatus::Inaccessible);
    }
}
