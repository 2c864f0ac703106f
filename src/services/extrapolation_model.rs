//! ExtrapolationModel: generate evidence-backed hypotheses about where an
//! action typically leads. Formulas reproduced verbatim from spec.md §4.9.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::instrument;

use crate::domain::models::{tokenize, Experience, Hypothesis, Trajectory, TrajectoryEvidence};
use crate::domain::ports::{SearchResult, WebClient};

const CREATIVE_THEME_WORDS: &[&str] =
    &["built", "made", "created", "wrote", "composed", "designed", "learned", "taught"];
const CONSUMPTIVE_THEME_WORDS: &[&str] =
    &["watched", "scrolled", "binged", "played", "consumed", "browsed"];

pub struct ExtrapolationModel {
    web_client: Option<Arc<dyn WebClient>>,
}

impl ExtrapolationModel {
    pub fn new(web_client: Option<Arc<dyn WebClient>>) -> Self {
        Self { web_client }
    }

    /// `Hypothesise(experience, trajectory?) -> TrajectoryEvidence` with up
    /// to 3 hypotheses.
    #[instrument(skip(self, experience, trajectory), fields(user_id = %experience.user_id))]
    pub async fn hypothesise(&self, experience: &Experience, trajectory: Option<&Trajectory>) -> TrajectoryEvidence {
        let Some(web_client) = &self.web_client else {
            return TrajectoryEvidence {
                hypotheses: Vec::new(),
                degradation_note: Some("no web client configured".to_string()),
            };
        };

        let queries = Self::build_queries(experience);
        let mut seen_urls = HashSet::new();
        let mut all_results: Vec<SearchResult> = Vec::new();
        for query in &queries {
            match web_client.search(query, 5).await {
                Ok(results) => {
                    for result in results {
                        if seen_urls.insert(result.url.clone()) {
                            all_results.push(result);
                        }
                    }
                }
                Err(_) => {
                    return TrajectoryEvidence {
                        hypotheses: Vec::new(),
                        degradation_note: Some("web search failed".to_string()),
                    };
                }
            }
        }

        if all_results.is_empty() {
            return TrajectoryEvidence {
                hypotheses: Vec::new(),
                degradation_note: Some("no search results".to_string()),
            };
        }

        let (creative, consumptive, _neutral) = Self::partition(&all_results);
        let mut hypotheses = Vec::new();

        let majority_is_creative = creative.len() >= consumptive.len();
        hypotheses.push(Self::majority_hypothesis(&all_results, majority_is_creative));

        if !creative.is_empty() {
            hypotheses.push(Self::creative_hypothesis(&creative));
        }

        if let Some(trajectory) = trajectory {
            if trajectory.experiences.len() >= 3 {
                hypotheses.push(Self::personalized_hypothesis(trajectory, &all_results));
            }
        }

        hypotheses.truncate(3);
        TrajectoryEvidence { hypotheses, degradation_note: None }
    }

    fn build_queries(experience: &Experience) -> Vec<String> {
        let base = experience.description.trim();
        vec![
            format!("{base} outcomes"),
            format!("{base} what happens next"),
            format!("people who {base}"),
            format!("{base} long term effects"),
        ]
    }

    fn partition<'a>(results: &'a [SearchResult]) -> (Vec<&'a SearchResult>, Vec<&'a SearchResult>, Vec<&'a SearchResult>) {
        let mut creative = Vec::new();
        let mut consumptive = Vec::new();
        let mut neutral = Vec::new();
        for result in results {
            let tokens = tokenize(&format!("{} {}", result.title, result.snippet));
            let is_creative = CREATIVE_THEME_WORDS.iter().any(|w| tokens.contains(*w));
            let is_consumptive = CONSUMPTIVE_THEME_WORDS.iter().any(|w| tokens.contains(*w));
            match (is_creative, is_consumptive) {
                (true, false) => creative.push(result),
                (false, true) => consumptive.push(result),
                _ => neutral.push(result),
            }
        }
        (creative, consumptive, neutral)
    }

    fn confidence_for(sources: &[String]) -> f64 {
        (0.3 + 0.1 * sources.len() as f64).min(0.7)
    }

    fn majority_hypothesis(results: &[SearchResult], leans_creative: bool) -> Hypothesis {
        let sources: Vec<String> = results.iter().take(5).map(|r| r.url.clone()).collect();
        let summary = if leans_creative {
            "Most people who report a similar experience go on to create or teach something from it."
        } else {
            "Most people who report a similar experience move on to another round of the same activity."
        };
        Hypothesis {
            summary: summary.to_string(),
            probability: 0.6,
            confidence: Self::confidence_for(&sources),
            sources,
            distinguishing_factors: vec!["whether follow-up action was taken within the first week".to_string()],
            notable_exceptions: vec!["outcomes vary widely by how the activity was approached".to_string()],
            empowerment_note: "what happens next is still something you can shape".to_string(),
        }
    }

    fn creative_hypothesis(creative: &[&SearchResult]) -> Hypothesis {
        let sources: Vec<String> = creative.iter().take(5).map(|r| r.url.clone()).collect();
        Hypothesis {
            summary: "A meaningful share of people channel this kind of experience into something they build, write, or teach.".to_string(),
            probability: 0.25,
            confidence: Self::confidence_for(&sources),
            sources,
            distinguishing_factors: vec!["prior history of sharing or teaching".to_string()],
            notable_exceptions: vec!["this path usually needs a deliberate next step, not just more of the activity".to_string()],
            empowerment_note: "the creative path is available, not automatic".to_string(),
        }
    }

    fn personalized_hypothesis(trajectory: &Trajectory, results: &[SearchResult]) -> Hypothesis {
        let sources: Vec<String> = results.iter().take(3).map(|r| r.url.clone()).collect();
        let direction = trajectory.current_vector.direction;
        let summary = if direction > 0.2 {
            "Given your own history of following through on creative follow-ups, this experience is likely to lead somewhere generative for you specifically."
        } else if direction < -0.2 {
            "Given your own history, this experience is more likely to stay consumptive unless something changes."
        } else {
            "Your own history is mixed, so this experience could go either way depending on what you do next."
        };
        Hypothesis {
            summary: summary.to_string(),
            probability: 0.5,
            confidence: Self::confidence_for(&sources),
            sources,
            distinguishing_factors: vec!["your historical creation rate".to_string()],
            notable_exceptions: vec!["past pattern is not a guarantee".to_string()],
            empowerment_note: "your own track record, not a stranger's, is the best guide here".to_string(),
        }
    }
}
