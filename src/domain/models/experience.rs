//! Experience domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::followup::FollowUp;
use super::horizon::TimeHorizon;
use super::intention::IntentionSignal;
use super::vector::VectorSnapshot;

/// Score for one of the five named quality dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualityDimensions {
    pub signal_depth: f64,
    pub recursiveness: f64,
    pub durability: f64,
    pub growth_enabling: f64,
    pub authenticity: f64,
}

impl QualityDimensions {
    pub const WEIGHTS: QualityDimensions = QualityDimensions {
        signal_depth: 0.35,
        recursiveness: 0.20,
        durability: 0.20,
        growth_enabling: 0.15,
        authenticity: 0.10,
    };

    pub fn weighted_score(&self) -> f64 {
        let w = Self::WEIGHTS;
        self.signal_depth * w.signal_depth
            + self.recursiveness * w.recursiveness
            + self.durability * w.durability
            + self.growth_enabling * w.growth_enabling
            + self.authenticity * w.authenticity
    }
}

impl Default for QualityDimensions {
    fn default() -> Self {
        Self {
            signal_depth: 0.0,
            recursiveness: 0.0,
            durability: 0.0,
            growth_enabling: 0.0,
            authenticity: 0.0,
        }
    }
}

/// A single horizon's score for an experience, or absent when there isn't
/// enough evidence yet to speak to that horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonAssessment {
    pub horizon: TimeHorizon,
    pub score: Option<f64>,
}

impl HorizonAssessment {
    pub fn new(horizon: TimeHorizon, score: Option<f64>) -> Self {
        Self { horizon, score }
    }
}

/// A single recorded experience, owned exclusively by one user's trajectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub user_id: String,
    pub description: String,
    pub context: String,
    /// Self-reported rating in `[0, 1]` at the moment the experience was recorded.
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub follow_ups: Vec<FollowUp>,
    pub vector_snapshots: Vec<VectorSnapshot>,
    pub horizon_assessments: Vec<HorizonAssessment>,
    pub provisional_intention: IntentionSignal,
    pub intention_confidence: f64,
    pub resonance_score: f64,
    pub quality_score: f64,
    pub quality_dimensions: QualityDimensions,
    pub propagated: bool,
    pub propagation_events: Vec<String>,
    pub matrix_position: String,
}

impl Experience {
    pub fn new(user_id: impl Into<String>, description: impl Into<String>, context: impl Into<String>, rating: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            description: description.into(),
            context: context.into(),
            rating: rating.clamp(0.0, 1.0),
            created_at: Utc::now(),
            follow_ups: Vec::new(),
            vector_snapshots: Vec::new(),
            horizon_assessments: Vec::new(),
            provisional_intention: IntentionSignal::Pending,
            intention_confidence: 0.0,
            resonance_score: 0.0,
            quality_score: 0.0,
            quality_dimensions: QualityDimensions::default(),
            propagated: false,
            propagation_events: Vec::new(),
            matrix_position: String::new(),
        }
    }

    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.created_at = ts;
        self
    }

    /// Most recent per-experience vector snapshot, if any was ever recorded.
    pub fn latest_snapshot(&self) -> Option<&VectorSnapshot> {
        self.vector_snapshots.last()
    }

    /// Append-only push of a new per-experience snapshot.
    pub fn push_snapshot(&mut self, snapshot: VectorSnapshot) {
        self.vector_snapshots.push(snapshot);
    }

    pub fn tokens(&self) -> std::collections::HashSet<String> {
        tokenize(&format!("{} {}", self.description, self.context))
    }
}

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
    "can", "need", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into",
    "through", "during", "before", "after", "above", "below", "between", "under", "and", "but",
    "or", "nor", "not", "so", "yet", "both", "either", "neither", "all", "each", "every", "some",
    "any", "no", "more", "most", "other", "such", "only", "own", "same", "than", "too", "very",
    "just", "also", "now", "that", "this", "these", "those", "it", "its",
];

/// Lowercase, punctuation-stripped, stopword-filtered tokenization shared by
/// the quality/resonance/artifact scorers that do coarse lexical overlap.
pub fn tokenize(text: &str) -> std::collections::HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2 && !STOPWORDS.contains(w))
        .map(|w| w.to_string())
        .collect()
}
