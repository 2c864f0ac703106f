//! Assessment: the typed record returned from every orchestrator entry point.
//!
//! Replaces the dict-bag explanation pattern described in spec.md §9 with a
//! single struct and nested per-facet structs. `Assessment::get_path` is the
//! one deliberately dynamic escape hatch, for scenario harnesses that want to
//! assert on a dotted field path without statically naming every variant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::extrapolation::TrajectoryEvidence;
use super::horizon::ArcTrend;
use super::intention::IntentionSignal;
use super::question::PendingQuestion;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorExplanation {
    pub direction: f64,
    pub magnitude: f64,
    pub confidence: f64,
    pub compounding_direction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentionExplanation {
    pub signal: IntentionSignal,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityExplanation {
    pub score: f64,
    pub signal_depth: f64,
    pub recursiveness: f64,
    pub durability: f64,
    pub growth_enabling: f64,
    pub authenticity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResonanceExplanation {
    pub raw_score: f64,
    pub validated_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalExplanation {
    pub arc_trend: ArcTrend,
    pub weighted_score: Option<f64>,
}

/// Result of `OuroborosAnchor::ValidateClassification`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftCheck {
    pub valid: bool,
    pub reason: String,
}

/// Result of `OuroborosAnchor::CheckOuroborosHealth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OuroborosHealth {
    pub healthy: bool,
    pub reason: String,
}

/// Set when a WebClient-dependent layer degraded instead of raising.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebDegradation {
    pub artifact_note: Option<String>,
    pub extrapolation_note: Option<String>,
}

impl Default for WebDegradation {
    fn default() -> Self {
        Self { artifact_note: None, extrapolation_note: None }
    }
}

/// The assessment returned from `ProcessExperience` / `ProcessFollowUp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub user_id: String,
    pub experience_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub matrix_position: String,
    /// True when `intention.confidence < 0.5`.
    pub is_provisional: bool,
    pub vector: VectorExplanation,
    pub intention: IntentionExplanation,
    pub quality: QualityExplanation,
    pub resonance: ResonanceExplanation,
    pub temporal: TemporalExplanation,
    pub drift_check: DriftCheck,
    pub ouroboros_health: OuroborosHealth,
    pub recommendations: Vec<String>,
    pub trajectory_evidence: TrajectoryEvidence,
    pub degradation: WebDegradation,
    /// Non-empty only for the `ProcessExperience` entry point.
    pub questions_generated: Vec<PendingQuestion>,
}

impl Assessment {
    /// Generic dot-path projection over the known field names, e.g.
    /// `"intention.signal"` or `"vector.direction"`. Returns `None` for
    /// unknown paths rather than panicking, since callers are test harnesses
    /// driven by external scenario YAML.
    pub fn get_path(&self, path: &str) -> Option<serde_json::Value> {
        let value = serde_json::to_value(self).ok()?;
        path.split('.').try_fold(value, |acc, segment| match acc {
            serde_json::Value::Object(mut map) => map.remove(segment),
            _ => None,
        })
    }
}
