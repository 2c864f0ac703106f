//! Output types for the ExtrapolationModel.

use serde::{Deserialize, Serialize};

/// A single evidence-backed hypothesis about where an action typically leads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hypothesis {
    pub summary: String,
    /// `[0, 1]`.
    pub probability: f64,
    /// `min(0.3 + 0.1*|relevant sources|, 0.7)`.
    pub confidence: f64,
    pub sources: Vec<String>,
    pub distinguishing_factors: Vec<String>,
    pub notable_exceptions: Vec<String>,
    /// Always phrased as an observation, never a directive.
    pub empowerment_note: String,
}

/// The bundle of hypotheses returned by one `Hypothesise` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrajectoryEvidence {
    pub hypotheses: Vec<Hypothesis>,
    /// Populated when the web client degraded or was absent.
    pub degradation_note: Option<String>,
}
