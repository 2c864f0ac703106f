//! VectorSnapshot domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::horizon::TimeHorizon;

/// A point-in-time (direction, magnitude, confidence) triple.
///
/// Snapshots are append-only: once written into a `vector_history` or onto
/// an `Experience`, they are never mutated, only superseded by a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorSnapshot {
    pub timestamp: DateTime<Utc>,
    /// `[-1, 1]`: negative is consumptive-leaning, positive creative-leaning.
    pub direction: f64,
    /// `[0, 1]`: strength of the signal, independent of its direction.
    pub magnitude: f64,
    /// `[0, 1]`: how much evidence backs this snapshot.
    pub confidence: f64,
    pub horizon: TimeHorizon,
}

impl VectorSnapshot {
    pub fn new(direction: f64, magnitude: f64, confidence: f64, horizon: TimeHorizon) -> Self {
        Self {
            timestamp: Utc::now(),
            direction: direction.clamp(-1.0, 1.0),
            magnitude: magnitude.clamp(0.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
            horizon,
        }
    }

    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = ts;
        self
    }

    /// The near-zero placeholder snapshot used when an experience has no
    /// follow-up evidence at all and no trajectory history to seed from.
    pub fn cold_start() -> Self {
        Self::new(0.0, 0.1, 0.05, TimeHorizon::Immediate)
    }
}
