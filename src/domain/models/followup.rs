//! FollowUp domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a follow-up originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpSource {
    UserResponse,
    Behavioral,
    SystemObservation,
}

impl FollowUpSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserResponse => "user_response",
            Self::Behavioral => "behavioral",
            Self::SystemObservation => "system_observation",
        }
    }
}

impl std::fmt::Display for FollowUpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single piece of evidence about what happened after an experience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUp {
    pub id: Uuid,
    pub experience_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub source: FollowUpSource,
    pub text: String,
    pub created_something: bool,
    pub shared_or_taught: bool,
    pub inspired_further_action: bool,
    /// `[0, 1]`: 0 = nothing, 0.25 = started, 0.5 = draft, 0.75 = substantial,
    /// 1.0 = shipped. Free-text description of what was created, if anything.
    pub creation_magnitude: f64,
    pub creation_description: Option<String>,
}

impl FollowUp {
    pub fn new(experience_id: Uuid, source: FollowUpSource, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            experience_id,
            timestamp: Utc::now(),
            source,
            text: text.into(),
            created_something: false,
            shared_or_taught: false,
            inspired_further_action: false,
            creation_magnitude: 0.0,
            creation_description: None,
        }
    }

    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = ts;
        self
    }

    pub fn with_created(mut self, magnitude: f64) -> Self {
        self.created_something = true;
        self.creation_magnitude = magnitude;
        self
    }

    pub fn with_shared(mut self, shared: bool) -> Self {
        self.shared_or_taught = shared;
        self
    }

    pub fn with_inspired(mut self, inspired: bool) -> Self {
        self.inspired_further_action = inspired;
        self
    }

    pub fn with_creation_description(mut self, desc: impl Into<String>) -> Self {
        self.creation_description = Some(desc.into());
        self
    }

    /// Effective creation magnitude, honoring the backward-compatibility
    /// invariant: `created_something && creation_magnitude == 0` is treated
    /// as `1.0` (fully shipped) rather than zero evidence.
    pub fn effective_magnitude(&self) -> f64 {
        if self.created_something && self.creation_magnitude == 0.0 {
            1.0
        } else if self.created_something {
            self.creation_magnitude
        } else {
            0.0
        }
    }

    /// Whether this follow-up shows any active evidence (created, shared, or
    /// inspired further action).
    pub fn is_active(&self) -> bool {
        self.created_something || self.shared_or_taught || self.inspired_further_action
    }

    /// The weighted per-follow-up creation signal shared by the VectorTracker
    /// and the IntentionClassifier: `0.40*m + 0.25*shared + 0.20*inspired`.
    pub fn creation_signal(&self) -> f64 {
        0.40 * self.effective_magnitude()
            + 0.25 * f64::from(self.shared_or_taught)
            + 0.20 * f64::from(self.inspired_further_action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backward_compat_zero_magnitude_becomes_shipped() {
        let f = FollowUp::new(Uuid::new_v4(), FollowUpSource::UserResponse, "x")
            .with_created(0.0);
        assert_eq!(f.effective_magnitude(), 1.0);
    }

    #[test]
    fn non_created_magnitude_is_zero() {
        let f = FollowUp::new(Uuid::new_v4(), FollowUpSource::Behavioral, "x");
        assert_eq!(f.effective_magnitude(), 0.0);
        assert!(!f.is_active());
    }

    #[test]
    fn creation_signal_bounded() {
        let f = FollowUp::new(Uuid::new_v4(), FollowUpSource::UserResponse, "x")
            .with_created(1.0)
            .with_shared(true)
            .with_inspired(true);
        assert!((f.creation_signal() - 0.85).abs() < 1e-9);
    }
}
