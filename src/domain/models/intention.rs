//! Intent signal classification.

use serde::{Deserialize, Serialize};

/// Discrete classification of a user's inferred intent.
///
/// Derived from a continuous `direction` in `[-1, 1]` plus a `confidence`
/// in `[0, 1]`: crossing neither threshold, or too little confidence to
/// commit, yields `Mixed`/`Pending` respectively rather than a false
/// positive in either creative or consumptive direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentionSignal {
    CreativeIntent,
    ConsumptiveIntent,
    Mixed,
    Pending,
}

impl IntentionSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreativeIntent => "creative_intent",
            Self::ConsumptiveIntent => "consumptive_intent",
            Self::Mixed => "mixed",
            Self::Pending => "pending",
        }
    }

    /// Map a continuous direction to the discrete signal using the fixed
    /// `+-0.2` thresholds shared by the VectorTracker and IntentionClassifier.
    pub fn from_direction(direction: f64) -> Self {
        if direction > 0.2 {
            Self::CreativeIntent
        } else if direction < -0.2 {
            Self::ConsumptiveIntent
        } else {
            Self::Mixed
        }
    }

    /// A representative direction for each label, used by the OuroborosAnchor
    /// drift check to compare a discrete label against continuous evidence.
    pub fn representative_direction(&self) -> f64 {
        match self {
            Self::CreativeIntent => 0.8,
            Self::ConsumptiveIntent => -0.8,
            Self::Mixed | Self::Pending => 0.0,
        }
    }
}

impl Default for IntentionSignal {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for IntentionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
