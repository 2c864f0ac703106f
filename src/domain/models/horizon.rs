//! Time horizons for temporal evaluation and question scheduling.

use serde::{Deserialize, Serialize};

/// A fixed point on the evidence timeline a score or question is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeHorizon {
    Immediate,
    ShortTerm,
    MediumTerm,
    LongTerm,
    Generational,
}

impl TimeHorizon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::ShortTerm => "short_term",
            Self::MediumTerm => "medium_term",
            Self::LongTerm => "long_term",
            Self::Generational => "generational",
        }
    }

    /// All horizons in evaluation order, narrowest to widest.
    pub const ALL: [TimeHorizon; 5] = [
        Self::Immediate,
        Self::ShortTerm,
        Self::MediumTerm,
        Self::LongTerm,
        Self::Generational,
    ];

    /// Weight used by `TemporalEvaluator::weighted_score`.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Immediate => 0.05,
            Self::ShortTerm => 0.10,
            Self::MediumTerm => 0.20,
            Self::LongTerm => 0.30,
            Self::Generational => 0.35,
        }
    }
}

impl std::fmt::Display for TimeHorizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trend of horizon scores as the horizon widens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcTrend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

impl ArcTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stable => "stable",
            Self::InsufficientData => "insufficient_data",
        }
    }
}

impl std::fmt::Display for ArcTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
