//! Artifact / ArtifactVerification domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-submitted URL claimed to be downstream evidence of an experience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: Uuid,
    pub experience_id: Uuid,
    pub user_id: String,
    pub url: String,
    pub platform: Option<String>,
    pub user_claim: String,
    pub submitted_at: DateTime<Utc>,
}

impl Artifact {
    pub fn new(
        experience_id: Uuid,
        user_id: impl Into<String>,
        url: impl Into<String>,
        user_claim: impl Into<String>,
        platform: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            experience_id,
            user_id: user_id.into(),
            url: url.into(),
            platform,
            user_claim: user_claim.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// Verdict on whether an artifact is substantive, timely, and relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    Verified,
    Unverified,
    Suspicious,
    Inaccessible,
}

impl ArtifactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Unverified => "unverified",
            Self::Suspicious => "suspicious",
            Self::Inaccessible => "inaccessible",
        }
    }
}

impl std::fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of verifying a submitted artifact against its fetched page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactVerification {
    pub artifact_id: Uuid,
    pub url_accessible: bool,
    pub content_summary: String,
    pub content_substantive: bool,
    pub timestamp_plausible: bool,
    pub relevance_score: f64,
    pub verified_at: DateTime<Utc>,
    pub status: ArtifactStatus,
    pub notes: String,
}

impl ArtifactVerification {
    pub fn inaccessible(artifact_id: Uuid, notes: impl Into<String>) -> Self {
        Self {
            artifact_id,
            url_accessible: false,
            content_summary: String::new(),
            content_substantive: false,
            timestamp_plausible: false,
            relevance_score: 0.0,
            verified_at: Utc::now(),
            status: ArtifactStatus::Inaccessible,
            notes: notes.into(),
        }
    }
}
