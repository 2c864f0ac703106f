//! PendingQuestion domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::followup::FollowUp;
use super::horizon::TimeHorizon;

/// A future-dated follow-up prompt scheduled by the QuestionEngine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingQuestion {
    pub id: Uuid,
    pub experience_id: Uuid,
    pub user_id: String,
    pub text: String,
    pub ask_after: DateTime<Utc>,
    pub horizon: TimeHorizon,
    pub asked: bool,
    pub answered_by: Option<FollowUp>,
}

impl PendingQuestion {
    pub fn new(
        experience_id: Uuid,
        user_id: impl Into<String>,
        text: impl Into<String>,
        ask_after: DateTime<Utc>,
        horizon: TimeHorizon,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            experience_id,
            user_id: user_id.into(),
            text: text.into(),
            ask_after,
            horizon,
            asked: false,
            answered_by: None,
        }
    }

    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        !self.asked && self.ask_after <= as_of
    }
}
