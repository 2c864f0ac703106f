//! The `Storage` port: persistence for trajectories, experiences, follow-ups,
//! and pending questions.
//!
//! Grounded on the teacher's `domain/ports/task_repository.rs`: an
//! `#[async_trait]` trait over `Send + Sync`, returning `DomainResult<T>`,
//! implemented by interchangeable adapters (there: sqlite; here: in-memory
//! and sqlite).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Experience, FollowUp, PendingQuestion, Trajectory};

/// A single logged conversation turn, for audit/debugging purposes.
/// Grounded on the teacher's conversation-log tables in the sqlite adapter.
#[derive(Debug, Clone)]
pub struct ConversationRow {
    pub id: Uuid,
    pub user_id: String,
    pub experience_id: Option<Uuid>,
    pub role: String,
    pub content: String,
    pub logged_at: DateTime<Utc>,
}

/// Persistence port for the trajectory engine's durable state.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Load a user's full trajectory, creating an empty one if absent.
    async fn load_trajectory(&self, user_id: &str) -> DomainResult<Trajectory>;

    /// Persist the full trajectory (experiences, vector history, rates).
    async fn save_trajectory(&self, trajectory: &Trajectory) -> DomainResult<()>;

    /// List every user id this storage instance has ever recorded.
    async fn list_user_ids(&self) -> DomainResult<Vec<String>>;

    /// Load a single experience by id, if present in any trajectory.
    async fn load_experience(&self, experience_id: Uuid) -> DomainResult<Option<Experience>>;

    /// Persist or update a single experience within its owning trajectory.
    async fn save_experience(&self, user_id: &str, experience: &Experience) -> DomainResult<()>;

    /// Append a follow-up to the experience it answers.
    async fn save_follow_up(
        &self,
        user_id: &str,
        experience_id: Uuid,
        follow_up: &FollowUp,
    ) -> DomainResult<()>;

    /// Persist a newly scheduled question.
    async fn save_pending_question(&self, question: &PendingQuestion) -> DomainResult<()>;

    /// All pending questions across all users, due or not.
    async fn list_pending_questions(&self) -> DomainResult<Vec<PendingQuestion>>;

    /// Mark a pending question as asked (and optionally answered).
    async fn mark_question_asked(&self, question_id: Uuid) -> DomainResult<()>;

    /// Append a conversation log row. Optional: adapters may no-op this.
    async fn log_conversation(&self, _row: ConversationRow) -> DomainResult<()> {
        Ok(())
    }

    /// Retrieve logged conversation rows for a user, most recent last.
    async fn get_conversation_logs(&self, _user_id: &str) -> DomainResult<Vec<ConversationRow>> {
        Ok(Vec::new())
    }

    /// Cheap liveness probe used by the CLI's `health` path.
    async fn health_check(&self) -> DomainResult<()>;
}
