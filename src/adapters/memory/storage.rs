//! `InMemoryStorage`: deep-copy-on-load/save Storage implementation.
//!
//! Grounded on spec.md §9's "storage's deep-copy-on-load/save in the
//! in-memory implementation provides the same aliasing safety the source
//! relied on" and on the teacher's `RwLock<HashMap<...>>`-guarded adapter
//! shape used for its own in-memory test doubles.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Experience, FollowUp, PendingQuestion, Trajectory};
use crate::domain::ports::{ConversationRow, Storage};

#[derive(Default)]
pub struct InMemoryStorage {
    trajectories: RwLock<HashMap<String, Trajectory>>,
    pending_questions: RwLock<HashMap<Uuid, PendingQuestion>>,
    conversation_logs: RwLock<Vec<ConversationRow>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn load_trajectory(&self, user_id: &str) -> DomainResult<Trajectory> {
        let guard = self.trajectories.read().expect("trajectories lock poisoned");
        Ok(guard.get(user_id).cloned().unwrap_or_else(|| Trajectory::new(user_id)))
    }

    async fn save_trajectory(&self, trajectory: &Trajectory) -> DomainResult<()> {
        let mut guard = self.trajectories.write().expect("trajectories lock poisoned");
        guard.insert(trajectory.user_id.clone(), trajectory.clone());
        Ok(())
    }

    async fn list_user_ids(&self) -> DomainResult<Vec<String>> {
        let guard = self.trajectories.read().expect("trajectories lock poisoned");
        Ok(guard.keys().cloned().collect())
    }

    async fn load_experience(&self, experience_id: Uuid) -> DomainResult<Option<Experience>> {
        let guard = self.trajectories.read().expect("trajectories lock poisoned");
        Ok(guard.values().find_map(|t| t.experience(experience_id).cloned()))
    }

    async fn save_experience(&self, user_id: &str, experience: &Experience) -> DomainResult<()> {
        let mut guard = self.trajectories.write().expect("trajectories lock poisoned");
        let trajectory = guard.entry(user_id.to_string()).or_insert_with(|| Trajectory::new(user_id));
        if let Some(existing) = trajectory.experience_mut(experience.id) {
            *existing = experience.clone();
        } else {
            trajectory.experiences.push(experience.clone());
        }
        Ok(())
    }

    async fn save_follow_up(&self, user_id: &str, experience_id: Uuid, follow_up: &FollowUp) -> DomainResult<()> {
        let mut guard = self.trajectories.write().expect("trajectories lock poisoned");
        if let Some(trajectory) = guard.get_mut(user_id) {
            if let Some(experience) = trajectory.experience_mut(experience_id) {
                experience.follow_ups.push(follow_up.clone());
            }
        }
        Ok(())
    }

    async fn save_pending_question(&self, question: &PendingQuestion) -> DomainResult<()> {
        let mut guard = self.pending_questions.write().expect("pending_questions lock poisoned");
        guard.insert(question.id, question.clone());
        Ok(())
    }

    async fn list_pending_questions(&self) -> DomainResult<Vec<PendingQuestion>> {
        let guard = self.pending_questions.read().expect("pending_questions lock poisoned");
        Ok(guard.values().cloned().collect())
    }

    async fn mark_question_asked(&self, question_id: Uuid) -> DomainResult<()> {
        let mut guard = self.pending_questions.write().expect("pending_questions lock poisoned");
        if let Some(question) = guard.get_mut(&question_id) {
            question.asked = true;
        }
        Ok(())
    }

    async fn log_conversation(&self, row: ConversationRow) -> DomainResult<()> {
        let mut guard = self.conversation_logs.write().expect("conversation_logs lock poisoned");
        guard.push(row);
        Ok(())
    }

    async fn get_conversation_logs(&self, user_id: &str) -> DomainResult<Vec<ConversationRow>> {
        let guard = self.conversation_logs.read().expect("conversation_logs lock poisoned");
        Ok(guard.iter().filter(|r| r.user_id == user_id).cloned().collect())
    }

    async fn health_check(&self) -> DomainResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_creates_empty_trajectory_for_new_user() {
        let storage = InMemoryStorage::new();
        let trajectory = storage.load_trajectory("new-user").await.unwrap();
        assert_eq!(trajectory.user_id, "new-user");
        assert!(trajectory.experiences.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips_and_does_not_alias() {
        let storage = InMemoryStorage::new();
        let mut trajectory = Trajectory::new("u1");
        trajectory.experiences.push(Experience::new("u1", "d", "c", 0.5));
        storage.save_trajectory(&trajectory).await.unwrap();

        trajectory.experiences.push(Experience::new("u1", "d2", "c2", 0.6));

        let loaded = storage.load_trajectory("u1").await.unwrap();
        assert_eq!(loaded.experiences.len(), 1, "mutating the caller's copy must not affect storage");
    }
}
