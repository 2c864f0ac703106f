//! VectorTracker: owns the per-user trajectory and computes per-experience
//! and aggregate intent vectors.
//!
//! Grounded on the teacher's `services/task_queue_service.rs` shape (a
//! service struct holding domain state, `#[instrument]`-annotated public
//! methods returning `DomainResult`) generalized from task mutation to
//! vector recomputation. All formulas below are reproduced verbatim from
//! spec.md §4.1.

use chrono::{DateTime, Utc};
use tracing::instrument;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Experience, FollowUp, IntentionSignal, TimeHorizon, Trajectory, VectorSnapshot};

/// Pure computation over trajectories and experiences. Holds no mutable
/// state of its own; the Trajectory passed in and out is the only state.
#[derive(Debug, Default, Clone, Copy)]
pub struct VectorTracker;

impl VectorTracker {
    pub fn new() -> Self {
        Self
    }

    /// Build a brand-new Experience and append it to the trajectory,
    /// writing its provisional (no-follow-up) snapshot.
    #[instrument(skip(self, trajectory), fields(user_id = %trajectory.user_id))]
    pub fn record_experience(
        &self,
        trajectory: &mut Trajectory,
        description: impl Into<String>,
        context: impl Into<String>,
        rating: f64,
        ts: Option<DateTime<Utc>>,
    ) -> DomainResult<Uuid> {
        if !(0.0..=1.0).contains(&rating) {
            return Err(DomainError::RatingOutOfRange(rating));
        }
        let mut experience = Experience::new(trajectory.user_id.clone(), description, context, rating);
        if let Some(ts) = ts {
            experience = experience.with_timestamp(ts);
        }
        let id = experience.id;
        let snapshot = self.per_experience_snapshot(&experience, trajectory);
        experience.push_snapshot(snapshot);
        trajectory.experiences.push(experience);
        let aggregate = self.compute_vector(trajectory);
        trajectory.push_aggregate(aggregate);
        Ok(id)
    }

    /// Append a follow-up to an existing experience and recompute its
    /// per-experience snapshot plus the trajectory aggregate. Returns
    /// `Ok(None)` when the experience id is unknown, matching spec.md §7's
    /// "nil/absent assessment, not an exception" requirement.
    #[instrument(skip(self, trajectory, follow_up), fields(user_id = %trajectory.user_id))]
    pub fn record_follow_up(
        &self,
        trajectory: &mut Trajectory,
        experience_id: Uuid,
        follow_up: FollowUp,
    ) -> DomainResult<Option<()>> {
        let Some(index) = trajectory.experience_index(experience_id) else {
            return Ok(None);
        };
        trajectory.experiences[index].follow_ups.push(follow_up);
        let snapshot = {
            let experience = &trajectory.experiences[index];
            self.per_experience_snapshot(experience, trajectory)
        };
        trajectory.experiences[index].push_snapshot(snapshot);
        let aggregate = self.compute_vector(trajectory);
        trajectory.push_aggregate(aggregate);
        Ok(Some(()))
    }

    /// Per-experience vector recomputation per spec.md §4.1.
    pub fn per_experience_snapshot(&self, experience: &Experience, trajectory: &Trajectory) -> VectorSnapshot {
        if experience.follow_ups.is_empty() {
            return self.cold_or_seeded_snapshot(trajectory);
        }
        let n = experience.follow_ups.len() as f64;
        let avg_creation: f64 =
            experience.follow_ups.iter().map(FollowUp::creation_signal).sum::<f64>() / n;
        let direction = (2.0 * avg_creation - 0.2 + (experience.rating - 0.5) * 0.10).clamp(-1.0, 1.0);
        let magnitude = (avg_creation + 0.2).min(1.0);
        let confidence = (0.15 + 0.15 * n).min(0.95);
        VectorSnapshot::new(direction, magnitude, confidence, TimeHorizon::Immediate)
    }

    /// No-follow-up case: near-zero snapshot, or a dampened seed from the
    /// current trajectory aggregate when history exists.
    fn cold_or_seeded_snapshot(&self, trajectory: &Trajectory) -> VectorSnapshot {
        if trajectory.experiences.is_empty() {
            return VectorSnapshot::cold_start();
        }
        let current = &trajectory.current_vector;
        VectorSnapshot::new(
            current.direction * 0.3,
            current.magnitude * 0.3,
            current.confidence.min(0.25),
            TimeHorizon::Immediate,
        )
    }

    /// Aggregate vector across all experiences of one user, per spec.md
    /// §4.1: recency-weight each experience's latest snapshot by
    /// `exp(-ln(2)*ageDays/90)`, further weight by its own confidence, then
    /// take the weighted mean.
    #[instrument(skip(self, trajectory), fields(user_id = %trajectory.user_id))]
    pub fn compute_vector(&self, trajectory: &Trajectory) -> VectorSnapshot {
        let now = Utc::now();
        let mut weighted_direction = 0.0;
        let mut weighted_magnitude = 0.0;
        let mut weighted_confidence = 0.0;
        let mut total_weight = 0.0;

        for experience in &trajectory.experiences {
            let Some(snapshot) = experience.latest_snapshot() else { continue };
            let age_days = (now - experience.created_at).num_seconds() as f64 / 86_400.0;
            let recency = (-std::f64::consts::LN_2 * age_days.max(0.0) / 90.0).exp();
            let weight = recency * snapshot.confidence;
            weighted_direction += weight * snapshot.direction;
            weighted_magnitude += weight * snapshot.magnitude;
            weighted_confidence += weight * snapshot.confidence;
            total_weight += weight;
        }

        if total_weight < 1e-9 {
            return VectorSnapshot::new(0.0, 0.0, 0.0, TimeHorizon::Immediate);
        }

        VectorSnapshot::new(
            weighted_direction / total_weight,
            weighted_magnitude / total_weight,
            weighted_confidence / total_weight,
            TimeHorizon::Immediate,
        )
    }

    /// `compounding_direction`: first finite difference of the last two
    /// aggregate directions, or 0 with fewer than two snapshots.
    pub fn compute_compounding_rate(&self, trajectory: &Trajectory) -> f64 {
        trajectory.compounding_direction
    }

    /// `direction > 0.2 -> CREATIVE_INTENT; direction < -0.2 ->
    /// CONSUMPTIVE_INTENT; else MIXED`. Callers apply the confidence<0.15
    /// `PENDING` override separately (it depends on classifier confidence,
    /// not the vector tracker's own).
    pub fn discretize(direction: f64) -> IntentionSignal {
        IntentionSignal::from_direction(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FollowUpSource;

    fn trajectory() -> Trajectory {
        Trajectory::new("u1")
    }

    #[test]
    fn cold_start_has_near_zero_snapshot() {
        let tracker = VectorTracker::new();
        let mut traj = trajectory();
        let id = tracker.record_experience(&mut traj, "desc", "ctx", 0.8, None).unwrap();
        let exp = traj.experience(id).unwrap();
        let snap = exp.latest_snapshot().unwrap();
        assert_eq!(snap.direction, 0.0);
        assert!((snap.magnitude - 0.1).abs() < 1e-9);
        assert!((snap.confidence - 0.05).abs() < 1e-9);
    }

    #[test]
    fn follow_up_with_creation_pushes_direction_positive() {
        let tracker = VectorTracker::new();
        let mut traj = trajectory();
        let id = tracker.record_experience(&mut traj, "desc", "ctx", 0.8, None).unwrap();
        let fu = FollowUp::new(id, FollowUpSource::UserResponse, "built a thing")
            .with_created(0.75)
            .with_inspired(true);
        tracker.record_follow_up(&mut traj, id, fu).unwrap();
        let exp = traj.experience(id).unwrap();
        let snap = exp.latest_snapshot().unwrap();
        assert!(snap.direction > 0.0, "direction should trend creative: {}", snap.direction);
    }

    #[test]
    fn unknown_experience_returns_none() {
        let tracker = VectorTracker::new();
        let mut traj = trajectory();
        let fu = FollowUp::new(Uuid::new_v4(), FollowUpSource::Behavioral, "x");
        let result = tracker.record_follow_up(&mut traj, Uuid::new_v4(), fu).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn aggregate_outputs_stay_in_range() {
        let tracker = VectorTracker::new();
        let mut traj = trajectory();
        for _ in 0..5 {
            tracker.record_experience(&mut traj, "desc", "ctx", 0.5, None).unwrap();
        }
        let agg = tracker.compute_vector(&traj);
        assert!((-1.0..=1.0).contains(&agg.direction));
        assert!((0.0..=1.0).contains(&agg.magnitude));
        assert!((0.0..=1.0).contains(&agg.confidence));
    }
}
