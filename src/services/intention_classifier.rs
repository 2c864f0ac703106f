//! IntentionClassifier: maps `(experience, trajectory)` to a discrete
//! intent signal plus confidence, blending follow-up evidence with
//! trajectory history. Formulas reproduced verbatim from spec.md §4.2.
//!
//! Grounded on the teacher's stateless-scorer pattern in
//! `services/priority_service.rs`-style pure functions operating on
//! borrowed domain structs.

use crate::domain::models::{Experience, FollowUp, IntentionSignal, Trajectory};

#[derive(Debug, Default, Clone, Copy)]
pub struct IntentionClassifier;

/// `(signal, confidence)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub signal: IntentionSignal,
    pub confidence: f64,
}

impl IntentionClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, experience: &Experience, trajectory: &Trajectory) -> Classification {
        let follow_up_evidence = Self::follow_up_direction(experience);
        let has_trajectory_history = !trajectory.experiences.is_empty();

        let (direction, confidence) = match (follow_up_evidence, has_trajectory_history) {
            (Some((direction_fu, conf_fu)), true) => {
                let direction_traj = trajectory.current_vector.direction;
                let conf_traj = trajectory.current_vector.confidence;
                (0.45 * direction_traj + 0.55 * direction_fu, 0.45 * conf_traj + 0.55 * conf_fu)
            }
            (Some((direction_fu, conf_fu)), false) => (direction_fu, conf_fu),
            (None, true) => {
                let direction_traj = trajectory.current_vector.direction;
                let conf_traj = trajectory.current_vector.confidence;
                (direction_traj, (0.4 * conf_traj).min(0.3))
            }
            (None, false) => {
                return Classification { signal: IntentionSignal::Pending, confidence: 0.0 };
            }
        };

        if confidence < 0.15 {
            return Classification { signal: IntentionSignal::Pending, confidence };
        }
        Classification { signal: IntentionSignal::from_direction(direction), confidence }
    }

    /// `(direction_fu, conf_fu)` from the follow-up signal-sum formula,
    /// scaled to `[-1, 1]`; `confidence = min(0.2 + 0.2*N, 0.95)`.
    fn follow_up_direction(experience: &Experience) -> Option<(f64, f64)> {
        if experience.follow_ups.is_empty() {
            return None;
        }
        let n = experience.follow_ups.len() as f64;
        let avg_creation: f64 =
            experience.follow_ups.iter().map(FollowUp::creation_signal).sum::<f64>() / n;
        // The per-follow-up signal is already bounded in [0, 0.85]; rescale
        // around its midpoint onto [-1, 1] the same way VectorTracker does
        // for its own direction, per the multiplicative contract in
        // spec.md §9.
        let direction = (2.0 * avg_creation - 0.2).clamp(-1.0, 1.0);
        let confidence = (0.2 + 0.2 * n).min(0.95);
        Some((direction, confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FollowUpSource;

    #[test]
    fn cold_start_is_pending_zero_confidence() {
        let classifier = IntentionClassifier::new();
        let traj = Trajectory::new("u1");
        let exp = Experience::new("u1", "d", "c", 0.5);
        let result = classifier.classify(&exp, &traj);
        assert_eq!(result.signal, IntentionSignal::Pending);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn strong_creative_follow_up_yields_creative_intent() {
        let classifier = IntentionClassifier::new();
        let traj = Trajectory::new("u1");
        let mut exp = Experience::new("u1", "d", "c", 0.8);
        let fu = FollowUp::new(exp.id, FollowUpSource::UserResponse, "x")
            .with_created(1.0)
            .with_shared(true)
            .with_inspired(true);
        exp.follow_ups.push(fu);
        let result = classifier.classify(&exp, &traj);
        assert_eq!(result.signal, IntentionSignal::CreativeIntent);
        assert!(result.confidence > 0.15);
    }
}
