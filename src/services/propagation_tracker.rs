//! PropagationTracker: creation events, propagation rate, and an
//! authenticity adjustment derived from the historical propagation rate.
//! Formulas reproduced verbatim from spec.md §4.6.
//!
//! Grounded on the teacher's pattern of a per-user map guarded inside the
//! orchestrator's critical section (spec.md §5): this tracker itself holds
//! no map, since `Trajectory.experiences[..].propagation_events` already is
//! that per-user record; `record_creation_event` just appends to it.

use crate::domain::models::{Experience, Trajectory};

#[derive(Debug, Default, Clone, Copy)]
pub struct PropagationTracker;

impl PropagationTracker {
    pub fn new() -> Self {
        Self
    }

    /// Record a creation event against an experience: marks it propagated
    /// and appends a human-readable description of what happened.
    pub fn record_creation_event(&self, experience: &mut Experience, description: impl Into<String>) {
        experience.propagated = true;
        experience.propagation_events.push(description.into());
    }

    /// `ComputePropagationRate(trajectory)` = fraction of
    /// `(resonance > 0.6 OR rating > 0.6)` experiences that are propagated.
    pub fn compute_propagation_rate(&self, trajectory: &Trajectory) -> f64 {
        let candidates: Vec<&Experience> = trajectory
            .experiences
            .iter()
            .filter(|e| e.resonance_score > 0.6 || e.rating > 0.6)
            .collect();
        if candidates.is_empty() {
            return 0.0;
        }
        let propagated = candidates.iter().filter(|e| e.propagated).count();
        propagated as f64 / candidates.len() as f64
    }

    /// `ValidateResonanceAuthenticity` adjusts a resonance score by
    /// ±0.10/0.15 based on the trajectory's historical propagation rate,
    /// only if it has at least 3 experiences.
    pub fn validate_resonance_authenticity(&self, resonance: f64, trajectory: &Trajectory) -> f64 {
        if trajectory.experiences.len() < 3 {
            return resonance;
        }
        let rate = self.compute_propagation_rate(trajectory);
        let adjusted = if rate > 0.5 {
            resonance + 0.10
        } else if rate < 0.15 {
            resonance - 0.15
        } else {
            resonance
        };
        adjusted.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn propagation_rate_zero_with_no_candidates() {
        let tracker = PropagationTracker::new();
        let traj = Trajectory::new("u1");
        assert_eq!(tracker.compute_propagation_rate(&traj), 0.0);
    }

    #[test]
    fn record_creation_event_marks_propagated() {
        let tracker = PropagationTracker::new();
        let mut exp = Experience::new("u1", "d", "c", 0.5);
        tracker.record_creation_event(&mut exp, "[Artifact verified] https://x: claim");
        assert!(exp.propagated);
        assert_eq!(exp.propagation_events.len(), 1);
    }

    #[test]
    fn authenticity_adjustment_needs_three_experiences() {
        let tracker = PropagationTracker::new();
        let traj = Trajectory::new("u1");
        assert_eq!(tracker.validate_resonance_authenticity(0.5, &traj), 0.5);
    }
}
