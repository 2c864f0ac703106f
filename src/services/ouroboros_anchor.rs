//! OuroborosAnchor: classification-vs-evidence drift check and
//! trajectory-level health. Formulas reproduced verbatim from spec.md §4.7.

use crate::domain::models::{DriftCheck, Experience, IntentionSignal, OuroborosHealth, Trajectory};

#[derive(Debug, Default, Clone, Copy)]
pub struct OuroborosAnchor;

impl OuroborosAnchor {
    pub fn new() -> Self {
        Self
    }

    /// `ValidateClassification(experience, trajectory) -> (valid, reason)`.
    pub fn validate_classification(
        &self,
        experience: &Experience,
        trajectory: &Trajectory,
    ) -> DriftCheck {
        if experience.intention_confidence < 0.3 {
            return DriftCheck { valid: true, reason: "confidence too provisional to check".to_string() };
        }

        if !experience.follow_ups.is_empty() {
            let n = experience.follow_ups.len() as f64;
            let avg_creation: f64 =
                experience.follow_ups.iter().map(|f| f.creation_signal()).sum::<f64>() / n;
            let evidence_direction = (2.0 * avg_creation - 0.2).clamp(-1.0, 1.0);
            let label_direction = experience.provisional_intention.representative_direction();
            if (evidence_direction - label_direction).abs() > 0.4 {
                return DriftCheck {
                    valid: false,
                    reason: format!(
                        "follow-up evidence direction {evidence_direction:.2} diverges from label direction {label_direction:.2}"
                    ),
                };
            }
        }

        let label_direction = experience.provisional_intention.representative_direction();
        if !trajectory.experiences.is_empty()
            && label_direction > 0.3
            && trajectory.current_vector.direction < -0.3
            && experience.intention_confidence > 0.5
        {
            return DriftCheck {
                valid: false,
                reason: "label leans creative while trajectory leans consumptive; possible turning point".to_string(),
            };
        }

        DriftCheck { valid: true, reason: "no drift detected".to_string() }
    }

    /// `CheckOuroborosHealth(trajectory) -> (healthy, reason)`.
    pub fn check_ouroboros_health(&self, trajectory: &Trajectory) -> OuroborosHealth {
        if trajectory.experiences.len() < 3 {
            return OuroborosHealth { healthy: true, reason: "not enough history to assess".to_string() };
        }

        if trajectory.creation_rate < 0.2 {
            let recent: Vec<&Experience> = trajectory.experiences.iter().rev().take(5).collect();
            if recent.len() == 5
                && recent.iter().all(|e| {
                    e.provisional_intention == IntentionSignal::ConsumptiveIntent && e.intention_confidence >= 0.3
                })
            {
                return OuroborosHealth {
                    healthy: false,
                    reason: "low creation rate with five straight consumptive experiences".to_string(),
                };
            }
        }

        if trajectory.compounding_direction < -0.3 {
            return OuroborosHealth { healthy: false, reason: "trajectory direction is sharply declining".to_string() };
        }

        OuroborosHealth { healthy: true, reason: "trajectory is healthy".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_confidence_always_valid() {
        let anchor = OuroborosAnchor::new();
        let traj = Trajectory::new("u1");
        let mut exp = Experience::new("u1", "d", "c", 0.5);
        exp.intention_confidence = 0.1;
        let result = anchor.validate_classification(&exp, &traj);
        assert!(result.valid);
    }

    #[test]
    fn health_ok_with_few_experiences() {
        let anchor = OuroborosAnchor::new();
        let traj = Trajectory::new("u1");
        assert!(anchor.check_ouroboros_health(&traj).healthy);
    }

    #[test]
    fn health_unhealthy_on_sharp_decline() {
        let anchor = OuroborosAnchor::new();
        let mut traj = Trajectory::new("u1");
        for _ in 0..3 {
            traj.experiences.push(Experience::new("u1", "d", "c", 0.5));
        }
        traj.compounding_direction = -0.5;
        assert!(!anchor.check_ouroboros_health(&traj).healthy);
    }
}
