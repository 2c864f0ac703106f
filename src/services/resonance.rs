//! ResonanceTracker and ResonanceValidator: raw resonance from self-report
//! calibrated by action evidence, then multi-lens validated. Formulas
//! reproduced verbatim from spec.md §4.4.

use crate::domain::models::{tokenize, Experience, HorizonAssessment, TimeHorizon, Trajectory};

#[derive(Debug, Default, Clone, Copy)]
pub struct ResonanceTracker;

impl ResonanceTracker {
    pub fn new() -> Self {
        Self
    }

    /// `MeasureResonance(experience) -> float`.
    pub fn measure_resonance(&self, experience: &Experience) -> f64 {
        if experience.follow_ups.is_empty() {
            return experience.rating.min(0.60);
        }
        let n = experience.follow_ups.len() as f64;
        let created_rate = experience.follow_ups.iter().filter(|f| f.created_something).count() as f64 / n;
        let shared_rate = experience.follow_ups.iter().filter(|f| f.shared_or_taught).count() as f64 / n;
        let inspired_rate = experience.follow_ups.iter().filter(|f| f.inspired_further_action).count() as f64 / n;
        let action_rate = 0.40 * created_rate + 0.30 * shared_rate + 0.30 * inspired_rate;
        let evidence_weight = (0.15 * n).min(0.70);
        ((1.0 - evidence_weight) * experience.rating + evidence_weight * action_rate).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ResonanceValidator;

impl ResonanceValidator {
    pub fn new() -> Self {
        Self
    }

    /// `Validate(experience, trajectory, horizonAssessments?) -> float`.
    /// Starts from `experience.resonance_score` and applies the four lenses
    /// in order: arc, propagation, dependency, predictability.
    pub fn validate(
        &self,
        experience: &Experience,
        trajectory: &Trajectory,
        horizon_assessments: Option<&[HorizonAssessment]>,
    ) -> f64 {
        let mut score = experience.resonance_score;
        score = self.apply_arc(score, horizon_assessments);
        score = self.apply_propagation(score, trajectory);
        score = self.apply_dependency(score, trajectory);
        score = self.apply_predictability(score, trajectory);
        score.clamp(0.0, 1.0)
    }

    fn apply_arc(&self, score: f64, horizon_assessments: Option<&[HorizonAssessment]>) -> f64 {
        let Some(assessments) = horizon_assessments else { return score };
        let mut scored: Vec<&HorizonAssessment> = assessments.iter().filter(|a| a.score.is_some()).collect();
        if scored.len() < 2 {
            return score;
        }
        scored.sort_by_key(|a| a.horizon);
        let earliest = scored.first().unwrap().score.unwrap();
        let latest = scored.last().unwrap().score.unwrap();
        if latest > earliest + 0.1 {
            score + 0.05
        } else if latest < earliest - 0.1 {
            score * (1.0 - 0.5 * (earliest - latest))
        } else {
            score
        }
    }

    fn apply_propagation(&self, score: f64, trajectory: &Trajectory) -> f64 {
        if trajectory.experiences.len() < 3 {
            return score;
        }
        let rate = trajectory.propagation_rate;
        if rate > 0.5 {
            score + 0.05
        } else if rate < 0.15 {
            score - 0.10
        } else {
            score
        }
    }

    fn apply_dependency(&self, score: f64, trajectory: &Trajectory) -> f64 {
        let recent: Vec<&Experience> = trajectory.experiences.iter().rev().take(8).collect();
        if recent.len() < 3 {
            return score;
        }
        // recent is newest-first; restore chronological order for the
        // gap/escalation/decline computations below.
        let recent: Vec<&Experience> = recent.into_iter().rev().collect();

        let narrowing = Self::narrowing_variety(&recent);
        let escalation = Self::escalation(&recent);
        let declining_returns = Self::declining_returns(&recent);

        let mut composite = 0.40 * narrowing + 0.30 * escalation + 0.30 * declining_returns;
        let all_elevated = narrowing > 0.6 && escalation > 0.6 && declining_returns > 0.6;
        if all_elevated {
            composite *= 1.5;
        }
        if composite > 0.7 {
            score * 0.3
        } else {
            score
        }
    }

    /// Average pairwise Jaccard similarity of tokenized, stopword-filtered
    /// descriptions: a high value means the user keeps describing the same
    /// narrow thing (variety is narrowing).
    fn narrowing_variety(recent: &[&Experience]) -> f64 {
        let token_sets: Vec<_> = recent.iter().map(|e| tokenize(&e.description)).collect();
        let mut pair_count = 0;
        let mut sum = 0.0;
        for i in 0..token_sets.len() {
            for j in (i + 1)..token_sets.len() {
                let a = &token_sets[i];
                let b = &token_sets[j];
                let union = a.union(b).count();
                if union == 0 {
                    continue;
                }
                let intersection = a.intersection(b).count();
                sum += intersection as f64 / union as f64;
                pair_count += 1;
            }
        }
        if pair_count == 0 {
            0.0
        } else {
            sum / pair_count as f64
        }
    }

    /// Ratio of the later half's average inter-event gap to the earlier
    /// half's: a ratio below 1 means events are happening closer together
    /// over time (escalation).
    fn escalation(recent: &[&Experience]) -> f64 {
        if recent.len() < 4 {
            return 0.0;
        }
        let gaps: Vec<f64> = recent
            .windows(2)
            .map(|w| (w[1].created_at - w[0].created_at).num_seconds() as f64)
            .collect();
        let mid = gaps.len() / 2;
        let (early, late) = gaps.split_at(mid);
        let avg = |s: &[f64]| -> f64 { if s.is_empty() { 0.0 } else { s.iter().sum::<f64>() / s.len() as f64 } };
        let early_avg = avg(early);
        let late_avg = avg(late);
        if early_avg <= 1e-9 {
            return 0.0;
        }
        (1.0 - late_avg / early_avg).clamp(0.0, 1.0)
    }

    /// Difference of first-half vs second-half resonance means: positive
    /// when resonance is declining as the window progresses.
    fn declining_returns(recent: &[&Experience]) -> f64 {
        let mid = recent.len() / 2;
        let (first, second) = recent.split_at(mid);
        let avg = |s: &[&Experience]| -> f64 {
            if s.is_empty() { 0.0 } else { s.iter().map(|e| e.resonance_score).sum::<f64>() / s.len() as f64 }
        };
        (avg(first) - avg(second)).clamp(0.0, 1.0)
    }

    fn apply_predictability(&self, score: f64, trajectory: &Trajectory) -> f64 {
        let recent: Vec<&Experience> = trajectory.experiences.iter().rev().take(10).collect();
        if recent.len() < 3 {
            return score;
        }
        let resonances: Vec<f64> = recent.iter().map(|e| e.resonance_score).collect();
        let ratings: Vec<f64> = recent.iter().map(|e| e.rating).collect();

        let stdev = Self::stdev(&resonances);
        let stdev_band = if stdev < 0.05 {
            0.9
        } else if stdev < 0.10 {
            0.5
        } else if stdev < 0.15 {
            0.2
        } else {
            0.0
        };

        let avg_rating = ratings.iter().sum::<f64>() / ratings.len() as f64;
        let inflation = if avg_rating > 0.9 {
            0.8
        } else if avg_rating > 0.8 {
            0.4
        } else {
            0.0
        };

        let monotonicity = {
            let deltas: Vec<f64> = resonances.windows(2).rev().map(|w| (w[1] - w[0]).abs()).collect();
            if deltas.is_empty() {
                0.0
            } else {
                deltas.iter().filter(|d| **d < 0.02).count() as f64 / deltas.len() as f64
            }
        };

        let composite = 0.50 * stdev_band + 0.25 * inflation + 0.25 * monotonicity;
        if composite > 0.8 {
            score - 0.15
        } else {
            score
        }
    }

    fn stdev(values: &[f64]) -> f64 {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_follow_ups_caps_at_rating_or_point_six() {
        let tracker = ResonanceTracker::new();
        let exp = Experience::new("u1", "d", "c", 0.9);
        assert_eq!(tracker.measure_resonance(&exp), 0.60);
    }

    #[test]
    fn validate_bounds_stay_in_range() {
        let validator = ResonanceValidator::new();
        let mut traj = Trajectory::new("u1");
        let mut exp = Experience::new("u1", "d", "c", 0.5);
        exp.resonance_score = 0.5;
        traj.experiences.push(exp.clone());
        let result = validator.validate(&exp, &traj, None);
        assert!((0.0..=1.0).contains(&result));
    }

    #[test]
    fn arc_declining_lowers_score() {
        let validator = ResonanceValidator::new();
        let traj = Trajectory::new("u1");
        let mut exp = Experience::new("u1", "d", "c", 0.5);
        exp.resonance_score = 0.5;
        let assessments = vec![
            HorizonAssessment::new(TimeHorizon::Immediate, Some(0.9)),
            HorizonAssessment::new(TimeHorizon::MediumTerm, Some(0.3)),
        ];
        let with_decline = validator.validate(&exp, &traj, Some(&assessments));
        let without = validator.validate(&exp, &traj, None);
        assert!(with_decline < without);
    }
}
