//! QualityAssessor: five-dimension quality score from evidence of response
//! depth. Formulas reproduced verbatim from spec.md §4.3.

use crate::domain::models::{tokenize, Experience, FollowUp, QualityDimensions, Trajectory};

#[derive(Debug, Default, Clone, Copy)]
pub struct QualityAssessor;

impl QualityAssessor {
    pub fn new() -> Self {
        Self
    }

    pub fn assess_quality(&self, experience: &Experience, trajectory: Option<&Trajectory>) -> (f64, QualityDimensions) {
        let dims = QualityDimensions {
            signal_depth: self.signal_depth(experience),
            recursiveness: self.recursiveness(experience),
            durability: self.durability(experience),
            growth_enabling: trajectory.map_or(0.0, |t| self.growth_enabling(experience, t)),
            authenticity: self.authenticity(experience, trajectory),
        };
        (dims.weighted_score(), dims)
    }

    fn signal_depth(&self, experience: &Experience) -> f64 {
        if experience.follow_ups.is_empty() {
            return experience.rating * 0.4;
        }
        let n = experience.follow_ups.len() as f64;
        let active: Vec<&FollowUp> = experience.follow_ups.iter().filter(|f| f.is_active()).collect();
        let any_active_rate = active.len() as f64 / n;

        let has_created = experience.follow_ups.iter().any(|f| f.created_something);
        let has_shared = experience.follow_ups.iter().any(|f| f.shared_or_taught);
        let has_inspired = experience.follow_ups.iter().any(|f| f.inspired_further_action);
        let breadth = f64::from(has_created) * 0.4 + f64::from(has_shared) * 0.3 + f64::from(has_inspired) * 0.3;

        let speed = active
            .iter()
            .map(|f| {
                let age = f.timestamp - experience.created_at;
                Self::speed_step(age)
            })
            .fold(None, |acc: Option<f64>, v| match acc {
                None => Some(v),
                Some(best) if v > best => Some(v),
                Some(best) => Some(best),
            })
            .unwrap_or(0.0);

        0.55 * any_active_rate + 0.25 * breadth + 0.20 * speed
    }

    /// Step function on the age of the earliest active follow-up; since
    /// "earliest" and "fastest" coincide (smaller age = higher score), the
    /// max over active follow-ups of this step is equivalent to evaluating
    /// it at the earliest one.
    fn speed_step(age: chrono::Duration) -> f64 {
        let hours = age.num_seconds() as f64 / 3600.0;
        if hours <= 6.0 {
            1.0
        } else if hours <= 24.0 {
            0.85
        } else if hours <= 72.0 {
            0.7
        } else if hours <= 24.0 * 7.0 {
            0.55
        } else if hours <= 24.0 * 30.0 {
            0.4
        } else {
            0.2
        }
    }

    fn recursiveness(&self, experience: &Experience) -> f64 {
        let n_creations = experience.follow_ups.iter().filter(|f| f.created_something).count();
        if n_creations == 0 {
            return 0.0;
        }
        let n_created_and_shared = experience
            .follow_ups
            .iter()
            .filter(|f| f.created_something && f.shared_or_taught)
            .count();
        let n_created_and_inspired = experience
            .follow_ups
            .iter()
            .filter(|f| f.created_something && f.inspired_further_action)
            .count();
        let score = 0.3
            + (0.15 * (n_creations as f64 - 1.0)).min(0.35)
            + (0.15 * n_created_and_shared as f64).min(0.25)
            + (0.1 * n_created_and_inspired as f64).min(0.2);
        score.clamp(0.0, 1.0)
    }

    fn durability(&self, experience: &Experience) -> f64 {
        if experience.follow_ups.is_empty() {
            return experience.rating * 0.3;
        }
        let mut short = Vec::new();
        let mut medium = Vec::new();
        let mut long = Vec::new();
        for f in &experience.follow_ups {
            let age_days = (f.timestamp - experience.created_at).num_seconds() as f64 / 86_400.0;
            if age_days < 3.0 {
                short.push(f);
            } else if age_days < 60.0 {
                medium.push(f);
            } else {
                long.push(f);
            }
        }
        let active_rate = |bucket: &[&FollowUp]| -> Option<f64> {
            if bucket.is_empty() {
                None
            } else {
                Some(bucket.iter().filter(|f| f.is_active()).count() as f64 / bucket.len() as f64)
            }
        };

        let buckets = [(active_rate(&short), 0.20), (active_rate(&medium), 0.35), (active_rate(&long), 0.45)];
        let present: Vec<(f64, f64)> = buckets.into_iter().filter_map(|(rate, w)| rate.map(|r| (r, w))).collect();
        if present.is_empty() {
            return experience.rating * 0.3;
        }
        let weight_sum: f64 = present.iter().map(|(_, w)| w).sum();
        let combined: f64 = present.iter().map(|(r, w)| r * w).sum::<f64>() / weight_sum;

        let only_short = !short.is_empty() && medium.is_empty() && long.is_empty();
        if only_short {
            combined.min(0.45)
        } else {
            combined
        }
    }

    fn growth_enabling(&self, experience: &Experience, trajectory: &Trajectory) -> f64 {
        if trajectory.experiences.len() < 2 {
            return 0.0;
        }
        let Some(position) = trajectory.experience_index(experience.id) else { return 0.0 };
        let before = &trajectory.experiences[..position];
        let after = if position + 1 < trajectory.experiences.len() {
            &trajectory.experiences[position + 1..]
        } else {
            &[]
        };
        if before.is_empty() || after.is_empty() {
            return 0.0;
        }

        let propagation_rate = |slice: &[Experience]| -> f64 {
            let propagated = slice.iter().filter(|e| e.propagated).count();
            propagated as f64 / slice.len() as f64
        };
        let delta_propagation = propagation_rate(after) - propagation_rate(before);

        let direction_of = |slice: &[Experience]| -> f64 {
            slice
                .last()
                .and_then(Experience::latest_snapshot)
                .map(|s| s.direction)
                .unwrap_or(0.0)
        };
        let direction_latest = direction_of(after);
        let direction_earlier = direction_of(before);

        0.6 * (delta_propagation + 0.5).clamp(0.0, 1.0)
            + 0.4 * ((direction_latest - direction_earlier + 1.0) / 2.0).clamp(0.0, 1.0)
    }

    fn authenticity(&self, experience: &Experience, trajectory: Option<&Trajectory>) -> f64 {
        let n = experience.follow_ups.len() as f64;
        let active_rate = if n > 0.0 {
            experience.follow_ups.iter().filter(|f| f.is_active()).count() as f64 / n
        } else {
            0.0
        };

        let base = if experience.rating > 0.7 && active_rate > 0.5 {
            0.9
        } else if experience.rating > 0.7 && active_rate <= 0.5 {
            0.3
        } else if experience.rating < 0.4 && active_rate > 0.3 {
            0.8
        } else {
            0.5
        };

        let trajectory_consistency = trajectory.map_or(0.5, |t| {
            let recent: Vec<f64> = t
                .experiences
                .iter()
                .rev()
                .take(5)
                .map(|e| e.quality_score)
                .collect();
            if recent.len() < 2 {
                0.5
            } else {
                (1.0 - 2.0 * stdev(&recent)).clamp(0.0, 1.0)
            }
        });

        (0.6 * base + 0.4 * trajectory_consistency).clamp(0.0, 1.0)
    }
}

/// Tokenize helper re-exported for callers that need description overlap
/// without pulling in the full quality assessment (kept here since it was
/// originally authored alongside `signal_depth`'s breadth check).
pub fn shared_token_overlap(a: &str, b: &str) -> usize {
    tokenize(a).intersection(&tokenize(b)).count()
}

fn stdev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FollowUpSource;

    #[test]
    fn no_follow_ups_uses_rating_ceiling() {
        let assessor = QualityAssessor::new();
        let exp = Experience::new("u1", "d", "c", 0.8);
        let (score, dims) = assessor.assess_quality(&exp, None);
        assert!((dims.signal_depth - 0.32).abs() < 1e-9);
        assert!((dims.durability - 0.24).abs() < 1e-9);
        assert!(score >= 0.0 && score <= 1.0);
    }

    #[test]
    fn active_follow_ups_raise_signal_depth() {
        let assessor = QualityAssessor::new();
        let mut exp = Experience::new("u1", "d", "c", 0.8);
        let fu = FollowUp::new(exp.id, FollowUpSource::UserResponse, "x")
            .with_timestamp(exp.created_at + chrono::Duration::hours(2))
            .with_created(0.75)
            .with_shared(true)
            .with_inspired(true);
        exp.follow_ups.push(fu);
        let (_, dims) = assessor.assess_quality(&exp, None);
        assert!(dims.signal_depth > 0.5, "signal_depth={}", dims.signal_depth);
    }

    #[test]
    fn recursiveness_zero_without_creation() {
        let assessor = QualityAssessor::new();
        let mut exp = Experience::new("u1", "d", "c", 0.5);
        exp.follow_ups.push(FollowUp::new(exp.id, FollowUpSource::Behavioral, "x"));
        let (_, dims) = assessor.assess_quality(&exp, None);
        assert_eq!(dims.recursiveness, 0.0);
    }

    #[test]
    fn growth_enabling_zero_with_insufficient_trajectory() {
        let assessor = QualityAssessor::new();
        let traj = Trajectory::new("u1");
        let exp = Experience::new("u1", "d", "c", 0.5);
        assert_eq!(assessor.growth_enabling(&exp, &traj), 0.0);
    }
}
