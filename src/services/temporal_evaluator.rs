//! TemporalEvaluator: per-horizon scores and arc trend. Formulas
//! reproduced verbatim from spec.md §4.5.

use crate::domain::models::{ArcTrend, Experience, HorizonAssessment, TimeHorizon, Trajectory};

#[derive(Debug, Default, Clone, Copy)]
pub struct TemporalEvaluator;

impl TemporalEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// `Evaluate(experience, trajectory) -> [HorizonAssessment]` for all
    /// five fixed horizons, in order.
    pub fn evaluate(&self, experience: &Experience, trajectory: &Trajectory) -> Vec<HorizonAssessment> {
        TimeHorizon::ALL
            .iter()
            .map(|&horizon| HorizonAssessment::new(horizon, self.score_for(horizon, experience, trajectory)))
            .collect()
    }

    fn score_for(&self, horizon: TimeHorizon, experience: &Experience, trajectory: &Trajectory) -> Option<f64> {
        match horizon {
            TimeHorizon::Immediate => Some(experience.rating),
            TimeHorizon::ShortTerm => self.short_term(experience),
            TimeHorizon::MediumTerm => self.medium_term(experience),
            TimeHorizon::LongTerm => self.long_term(experience, trajectory),
            TimeHorizon::Generational => self.generational(trajectory),
        }
    }

    fn short_term(&self, experience: &Experience) -> Option<f64> {
        let within_3d: Vec<_> = experience
            .follow_ups
            .iter()
            .filter(|f| (f.timestamp - experience.created_at).num_seconds() as f64 / 86_400.0 <= 3.0)
            .collect();
        if within_3d.is_empty() {
            return None;
        }
        let n = within_3d.len() as f64;
        let created_rate = within_3d.iter().filter(|f| f.created_something).count() as f64 / n;
        let shared_rate = within_3d.iter().filter(|f| f.shared_or_taught).count() as f64 / n;
        let inspired_rate = within_3d.iter().filter(|f| f.inspired_further_action).count() as f64 / n;
        Some(0.4 * created_rate + 0.3 * shared_rate + 0.3 * inspired_rate)
    }

    fn medium_term(&self, experience: &Experience) -> Option<f64> {
        let window: Vec<_> = experience
            .follow_ups
            .iter()
            .filter(|f| {
                let age = (f.timestamp - experience.created_at).num_seconds() as f64 / 86_400.0;
                (3.0..60.0).contains(&age)
            })
            .collect();
        if window.is_empty() {
            return None;
        }
        let n = window.len() as f64;
        let created_fraction = window.iter().filter(|f| f.created_something).count() as f64 / n;

        let mid = window.len() / 2;
        let (before, after) = window.split_at(mid);
        let direction_of = |fs: &[&crate::domain::models::FollowUp]| -> f64 {
            if fs.is_empty() {
                0.0
            } else {
                fs.iter().map(|f| f.creation_signal()).sum::<f64>() / fs.len() as f64
            }
        };
        let direction_before = direction_of(before);
        let direction_after = direction_of(after);

        Some(0.6 * created_fraction + 0.4 * ((direction_after - direction_before + 1.0) / 2.0).clamp(0.0, 1.0))
    }

    fn long_term(&self, experience: &Experience, trajectory: &Trajectory) -> Option<f64> {
        let has_long_follow_up = experience.follow_ups.iter().any(|f| {
            (f.timestamp - experience.created_at).num_seconds() as f64 / 86_400.0 >= 60.0
        });
        if !has_long_follow_up && trajectory.experiences.len() < 5 {
            return None;
        }
        let compounding = trajectory.compounding_direction;
        Some(0.5 * ((compounding + 1.0) / 2.0).clamp(0.0, 1.0) + 0.5 * trajectory.creation_rate)
    }

    fn generational(&self, trajectory: &Trajectory) -> Option<f64> {
        if trajectory.experiences.len() < 20 {
            return None;
        }
        let compounding = trajectory.compounding_direction;
        Some(
            0.4 * trajectory.propagation_rate
                + 0.3 * trajectory.creation_rate
                + 0.3 * ((compounding + 1.0) / 2.0).clamp(0.0, 1.0),
        )
    }

    /// `ComputeArcTrend(assessments) -> improving | declining | stable |
    /// insufficient_data`.
    pub fn compute_arc_trend(&self, assessments: &[HorizonAssessment]) -> ArcTrend {
        let mut scored: Vec<&HorizonAssessment> = assessments.iter().filter(|a| a.score.is_some()).collect();
        if scored.len() < 2 {
            return ArcTrend::InsufficientData;
        }
        scored.sort_by_key(|a| a.horizon);
        let scores: Vec<f64> = scored.iter().map(|a| a.score.unwrap()).collect();
        let deltas: Vec<f64> = scores.windows(2).map(|w| w[1] - w[0]).collect();
        let avg = deltas.iter().sum::<f64>() / deltas.len() as f64;
        if avg.abs() <= 0.05 {
            ArcTrend::Stable
        } else if avg > 0.05 {
            ArcTrend::Improving
        } else {
            ArcTrend::Declining
        }
    }

    /// `WeightedScore(assessments) -> float | nil`, normalized over the
    /// horizons that have a score.
    pub fn weighted_score(&self, assessments: &[HorizonAssessment]) -> Option<f64> {
        let present: Vec<&HorizonAssessment> = assessments.iter().filter(|a| a.score.is_some()).collect();
        if present.is_empty() {
            return None;
        }
        let weight_sum: f64 = present.iter().map(|a| a.horizon.weight()).sum();
        if weight_sum <= 0.0 {
            return None;
        }
        let weighted: f64 = present.iter().map(|a| a.horizon.weight() * a.score.unwrap()).sum();
        Some(weighted / weight_sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_equals_rating() {
        let evaluator = TemporalEvaluator::new();
        let traj = Trajectory::new("u1");
        let exp = Experience::new("u1", "d", "c", 0.75);
        let assessments = evaluator.evaluate(&exp, &traj);
        assert_eq!(assessments[0].horizon, TimeHorizon::Immediate);
        assert_eq!(assessments[0].score, Some(0.75));
    }

    #[test]
    fn long_term_nil_without_enough_history() {
        let evaluator = TemporalEvaluator::new();
        let traj = Trajectory::new("u1");
        let exp = Experience::new("u1", "d", "c", 0.75);
        let assessments = evaluator.evaluate(&exp, &traj);
        let long = assessments.iter().find(|a| a.horizon == TimeHorizon::LongTerm).unwrap();
        assert_eq!(long.score, None);
    }

    #[test]
    fn arc_trend_needs_at_least_two_scores() {
        let evaluator = TemporalEvaluator::new();
        let assessments = vec![HorizonAssessment::new(TimeHorizon::Immediate, Some(0.5))];
        assert_eq!(evaluator.compute_arc_trend(&assessments), ArcTrend::InsufficientData);
    }

    #[test]
    fn arc_trend_declining_example() {
        let evaluator = TemporalEvaluator::new();
        let assessments = vec![
            HorizonAssessment::new(TimeHorizon::Immediate, Some(0.9)),
            HorizonAssessment::new(TimeHorizon::MediumTerm, Some(0.3)),
        ];
        assert_eq!(evaluator.compute_arc_trend(&assessments), ArcTrend::Declining);
    }
}
