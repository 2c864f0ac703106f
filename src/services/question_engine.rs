//! QuestionEngine: future-dated follow-up prompts. Formulas reproduced
//! verbatim from spec.md §4.10.

use chrono::{DateTime, Duration, Utc};

use crate::domain::models::{Experience, PendingQuestion, TimeHorizon, Trajectory};

#[derive(Debug, Default, Clone, Copy)]
pub struct QuestionEngine;

impl QuestionEngine {
    pub fn new() -> Self {
        Self
    }

    /// `GenerateQuestions(experience, trajectory) -> [PendingQuestion]`:
    /// three questions at +1d (short), +14d (medium), +90d (long).
    pub fn generate_questions(&self, experience: &Experience, trajectory: &Trajectory) -> Vec<PendingQuestion> {
        let base = experience.created_at;
        vec![
            PendingQuestion::new(
                experience.id,
                experience.user_id.clone(),
                self.short_term_text(experience, trajectory),
                base + Duration::days(1),
                TimeHorizon::ShortTerm,
            ),
            PendingQuestion::new(
                experience.id,
                experience.user_id.clone(),
                self.medium_term_text(experience, trajectory),
                base + Duration::days(14),
                TimeHorizon::MediumTerm,
            ),
            PendingQuestion::new(
                experience.id,
                experience.user_id.clone(),
                self.long_term_text(experience, trajectory),
                base + Duration::days(90),
                TimeHorizon::LongTerm,
            ),
        ]
    }

    fn short_term_text(&self, experience: &Experience, trajectory: &Trajectory) -> String {
        let lead_in = Self::lead_in_phrase(trajectory);
        format!(
            "A day after \"{}\" — {}did anything come of it yet, even something small?",
            experience.description, lead_in
        )
    }

    fn medium_term_text(&self, experience: &Experience, trajectory: &Trajectory) -> String {
        let lead_in = Self::lead_in_phrase(trajectory);
        format!(
            "Two weeks on from \"{}\" — {}has it led anywhere, or shown up again in what you're doing?",
            experience.description, lead_in
        )
    }

    fn long_term_text(&self, experience: &Experience, trajectory: &Trajectory) -> String {
        let lead_in = Self::lead_in_phrase(trajectory);
        format!(
            "Looking back on \"{}\" from a few months out — {}did it change anything lasting?",
            experience.description, lead_in
        )
    }

    /// Stronger lean-in phrasing when the user's historical creation rate
    /// is high; neutral phrasing otherwise (including cold start).
    fn lead_in_phrase(trajectory: &Trajectory) -> &'static str {
        if trajectory.creation_rate > 0.5 {
            "given how often this has led somewhere for you before, "
        } else {
            ""
        }
    }

    /// `GetDueQuestions(pending, asOf)`.
    pub fn get_due_questions(
        &self,
        pending: &[PendingQuestion],
        as_of: DateTime<Utc>,
    ) -> Vec<&PendingQuestion> {
        pending.iter().filter(|q| q.is_due(as_of)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_three_questions_at_expected_offsets() {
        let engine = QuestionEngine::new();
        let traj = Trajectory::new("u1");
        let exp = Experience::new("u1", "Played video games all weekend", "c", 0.8);
        let questions = engine.generate_questions(&exp, &traj);
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].horizon, TimeHorizon::ShortTerm);
        assert_eq!(questions[1].horizon, TimeHorizon::MediumTerm);
        assert_eq!(questions[2].horizon, TimeHorizon::LongTerm);
        assert!(questions[0].text.to_lowercase().contains("weekend") || questions[0].text.to_lowercase().contains("games"));
    }

    #[test]
    fn due_questions_filters_on_ask_after() {
        let engine = QuestionEngine::new();
        let traj = Trajectory::new("u1");
        let exp = Experience::new("u1", "d", "c", 0.5);
        let questions = engine.generate_questions(&exp, &traj);
        let none_due = engine.get_due_questions(&questions, exp.created_at);
        assert!(none_due.is_empty());
        let all_due = engine.get_due_questions(&questions, exp.created_at + chrono::Duration::days(100));
        assert_eq!(all_due.len(), 3);
    }
}
