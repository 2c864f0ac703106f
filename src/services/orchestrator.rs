//! Orchestrator: the three public entry points, sequencing every scorer.
//! Step lists reproduced verbatim from spec.md §4.11.
//!
//! Grounded on the teacher's `SwarmOrchestrator`-style service-of-services
//! (holds `Arc<dyn Storage>` plus every collaborator, exposes a handful of
//! `#[instrument(skip(...), err)]` entry points) and on spec.md §5's
//! per-user-mutex concurrency model, generalized here from the teacher's
//! per-resource locking to a sharded map of per-user `tokio::sync::Mutex`es.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Artifact, ArtifactVerification, Assessment, DriftCheck, FollowUp, IntentionExplanation, IntentionSignal,
    OuroborosHealth, QualityExplanation, ResonanceExplanation, TemporalExplanation, VectorExplanation,
    WebDegradation,
};
use crate::domain::ports::{Storage, WebClient};
use crate::services::artifact_verifier::ArtifactVerifier;
use crate::services::extrapolation_model::ExtrapolationModel;
use crate::services::intention_classifier::IntentionClassifier;
use crate::services::ouroboros_anchor::OuroborosAnchor;
use crate::services::propagation_tracker::PropagationTracker;
use crate::services::quality_assessor::QualityAssessor;
use crate::services::question_engine::QuestionEngine;
use crate::services::resonance::{ResonanceTracker, ResonanceValidator};
use crate::services::temporal_evaluator::TemporalEvaluator;
use crate::services::vector_tracker::VectorTracker;

/// Sequences every scorer behind the three public entry points, holding a
/// per-user lock across each load-mutate-persist cycle per spec.md §5.
pub struct Orchestrator {
    storage: Arc<dyn Storage>,
    web_client: Option<Arc<dyn WebClient>>,
    user_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,

    vector_tracker: VectorTracker,
    intention_classifier: IntentionClassifier,
    quality_assessor: QualityAssessor,
    resonance_tracker: ResonanceTracker,
    resonance_validator: ResonanceValidator,
    temporal_evaluator: TemporalEvaluator,
    propagation_tracker: PropagationTracker,
    ouroboros_anchor: OuroborosAnchor,
    question_engine: QuestionEngine,
}

impl Orchestrator {
    pub fn new(storage: Arc<dyn Storage>, web_client: Option<Arc<dyn WebClient>>) -> Self {
        Self {
            storage,
            web_client,
            user_locks: Mutex::new(HashMap::new()),
            vector_tracker: VectorTracker::new(),
            intention_classifier: IntentionClassifier::new(),
            quality_assessor: QualityAssessor::new(),
            resonance_tracker: ResonanceTracker::new(),
            resonance_validator: ResonanceValidator::new(),
            temporal_evaluator: TemporalEvaluator::new(),
            propagation_tracker: PropagationTracker::new(),
            ouroboros_anchor: OuroborosAnchor::new(),
            question_engine: QuestionEngine::new(),
        }
    }

    async fn lock_for(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks.entry(user_id.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// `ProcessExperience(userId, description, rating, context) -> Assessment`.
    #[instrument(skip(self, description, context), fields(user_id = %user_id), err)]
    pub async fn process_experience(
        &self,
        user_id: &str,
        description: &str,
        rating: f64,
        context: &str,
    ) -> DomainResult<Assessment> {
        if user_id.trim().is_empty() {
            return Err(DomainError::EmptyUserId);
        }
        if !(0.0..=1.0).contains(&rating) {
            return Err(DomainError::RatingOutOfRange(rating));
        }

        let lock = self.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let mut trajectory = self.storage.load_trajectory(user_id).await?;

        let experience_id = self
            .vector_tracker
            .record_experience(&mut trajectory, description, context, rating, None)?;

        let result: DomainResult<Assessment> = (|| {
            let index = trajectory
                .experience_index(experience_id)
                .ok_or(DomainError::ExperienceNotFound(experience_id))?;

            let (quality_score, quality_dims) = {
                let experience = &trajectory.experiences[index];
                self.quality_assessor.assess_quality(experience, Some(&trajectory))
            };
            trajectory.experiences[index].quality_score = quality_score;
            trajectory.experiences[index].quality_dimensions = quality_dims;

            let raw_resonance = self.resonance_tracker.measure_resonance(&trajectory.experiences[index]);
            trajectory.experiences[index].resonance_score = raw_resonance;

            let classification = self.intention_classifier.classify(&trajectory.experiences[index], &trajectory);
            trajectory.experiences[index].provisional_intention = classification.signal;
            trajectory.experiences[index].intention_confidence = classification.confidence;

            let horizon_assessments = self
                .temporal_evaluator
                .evaluate(&trajectory.experiences[index], &trajectory);
            trajectory.experiences[index].horizon_assessments = horizon_assessments.clone();
            let arc_trend = self.temporal_evaluator.compute_arc_trend(&horizon_assessments);
            let weighted_temporal = self.temporal_evaluator.weighted_score(&horizon_assessments);

            let validated_resonance = self.resonance_validator.validate(
                &trajectory.experiences[index],
                &trajectory,
                Some(&horizon_assessments),
            );
            trajectory.experiences[index].resonance_score = validated_resonance;

            let matrix_position = matrix_position_for(quality_score, classification.signal);
            trajectory.experiences[index].matrix_position = matrix_position.clone();

            let drift_check = self
                .ouroboros_anchor
                .validate_classification(&trajectory.experiences[index], &trajectory);
            let ouroboros_health = self.ouroboros_anchor.check_ouroboros_health(&trajectory);

            let questions = self
                .question_engine
                .generate_questions(&trajectory.experiences[index], &trajectory);

            let recommendations = build_recommendations(&matrix_position, &drift_check, &ouroboros_health);

            Ok(Assessment {
                user_id: user_id.to_string(),
                experience_id,
                generated_at: Utc::now(),
                matrix_position,
                is_provisional: classification.confidence < 0.5,
                vector: VectorExplanation {
                    direction: trajectory.current_vector.direction,
                    magnitude: trajectory.current_vector.magnitude,
                    confidence: trajectory.current_vector.confidence,
                    compounding_direction: trajectory.compounding_direction,
                },
                intention: IntentionExplanation { signal: classification.signal, confidence: classification.confidence },
                quality: QualityExplanation {
                    score: quality_score,
                    signal_depth: trajectory.experiences[index].quality_dimensions.signal_depth,
                    recursiveness: trajectory.experiences[index].quality_dimensions.recursiveness,
                    durability: trajectory.experiences[index].quality_dimensions.durability,
                    growth_enabling: trajectory.experiences[index].quality_dimensions.growth_enabling,
                    authenticity: trajectory.experiences[index].quality_dimensions.authenticity,
                },
                resonance: ResonanceExplanation { raw_score: raw_resonance, validated_score: validated_resonance },
                temporal: TemporalExplanation { arc_trend, weighted_score: weighted_temporal },
                drift_check,
                ouroboros_health,
                recommendations,
                trajectory_evidence: Default::default(),
                degradation: WebDegradation::default(),
                questions_generated: questions,
            })
        })();

        let mut assessment = match result {
            Ok(a) => a,
            Err(err) => {
                warn!(error = %err, "process_experience failed after mutation, rolling back");
                return Err(err);
            }
        };

        let hypotheses = self
            .extrapolation_model()
            .hypothesise(&trajectory.experiences[trajectory.experience_index(experience_id).unwrap()], Some(&trajectory))
            .await;
        if let Some(note) = &hypotheses.degradation_note {
            debug!(note = %note, "extrapolation degraded");
            assessment.degradation.extrapolation_note = Some(note.clone());
        }
        assessment.trajectory_evidence = hypotheses;

        for question in &assessment.questions_generated {
            self.storage.save_pending_question(question).await?;
        }

        trajectory.recompute_creation_rate();
        // Storage adapters load by deep copy (spec.md §9), so a failed save
        // here never corrupts the persisted trajectory; only this in-memory
        // copy, which we simply drop, is affected.
        self.storage.save_trajectory(&trajectory).await?;

        Ok(assessment)
    }

    /// `ProcessFollowUp(userId, expId, followUp) -> Assessment | nil`.
    #[instrument(skip(self, follow_up), fields(user_id = %user_id, experience_id = %experience_id), err)]
    pub async fn process_follow_up(
        &self,
        user_id: &str,
        experience_id: Uuid,
        follow_up: FollowUp,
    ) -> DomainResult<Option<Assessment>> {
        if user_id.trim().is_empty() {
            return Err(DomainError::EmptyUserId);
        }

        let lock = self.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let mut trajectory = self.storage.load_trajectory(user_id).await?;

        let created_something = follow_up.created_something;
        let creation_description = follow_up.creation_description.clone();

        let Some(()) = self.vector_tracker.record_follow_up(&mut trajectory, experience_id, follow_up)? else {
            return Ok(None);
        };

        let index = trajectory
            .experience_index(experience_id)
            .ok_or(DomainError::ExperienceNotFound(experience_id))?;

        if created_something {
            let description = creation_description.unwrap_or_else(|| "created something".to_string());
            self.propagation_tracker.record_creation_event(&mut trajectory.experiences[index], description);
            trajectory.propagation_rate = self.propagation_tracker.compute_propagation_rate(&trajectory);
        }

        let (quality_score, quality_dims) = {
            let experience = &trajectory.experiences[index];
            self.quality_assessor.assess_quality(experience, Some(&trajectory))
        };
        trajectory.experiences[index].quality_score = quality_score;
        trajectory.experiences[index].quality_dimensions = quality_dims;

        let raw_resonance = self.resonance_tracker.measure_resonance(&trajectory.experiences[index]);
        trajectory.experiences[index].resonance_score = raw_resonance;

        let classification = self.intention_classifier.classify(&trajectory.experiences[index], &trajectory);
        trajectory.experiences[index].provisional_intention = classification.signal;
        trajectory.experiences[index].intention_confidence = classification.confidence;

        let horizon_assessments = self.temporal_evaluator.evaluate(&trajectory.experiences[index], &trajectory);
        trajectory.experiences[index].horizon_assessments = horizon_assessments.clone();
        let arc_trend = self.temporal_evaluator.compute_arc_trend(&horizon_assessments);
        let weighted_temporal = self.temporal_evaluator.weighted_score(&horizon_assessments);

        let validated_resonance =
            self.resonance_validator.validate(&trajectory.experiences[index], &trajectory, Some(&horizon_assessments));
        trajectory.experiences[index].resonance_score = validated_resonance;

        let matrix_position = matrix_position_for(quality_score, classification.signal);
        trajectory.experiences[index].matrix_position = matrix_position.clone();

        let drift_check = self.ouroboros_anchor.validate_classification(&trajectory.experiences[index], &trajectory);
        let ouroboros_health = self.ouroboros_anchor.check_ouroboros_health(&trajectory);
        let recommendations = build_recommendations(&matrix_position, &drift_check, &ouroboros_health);

        trajectory.recompute_creation_rate();
        self.storage.save_trajectory(&trajectory).await?;

        Ok(Some(Assessment {
            user_id: user_id.to_string(),
            experience_id,
            generated_at: Utc::now(),
            matrix_position,
            is_provisional: classification.confidence < 0.5,
            vector: VectorExplanation {
                direction: trajectory.current_vector.direction,
                magnitude: trajectory.current_vector.magnitude,
                confidence: trajectory.current_vector.confidence,
                compounding_direction: trajectory.compounding_direction,
            },
            intention: IntentionExplanation { signal: classification.signal, confidence: classification.confidence },
            quality: QualityExplanation {
                score: quality_score,
                signal_depth: trajectory.experiences[index].quality_dimensions.signal_depth,
                recursiveness: trajectory.experiences[index].quality_dimensions.recursiveness,
                durability: trajectory.experiences[index].quality_dimensions.durability,
                growth_enabling: trajectory.experiences[index].quality_dimensions.growth_enabling,
                authenticity: trajectory.experiences[index].quality_dimensions.authenticity,
            },
            resonance: ResonanceExplanation { raw_score: raw_resonance, validated_score: validated_resonance },
            temporal: TemporalExplanation { arc_trend, weighted_score: weighted_temporal },
            drift_check,
            ouroboros_health,
            recommendations,
            trajectory_evidence: Default::default(),
            degradation: WebDegradation::default(),
            questions_generated: Vec::new(),
        }))
    }

    /// `SubmitArtifact(userId, expId, url, claim, platform?) -> ArtifactVerification`.
    #[instrument(skip(self, url, claim), fields(user_id = %user_id, experience_id = %experience_id), err)]
    pub async fn submit_artifact(
        &self,
        user_id: &str,
        experience_id: Uuid,
        url: &str,
        claim: &str,
        platform: Option<String>,
    ) -> DomainResult<ArtifactVerification> {
        let lock = self.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let mut trajectory = self.storage.load_trajectory(user_id).await?;
        let Some(index) = trajectory.experience_index(experience_id) else {
            let artifact_id = Uuid::new_v4();
            return Ok(ArtifactVerification::inaccessible(artifact_id, "unknown experience"));
        };

        let artifact = Artifact::new(experience_id, user_id, url, claim, platform);

        let Some(web_client) = self.web_client.clone() else {
            return Ok(ArtifactVerification::inaccessible(artifact.id, "no web client configured"));
        };
        let verifier = ArtifactVerifier::new(web_client);
        let verification = verifier.verify(&artifact, &trajectory.experiences[index]).await;

        if verification.status == crate::domain::models::ArtifactStatus::Verified {
            let description = format!("[Artifact verified] {url}: {claim}");
            self.propagation_tracker.record_creation_event(&mut trajectory.experiences[index], description);
            trajectory.propagation_rate = self.propagation_tracker.compute_propagation_rate(&trajectory);
            trajectory.recompute_creation_rate();
            self.storage.save_trajectory(&trajectory).await?;
        }

        Ok(verification)
    }

    fn extrapolation_model(&self) -> ExtrapolationModel {
        ExtrapolationModel::new(self.web_client.clone())
    }
}

/// `matrix_position` is a pure function of `(qualityBucket, signal)` via
/// the fixed 2x4 table in spec.md §4.11.
fn matrix_position_for(quality_score: f64, signal: IntentionSignal) -> String {
    let high = quality_score > 0.5;
    match (high, signal) {
        (true, IntentionSignal::CreativeIntent) => "Optimal",
        (true, IntentionSignal::ConsumptiveIntent) => "Hedonism",
        (true, IntentionSignal::Mixed) => "Transitional-High",
        (true, IntentionSignal::Pending) => "Pending-High",
        (false, IntentionSignal::CreativeIntent) => "Slop",
        (false, IntentionSignal::ConsumptiveIntent) => "Junk Food",
        (false, IntentionSignal::Mixed) => "Transitional-Low",
        (false, IntentionSignal::Pending) => "Pending-Low",
    }
    .to_string()
}

fn build_recommendations(matrix_position: &str, drift_check: &DriftCheck, ouroboros_health: &OuroborosHealth) -> Vec<String> {
    let mut recommendations = Vec::new();
    recommendations.push(match matrix_position {
        "Optimal" => "This looks generative — what would make the next one even more so?".to_string(),
        "Hedonism" => "High quality, consumptive lean — is there a version of this you'd want to make rather than take in?".to_string(),
        "Slop" => "Creative-leaning but thin so far — what's one concrete thing you could finish from this?".to_string(),
        "Junk Food" => "Low depth, consumptive — what would make this feel worth returning to?".to_string(),
        _ => "Still forming a picture here — what happened next?".to_string(),
    });
    if !drift_check.valid {
        recommendations.push(format!("Noticed some drift: {}", drift_check.reason));
    }
    if !ouroboros_health.healthy {
        recommendations.push(format!("Pattern check: {}", ouroboros_health.reason));
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStorage;

    #[tokio::test]
    async fn process_experience_is_provisional_at_t0() {
        let orchestrator = Orchestrator::new(Arc::new(InMemoryStorage::new()), None);
        let assessment = orchestrator
            .process_experience("u1", "Played video games all weekend", 0.8, "First time trying this game")
            .await
            .unwrap();
        assert!(assessment.is_provisional);
        assert!(assessment.intention.confidence < 0.20);
        assert!(assessment.questions_generated.len() >= 2);
    }

    #[tokio::test]
    async fn empty_user_id_rejected() {
        let orchestrator = Orchestrator::new(Arc::new(InMemoryStorage::new()), None);
        let result = orchestrator.process_experience("", "d", 0.5, "c").await;
        assert!(matches!(result, Err(DomainError::EmptyUserId)));
    }

    #[tokio::test]
    async fn follow_up_for_unknown_experience_returns_none() {
        let orchestrator = Orchestrator::new(Arc::new(InMemoryStorage::new()), None);
        orchestrator.process_experience("u1", "d", 0.5, "c").await.unwrap();
        let fu = FollowUp::new(Uuid::new_v4(), crate::domain::models::FollowUpSource::Behavioral, "x");
        let result = orchestrator.process_follow_up("u1", Uuid::new_v4(), fu).await.unwrap();
        assert!(result.is_none());
    }
}
