//! End-to-end scenarios run against the full orchestrator, one per
//! documented trajectory shape plus the concrete-form invariants that are
//! easiest to pin down with literal inputs rather than generated ones.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use ouroboros_engine::adapters::memory::InMemoryStorage;
use ouroboros_engine::domain::models::{ArcTrend, ArtifactStatus, FollowUp, FollowUpSource, HorizonAssessment, TimeHorizon};
use ouroboros_engine::services::{Orchestrator, ResonanceValidator, TemporalEvaluator};

use common::{woodworking_post, ScriptedWebClient};

fn orchestrator() -> Orchestrator {
    Orchestrator::new(Arc::new(InMemoryStorage::new()), None)
}

fn orchestrator_with_web(client: ScriptedWebClient) -> Orchestrator {
    Orchestrator::new(Arc::new(InMemoryStorage::new()), Some(Arc::new(client)))
}

/// S1 — a brand-new experience with no follow-ups is provisional, has
/// near-zero confidence, and schedules at least two follow-up questions
/// that each echo a token from the description.
#[tokio::test]
async fn s1_provisional_at_t0() {
    let orchestrator = orchestrator();
    let assessment = orchestrator
        .process_experience("u1", "Played video games all weekend", 0.8, "First time trying this game")
        .await
        .unwrap();

    assert!(assessment.is_provisional);
    assert!(assessment.intention.confidence < 0.20);
    assert!(assessment.questions_generated.len() >= 2);
    for question in &assessment.questions_generated {
        let lower = question.text.to_lowercase();
        assert!(
            lower.contains("game") || lower.contains("weekend"),
            "question text `{}` didn't echo the description",
            question.text
        );
    }
}

/// S2 — a strongly creative follow-up a week later pulls the experience
/// toward creative/mixed intent, marks it propagated, and raises the
/// trajectory's creation rate above zero.
#[tokio::test]
async fn s2_creative_follow_up_shifts_vector() {
    let storage = Arc::new(InMemoryStorage::new());
    let orchestrator = Orchestrator::new(storage.clone(), None);

    let seed = orchestrator
        .process_experience("u1", "Played video games all weekend", 0.8, "First time trying this game")
        .await
        .unwrap();

    let follow_up = FollowUp::new(seed.experience_id, FollowUpSource::UserResponse, "built a calculator")
        .with_timestamp(Utc::now() + Duration::days(7))
        .with_created(0.75)
        .with_creation_description("Started learning redstone circuits and built a calculator")
        .with_inspired(true);

    let assessment = orchestrator
        .process_follow_up("u1", seed.experience_id, follow_up)
        .await
        .unwrap()
        .expect("known experience should yield an assessment");

    assert!(matches!(
        assessment.intention.signal,
        ouroboros_engine::domain::models::IntentionSignal::CreativeIntent
            | ouroboros_engine::domain::models::IntentionSignal::Mixed
    ));

    let trajectory = storage.load_trajectory("u1").await.unwrap();
    let experience = trajectory.experience(seed.experience_id).unwrap();
    assert!(experience.propagated);
    assert!(trajectory.creation_rate > 0.0);
}

/// S3 — two users who log the same activity at t=0 start with identical
/// confidence, but diverge once one of them reports creating something
/// from it and the other reports nothing.
#[tokio::test]
async fn s3_same_activity_divergence() {
    let storage_a = Arc::new(InMemoryStorage::new());
    let storage_b = Arc::new(InMemoryStorage::new());
    let orchestrator_a = Orchestrator::new(storage_a.clone(), None);
    let orchestrator_b = Orchestrator::new(storage_b.clone(), None);

    let seed_a = orchestrator_a
        .process_experience("kid_a", "Played Minecraft all weekend", 0.9, "weekend play")
        .await
        .unwrap();
    let seed_b = orchestrator_b
        .process_experience("kid_b", "Played Minecraft all weekend", 0.9, "weekend play")
        .await
        .unwrap();

    assert!((seed_a.intention.confidence - seed_b.intention.confidence).abs() < 1e-6);

    let quiet_follow_up = FollowUp::new(seed_a.experience_id, FollowUpSource::Behavioral, "nothing more happened");
    orchestrator_a.process_follow_up("kid_a", seed_a.experience_id, quiet_follow_up).await.unwrap();

    let creative_follow_up = FollowUp::new(seed_b.experience_id, FollowUpSource::UserResponse, "built a redstone computer")
        .with_created(1.0)
        .with_inspired(true);
    orchestrator_b.process_follow_up("kid_b", seed_b.experience_id, creative_follow_up).await.unwrap();

    let trajectory_a = storage_a.load_trajectory("kid_a").await.unwrap();
    let trajectory_b = storage_b.load_trajectory("kid_b").await.unwrap();
    assert!(
        trajectory_a.current_vector.direction < trajectory_b.current_vector.direction,
        "kid_a direction {} should trail kid_b direction {}",
        trajectory_a.current_vector.direction,
        trajectory_b.current_vector.direction
    );
}

/// S4 — a plausible, on-topic, substantive artifact is verified, and the
/// underlying experience is marked propagated with a matching event note.
#[tokio::test]
async fn s4_artifact_is_verified_and_propagates() {
    let published = chrono::DateTime::parse_from_rfc3339("2025-06-15T00:00:00Z").unwrap().with_timezone(&Utc);
    let web_client = ScriptedWebClient::new().with_page("https://medium.com/u/post", woodworking_post(published));
    let storage = Arc::new(InMemoryStorage::new());
    let orchestrator = Orchestrator::new(storage.clone(), Some(Arc::new(web_client)));

    let experience_ts = chrono::DateTime::parse_from_rfc3339("2025-06-01T00:00:00Z").unwrap().with_timezone(&Utc);
    let seed = orchestrator
        .process_experience(
            "u1",
            "Built a woodworking project inspired by the workshop",
            0.8,
            "weekend project",
        )
        .await
        .unwrap();
    // process_experience always stamps `created_at` with `Utc::now()`; pin
    // it to the scenario's literal date by going straight to storage.
    let mut trajectory = storage.load_trajectory("u1").await.unwrap();
    let index = trajectory.experience_index(seed.experience_id).unwrap();
    trajectory.experiences[index].created_at = experience_ts;
    storage.save_trajectory(&trajectory).await.unwrap();

    let verification = orchestrator
        .submit_artifact(
            "u1",
            seed.experience_id,
            "https://medium.com/u/post",
            "I wrote up the bookshelf build",
            None,
        )
        .await
        .unwrap();

    assert_eq!(verification.status, ArtifactStatus::Verified);

    let trajectory = storage.load_trajectory("u1").await.unwrap();
    let experience = trajectory.experience(seed.experience_id).unwrap();
    assert!(experience.propagated);
    assert!(experience
        .propagation_events
        .iter()
        .any(|event| event.starts_with("[Artifact verified] https://medium.com/u/post:")));
}

/// S5 — sugar-hit detection, assembled directly rather than through the
/// orchestrator so the quality-history and dependency-lens inputs that
/// drive the detector are pinned to known values instead of left to
/// emerge from several rounds of blended scoring.
///
/// Five high-rating experiences with no follow-through: quality-history
/// variance is high enough to keep the authenticity dimension's
/// trajectory-consistency term low, a narrowing/escalating/declining
/// follow-up pattern trips the resonance validator's dependency lens, and
/// a trajectory with a low creation rate and five straight low-confidence
/// consumptive experiences reads as unhealthy.
#[test]
fn s5_sugar_hit_detection() {
    use ouroboros_engine::domain::models::{Experience, IntentionSignal, Trajectory};
    use ouroboros_engine::services::{OuroborosAnchor, QualityAssessor};

    let assessor = QualityAssessor::new();
    let mut trajectory = Trajectory::new("u1");
    // Distinct, non-converging quality-score history: this is what the
    // authenticity dimension's "1 - 2*stdev(last 5)" term reads from.
    let prior_scores = [0.1, 0.9, 0.05, 0.9];
    for (i, score) in prior_scores.iter().enumerate() {
        let mut experience = Experience::new("u1", format!("Binged episode {i}"), "just watching", 0.9);
        let follow_up = FollowUp::new(experience.id, FollowUpSource::Behavioral, "watched more");
        experience.follow_ups.push(follow_up);
        experience.quality_score = *score;
        trajectory.experiences.push(experience);
    }
    let mut current = Experience::new("u1", "Binged episode 4", "just watching", 0.9);
    let follow_up = FollowUp::new(current.id, FollowUpSource::Behavioral, "watched more");
    current.follow_ups.push(follow_up);
    trajectory.experiences.push(current.clone());

    let (_, dims) = assessor.assess_quality(&current, Some(&trajectory));
    assert!(dims.authenticity < 0.45, "authenticity={}", dims.authenticity);

    // Same shape, this time for the resonance validator's dependency lens:
    // identical descriptions (zero variety), shrinking gaps between events
    // (escalation), and declining resonance (diminishing returns).
    let mut dependency_trajectory = Trajectory::new("u1");
    dependency_trajectory.propagation_rate = 0.3;
    let start = Utc::now();
    let offsets_hours = [0.0, 10.0, 15.0, 17.0];
    let resonances = [0.8, 0.8, 0.1, 0.1];
    for (offset, resonance) in offsets_hours.iter().zip(resonances.iter()) {
        let mut experience = Experience::new("u1", "watched another episode", "binge", 0.9);
        experience.created_at = start + Duration::minutes((offset * 60.0) as i64);
        experience.resonance_score = *resonance;
        dependency_trajectory.experiences.push(experience);
    }
    let last = dependency_trajectory.experiences.last().unwrap().clone();
    let validator = ResonanceValidator::new();
    let validated = validator.validate(&last, &dependency_trajectory, None);
    assert!(validated < last.resonance_score, "validated {validated} should drop below raw {}", last.resonance_score);

    // And a trajectory-health check: low creation rate plus five straight
    // low-confidence-but-qualifying consumptive experiences reads as
    // unhealthy.
    let mut health_trajectory = Trajectory::new("u1");
    health_trajectory.creation_rate = 0.1;
    for i in 0..5 {
        let mut experience = Experience::new("u1", format!("episode {i}"), "binge", 0.9);
        experience.provisional_intention = IntentionSignal::ConsumptiveIntent;
        experience.intention_confidence = 0.3;
        health_trajectory.experiences.push(experience);
    }
    let health = OuroborosAnchor::new().check_ouroboros_health(&health_trajectory);
    assert!(!health.healthy, "expected unhealthy, got: {}", health.reason);
}

/// S6 — a manually assembled horizon-assessment pair (immediate high,
/// medium-term low) computes as declining, and pushes validated resonance
/// strictly below what it would be without that evidence.
#[test]
fn s6_declining_arc_lowers_resonance() {
    let evaluator = TemporalEvaluator::new();
    let assessments = vec![
        HorizonAssessment::new(TimeHorizon::Immediate, Some(0.9)),
        HorizonAssessment::new(TimeHorizon::MediumTerm, Some(0.3)),
    ];
    assert_eq!(evaluator.compute_arc_trend(&assessments), ArcTrend::Declining);

    let validator = ResonanceValidator::new();
    let trajectory = ouroboros_engine::domain::models::Trajectory::new("u1");
    let mut experience = ouroboros_engine::domain::models::Experience::new("u1", "d", "c", 0.5);
    experience.resonance_score = 0.5;

    let with_decline = validator.validate(&experience, &trajectory, Some(&assessments));
    let without = validator.validate(&experience, &trajectory, None);
    assert!(with_decline < without);
}

/// Invariant 8 — with no web client configured, every entry point still
/// succeeds, and artifact submission degrades to `inaccessible` rather than
/// erroring.
#[tokio::test]
async fn invariant8_graceful_degradation_without_web_client() {
    let orchestrator = orchestrator();
    let seed = orchestrator.process_experience("u1", "Went for a walk", 0.6, "evening walk").await.unwrap();
    assert!(seed.trajectory_evidence.hypotheses.is_empty());

    let verification = orchestrator
        .submit_artifact("u1", seed.experience_id, "https://example.com/x", "a claim", None)
        .await
        .unwrap();
    assert_eq!(verification.status, ArtifactStatus::Inaccessible);
}

/// Invariant 3 — cold-start honesty: the very first experience for a brand
/// new user, with no follow-ups yet, stays below the 0.10 confidence floor.
#[tokio::test]
async fn invariant3_cold_start_honesty() {
    let orchestrator = orchestrator();
    let assessment = orchestrator.process_experience("new_user", "Tried something new", 0.7, "first time").await.unwrap();
    assert!(assessment.intention.confidence < 0.10);
    assert_eq!(assessment.intention.signal, ouroboros_engine::domain::models::IntentionSignal::Pending);
}

/// Invariant 5 — matrix_position is a pure function of (quality bucket,
/// intention signal): the same two orchestrators seeded identically land on
/// the same label.
#[tokio::test]
async fn invariant5_idempotent_matrix_mapping() {
    let orchestrator_a = orchestrator();
    let orchestrator_b = orchestrator();

    let a = orchestrator_a.process_experience("u1", "Read a novel", 0.9, "leisure reading").await.unwrap();
    let b = orchestrator_b.process_experience("u1", "Read a novel", 0.9, "leisure reading").await.unwrap();

    assert_eq!(a.matrix_position, b.matrix_position);
}
