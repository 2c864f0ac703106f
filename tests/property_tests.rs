//! Property-based invariants over the orchestrator and its scorers, run
//! against generated follow-up sequences rather than literal scenarios.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use ouroboros_engine::adapters::memory::InMemoryStorage;
use ouroboros_engine::domain::models::{FollowUp, FollowUpSource};
use ouroboros_engine::services::{IntentionClassifier, Orchestrator, VectorTracker};
use proptest::prelude::*;

fn source_strategy() -> impl Strategy<Value = FollowUpSource> {
    prop_oneof![
        Just(FollowUpSource::UserResponse),
        Just(FollowUpSource::Behavioral),
        Just(FollowUpSource::SystemObservation),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property 1 — append-only evidence: after any number of follow-ups,
    /// `follow_ups` and `vector_snapshots` never shrink and always end up
    /// with exactly as many entries as follow-ups were recorded (one
    /// snapshot for the seed experience plus one per follow-up).
    #[test]
    fn prop1_append_only_evidence(
        created in prop::collection::vec(any::<bool>(), 0..6),
        source in prop::collection::vec(source_strategy(), 0..6),
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let storage = Arc::new(InMemoryStorage::new());
            let orchestrator = Orchestrator::new(storage.clone(), None);
            let seed = orchestrator.process_experience("u1", "Tried a new hobby", 0.7, "weekend").await.unwrap();

            let n = created.len().min(source.len());
            let mut previous_follow_ups = 0;
            let mut previous_snapshots = 1;
            for i in 0..n {
                let mut follow_up = FollowUp::new(seed.experience_id, source[i], "evidence");
                if created[i] {
                    follow_up = follow_up.with_created(0.5);
                }
                orchestrator.process_follow_up("u1", seed.experience_id, follow_up).await.unwrap();

                let trajectory = storage.load_trajectory("u1").await.unwrap();
                let experience = trajectory.experience(seed.experience_id).unwrap();
                prop_assert!(experience.follow_ups.len() >= previous_follow_ups);
                prop_assert!(experience.vector_snapshots.len() >= previous_snapshots);
                prop_assert_eq!(experience.follow_ups.len(), i + 1);
                prop_assert_eq!(experience.vector_snapshots.len(), i + 2);
                previous_follow_ups = experience.follow_ups.len();
                previous_snapshots = experience.vector_snapshots.len();
            }
            Ok(())
        })?;
    }

    /// Property 2 — confidence monotonicity: for a fixed experience, adding
    /// one more follow-up never strictly decreases `intention_confidence`
    /// beyond a small rounding tolerance.
    #[test]
    fn prop2_confidence_monotonicity(
        magnitude in 0.0f64..1.0,
        shared in any::<bool>(),
        inspired in any::<bool>(),
    ) {
        let classifier = IntentionClassifier::new();
        let trajectory = ouroboros_engine::domain::models::Trajectory::new("u1");
        let mut experience = ouroboros_engine::domain::models::Experience::new("u1", "d", "c", 0.6);

        let before = classifier.classify(&experience, &trajectory).confidence;

        let follow_up = FollowUp::new(experience.id, FollowUpSource::UserResponse, "x")
            .with_created(magnitude)
            .with_shared(shared)
            .with_inspired(inspired);
        experience.follow_ups.push(follow_up);

        let after = classifier.classify(&experience, &trajectory).confidence;
        prop_assert!(after >= before - 1e-9, "confidence dropped from {before} to {after}");
    }

    /// Property 6 — bounded outputs: the vector tracker's aggregate and
    /// per-experience snapshots always stay within their documented ranges,
    /// regardless of how many random follow-ups were appended.
    #[test]
    fn prop6_bounded_outputs(
        magnitudes in prop::collection::vec(0.0f64..1.0, 0..8),
        rating in 0.0f64..1.0,
    ) {
        let tracker = VectorTracker::new();
        let mut trajectory = ouroboros_engine::domain::models::Trajectory::new("u1");
        let id = tracker.record_experience(&mut trajectory, "d", "c", rating, None).unwrap();

        for magnitude in magnitudes {
            let follow_up = FollowUp::new(id, FollowUpSource::UserResponse, "x").with_created(magnitude);
            tracker.record_follow_up(&mut trajectory, id, follow_up).unwrap();

            let experience = trajectory.experience(id).unwrap();
            let snapshot = experience.latest_snapshot().unwrap();
            prop_assert!((-1.0..=1.0).contains(&snapshot.direction));
            prop_assert!((0.0..=1.0).contains(&snapshot.magnitude));
            prop_assert!((0.0..=1.0).contains(&snapshot.confidence));
        }

        let aggregate = tracker.compute_vector(&trajectory);
        prop_assert!((-1.0..=1.0).contains(&aggregate.direction));
        prop_assert!((0.0..=1.0).contains(&aggregate.magnitude));
        prop_assert!((0.0..=1.0).contains(&aggregate.confidence));
    }

    /// Property 7 — ordering independence: two follow-ups sharing the same
    /// timestamp produce the same aggregate vector regardless of the order
    /// they're recorded in.
    #[test]
    fn prop7_same_timestamp_order_independence(
        magnitude_a in 0.0f64..1.0,
        magnitude_b in 0.0f64..1.0,
    ) {
        let tracker = VectorTracker::new();
        let shared_ts: DateTime<Utc> = Utc::now() + Duration::hours(1);

        let run = |first_magnitude: f64, second_magnitude: f64| {
            let mut trajectory = ouroboros_engine::domain::models::Trajectory::new("u1");
            let id = tracker.record_experience(&mut trajectory, "d", "c", 0.5, None).unwrap();
            let fu1 = FollowUp::new(id, FollowUpSource::UserResponse, "a")
                .with_timestamp(shared_ts)
                .with_created(first_magnitude);
            tracker.record_follow_up(&mut trajectory, id, fu1).unwrap();
            let fu2 = FollowUp::new(id, FollowUpSource::UserResponse, "b")
                .with_timestamp(shared_ts)
                .with_created(second_magnitude);
            tracker.record_follow_up(&mut trajectory, id, fu2).unwrap();
            tracker.compute_vector(&trajectory)
        };

        let forward = run(magnitude_a, magnitude_b);
        let backward = run(magnitude_b, magnitude_a);
        prop_assert!((forward.direction - backward.direction).abs() < 1e-9);
        prop_assert!((forward.magnitude - backward.magnitude).abs() < 1e-9);
        prop_assert!((forward.confidence - backward.confidence).abs() < 1e-9);
    }
}

/// Property 4 — same-action divergence: two identically-seeded users given
/// opposite-signal follow-ups end up more than 0.4 apart in direction.
#[tokio::test]
async fn prop4_same_action_divergence() {
    let storage_a = Arc::new(InMemoryStorage::new());
    let storage_b = Arc::new(InMemoryStorage::new());
    let orchestrator_a = Orchestrator::new(storage_a.clone(), None);
    let orchestrator_b = Orchestrator::new(storage_b.clone(), None);

    let seed_a = orchestrator_a.process_experience("a", "Played a video game", 0.8, "ctx").await.unwrap();
    let seed_b = orchestrator_b.process_experience("b", "Played a video game", 0.8, "ctx").await.unwrap();

    let quiet = FollowUp::new(seed_a.experience_id, FollowUpSource::Behavioral, "nothing happened");
    orchestrator_a.process_follow_up("a", seed_a.experience_id, quiet).await.unwrap();

    let creative = FollowUp::new(seed_b.experience_id, FollowUpSource::UserResponse, "shipped a mod")
        .with_created(1.0)
        .with_shared(true)
        .with_inspired(true);
    orchestrator_b.process_follow_up("b", seed_b.experience_id, creative).await.unwrap();

    let trajectory_a = storage_a.load_trajectory("a").await.unwrap();
    let trajectory_b = storage_b.load_trajectory("b").await.unwrap();
    let delta = (trajectory_a.current_vector.direction - trajectory_b.current_vector.direction).abs();
    assert!(delta > 0.4, "expected divergence > 0.4, got {delta}");
}
