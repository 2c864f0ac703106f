use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ouroboros_engine::domain::models::{FollowUp, FollowUpSource, Trajectory};
use ouroboros_engine::services::VectorTracker;

fn seeded_trajectory(experience_count: usize, follow_ups_per_experience: usize) -> (Trajectory, VectorTracker) {
    let tracker = VectorTracker::new();
    let mut trajectory = Trajectory::new("bench-user");
    for i in 0..experience_count {
        let id = tracker
            .record_experience(&mut trajectory, format!("experience {i}"), "ctx", 0.7, None)
            .unwrap();
        for j in 0..follow_ups_per_experience {
            let follow_up = FollowUp::new(id, FollowUpSource::UserResponse, format!("follow-up {j}")).with_created(0.5);
            tracker.record_follow_up(&mut trajectory, id, follow_up).unwrap();
        }
    }
    (trajectory, tracker)
}

fn bench_compute_vector(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_vector");
    for &size in &[5usize, 25, 100] {
        let (trajectory, tracker) = seeded_trajectory(size, 3);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| tracker.compute_vector(black_box(&trajectory)));
        });
    }
    group.finish();
}

fn bench_record_follow_up(c: &mut Criterion) {
    c.bench_function("record_follow_up_single", |b| {
        b.iter_batched(
            || seeded_trajectory(10, 0),
            |(mut trajectory, tracker)| {
                let id = trajectory.experiences[0].id;
                let follow_up = FollowUp::new(id, FollowUpSource::UserResponse, "x").with_created(0.6);
                tracker.record_follow_up(black_box(&mut trajectory), id, follow_up).unwrap();
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_compute_vector, bench_record_follow_up);
criterion_main!(benches);
