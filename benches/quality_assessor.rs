use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ouroboros_engine::domain::models::{Experience, FollowUp, FollowUpSource, Trajectory};
use ouroboros_engine::services::QualityAssessor;

fn experience_with_follow_ups(n: usize) -> Experience {
    let mut experience = Experience::new("bench-user", "built a birdhouse", "weekend project", 0.8);
    for i in 0..n {
        let follow_up = FollowUp::new(experience.id, FollowUpSource::UserResponse, format!("update {i}"))
            .with_timestamp(experience.created_at + chrono::Duration::hours(i as i64 * 6))
            .with_created(0.4 + (i as f64 * 0.05).min(0.5))
            .with_shared(i % 2 == 0)
            .with_inspired(i % 3 == 0);
        experience.follow_ups.push(follow_up);
    }
    experience
}

fn bench_assess_quality(c: &mut Criterion) {
    let assessor = QualityAssessor::new();
    let mut group = c.benchmark_group("assess_quality");
    for &follow_up_count in &[0usize, 5, 20] {
        let experience = experience_with_follow_ups(follow_up_count);
        group.bench_with_input(BenchmarkId::from_parameter(follow_up_count), &follow_up_count, |b, _| {
            b.iter(|| assessor.assess_quality(black_box(&experience), None));
        });
    }
    group.finish();
}

fn bench_assess_quality_with_trajectory(c: &mut Criterion) {
    let assessor = QualityAssessor::new();
    let mut trajectory = Trajectory::new("bench-user");
    for _ in 0..30 {
        trajectory.experiences.push(experience_with_follow_ups(3));
    }
    let experience = trajectory.experiences[15].clone();

    c.bench_function("assess_quality_with_trajectory_history", |b| {
        b.iter(|| assessor.assess_quality(black_box(&experience), Some(black_box(&trajectory))));
    });
}

criterion_group!(benches, bench_assess_quality, bench_assess_quality_with_trajectory);
criterion_main!(benches);
