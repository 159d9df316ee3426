use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ferry::{
    best_arm, AllocationPolicy, DecisionContext, EpsilonGreedy, EpsilonGreedyConfig,
    RollingEstimator, TieBreak,
};
use std::hint::black_box;

fn filled_estimator(n_arms: usize, cap: usize) -> RollingEstimator {
    let mut est = RollingEstimator::new(n_arms, cap);
    // A deterministic, slightly-non-uniform survival pattern.
    for i in 0..(n_arms * cap) {
        est.record(i % n_arms, (i * 7 + 3) % 5 < 3);
    }
    est
}

fn bench_policy(c: &mut Criterion) {
    let mut group = c.benchmark_group("decide");
    for &n_arms in &[3usize, 16usize, 128usize] {
        let est = filled_estimator(n_arms, 20);

        group.bench_with_input(BenchmarkId::new("best_arm", n_arms), &n_arms, |b, &_n| {
            b.iter(|| black_box(best_arm(black_box(&est), TieBreak::FewestSamples)))
        });

        let cfg = EpsilonGreedyConfig {
            epsilon: 0.1,
            ..EpsilonGreedyConfig::default()
        };
        let mut policy = EpsilonGreedy::with_seed(cfg, n_arms, 7).unwrap();
        let probe = policy.probe_trip_count();
        group.bench_with_input(
            BenchmarkId::new("epsilon_greedy", n_arms),
            &n_arms,
            |b, &_n| {
                b.iter(|| {
                    let d = policy.decide(&DecisionContext {
                        trip_index: probe,
                        remaining: 1_000,
                        estimator: &est,
                    });
                    black_box(d);
                })
            },
        );
    }
    group.finish();

    c.bench_function("record_w20", |b| {
        let mut est = RollingEstimator::new(3, 20);
        let mut i = 0usize;
        b.iter(|| {
            est.record(i % 3, i % 2 == 0);
            i = i.wrapping_add(1);
        })
    });
}

criterion_group!(benches, bench_policy);
criterion_main!(benches);
