use criterion::{black_box, criterion_group, criterion_main, Criterion};
use panpart_stats::mixture::{fit, BinomialFamily, GaussianFamily, MixtureConfig};

/// Family frequencies out of `trials` genomes with a U-shaped spectrum.
fn u_shaped(n: usize, trials: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let u = (state >> 11) as f64 / (1u64 << 53) as f64;
            let k = if u < 0.45 {
                1 + (u * 10.0) as usize % 3
            } else if u < 0.6 {
                trials / 2
            } else {
                trials - (u * 10.0) as usize % 2
            };
            k as f64 / trials as f64
        })
        .collect()
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixture_fit");
    let data = u_shaped(20_000, 100, 42);
    let config = MixtureConfig::default();

    group.bench_function("binomial_20k", |b| {
        b.iter(|| fit(&BinomialFamily::new(100), black_box(&data), &config))
    });
    group.bench_function("gaussian_20k", |b| {
        b.iter(|| fit(&GaussianFamily::default(), black_box(&data), &config))
    });

    group.finish();
}

criterion_group!(benches, bench_fit);
criterion_main!(benches);
