use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quadprec::prelude::*;

fn bench_simpson_sqrt(c: &mut Criterion) {
    let opt = EstimateOptions::new(vec![Interval::new(0.0, 100.0)]).iterations(10_000);

    c.bench_function("simpson_10k_nodes", |b| {
        b.iter(|| {
            Simpson
                .estimate(
                    &|x: f64| x * (x + 1e-12).sqrt(),
                    &|x: f64| x * x.sqrt(),
                    black_box(&opt),
                )
                .map(|r| black_box(r.max_error))
        })
    });
}

fn bench_simpson_multi_interval(c: &mut Criterion) {
    let domain: Vec<Interval> = (0..10)
        .map(|i| Interval::new(i as f64, i as f64 + 1.0))
        .collect();
    let opt = EstimateOptions::new(domain).iterations(1_000);

    c.bench_function("simpson_10x1k_nodes", |b| {
        b.iter(|| {
            Simpson
                .estimate(&|x: f64| x.sin(), &|x: f64| x.sin() + 1e-9, black_box(&opt))
                .map(|r| black_box(r.mean_error))
        })
    });
}

fn bench_monte_carlo(c: &mut Criterion) {
    let opt = EstimateOptions::new(vec![Interval::new(0.0, 1.0)])
        .estimator(std::sync::Arc::new(MonteCarlo))
        .iterations(10_000)
        .seed(42);
    let mc: &dyn Estimator<f64, f64> = &MonteCarlo;

    c.bench_function("monte_carlo_10k_samples", |b| {
        b.iter(|| {
            mc.estimate(&|x: f64| x.exp(), &|x: f64| 1.0 + x, black_box(&opt))
                .map(|r| black_box(r.rms_error))
        })
    });
}

fn bench_session_dispatch(c: &mut Criterion) {
    c.bench_function("session_16_estimates", |b| {
        b.iter(|| {
            let settings = SessionSettings {
                seed: 1,
                ..SessionSettings::new("bench")
            };
            let mut session = Session::with_settings(settings, Vec::<String>::new());
            for i in 0..16 {
                let opt = EstimateOptions::new(vec![Interval::new(0.0, 1.0)]).iterations(1_000);
                let shift = i as f64 * 1e-10;
                let _ = session.estimate(&format!("t{i}"), move |x: f64| x + shift, |x: f64| x, opt);
            }
            black_box(session.summary())
        })
    });
}

criterion_group!(
    benches,
    bench_simpson_sqrt,
    bench_simpson_multi_interval,
    bench_monte_carlo,
    bench_session_dispatch
);
criterion_main!(benches);
