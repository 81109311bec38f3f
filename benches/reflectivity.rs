use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use synthseis::reflectivity::{MonteCarloAvo, ReflectivityMethod, reflectivity};
use synthseis::rock::RockProperties;

/// Shale over gas sand, a typical class III AVO pair.
fn rock_pair() -> (RockProperties, RockProperties) {
    let shale = RockProperties::new(2400.0, 1100.0, 2450.0)
        .expect("benchmark shale should be valid")
        .with_uncertainty(50.0, 30.0, 20.0)
        .expect("benchmark uncertainties should be valid");
    let sand = RockProperties::new(2600.0, 1600.0, 2100.0)
        .expect("benchmark sand should be valid")
        .with_uncertainty(80.0, 40.0, 30.0)
        .expect("benchmark uncertainties should be valid");
    (shale, sand)
}

fn method_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("reflectivity");
    let (upper, lower) = rock_pair();
    // 0..45 degrees in 1 degree steps
    let theta: Vec<f64> = (0..=45).map(f64::from).collect();

    for method in ReflectivityMethod::ALL {
        group.bench_function(method.name(), |b| {
            b.iter(|| reflectivity(black_box(&upper), black_box(&lower), black_box(&theta), method).unwrap());
        });
    }

    group.finish();
}

fn monte_carlo_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo");
    let (upper, lower) = rock_pair();
    let theta: Vec<f64> = (0..=9).map(|i| 5.0 * f64::from(i)).collect();

    // 1000 correlated draws, exact solution per draw
    let mc = MonteCarloAvo::new(1000, 42).expect("benchmark realizations should be valid");
    group.bench_function("zoeppritz_1000", |b| {
        b.iter(|| mc.run(black_box(&upper), black_box(&lower), black_box(&theta)).unwrap());
    });

    let shuey = mc.method(ReflectivityMethod::Shuey2);
    group.bench_function("shuey2_1000", |b| {
        b.iter(|| shuey.run(black_box(&upper), black_box(&lower), black_box(&theta)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, method_benchmarks, monte_carlo_benchmarks);
criterion_main!(benches);
