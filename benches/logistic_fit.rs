/// Logistic fit benchmarks
///
/// Measures the Newton/IRLS solver and the full naive-vs-adjusted comparison
/// on synthetic admissions data of increasing size.
use confound::comparison::compare;
use confound::dataset::{Admission, Dataset, Record, Sex};
use confound::encoder::{encode, PredictorColumn};
use confound::regression::fit;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

const DEPARTMENTS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// Deterministic synthetic dataset: admission odds fall with department index
fn synthetic(n: usize) -> Dataset {
    (0..n)
        .filter_map(|i| {
            let dept = i % DEPARTMENTS.len();
            let sex = if (i / 7) % 3 == 0 { Sex::Female } else { Sex::Male };
            let accepted = (i * 31 + dept * 17) % 100 < 70 - dept * 10;
            let admission = if accepted {
                Admission::Accepted
            } else {
                Admission::Rejected
            };
            Record::new(1973, DEPARTMENTS[dept], sex, admission).ok()
        })
        .collect()
}

fn bench_fit_gender_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_gender_only");
    group.measurement_time(Duration::from_secs(5));

    for size in [500usize, 5_000].iter() {
        let encoded = encode(&synthetic(*size));
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| fit(black_box(encoded), &[PredictorColumn::Gender]))
        });
    }

    group.finish();
}

fn bench_fit_with_departments(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_with_departments");
    group.measurement_time(Duration::from_secs(5));

    let predictors: Vec<PredictorColumn> = std::iter::once(PredictorColumn::Gender)
        .chain(DEPARTMENTS[1..].iter().map(|d| PredictorColumn::department(*d)))
        .collect();

    for size in [500usize, 5_000].iter() {
        let encoded = encode(&synthetic(*size));
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| fit(black_box(encoded), &predictors))
        });
    }

    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");
    group.measurement_time(Duration::from_secs(5));

    let data = synthetic(4_526);
    group.throughput(Throughput::Elements(data.len() as u64));
    group.bench_function("berkeley_sized", |b| b.iter(|| compare(black_box(&data))));

    group.finish();
}

criterion_group!(
    benches,
    bench_fit_gender_only,
    bench_fit_with_departments,
    bench_compare
);
criterion_main!(benches);
