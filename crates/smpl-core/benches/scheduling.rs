use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use smpl_core::Kernel;

fn bench_schedule_cause_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule_cause");

    for count in [100u32, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || Kernel::<u32>::new("bench").unwrap(),
                |mut kernel| {
                    for i in 0..count {
                        kernel.schedule(1, (count - i) as f64, i).unwrap();
                    }
                    while kernel.cause().is_some() {}
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_facility_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("facility_contention");

    for count in [100u32, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let mut kernel = Kernel::<u32>::new("bench").unwrap();
                    let f = kernel.facility("f", 4).unwrap();
                    (kernel, f)
                },
                |(mut kernel, f)| {
                    for token in 0..count {
                        let _ = kernel.request(f, token, 0).unwrap();
                    }
                    for token in 0..count {
                        if kernel.status(f).unwrap() || kernel.inq(f).unwrap() > 0 {
                            let _ = kernel.release(f, token);
                        }
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_schedule_cause_throughput, bench_facility_contention);
criterion_main!(benches);
