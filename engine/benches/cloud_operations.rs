use cloud_engine::{Axis, Cloud, Filter, Record};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Row counts we benchmark.
const ROW_COUNTS: &[usize] = &[1_000, 10_000, 100_000];

const REGIONS: &[&str] = &["EU", "US", "APAC", "LATAM", "MEA"];

fn create_rows(seed: u64, count: usize) -> Vec<Record> {
    // Simple LCG for reproducible pseudo-random data
    let mut state = seed;
    (0..count)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let r = state >> 33;
            Record::new()
                .with("region", REGIONS[(r % REGIONS.len() as u64) as usize])
                .with("year", 2015 + (r % 10) as i64)
                .with("product", format!("P{}", r % 50))
                .with("n", (r % 100) as i64)
        })
        .collect()
}

fn sales_cloud() -> Cloud<Record, f64> {
    Cloud::with_constant(
        vec![Axis::field("region"), Axis::field("year"), Axis::field("product")],
        0.0,
    )
    .unwrap()
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("Cloud Load (sum fold)");

    for &count in ROW_COUNTS {
        let rows = create_rows(42, count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("load_data_with", count), &count, |bencher, &_| {
            bencher.iter(|| {
                let mut cloud = sales_cloud();
                cloud
                    .load_data_with(rows.iter().cloned(), |row, cur| {
                        cur + row.number("n").unwrap_or(0.0)
                    })
                    .unwrap();
                black_box(cloud.len())
            })
        });
    }

    group.finish();
}

fn bench_filtered_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("Cloud Filtered Sum");

    for &count in ROW_COUNTS {
        let mut cloud = sales_cloud();
        cloud
            .load_data_with(create_rows(7, count), |row, cur| cur + row.number("n").unwrap_or(0.0))
            .unwrap();
        let filters = vec![
            Filter::within("region", ["EU", "US"]),
            Filter::equals("year", 2020),
        ];

        group.throughput(Throughput::Elements(cloud.len() as u64));
        group.bench_with_input(BenchmarkId::new("sum", count), &count, |bencher, &_| {
            bencher.iter(|| black_box(cloud.sum(black_box(&filters)).unwrap()))
        });
    }

    group.finish();
}

fn bench_point_lookup(c: &mut Criterion) {
    let mut cloud = sales_cloud();
    cloud
        .load_data_with(create_rows(3, 10_000), |row, cur| cur + row.number("n").unwrap_or(0.0))
        .unwrap();
    let keys: Vec<_> = cloud.iter_points().map(|(k, _)| k.clone()).collect();

    c.bench_function("Cloud value_at (existing points)", |bencher| {
        bencher.iter(|| {
            let mut total = 0.0;
            for key in &keys {
                total += *cloud.value_at(key.clone()).unwrap();
            }
            black_box(total)
        })
    });
}

criterion_group!(benches, bench_load, bench_filtered_sum, bench_point_lookup);
criterion_main!(benches);
