//! Criterion benchmarks for location discovery, contact detection and
//! metric extraction.
//!
//! Run with: `cargo bench --bench metrics --features synthetic`
//!
//! Traces come from the seeded synthetic generator, so runs are comparable
//! across machines and commits.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mobmetrics::synthetic::SyntheticScenario;
use mobmetrics::{
    detect_contacts, extract_multi, find_homes, find_locations, metrics, ContactConfig,
    DistanceType, MetricInputs, MetricKind,
};

fn scenario(node_count: usize) -> SyntheticScenario {
    SyntheticScenario {
        node_count,
        stops_per_node: 6,
        stop_duration_secs: 1800.0,
        sample_interval_secs: 60.0,
        ..SyntheticScenario::default()
    }
}

// ============================================================================
// Location Discovery
// ============================================================================

fn bench_find_locations(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_locations");

    for nodes in [10, 100, 500] {
        let scenario = scenario(nodes);
        let dataset = scenario.generate();
        let config = scenario.location_config();

        group.bench_with_input(BenchmarkId::from_parameter(nodes), &dataset.trace, |b, trace| {
            b.iter(|| find_locations(black_box(trace), &config))
        });
    }

    group.finish();
}

fn bench_find_homes(c: &mut Criterion) {
    let scenario = scenario(500);
    let dataset = scenario.generate();
    let result = find_locations(&dataset.trace, &scenario.location_config()).unwrap();

    c.bench_function("find_homes/500", |b| {
        b.iter(|| find_homes(black_box(&result.trace_loc)))
    });
}

// ============================================================================
// Contact Detection
// ============================================================================

fn bench_contacts(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_contacts");
    group.sample_size(20);

    for nodes in [50, 200, 800] {
        let dataset = scenario(nodes).generate();

        let exhaustive = ContactConfig {
            radius: 20.0,
            dist_type: DistanceType::Haversine,
            index_min_points: usize::MAX,
        };
        let indexed = ContactConfig {
            index_min_points: 0,
            ..exhaustive.clone()
        };

        group.bench_with_input(BenchmarkId::new("exhaustive", nodes), &dataset.trace, |b, trace| {
            b.iter(|| detect_contacts(black_box(trace), &exhaustive))
        });
        group.bench_with_input(BenchmarkId::new("rtree", nodes), &dataset.trace, |b, trace| {
            b.iter(|| detect_contacts(black_box(trace), &indexed))
        });
    }

    group.finish();
}

// ============================================================================
// Metric Extraction
// ============================================================================

fn bench_metrics(c: &mut Criterion) {
    let scenario = scenario(500);
    let dataset = scenario.generate();
    let result = find_locations(&dataset.trace, &scenario.location_config()).unwrap();
    let contacts = detect_contacts(&dataset.trace, &ContactConfig::default()).unwrap();

    let inputs = MetricInputs::new(DistanceType::Haversine)
        .with_trace(&dataset.trace)
        .with_trace_loc(&result.trace_loc)
        .with_contacts(&contacts);

    let mut group = c.benchmark_group("extract");
    for kind in MetricKind::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(kind), &inputs, |b, inputs| {
            b.iter(|| metrics::extract(kind, black_box(inputs)))
        });
    }
    group.finish();
}

fn bench_extract_multi(c: &mut Criterion) {
    let datasets: Vec<_> = (0..8u64)
        .map(|seed| {
            let scenario = SyntheticScenario {
                seed,
                ..scenario(100)
            };
            let dataset = scenario.generate();
            find_locations(&dataset.trace, &scenario.location_config()).unwrap()
        })
        .collect();

    let inputs: Vec<MetricInputs> = datasets
        .iter()
        .map(|r| MetricInputs::new(DistanceType::Haversine).with_trace_loc(&r.trace_loc))
        .collect();

    c.bench_function("extract_multi/VIST/8x100", |b| {
        b.iter(|| extract_multi(MetricKind::VisitTime, black_box(&inputs)))
    });
}

criterion_group!(
    benches,
    bench_find_locations,
    bench_find_homes,
    bench_contacts,
    bench_metrics,
    bench_extract_multi,
);

criterion_main!(benches);
