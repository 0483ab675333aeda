//! Performance benchmarks for pmr_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pmr_core::config::SimulationParams;
use pmr_core::geo::distance_km;
use pmr_core::pricing::compute_invoice;
use pmr_core::taxi::TaxiSimulator;
use pmr_core::test_helpers::{charge_request, point, GARE_DU_NORD, MARSEILLE, PARIS};
use pmr_core::tracking::{PersistCadence, RecordingSink, TrackingRun};

fn bench_compute_invoice(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_invoice");
    for legs in [1u32, 3, 8] {
        let request = charge_request(true, legs, legs > 1);
        group.bench_with_input(BenchmarkId::from_parameter(legs), &request, |b, request| {
            b.iter(|| black_box(compute_invoice(black_box(request))));
        });
    }
    group.finish();
}

fn bench_haversine(c: &mut Criterion) {
    let (a, b) = (point(PARIS), point(MARSEILLE));
    c.bench_function("distance_km", |bench| {
        bench.iter(|| black_box(distance_km(black_box(&a), black_box(&b))));
    });
}

fn bench_full_ride(c: &mut Criterion) {
    let mut group = c.benchmark_group("taxi_ride");
    for total_ticks in [100u32, 1_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(total_ticks),
            &total_ticks,
            |b, &total_ticks| {
                let simulator =
                    TaxiSimulator::new(SimulationParams::default().with_total_ticks(total_ticks))
                        .expect("valid params");
                let session = simulator
                    .start(point(PARIS), point(GARE_DU_NORD), 25.0)
                    .expect("start");
                b.iter(|| {
                    let mut run =
                        TrackingRun::new(simulator, PersistCadence::default(), session.clone());
                    let mut sink = RecordingSink::new();
                    run.run_to_arrival(&mut sink).expect("run");
                    black_box(sink.snapshots().len())
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_compute_invoice, bench_haversine, bench_full_ride);
criterion_main!(benches);
