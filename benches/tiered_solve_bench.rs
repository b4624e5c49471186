//! Time a full four-tier solve on synthetic fleets of increasing size.
//!
//! Run with: `cargo bench --bench tiered_solve`

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tiered_dispatch::config::DispatchConfig;
use tiered_dispatch::model::{DispatchRequest, IncidentRecord, UnitRecord};
use tiered_dispatch::optimizer::run_optimisation;

/// Deterministic fleet spread over a small grid; no RNG so runs are comparable.
fn synthetic_request(units: usize, incidents: usize, categories: usize) -> DispatchRequest {
    let tiers = ["Immediate", "Urgent", "Routine", "Non-Urgent"];
    DispatchRequest {
        units: (0..units)
            .map(|i| UnitRecord {
                id: i as u64,
                lat: ((i * 37) % 101) as f64 / 10.0,
                lon: ((i * 53) % 97) as f64 / 10.0,
                capability: (i % categories) as i64,
            })
            .collect(),
        incidents: (0..incidents)
            .map(|i| {
                let mut requirements = vec![0_i64; categories];
                requirements[i % categories] += 1;
                requirements[(i * 3 + 1) % categories] += 1;
                IncidentRecord {
                    id: 1_000 + i as u64,
                    lat: ((i * 29) % 89) as f64 / 10.0,
                    lon: ((i * 71) % 83) as f64 / 10.0,
                    priority: tiers[i % tiers.len()].to_string(),
                    requirements,
                }
            })
            .collect(),
        costs: None,
    }
}

fn bench_tiered_solve(c: &mut Criterion) {
    let config = DispatchConfig::default();
    let mut group = c.benchmark_group("tiered_solve");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    for (units, incidents) in [(10, 4), (30, 12), (60, 24)] {
        let request = synthetic_request(units, incidents, config.categories);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{units}x{incidents}")),
            &request,
            |b, request| {
                b.iter(|| black_box(run_optimisation(request, &config)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_tiered_solve);
criterion_main!(benches);
