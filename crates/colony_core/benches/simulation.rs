//! Simulation benchmarks for colony_core.
//!
//! Run with: `cargo bench -p colony_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use colony_core::prelude::*;

/// A colony with a developed economy: mixed buildings and a few unlocks.
fn developed_colony() -> Colony {
    let colony = Colony::new(42, 0);
    let mut stocked = colony.to_save();
    for &r in &Resource::ALL {
        stocked.resources.insert(r, 100);
    }
    let mut colony = Colony::from_save(42, stocked);
    for _ in 0..5 {
        let _ = colony.construct_building(BuildingKind::Mine, Position::default(), 0);
    }
    for _ in 0..3 {
        let _ = colony.construct_building(BuildingKind::Farm, Position::default(), 0);
    }
    for _ in 0..2 {
        let _ = colony.construct_building(BuildingKind::Factory, Position::default(), 0);
    }
    colony
}

pub fn simulation_benchmark(c: &mut Criterion) {
    c.bench_function("tick_developed_colony", |b| {
        let mut colony = developed_colony();
        let mut now_ms = 0;
        b.iter(|| {
            now_ms += 1_000;
            black_box(colony.tick(now_ms))
        })
    });

    c.bench_function("save_round_trip", |b| {
        let colony = developed_colony();
        b.iter(|| {
            let mut store = MemoryStore::new();
            save_game(&mut store, &colony.to_save()).unwrap();
            black_box(load_game(&store))
        })
    });
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);
