use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use pickem_terminal::config::PoolConfig;
use pickem_terminal::csv_load::parse_slate_csv;
use pickem_terminal::fake_slate::demo_slate;
use pickem_terminal::ranker::compute_slate;

const SLATE_CSV: &str = "\
Home Team,Away Team,Kickoff,DraftKings Home ML,DraftKings Away ML,FanDuel Home ML,FanDuel Away ML
KC,CIN,2025-09-07 17:00,-150,+130,-145,+125
BUF,NYJ,2025-09-07 20:20,-300,+250,-290,+240
DET,GB,2025-09-08 00:15,+120,-140,+115,-135
PHI,DAL,2025-09-07 20:20,-190,+165,-185,+160
SF,SEA,2025-09-07 21:05,-260,+215,-250,+205
";

fn bench_slate_parse(c: &mut Criterion) {
    c.bench_function("slate_csv_parse", |b| {
        b.iter(|| {
            let loaded = parse_slate_csv(black_box(SLATE_CSV)).unwrap();
            black_box(loaded.matchups.len());
        })
    });
}

fn bench_compute_slate(c: &mut Criterion) {
    let cfg = PoolConfig::default();
    let slate = demo_slate(16);
    c.bench_function("compute_slate_16", |b| {
        b.iter_batched(
            || slate.clone(),
            |mut slate| {
                let summary = compute_slate(&mut slate, &cfg);
                black_box(summary.ranked);
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_slate_parse, bench_compute_slate);
criterion_main!(benches);
