use criterion::{black_box, criterion_group, criterion_main, Criterion};
use block_album::core::{resolve_clears, BlockerConfig, Board, EngineConfig, ShapeLibrary, TurnEngine};
use block_album::engine::{suggest, MatchSession, SessionConfig};
use block_album::types::Cell;

fn quiet_config() -> EngineConfig {
    EngineConfig {
        blockers: BlockerConfig {
            enabled: false,
            ..BlockerConfig::default()
        },
        ..EngineConfig::default()
    }
}

fn bench_resolve_clears(c: &mut Criterion) {
    // Diagonal left open: no line completes, the off-diagonal zones do.
    let mut board = Board::new(9).unwrap();
    for cell in board.cells().collect::<Vec<_>>() {
        if cell.x != cell.y {
            board.set_occupied(cell, true);
        }
    }

    c.bench_function("resolve_clears_dense", |b| {
        b.iter(|| resolve_clears(black_box(&board), 3))
    });
}

fn bench_place_turn(c: &mut Criterion) {
    let dot = [Cell::new(0, 0)];

    c.bench_function("place_row_clear", |b| {
        b.iter(|| {
            let mut engine = TurnEngine::new(quiet_config(), 7).unwrap();
            for x in 0..9 {
                engine.place(&dot, Cell::new(x, 0));
            }
            black_box(engine.score())
        })
    });
}

fn bench_hint(c: &mut Criterion) {
    let mut session = MatchSession::new(SessionConfig::default(), 12345).unwrap();
    for origin in [Cell::new(0, 0), Cell::new(4, 4), Cell::new(6, 1)] {
        let _ = session.place_from_tray(0, origin);
    }
    let slots = session.tray().slots().to_vec();

    c.bench_function("hint_search", |b| {
        b.iter(|| suggest(session.engine(), black_box(&slots)))
    });
}

fn bench_library_build(c: &mut Criterion) {
    c.bench_function("shape_library_build", |b| b.iter(ShapeLibrary::build));
}

criterion_group!(
    benches,
    bench_resolve_clears,
    bench_place_turn,
    bench_hint,
    bench_library_build
);
criterion_main!(benches);
