use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sapper_core::*;

fn autoplay(c: &mut Criterion) {
    let mut group = c.benchmark_group("autoplay");

    for difficulty in [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Expert,
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{difficulty:?}")),
            &difficulty,
            |b, &difficulty| {
                let mut seed = 0;
                b.iter(|| {
                    seed += 1;
                    let mut game = Game::with_config(difficulty.into(), Some(seed));
                    let report = Bot::default()
                        .play(&mut game, &CancelToken::new(), &mut NoPause)
                        .expect("bot game should not fail");
                    black_box(report.outcome)
                });
            },
        );
    }

    group.finish();
}

fn advisor(c: &mut Criterion) {
    let mut game = Game::with_config(Difficulty::Expert.into(), Some(42));
    game.dig((8, 15)).expect("opening dig");
    let view = game.view();

    c.bench_function("advisor/expert_opening", |b| {
        b.iter(|| choose_move(black_box(&view), AdvisorConfig::default()))
    });
}

fn large_board(c: &mut Criterion) {
    let mut group = c.benchmark_group("autoplay_large");
    group.sample_size(10);
    group.bench_function("120x120", |b| {
        let config = GameConfig::new(120, 120, 2000).expect("valid board");
        let mut seed = 0;
        b.iter(|| {
            seed += 1;
            let mut game = Game::with_config(config, Some(seed));
            let report = Bot::default()
                .play(&mut game, &CancelToken::new(), &mut NoPause)
                .expect("bot game should not fail");
            black_box(report.outcome)
        });
    });
    group.finish();
}

criterion_group!(benches, autoplay, advisor, large_board);
criterion_main!(benches);
