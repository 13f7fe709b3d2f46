use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use monopoly_config::GameConfig;
use monopoly_runtime::{Game, TopCard};
use std::path::Path;

fn new_game() -> Game {
    let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets");
    let config = GameConfig::load(&assets.join("board.txt"), &assets.join("cards.txt"), None)
        .expect("shipped assets load");
    let mut game = Game::new(config).expect("default rules are valid");
    for (name, archetype) in [("ana", "car"), ("bob", "ball"), ("cid", "sphinx"), ("dee", "hat")] {
        game.add_player(name, archetype).expect("player joins");
    }
    game.start().expect("game starts");
    game
}

fn bench_turns(c: &mut Criterion) {
    c.bench_function("play_100_turns", |b| {
        b.iter_batched(
            new_game,
            |mut game| {
                for _ in 0..100 {
                    if game.winner().is_some() {
                        break;
                    }
                    let _ = black_box(game.play_turn(&mut TopCard));
                }
                game
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_turns);
criterion_main!(benches);
