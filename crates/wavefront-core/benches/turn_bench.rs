use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;
use wavefront_core::action::{Action, MoveAction, Order, PlayerCommand};
use wavefront_core::config::EngineConfig;
use wavefront_core::entity::PlayerId;
use wavefront_core::factory::standard_board;
use wavefront_core::geometry::{Cell, Direction};
use wavefront_core::simulation::{RealtimeEngine, SimulationEngine, TickInput};
use wavefront_core::turn::update;
use wavefront_core::world::World;

fn bench_neutral_turn(c: &mut Criterion) {
    let config = EngineConfig::default();
    let mut state = standard_board();
    // Crowd the board so the claim pass has work to do.
    for row in 0..5 {
        for column in 0..5 {
            let owner = if (row + column) % 2 == 0 { "red" } else { "blue" };
            for _ in 0..8 {
                state.spawn_soldier(PlayerId::new(owner), Cell::new(row, column));
            }
        }
    }

    c.bench_function("neutral_turn", |b| {
        b.iter(|| black_box(update(black_box(&state), &[], &config)))
    });
}

fn bench_turn_with_battles(c: &mut Criterion) {
    let config = EngineConfig::default();
    let mut state = standard_board();
    for _ in 0..50 {
        state.spawn_soldier(PlayerId::new("red"), Cell::new(1, 2));
        state.spawn_soldier(PlayerId::new("blue"), Cell::new(2, 2));
    }
    let actions: Vec<Action> = (0..10)
        .map(|_| {
            Action::Move(MoveAction {
                player_id: PlayerId::new("red"),
                from: Cell::new(1, 2),
                direction: Direction::new(1, 0).unwrap(),
                number_of_troops: 3,
            })
        })
        .collect();

    c.bench_function("turn_with_battles", |b| {
        b.iter(|| black_box(update(&state, black_box(&actions), &config)))
    });
}

fn bench_realtime_tick(c: &mut Criterion) {
    let engine = RealtimeEngine::new(EngineConfig::default());
    let mut world = World::new();
    let names = ["ada", "bob", "cyd", "dee"];
    for name in names {
        world.join(PlayerId::new(name), engine.config());
    }
    // Give every player a long command log for the observation pass.
    for name in names {
        let player = PlayerId::new(name);
        let worker = world.player(&player).unwrap().arena().units().next().unwrap().id();
        for step in 0..50 {
            let input = TickInput {
                delta_ms: 10.0,
                commands: vec![PlayerCommand {
                    player_id: player.clone(),
                    entity: worker,
                    order: Order::Move {
                        position: Vec2::new(step as f32 * 10.0, 500.0),
                    },
                }],
            };
            engine.apply_tick(&mut world, &input);
        }
    }

    c.bench_function("realtime_tick", |b| {
        b.iter(|| engine.apply_tick(&mut world, black_box(&TickInput::idle(33.0))))
    });
}

criterion_group!(benches, bench_neutral_turn, bench_turn_with_battles, bench_realtime_tick);
criterion_main!(benches);
