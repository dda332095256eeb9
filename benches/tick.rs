//! Tick throughput benchmarks
//!
//! Measures the three tick phases over populated arenas to verify the
//! engine holds its 60 Hz budget at the hundreds-of-entities scale.
//!
//! Run with: cargo bench --bench tick

use std::time::Instant;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;

use battle_arena_server::config::GameConfig;
use battle_arena_server::game::spawn;
use battle_arena_server::game::state::{Bullet, GameState, GameStats, Player};
use battle_arena_server::game::systems::{bullets, cleanup, combat};
use battle_arena_server::util::vec2::Vec2;

/// Create a state with randomly distributed players and two bullets per
/// player in flight
fn create_state_with_players(config: &GameConfig, count: usize) -> GameState {
    let mut rng = rand::thread_rng();
    let now = Instant::now();
    let obstacles = spawn::generate_obstacles(config, &mut rng);
    let mut state = GameState::new(obstacles, GameStats::default());

    for i in 0..count {
        let id = format!("bot{i}_{i:08x}");
        let position = Vec2::new(rng.gen_range(1.0..99.0), rng.gen_range(1.0..99.0));
        state.players.insert(
            id.clone(),
            Player::new(id, format!("bot{i}"), position, 100, now),
        );
    }

    for i in 0..count * 2 {
        let owner_index = i % count;
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        state.bullets.push(Bullet::new(
            format!("bullet_{i:012x}"),
            format!("bot{owner_index}_{owner_index:08x}"),
            Vec2::new(rng.gen_range(1.0..99.0), rng.gen_range(1.0..99.0)),
            Vec2::new(angle.cos(), angle.sin()) * config.bullet_speed,
            config.bullet_damage,
            now,
        ));
    }

    state
}

fn bench_full_tick(c: &mut Criterion) {
    let config = GameConfig::default();
    let dt = config.tick_duration_secs();
    let mut group = c.benchmark_group("tick");
    group.sample_size(50);

    for count in [50, 100, 250] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("full_tick", count), &count, |b, &count| {
            let mut state = create_state_with_players(&config, count);
            b.iter(|| {
                let now = Instant::now();
                bullets::integrate(&mut state, &config, now, dt);
                black_box(combat::resolve(&mut state, &config, now));
                cleanup::run(&mut state, &config, now);
            });
        });
    }

    group.finish();
}

fn bench_bullet_integration(c: &mut Criterion) {
    let config = GameConfig::default();
    let dt = config.tick_duration_secs();
    let mut group = c.benchmark_group("bullets");
    group.sample_size(50);

    for count in [100, 500, 1000] {
        let mut state = create_state_with_players(&config, 10);
        let mut rng = rand::thread_rng();
        let now = Instant::now();
        state.bullets.clear();
        for i in 0..count {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            state.bullets.push(Bullet::new(
                format!("bullet_{i:012x}"),
                "bot0_00000000".to_string(),
                Vec2::new(rng.gen_range(1.0..99.0), rng.gen_range(1.0..99.0)),
                Vec2::new(angle.cos(), angle.sin()) * config.bullet_speed,
                config.bullet_damage,
                now,
            ));
        }

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::new("integrate", count),
            &count,
            |b, _| {
                b.iter(|| {
                    bullets::integrate(&mut state, &config, Instant::now(), black_box(dt));
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_full_tick, bench_bullet_integration);
criterion_main!(benches);
