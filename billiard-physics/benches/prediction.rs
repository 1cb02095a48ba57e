// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Benchmarks for event prediction and full shot simulation
//!
//! These benchmarks measure:
//! - Next-event prediction on a racked table right after the break
//! - Running a break shot event by event until the table is at rest
//! - Sequential versus parallel strike previews

use billiard_physics::builders::{eight_pool_table, triangle_rack, RackConfig, TableDimensions, CUE_BALL_ID};
use billiard_physics::trajectory::{preview_many, TrajectoryOptions};
use billiard_physics::{BilliardState, Cue, CueTransform, EngineConfig, StrikeCommand};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::DVec2;

fn racked_state() -> BilliardState {
    let table = eight_pool_table(&TableDimensions::default()).expect("default table");
    let balls = triangle_rack(&RackConfig::default()).expect("default rack");
    let mut config = EngineConfig::default();
    config.solver.planar = true;
    BilliardState::new(table.scene(balls), &config).expect("valid scene")
}

fn broken_state() -> BilliardState {
    let mut state = racked_state();
    state
        .strike(CUE_BALL_ID, &Cue::default(), 6.0, -90.0, 0.0, DVec2::ZERO)
        .expect("cue ball exists");
    // Move past the strike so every ball is in a real regime
    for _ in 0..3 {
        state.advance_to_next_event();
    }
    state
}

fn bench_next_event(c: &mut Criterion) {
    let state = broken_state();
    c.bench_function("next_event_racked_table", |b| {
        b.iter(|| black_box(&state).predict_next_event())
    });
}

fn bench_break_to_rest(c: &mut Criterion) {
    let mut group = c.benchmark_group("break_shot");
    group.sample_size(20);

    group.bench_function("events_until_rest", |b| {
        b.iter(|| {
            let mut state = broken_state();
            let mut events = 0usize;
            while !state.advance_to_next_event().is_none() && events < 100_000 {
                events += 1;
            }
            black_box(events)
        })
    });

    group.finish();
}

fn bench_previews(c: &mut Criterion) {
    let mut group = c.benchmark_group("strike_previews");
    let state = racked_state();
    let options = TrajectoryOptions::default();

    for count in [1usize, 8, 32] {
        let commands: Vec<StrikeCommand> = (0..count)
            .map(|i| {
                StrikeCommand::new(CUE_BALL_ID, 3.0, Cue::default()).with_transform(CueTransform {
                    yaw: -90.0 + (i as f64 - count as f64 * 0.5) * 0.5,
                    pitch: 0.0,
                    offset: DVec2::ZERO,
                })
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &commands, |b, commands| {
            b.iter(|| preview_many(black_box(&state), black_box(commands), &options))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_next_event, bench_break_to_rest, bench_previews);
criterion_main!(benches);
