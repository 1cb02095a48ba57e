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
//! Break shot on a standard eight-ball table
//!
//! Racks fifteen balls, breaks with the cue ball and drives the frame clock
//! at 60 Hz until the table is at rest, then reports where everything ended.
//!
//! Set `RUST_LOG=debug` to see every event, or `BILLIARD_PHYSICS_CONFIG` to
//! load engine constants from a JSON file.

use billiard_physics::builders::{eight_pool_table, triangle_rack, RackConfig, TableDimensions, CUE_BALL_ID};
use billiard_physics::objects::{balls_outside_polygon, pocketed_balls};
use billiard_physics::{BilliardState, Cue, EngineConfig, EventType, PhysicsResult};
use glam::DVec2;

const FRAME: f64 = 1.0 / 60.0;
const MAX_FRAMES: usize = 60 * 120;

fn main() -> PhysicsResult<()> {
    env_logger::init();

    println!("Billiard Physics - Break Shot");
    println!("=============================\n");

    let config = EngineConfig::from_env()?;
    let dimensions = TableDimensions::default();
    let table = eight_pool_table(&dimensions)?;
    let rack = RackConfig {
        seed: 42,
        ..RackConfig::default()
    };
    let balls = triangle_rack(&rack)?;
    println!(
        "Table {:.2} x {:.2} m, {} balls, {} cushions, {} pockets",
        dimensions.length,
        dimensions.width,
        balls.len(),
        table.cushions.len(),
        table.holes.len()
    );

    let mut state = BilliardState::new(table.scene(balls), &config)?;

    // Head spot to apex is along -X; a touch of follow
    let hit = state.strike(CUE_BALL_ID, &Cue::default(), 7.0, -90.0, 2.0, DVec2::new(0.0, 0.2))?;
    if !hit {
        println!("Miscue!");
        return Ok(());
    }

    let mut collisions = 0;
    let mut cushions = 0;
    let mut frames = 0;
    while frames < MAX_FRAMES {
        let report = state.tick(FRAME);
        frames += 1;
        for event in &report.events {
            match event.kind {
                EventType::BallCollision => collisions += 1,
                EventType::CushionCollision => cushions += 1,
                EventType::PocketCollision => {
                    let ball = state.physics_balls()[event.ball_index];
                    println!("  ball {:>2} pocketed", ball.identifier);
                }
                EventType::StateTransition | EventType::None => {}
            }
        }
        if report.stability_change == Some(true) {
            break;
        }
    }

    println!("\nTable at rest after {} frames ({:.1} s)", frames, frames as f64 * FRAME);
    println!("  ball-ball collisions: {}", collisions);
    println!("  cushion contacts:     {}", cushions);

    let pocketed = pocketed_balls(state.physics_balls());
    println!("  pocketed:             {:?}", pocketed);
    let escaped = balls_outside_polygon(&table.playing_areas[0], state.physics_balls());
    if !escaped.is_empty() {
        println!("  off the table:        {:?}", escaped);
    }

    println!("\nFinal positions:");
    for ball in state.physics_balls() {
        if pocketed.contains(&ball.identifier) {
            continue;
        }
        println!(
            "  ball {:>2}: ({:+.3}, {:+.3})",
            ball.identifier, ball.position.x, ball.position.z
        );
    }

    Ok(())
}
