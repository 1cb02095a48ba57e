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
//! Aiming previews
//!
//! Sweeps the cue around the cue ball and prints, for each angle, where the
//! cue ball first makes contact and where the object ball is sent. The real
//! state is never advanced.

use billiard_physics::builders::{eight_pool_table, RackConfig, TableDimensions, CUE_BALL_ID};
use billiard_physics::trajectory::{preview_many, TrajectoryOptions};
use billiard_physics::{
    Ball, BilliardState, Cue, CueTransform, EngineConfig, EventType, PhysicsResult, StrikeCommand,
};
use glam::{DQuat, DVec2, DVec3};

fn main() -> PhysicsResult<()> {
    env_logger::init();

    println!("Billiard Physics - Trajectory Preview");
    println!("=====================================\n");

    let dimensions = TableDimensions::default();
    let table = eight_pool_table(&dimensions)?;
    let rack = RackConfig::default();

    let cue_ball = Ball::try_new(
        CUE_BALL_ID,
        dimensions.head_spot(),
        DQuat::IDENTITY,
        rack.ball_mass,
        rack.ball_radius,
    )?;
    let object = Ball::try_new(
        8,
        DVec3::new(-0.3, 0.0, 0.12),
        DQuat::IDENTITY,
        rack.ball_mass,
        rack.ball_radius,
    )?;

    let mut config = EngineConfig::from_env()?;
    config.solver.planar = true;
    let state = BilliardState::new(table.scene(vec![cue_ball, object]), &config)?;

    let commands: Vec<StrikeCommand> = (-6..=6)
        .map(|step| {
            StrikeCommand::new(CUE_BALL_ID, 2.5, Cue::default()).with_transform(CueTransform {
                yaw: -90.0 + step as f64 * 2.0,
                pitch: 0.0,
                offset: DVec2::ZERO,
            })
        })
        .collect();

    let options = TrajectoryOptions::default();
    for (command, result) in commands.iter().zip(preview_many(&state, &commands, &options)) {
        let trajectory = result?;
        let yaw = command.transform.yaw;
        match (trajectory.collision, trajectory.ghost) {
            (EventType::None, _) | (_, None) => {
                println!("yaw {:+6.1}: no contact, path {:.2} m", yaw, trajectory.length());
            }
            (kind, Some(ghost)) => {
                let guide = trajectory
                    .guide
                    .map(|(from, to)| format!("({:+.3}, {:+.3})", to.x - from.x, to.z - from.z))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "yaw {:+6.1}: {:?} at ({:+.3}, {:+.3}), guide {}",
                    yaw, kind, ghost.x, ghost.z, guide
                );
            }
        }
    }

    Ok(())
}
