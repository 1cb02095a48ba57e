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
//! Strike previews
//!
//! A preview forks the state, executes a strike on the fork and walks it
//! event by event until the first collision. The caller's state is never
//! touched, so previews can be recomputed every frame while aiming.
//!
//! # Parallelism
//!
//! With the `parallel` feature, [`preview_many`] evaluates candidate strikes
//! on the Rayon global pool. Each candidate works on its own fork, so no
//! state is shared between threads.

use crate::commands::{BilliardCommand, StrikeCommand};
use crate::error::PhysicsResult;
use crate::solver::EventType;
use crate::state::BilliardState;
use glam::DVec3;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Tuning for [`preview`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryOptions {
    /// Events walked before giving up
    pub max_iterations: usize,
    /// Guide length per unit of speed (s)
    pub velocity_factor: f64,
    /// Upper bound on the guide length (m)
    pub max_guide_length: f64,
    /// Points closer than this on the table plane are merged (m)
    pub min_point_distance: f64,
    /// Points sampled along each segment between events
    pub segment_samples: usize,
}

impl Default for TrajectoryOptions {
    fn default() -> Self {
        TrajectoryOptions {
            max_iterations: 1000,
            velocity_factor: 1.0,
            max_guide_length: 0.5,
            min_point_distance: 0.01,
            segment_samples: 8,
        }
    }
}

/// Predicted path of a struck ball up to its first collision
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    /// Struck ball
    pub ball_id: u32,
    /// Path of the struck ball centre
    pub points: Vec<DVec3>,
    /// Struck ball position at the first collision
    pub ghost: Option<DVec3>,
    /// Direction guide after the collision: the object ball's departure for
    /// ball contacts, the rebound for cushion contacts
    pub guide: Option<(DVec3, DVec3)>,
    /// Kind of the first collision, `EventType::None` if there was none
    pub collision: EventType,
    /// The strike was a miscue
    pub miscue: bool,
}

impl Trajectory {
    fn add_point(&mut self, point: DVec3, min_distance: f64) {
        if let Some(last) = self.points.last() {
            let dx = last.x - point.x;
            let dz = last.z - point.z;
            if (dx * dx + dz * dz).sqrt() < min_distance {
                return;
            }
        }
        self.points.push(point);
    }

    /// Total length of the path (m)
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// Guide segment starting at `position` along `velocity`
fn guide(position: DVec3, velocity: DVec3, options: &TrajectoryOptions) -> Option<(DVec3, DVec3)> {
    let length = velocity.length() * options.velocity_factor;
    if length <= 1e-5 {
        return None;
    }
    let length = length.clamp(0.0, options.max_guide_length);
    Some((position, position + velocity.normalize_or_zero() * length))
}

/// Preview `command` on a fork of `state`
pub fn preview(
    state: &BilliardState,
    command: &StrikeCommand,
    options: &TrajectoryOptions,
) -> PhysicsResult<Trajectory> {
    let mut fork = state.fork();
    let mut trajectory = Trajectory {
        ball_id: command.ball_id,
        ..Trajectory::default()
    };

    let start = fork.physics_ball(command.ball_id)?;
    trajectory.points.push(start.position);
    if !command.execute(&mut fork)? {
        trajectory.miscue = true;
        return Ok(trajectory);
    }

    let index = fork
        .scene()
        .ball_index(command.ball_id)
        .unwrap_or_default();
    let samples = options.segment_samples.max(1);

    for _ in 0..options.max_iterations {
        let before = fork.physics_balls()[index];
        let event = fork.advance_to_next_event();
        if event.is_none() {
            break;
        }

        if before.is_in_play() && event.time > 0.0 {
            for k in 1..samples {
                let t = event.time * k as f64 / samples as f64;
                trajectory.add_point(before.predicted_position(t), options.min_point_distance);
            }
        }
        let ball = fork.physics_balls()[index];

        match event.kind {
            EventType::BallCollision => {
                let first = event.ball_index;
                let other = event.other_index.unwrap_or(first);
                let object_index = if first == index { other } else { first };
                let object = fork.physics_balls()[object_index];
                trajectory.guide = guide(object.position, object.velocity, options);
            }
            EventType::CushionCollision => {
                trajectory.guide = guide(ball.position, ball.velocity, options);
            }
            EventType::PocketCollision | EventType::StateTransition | EventType::None => {}
        }

        trajectory.add_point(ball.position, options.min_point_distance);
        if event.kind != EventType::StateTransition {
            trajectory.ghost = Some(ball.position);
            trajectory.collision = event.kind;
            break;
        }
    }

    if trajectory.collision == EventType::None {
        let ball = fork.physics_balls()[index];
        trajectory.add_point(ball.position, options.min_point_distance);
    }

    log::trace!(
        "Preview for ball {}: {} points, first collision {:?}",
        trajectory.ball_id,
        trajectory.points.len(),
        trajectory.collision
    );
    Ok(trajectory)
}

/// Preview several candidate strikes, each on its own fork
pub fn preview_many(
    state: &BilliardState,
    commands: &[StrikeCommand],
    options: &TrajectoryOptions,
) -> Vec<PhysicsResult<Trajectory>> {
    #[cfg(feature = "parallel")]
    {
        commands
            .par_iter()
            .map(|command| preview(state, command, options))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        commands
            .iter()
            .map(|command| preview(state, command, options))
            .collect()
    }
}
