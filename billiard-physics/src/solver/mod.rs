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
//! Event-driven physics solver
//!
//! The solver never integrates with a fixed timestep. It predicts the exact
//! time of the next event, advances every ball in closed form to that
//! instant, and resolves the event:
//!
//! 1. [`PhysicsSolver::next_event`] scans transitions and contacts
//! 2. [`PhysicsSolver::step`] advances the scene and applies the event
//! 3. the affected balls are reclassified and their coefficients recached
//!
//! Between events, [`PhysicsSolver::interpolate`] produces display-only
//! copies of the balls at an arbitrary offset from the authoritative scene.

pub mod events;
pub mod impact;
pub mod motion;
pub mod polynomial;

pub use events::{Event, EventType, MAX_EVENT_HORIZON};
pub use motion::contact_point_velocity;
pub use polynomial::{Poly2, Poly4};

use crate::config::SolverConstants;
use crate::objects::{Ball, BallState, MotionType};
use crate::scene::PhysicsScene;
use glam::DVec3;

/// Closed-form billiard solver parameterised by its physical constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsSolver {
    constants: SolverConstants,
}

impl PhysicsSolver {
    /// Create a solver
    pub fn new(constants: SolverConstants) -> Self {
        PhysicsSolver { constants }
    }

    /// Constants in use
    pub fn constants(&self) -> &SolverConstants {
        &self.constants
    }

    /// Advance the scene to `event` and apply it
    ///
    /// Returns the contact point on the ball surface for ball and cushion
    /// collisions. A `None` event leaves the scene untouched.
    pub fn step(&self, scene: &mut PhysicsScene, event: &Event) -> Option<DVec3> {
        if event.is_none() {
            return None;
        }

        let dt = event.time.max(0.0);
        if dt > 0.0 {
            for ball in scene.balls.iter_mut().filter(|b| b.is_in_play()) {
                let mut next = self.step_ball(ball, dt);
                self.cache_coefficients(&mut next);
                *ball = next;
            }
        }

        let index = event.ball_index;
        let mut ball = *scene.balls.get(index)?;

        let contact = match event.kind {
            EventType::None => None,
            EventType::StateTransition => {
                if ball.state == BallState::Struck {
                    ball.state = BallState::Normal;
                }
                let motion = event.motion.unwrap_or(ball.motion);
                self.apply_transition(&mut ball, motion);
                None
            }
            EventType::PocketCollision => {
                ball.motion = MotionType::Stationary;
                ball.state = BallState::Pocketed;
                ball.velocity = DVec3::ZERO;
                ball.angular_velocity = DVec3::ZERO;
                log::info!(
                    "Ball {} pocketed in hole {}",
                    ball.identifier,
                    event.other_index.map_or(-1, |h| h as i64)
                );
                None
            }
            EventType::BallCollision => {
                let other_index = event.other_index?;
                let mut other = *scene.balls.get(other_index)?;
                let contact = self.resolve_ball_to_ball_impact(&mut ball, &mut other);
                scene.balls[other_index] = other;
                Some(contact)
            }
            EventType::CushionCollision => {
                let cushion = *scene.cushions.get(event.other_index?)?;
                let contact = match event.vertex_index {
                    Some(vertex) => self.resolve_ball_vertex_impact(&mut ball, &cushion, vertex),
                    None => self.resolve_ball_cushion_impact(&mut ball, &cushion),
                };
                Some(contact)
            }
        };

        self.cache_coefficients(&mut ball);
        scene.balls[index] = ball;
        contact
    }

    /// Put a ball into the regime chosen by a transition event
    fn apply_transition(&self, ball: &mut Ball, motion: MotionType) {
        ball.motion = motion;
        match motion {
            MotionType::Stationary => {
                ball.velocity = DVec3::ZERO;
                ball.angular_velocity = DVec3::ZERO;
            }
            MotionType::StationarySpin => {
                ball.velocity = DVec3::ZERO;
                ball.angular_velocity.x = 0.0;
                ball.angular_velocity.z = 0.0;
            }
            MotionType::Landing => self.resolve_ball_slate_impact(ball),
            MotionType::Rolling | MotionType::Sliding | MotionType::Airborne => {}
        }
    }

    /// Fill `balls` with the scene balls advanced by `dt`
    ///
    /// Orientation already present in `balls` is kept, and balls out of play
    /// are copied unchanged.
    pub fn interpolate(&self, scene: &PhysicsScene, balls: &mut [Ball], dt: f64) {
        for (target, source) in balls.iter_mut().zip(scene.balls.iter()) {
            let rotation = target.rotation;
            *target = if source.is_in_play() {
                self.step_ball(source, dt)
            } else {
                *source
            };
            target.rotation = rotation;
        }
    }
}
