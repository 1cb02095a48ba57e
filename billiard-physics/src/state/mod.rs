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
//! Billiard state orchestration
//!
//! [`BilliardState`] couples the event batch job with a frame clock. The
//! authoritative scene only ever sits at event instants. Between them the
//! state keeps a second, temporary copy of the balls interpolated to the
//! current timer, which is what a presentation layer should draw.
//!
//! Each [`BilliardState::tick`] works in two stages:
//!
//! - when the timer has passed the pending event (or nothing is pending),
//!   it runs a batch: the pending event is applied and new events are
//!   predicted, and the timer restarts at zero
//! - then, if an event is pending, it moves the timer forward, never more
//!   than just past that event, and refreshes the temporary balls
//!
//! # Example
//!
//! ```
//! use billiard_physics::{Ball, BilliardState, Cue, EngineConfig, PhysicsScene};
//! use glam::{DQuat, DVec2, DVec3};
//!
//! let ball = Ball::new(0, DVec3::ZERO, DQuat::IDENTITY, 0.17, 0.028575);
//! let scene = PhysicsScene::new(vec![ball], vec![], vec![]);
//! let mut state = BilliardState::new(scene, &EngineConfig::default()).unwrap();
//!
//! assert!(state.strike(0, &Cue::default(), 1.0, 0.0, 0.0, DVec2::ZERO).unwrap());
//! let report = state.tick(1.0 / 60.0);
//! assert_eq!(report.stability_change, Some(false));
//! ```

pub mod job;
pub mod reset;

pub use job::{JobOutput, PhysicsJob};
pub use reset::ResetPoint;

use crate::commands::StrikeCommand;
use crate::config::EngineConfig;
use crate::error::{PhysicsError, PhysicsResult};
use crate::objects::{Ball, BallState, Cue, Kinematics};
use crate::scene::{validate_balls, PhysicsScene, SceneDescription};
use crate::solver::{Event, PhysicsSolver};
use glam::{DQuat, DVec2};

/// How far past the pending event an in-between step may move the timer (s)
pub const MINIMUM_INBETWEEN_STEP_DELTA: f64 = 1e-5;

/// What happened during one tick
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickReport {
    /// Events applied during the tick, in order
    pub events: Vec<Event>,
    /// `Some(false)` when motion started, `Some(true)` when the table came to rest
    pub stability_change: Option<bool>,
    /// Simulated time the temporary balls moved forward (s)
    pub advanced: f64,
}

/// Authoritative scene, temporary balls and frame clock
#[derive(Debug, Clone)]
pub struct BilliardState {
    job: PhysicsJob,
    balls: Vec<Ball>,
    timer: f64,
    stable: bool,
    event_log: Vec<Event>,
}

impl BilliardState {
    /// Create a state over `scene`
    ///
    /// Balls are reclassified from their velocities so their cached motion
    /// coefficients are consistent before the first prediction.
    pub fn new(mut scene: PhysicsScene, config: &EngineConfig) -> PhysicsResult<Self> {
        config.validate()?;
        scene.validate()?;

        let solver = PhysicsSolver::new(config.solver);
        for ball in scene.balls.iter_mut() {
            prepare(&solver, ball);
        }
        let balls = scene.balls.clone();

        Ok(BilliardState {
            job: PhysicsJob::new(solver, config.job, scene),
            balls,
            timer: 0.0,
            stable: true,
            event_log: Vec::new(),
        })
    }

    /// Create a state from a placement description and its configuration
    pub fn from_description(description: &SceneDescription) -> PhysicsResult<Self> {
        let scene = description.build_scene()?;
        Self::new(scene, &description.config)
    }

    /// Independent deep copy for what-if simulation
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Advance the clock by `dt` seconds of wall time
    ///
    /// A tick that starts a new batch still spends `dt` moving toward the
    /// batch's pending event.
    pub fn tick(&mut self, dt: f64) -> TickReport {
        let mut report = if self.is_stationary() {
            self.run_batch()
        } else {
            TickReport::default()
        };
        if !self.is_stationary() {
            report.advanced = self.inbetween_step(dt);
        }
        report
    }

    /// Run one batch immediately, whatever the timer says
    ///
    /// Returns the new pending event.
    pub fn step(&mut self) -> Event {
        self.run_batch();
        self.job.output().last_event()
    }

    /// Predict and apply exactly one event
    ///
    /// Any pending event is dropped and the timer restarts. The stability
    /// flag is left alone, so this is meant for forks driven event by event.
    pub fn advance_to_next_event(&mut self) -> Event {
        self.job.discard_pending();
        self.timer = 0.0;

        let solver = *self.job.solver();
        let event = solver.next_event(self.job.scene());
        solver.step(self.job.scene_mut(), &event);
        solver.interpolate(self.job.scene(), &mut self.balls, 0.0);
        if !event.is_none() {
            self.event_log.push(event);
        }
        event
    }

    /// Next event of the authoritative scene, without applying it
    pub fn predict_next_event(&self) -> Event {
        self.job.solver().next_event(self.job.scene())
    }

    /// Whether the timer has run past the pending event
    pub fn is_stationary(&self) -> bool {
        let last = self.job.output().last_event();
        last.is_none() || self.timer > last.time
    }

    /// Whether the table is at rest
    pub fn is_stable(&self) -> bool {
        self.stable
    }

    /// Time since the last applied event (s)
    pub fn timer(&self) -> f64 {
        self.timer
    }

    /// Solver used for prediction and resolution
    pub fn solver(&self) -> &PhysicsSolver {
        self.job.solver()
    }

    /// Authoritative scene
    pub fn scene(&self) -> &PhysicsScene {
        self.job.scene()
    }

    /// Authoritative balls, at the last applied event
    pub fn physics_balls(&self) -> &[Ball] {
        &self.job.scene().balls
    }

    /// Display balls, at the current timer
    pub fn temporary_balls(&self) -> &[Ball] {
        &self.balls
    }

    /// Authoritative ball with `identifier`
    pub fn physics_ball(&self, identifier: u32) -> PhysicsResult<Ball> {
        self.job
            .scene()
            .ball(identifier)
            .copied()
            .ok_or(PhysicsError::UnknownBall(identifier))
    }

    /// Display ball with `identifier`
    pub fn temporary_ball(&self, identifier: u32) -> PhysicsResult<Ball> {
        self.balls
            .iter()
            .find(|b| b.identifier == identifier)
            .copied()
            .ok_or(PhysicsError::UnknownBall(identifier))
    }

    /// Events emitted since the last stability change
    pub fn cached_events(&self) -> &[Event] {
        &self.event_log
    }

    /// Replace the ball with the same identifier
    pub fn set_physics_ball(&mut self, ball: Ball) -> PhysicsResult<()> {
        validate_balls(std::slice::from_ref(&ball))?;
        let index = self.index_of(ball.identifier)?;

        self.commit_progress();
        let mut ball = ball;
        prepare(self.job.solver(), &mut ball);
        self.job.scene_mut().balls[index] = ball;
        self.balls[index] = ball;
        Ok(())
    }

    /// Replace every ball and restart the clock
    pub fn reset(&mut self, balls: &[Ball]) -> PhysicsResult<()> {
        validate_balls(balls)?;

        let solver = *self.job.solver();
        let mut balls = balls.to_vec();
        for ball in balls.iter_mut() {
            prepare(&solver, ball);
        }
        self.balls.clone_from(&balls);
        self.job.scene_mut().balls = balls;
        self.job.discard_pending();
        self.event_log.clear();
        self.timer = 0.0;
        Ok(())
    }

    /// Strike ball `identifier` with `cue`
    ///
    /// Returns `Ok(false)` on a miscue, leaving the ball untouched.
    pub fn strike(
        &mut self,
        identifier: u32,
        cue: &Cue,
        speed: f64,
        yaw_deg: f64,
        pitch_deg: f64,
        offset: DVec2,
    ) -> PhysicsResult<bool> {
        let index = self.index_of(identifier)?;
        let state = self.job.scene().balls[index].state;
        if state != BallState::Normal {
            return Err(PhysicsError::BallNotStrikeable {
                id: identifier,
                state,
            });
        }

        self.commit_progress();
        let solver = *self.job.solver();
        let mut ball = self.job.scene().balls[index];
        if !solver.resolve_ball_cue_impact(&mut ball, cue, speed, yaw_deg, pitch_deg, offset) {
            log::warn!("Invalid strike on ball {}, miscue occurred", identifier);
            return Ok(false);
        }
        ball.state = BallState::Struck;

        log::debug!(
            "Ball {} struck at {:.2} m/s: velocity {:.2}, angular velocity {:.2}",
            identifier,
            speed,
            ball.velocity.length(),
            ball.angular_velocity.length()
        );
        self.job.scene_mut().balls[index] = ball;
        let rotation = self.balls[index].rotation;
        self.balls[index] = ball;
        self.balls[index].rotation = rotation;
        Ok(true)
    }

    /// Put a pocketed ball back in play
    ///
    /// Returns `Ok(false)` if the ball is not pocketed.
    pub fn take_from_pocket(&mut self, identifier: u32, kinematics: Kinematics) -> PhysicsResult<bool> {
        let index = self.index_of(identifier)?;
        if self.job.scene().balls[index].state != BallState::Pocketed {
            return Ok(false);
        }
        if !(kinematics.position.is_finite()
            && kinematics.velocity.is_finite()
            && kinematics.angular_velocity.is_finite())
        {
            return Err(PhysicsError::InvalidParameter(format!(
                "Ball {} must be taken out of the pocket with finite kinematics",
                identifier
            )));
        }

        self.commit_progress();
        let solver = *self.job.solver();
        let mut ball = self.job.scene().balls[index];
        ball.state = BallState::Normal;
        solver.set_position(&mut ball, kinematics.position);
        solver.set_velocity(&mut ball, kinematics.velocity);
        solver.set_angular_velocity(&mut ball, kinematics.angular_velocity);
        solver.settle(&mut ball);

        log::info!("Ball {} taken out of the pocket", identifier);
        self.job.scene_mut().balls[index] = ball;
        self.balls[index] = ball;
        Ok(true)
    }

    /// Snapshot the authoritative balls
    ///
    /// The table must be at rest.
    pub fn create_reset_point(&self, command: Option<StrikeCommand>) -> PhysicsResult<ResetPoint> {
        if !(self.is_stationary() && self.stable) {
            return Err(PhysicsError::Unstable);
        }
        Ok(ResetPoint::new(self.physics_balls().to_vec(), command))
    }

    /// Reset to a snapshot; the stored command is not executed
    pub fn restore(&mut self, point: &ResetPoint) -> PhysicsResult<()> {
        self.reset(&point.balls)
    }

    fn index_of(&self, identifier: u32) -> PhysicsResult<usize> {
        self.job
            .scene()
            .ball_index(identifier)
            .ok_or(PhysicsError::UnknownBall(identifier))
    }

    fn run_batch(&mut self) -> TickReport {
        let mut events = Vec::new();
        let pending = self.job.output().last_event();
        if !pending.is_none() {
            events.push(pending);
        }

        self.job.execute();
        let solver = *self.job.solver();
        solver.interpolate(self.job.scene(), &mut self.balls, 0.0);

        let output = self.job.output();
        let applied = output.len().saturating_sub(1);
        events.extend(output.events()[..applied].iter().filter(|e| !e.is_none()));

        let stability_change = if !output.last_event().is_none() {
            self.timer = 0.0;
            self.stable.then_some(false)
        } else {
            (!self.stable).then_some(true)
        };
        if let Some(stable) = stability_change {
            self.stable = stable;
            self.event_log.clear();
            log::info!("Table is {}", if stable { "at rest" } else { "in motion" });
        }
        self.event_log.extend_from_slice(&events);

        TickReport {
            events,
            stability_change,
            advanced: 0.0,
        }
    }

    fn inbetween_step(&mut self, dt: f64) -> f64 {
        let pending = self.job.output().last_event();
        let target = (self.timer + dt).clamp(0.0, pending.time + MINIMUM_INBETWEEN_STEP_DELTA);
        let delta = target - self.timer;

        let solver = *self.job.solver();
        solver.interpolate(self.job.scene(), &mut self.balls, self.timer);
        for ball in self.balls.iter_mut().filter(|b| b.is_in_play()) {
            let spin = DQuat::from_scaled_axis(ball.angular_velocity * delta);
            ball.rotation = (spin * ball.rotation).normalize();
        }

        self.timer += delta;
        delta
    }

    /// Move the authoritative scene up to the timer and drop the pending event
    ///
    /// A pending event the timer has already passed is applied first.
    fn commit_progress(&mut self) {
        let pending = self.job.output().last_event();
        if !pending.is_none() {
            let solver = *self.job.solver();
            if self.timer > pending.time {
                solver.step(self.job.scene_mut(), &pending);
                self.event_log.push(pending);
            } else if self.timer > 0.0 {
                let dt = self.timer;
                for ball in self.job.scene_mut().balls.iter_mut().filter(|b| b.is_in_play()) {
                    let mut next = solver.step_ball(ball, dt);
                    solver.cache_coefficients(&mut next);
                    *ball = next;
                }
            }
        }
        self.job.discard_pending();
        self.timer = 0.0;
    }
}

/// Reclassify balls that can move
fn prepare(solver: &PhysicsSolver, ball: &mut Ball) {
    if matches!(ball.state, BallState::Normal | BallState::Struck) {
        solver.settle(ball);
    }
}
