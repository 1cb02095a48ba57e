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
//! Event batch job
//!
//! One execution of [`PhysicsJob`] applies the event left pending by the
//! previous batch, then predicts and applies events until either
//! `min_event_time` seconds of simulated time are covered or
//! `max_events_per_step` events have been produced. The last predicted event
//! of a batch is never applied by that batch; it stays pending so the caller
//! can interpolate up to it.

use crate::config::JobConstants;
use crate::scene::PhysicsScene;
use crate::solver::{Event, EventType, PhysicsSolver};

/// Events produced by one batch, in the order they were predicted
#[derive(Debug, Clone, Default)]
pub struct JobOutput {
    events: Vec<Event>,
}

impl JobOutput {
    /// Create an empty output with room for `capacity` events
    pub fn with_capacity(capacity: usize) -> Self {
        JobOutput {
            events: Vec::with_capacity(capacity),
        }
    }

    /// Event predicted last, or a none event for an empty output
    pub fn last_event(&self) -> Event {
        self.events.last().copied().unwrap_or_default()
    }

    /// All events of the batch
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events in the batch
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Forget every event, including the pending one
    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn push(&mut self, event: Event) {
        self.events.push(event);
    }
}

/// Batch runner owning the authoritative scene
#[derive(Debug, Clone)]
pub struct PhysicsJob {
    solver: PhysicsSolver,
    constants: JobConstants,
    scene: PhysicsScene,
    output: JobOutput,
}

impl PhysicsJob {
    /// Create a job over `scene`
    pub fn new(solver: PhysicsSolver, constants: JobConstants, scene: PhysicsScene) -> Self {
        PhysicsJob {
            solver,
            constants,
            scene,
            output: JobOutput::with_capacity(constants.max_events_per_step),
        }
    }

    /// Run one batch
    ///
    /// Returns the simulated time covered by the predicted events.
    pub fn execute(&mut self) -> f64 {
        let pending = self.output.last_event();
        self.solver.step(&mut self.scene, &pending);
        self.output.clear();

        let mut accumulated = 0.0;
        let mut iterations = 0;
        loop {
            let previous = self.output.last_event();
            self.solver.step(&mut self.scene, &previous);

            let next = self.solver.next_event(&self.scene);
            self.log_event(&next, iterations);
            self.output.push(next);

            accumulated += next.time.abs();
            iterations += 1;
            if accumulated >= self.constants.min_event_time
                || iterations >= self.constants.max_events_per_step
            {
                break;
            }
        }
        accumulated
    }

    fn log_event(&self, event: &Event, iteration: usize) {
        if !log::log_enabled!(log::Level::Debug) || event.is_none() {
            return;
        }
        let id = |index: usize| self.scene.balls.get(index).map_or(0, |b| b.identifier);
        match event.kind {
            EventType::StateTransition => {
                let from = self.scene.balls.get(event.ball_index).map(|b| b.motion);
                log::debug!(
                    "[{}] ball {} {:?} -> {:?} in {:.5}s",
                    iteration,
                    id(event.ball_index),
                    from,
                    event.motion,
                    event.time
                );
            }
            EventType::BallCollision => log::debug!(
                "[{}] ball {} hits ball {} in {:.5}s",
                iteration,
                id(event.ball_index),
                event.other_index.map_or(0, id),
                event.time
            ),
            EventType::CushionCollision => log::debug!(
                "[{}] ball {} hits cushion {} (vertex {:?}) in {:.5}s",
                iteration,
                id(event.ball_index),
                event.other_index.unwrap_or_default(),
                event.vertex_index,
                event.time
            ),
            EventType::PocketCollision => log::debug!(
                "[{}] ball {} drops into hole {} in {:.5}s",
                iteration,
                id(event.ball_index),
                event.other_index.unwrap_or_default(),
                event.time
            ),
            EventType::None => {}
        }
    }

    /// Solver used by the job
    pub fn solver(&self) -> &PhysicsSolver {
        &self.solver
    }

    /// Batch limits
    pub fn constants(&self) -> &JobConstants {
        &self.constants
    }

    /// Authoritative scene
    pub fn scene(&self) -> &PhysicsScene {
        &self.scene
    }

    /// Mutable access to the authoritative scene
    pub fn scene_mut(&mut self) -> &mut PhysicsScene {
        &mut self.scene
    }

    /// Output of the last batch
    pub fn output(&self) -> &JobOutput {
        &self.output
    }

    /// Drop the pending event so the next batch predicts from scratch
    pub fn discard_pending(&mut self) {
        self.output.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConstants;
    use crate::objects::{Ball, MotionType};
    use glam::{DQuat, DVec3};

    const R: f64 = 0.028575;

    fn planar_solver() -> PhysicsSolver {
        let mut constants = SolverConstants::default();
        constants.planar = true;
        PhysicsSolver::new(constants)
    }

    #[test]
    fn test_empty_output_has_none_event() {
        let output = JobOutput::default();
        assert!(output.is_empty());
        assert!(output.last_event().is_none());
    }

    #[test]
    fn test_resting_scene_predicts_nothing() {
        let ball = Ball::new(0, DVec3::ZERO, DQuat::IDENTITY, 0.17, R);
        let scene = PhysicsScene::new(vec![ball], vec![], vec![]);
        let mut job = PhysicsJob::new(planar_solver(), JobConstants::default(), scene);

        let covered = job.execute();
        assert!(covered.is_infinite());
        assert_eq!(job.output().len(), 1);
        assert!(job.output().last_event().is_none());
    }

    #[test]
    fn test_batch_leaves_last_event_pending() {
        let s = planar_solver();
        let mut ball = Ball::new(0, DVec3::ZERO, DQuat::IDENTITY, 0.17, R);
        ball.velocity = DVec3::new(0.5, 0.0, 0.0);
        ball.angular_velocity = DVec3::Y.cross(ball.velocity) / R;
        s.settle(&mut ball);
        let scene = PhysicsScene::new(vec![ball], vec![], vec![]);
        let mut job = PhysicsJob::new(s, JobConstants::default(), scene);

        job.execute();
        let pending = job.output().last_event();
        assert_eq!(pending.motion, Some(MotionType::Stationary));
        // Not yet applied
        assert_eq!(job.scene().balls[0].motion, MotionType::Rolling);

        job.execute();
        assert_eq!(job.scene().balls[0].motion, MotionType::Stationary);
        assert!(job.output().last_event().is_none());
    }

    #[test]
    fn test_batch_respects_event_cap() {
        let s = planar_solver();
        let constants = JobConstants {
            max_events_per_step: 1,
            min_event_time: 10.0,
        };
        let mut ball = Ball::new(0, DVec3::ZERO, DQuat::IDENTITY, 0.17, R);
        ball.velocity = DVec3::new(1.0, 0.0, 0.0);
        s.settle(&mut ball);
        let scene = PhysicsScene::new(vec![ball], vec![], vec![]);
        let mut job = PhysicsJob::new(s, constants, scene);

        job.execute();
        assert_eq!(job.output().len(), 1);
    }

    #[test]
    fn test_discard_pending() {
        let s = planar_solver();
        let mut ball = Ball::new(0, DVec3::ZERO, DQuat::IDENTITY, 0.17, R);
        ball.velocity = DVec3::new(1.0, 0.0, 0.0);
        s.settle(&mut ball);
        let scene = PhysicsScene::new(vec![ball], vec![], vec![]);
        let mut job = PhysicsJob::new(s, JobConstants::default(), scene);

        job.execute();
        assert!(!job.output().is_empty());
        job.discard_pending();
        assert!(job.output().is_empty());
    }
}
