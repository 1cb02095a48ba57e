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
//! Next-event prediction
//!
//! All contact tests share one form. With the cached coefficients a ball
//! centre follows `P(t) = A·t² + B·t + C`, so contact at distance `D` is the
//! smallest root of the quartic
//!
//! ```text
//! ‖A·t² + B·t + C‖² - D² = 0
//! ```
//!
//! Ball-ball tests use coefficient differences, point and pocket tests use the
//! ball against a fixed point, and cushion tests cross every coefficient with
//! the cushion direction to get the distance to the infinite line.
//!
//! Candidates are scanned in a fixed order: regime transitions, ball pairs,
//! pockets, cushions. A later candidate wins only when strictly earlier, and a
//! zero-time candidate ends the scan.

use super::polynomial::Poly4;
use super::PhysicsSolver;
use crate::objects::{Ball, Cushion, Hole, MotionType};
use crate::scene::PhysicsScene;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Upper limit on how far ahead contacts are searched (s)
pub const MAX_EVENT_HORIZON: f64 = 1e4;

/// Kind of a predicted event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EventType {
    /// Nothing will happen
    #[default]
    None,
    /// A ball changes motion regime
    StateTransition,
    /// Two balls touch
    BallCollision,
    /// A ball touches a cushion segment or one of its endpoints
    CushionCollision,
    /// A ball enters a pocket's capture region
    PocketCollision,
}

/// Earliest predicted occurrence in a scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Time until the event, `f64::INFINITY` when there is none
    pub time: f64,
    /// Index of the primary ball
    pub ball_index: usize,
    /// Index of the other ball, cushion or hole
    pub other_index: Option<usize>,
    /// Cushion endpoint hit, if the contact is with a vertex
    pub vertex_index: Option<usize>,
    /// Event kind
    pub kind: EventType,
    /// Regime entered, for state transitions only
    pub motion: Option<MotionType>,
}

impl Event {
    /// The "nothing happens" event
    pub fn none() -> Self {
        Event {
            time: f64::INFINITY,
            ball_index: 0,
            other_index: None,
            vertex_index: None,
            kind: EventType::None,
            motion: None,
        }
    }

    /// Whether this is the "nothing happens" event
    pub fn is_none(&self) -> bool {
        self.kind == EventType::None
    }
}

impl Default for Event {
    fn default() -> Self {
        Event::none()
    }
}

impl PhysicsSolver {
    /// Smallest `t` in `[0, bound]` with `‖A·t² + B·t + C‖ = D`
    pub fn contact_time(&self, a: DVec3, b: DVec3, c: DVec3, d: f64, bound: f64) -> Option<f64> {
        let poly = Poly4::new(
            a.dot(a),
            2.0 * a.dot(b),
            2.0 * a.dot(c) + b.dot(b),
            2.0 * b.dot(c),
            c.dot(c) - d * d,
        );
        poly.smallest_root(bound, self.constants.polynomial_error_bound)
            .filter(|t| *t >= 0.0)
    }

    /// Time until two balls touch
    ///
    /// Touching or overlapping balls that are not separating collide now.
    pub fn ball_to_ball_time(&self, b1: &Ball, b2: &Ball, bound: f64) -> Option<f64> {
        let offset = b1.position - b2.position;
        let reach = b1.radius() + b2.radius();
        let closing = offset.dot(b1.velocity - b2.velocity);
        if offset.length() - reach <= 0.0 && closing <= 0.0 {
            return Some(0.0);
        }

        self.contact_time(
            b1.acceleration_coefficient - b2.acceleration_coefficient,
            b1.velocity_coefficient - b2.velocity_coefficient,
            offset,
            reach,
            bound,
        )
    }

    /// Time until a ball touches a fixed point
    ///
    /// Overlapping the point while not moving away from it is a contact now.
    pub fn ball_to_point_time(&self, ball: &Ball, point: DVec3, bound: f64) -> Option<f64> {
        let offset = ball.position - point;
        if offset.length() < ball.radius() && offset.dot(ball.velocity) <= 0.0 {
            return Some(0.0);
        }
        self.contact_time(
            ball.acceleration_coefficient,
            ball.velocity_coefficient,
            ball.position - point,
            ball.radius(),
            bound,
        )
    }

    /// Time until a ball centre is within capture distance of a hole
    pub fn ball_to_pocket_time(&self, ball: &Ball, hole: &Hole, bound: f64) -> Option<f64> {
        let reach = ball.radius() + hole.radius();
        if (ball.position - hole.position()).length() < reach {
            return Some(0.0);
        }
        self.contact_time(
            ball.acceleration_coefficient,
            ball.velocity_coefficient,
            ball.position - hole.position(),
            reach,
            bound,
        )
    }

    /// Lift applied to cushion geometry; contact lines sit at cushion height
    /// unless the simulation is planar
    pub(crate) fn cushion_lift(&self, cushion: &Cushion) -> DVec3 {
        if self.constants.planar {
            DVec3::ZERO
        } else {
            DVec3::Y * cushion.height()
        }
    }

    /// Time until a ball touches a cushion, and which endpoint if any
    ///
    /// The infinite line is tested first. A line contact landing outside the
    /// segment, or no line contact at all, falls back to endpoint `0` and
    /// then endpoint `1`; the first endpoint with a contact wins.
    pub fn ball_to_cushion_time(
        &self,
        ball: &Ball,
        cushion: &Cushion,
        bound: f64,
    ) -> Option<(f64, Option<usize>)> {
        let lift = self.cushion_lift(cushion);
        let p0 = cushion.vertex(0) + lift;
        let dir = cushion.direction();
        let radius = ball.radius();

        let closest = cushion.closest_point(ball.position, lift);
        let offset = ball.position - closest;
        if offset.length() < radius && offset.dot(ball.velocity) <= 0.0 {
            return Some((0.0, None));
        }

        let line_time = self.contact_time(
            ball.acceleration_coefficient.cross(dir),
            ball.velocity_coefficient.cross(dir),
            (ball.position - p0).cross(dir),
            radius,
            bound,
        );

        if let Some(t) = line_time {
            let position = ball.predicted_position(t);
            let closest = cushion.closest_point(position, lift);
            if (closest - position).length() - radius < self.constants.cushion_error_tolerance {
                return Some((t, None));
            }
        }

        (0..2).find_map(|vertex| {
            self.ball_to_point_time(ball, cushion.vertex(vertex) + lift, bound)
                .map(|t| (t, Some(vertex)))
        })
    }

    /// Earliest event in the scene
    ///
    /// Pure: calling it twice on an unchanged scene gives identical results.
    pub fn next_event(&self, scene: &PhysicsScene) -> Event {
        let balls = &scene.balls;
        let mut event = Event::none();

        for (i, ball) in balls.iter().enumerate() {
            let (time, motion) = self.motion_transition(ball);
            if time >= event.time {
                continue;
            }
            event = Event {
                time,
                ball_index: i,
                other_index: None,
                vertex_index: None,
                kind: EventType::StateTransition,
                motion: Some(motion),
            };
            if time == 0.0 {
                return event;
            }
        }

        for i in 0..balls.len() {
            if !balls[i].is_in_play() {
                continue;
            }
            for j in (i + 1)..balls.len() {
                if !balls[j].is_in_play() {
                    continue;
                }
                if !MotionType::is_moving_mask(balls[i].motion.bits() | balls[j].motion.bits()) {
                    continue;
                }
                let bound = event.time.min(MAX_EVENT_HORIZON);
                let Some(time) = self.ball_to_ball_time(&balls[i], &balls[j], bound) else {
                    continue;
                };
                if time >= event.time {
                    continue;
                }
                event = Event {
                    time,
                    ball_index: i,
                    other_index: Some(j),
                    vertex_index: None,
                    kind: EventType::BallCollision,
                    motion: None,
                };
                if time == 0.0 {
                    return event;
                }
            }
        }

        for (i, ball) in balls.iter().enumerate() {
            if !ball.is_in_play() || !ball.motion.is_moving() {
                continue;
            }
            for (j, hole) in scene.holes.iter().enumerate() {
                let bound = event.time.min(MAX_EVENT_HORIZON);
                let Some(time) = self.ball_to_pocket_time(ball, hole, bound) else {
                    continue;
                };
                if time >= event.time {
                    continue;
                }
                event = Event {
                    time,
                    ball_index: i,
                    other_index: Some(j),
                    vertex_index: None,
                    kind: EventType::PocketCollision,
                    motion: None,
                };
                if time == 0.0 {
                    return event;
                }
            }
        }

        for (i, ball) in balls.iter().enumerate() {
            if !ball.is_in_play() || !ball.motion.is_moving() {
                continue;
            }
            for (j, cushion) in scene.cushions.iter().enumerate() {
                let bound = event.time.min(MAX_EVENT_HORIZON);
                let Some((time, vertex)) = self.ball_to_cushion_time(ball, cushion, bound) else {
                    continue;
                };
                if time >= event.time {
                    continue;
                }
                event = Event {
                    time,
                    ball_index: i,
                    other_index: Some(j),
                    vertex_index: vertex,
                    kind: EventType::CushionCollision,
                    motion: None,
                };
                if time == 0.0 {
                    return event;
                }
            }
        }

        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConstants;
    use glam::DQuat;

    const R: f64 = 0.03;

    fn solver() -> PhysicsSolver {
        let mut constants = SolverConstants::default();
        constants.planar = true;
        PhysicsSolver::new(constants)
    }

    fn moving_ball(s: &PhysicsSolver, id: u32, position: DVec3, velocity: DVec3) -> Ball {
        let mut ball = Ball::new(id, position, DQuat::IDENTITY, 0.17, R);
        ball.velocity = velocity;
        ball.angular_velocity = DVec3::Y.cross(velocity) / R;
        s.settle(&mut ball);
        assert_eq!(ball.motion, MotionType::Rolling);
        ball
    }

    #[test]
    fn test_event_none() {
        let e = Event::none();
        assert!(e.is_none());
        assert!(e.time.is_infinite());
    }

    #[test]
    fn test_empty_scene_has_no_event() {
        let s = solver();
        let scene = PhysicsScene::new(vec![], vec![], vec![]);
        assert!(s.next_event(&scene).is_none());
    }

    #[test]
    fn test_stationary_scene_has_no_event() {
        let s = solver();
        let a = Ball::new(0, DVec3::ZERO, DQuat::IDENTITY, 0.17, R);
        let b = Ball::new(1, DVec3::new(1.0, 0.0, 0.0), DQuat::IDENTITY, 0.17, R);
        let scene = PhysicsScene::new(vec![a, b], vec![], vec![]);
        assert!(s.next_event(&scene).is_none());
    }

    #[test]
    fn test_touching_and_closing_is_immediate() {
        let s = solver();
        let a = moving_ball(&s, 0, DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0));
        let b = Ball::new(1, DVec3::new(2.0 * R, 0.0, 0.0), DQuat::IDENTITY, 0.17, R);
        assert_eq!(s.ball_to_ball_time(&a, &b, 10.0), Some(0.0));
    }

    #[test]
    fn test_separating_pair_has_no_contact() {
        let s = solver();
        let a = moving_ball(&s, 0, DVec3::ZERO, DVec3::new(-1.0, 0.0, 0.0));
        let b = Ball::new(1, DVec3::new(0.5, 0.0, 0.0), DQuat::IDENTITY, 0.17, R);
        assert!(s.ball_to_ball_time(&a, &b, 5.0).is_none());
    }

    #[test]
    fn test_ball_to_ball_time_matches_kinematics() {
        let s = solver();
        let a = moving_ball(&s, 0, DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0));
        let b = Ball::new(1, DVec3::new(0.3, 0.0, 0.0), DQuat::IDENTITY, 0.17, R);
        let t = s.ball_to_ball_time(&a, &b, 10.0).unwrap();
        let gap = (a.predicted_position(t) - b.position).length();
        assert!((gap - 2.0 * R).abs() < 1e-6);
    }

    #[test]
    fn test_pocket_overlap_is_immediate() {
        let s = solver();
        let hole = Hole::new(0, 0.05, DVec3::new(0.06, 0.0, 0.0));
        let a = moving_ball(&s, 0, DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(s.ball_to_pocket_time(&a, &hole, 10.0), Some(0.0));
    }

    #[test]
    fn test_cushion_line_contact() {
        let s = solver();
        let cushion = Cushion::new(0, DVec3::new(-1.0, 0.0, 0.5), DVec3::new(1.0, 0.0, 0.5), 0.0);
        let a = moving_ball(&s, 0, DVec3::ZERO, DVec3::new(0.0, 0.0, 1.0));
        let (t, vertex) = s.ball_to_cushion_time(&a, &cushion, 10.0).unwrap();
        assert_eq!(vertex, None);
        let z = a.predicted_position(t).z;
        assert!((z - (0.5 - R)).abs() < 1e-6);
    }

    #[test]
    fn test_cushion_vertex_contact() {
        let s = solver();
        // Segment ends short of the ball path; only its endpoint can be hit
        let cushion = Cushion::new(0, DVec3::new(0.02, 0.0, 0.5), DVec3::new(1.0, 0.0, 0.5), 0.0);
        let a = moving_ball(&s, 0, DVec3::ZERO, DVec3::new(0.0, 0.0, 1.0));
        let (t, vertex) = s.ball_to_cushion_time(&a, &cushion, 10.0).unwrap();
        assert_eq!(vertex, Some(0));
        let d = (a.predicted_position(t) - cushion.vertex(0)).length();
        assert!((d - R).abs() < 1e-6);
    }

    #[test]
    fn test_cushion_vertex_zero_checked_first() {
        let s = solver();
        // Endpoint 1 is reached first, but endpoint 0 also has a contact
        let cushion = Cushion::new(0, DVec3::new(0.02, 0.0, 0.6), DVec3::new(0.02, 0.0, 0.3), 0.0);
        let a = moving_ball(&s, 0, DVec3::ZERO, DVec3::new(0.0, 0.0, 1.0));
        assert!(s.ball_to_point_time(&a, cushion.vertex(1), 10.0).is_some());

        let (t, vertex) = s.ball_to_cushion_time(&a, &cushion, 10.0).unwrap();
        assert_eq!(vertex, Some(0));
        let d = (a.predicted_position(t) - cushion.vertex(0)).length();
        assert!((d - R).abs() < 1e-6);
    }

    #[test]
    fn test_cushion_overlap_only_immediate_when_closing() {
        let s = solver();
        let cushion = Cushion::new(0, DVec3::new(-1.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0), 0.0);
        let position = DVec3::new(0.0, 0.0, -(R - 0.001));

        let closing = moving_ball(&s, 0, position, DVec3::new(0.0, 0.0, 1.0));
        assert_eq!(s.ball_to_cushion_time(&closing, &cushion, 10.0), Some((0.0, None)));

        let leaving = moving_ball(&s, 0, position, DVec3::new(0.0, 0.0, -1.0));
        let hit = s.ball_to_cushion_time(&leaving, &cushion, 10.0);
        assert!(hit.map_or(true, |(t, _)| t > 0.0), "immediate re-hit {:?}", hit);
    }

    #[test]
    fn test_point_overlap_only_immediate_when_closing() {
        let s = solver();
        let point = DVec3::ZERO;
        let position = DVec3::new(R - 0.001, 0.0, 0.0);

        let closing = moving_ball(&s, 0, position, DVec3::new(-1.0, 0.0, 0.0));
        assert_eq!(s.ball_to_point_time(&closing, point, 10.0), Some(0.0));

        let leaving = moving_ball(&s, 0, position, DVec3::new(1.0, 0.0, 0.0));
        let hit = s.ball_to_point_time(&leaving, point, 10.0);
        assert!(hit.map_or(true, |t| t > 0.0), "immediate re-hit {:?}", hit);
    }

    #[test]
    fn test_cushion_missed_entirely() {
        let s = solver();
        let cushion = Cushion::new(0, DVec3::new(0.5, 0.0, 0.5), DVec3::new(1.0, 0.0, 0.5), 0.0);
        let a = moving_ball(&s, 0, DVec3::ZERO, DVec3::new(0.0, 0.0, 1.0));
        assert!(s.ball_to_cushion_time(&a, &cushion, 10.0).is_none());
    }

    #[test]
    fn test_transition_wins_ties_by_scan_order() {
        let s = solver();
        let mut a = moving_ball(&s, 0, DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0));
        a.state = crate::objects::BallState::Struck;
        let b = moving_ball(&s, 1, DVec3::new(2.0 * R, 0.0, 0.0), DVec3::new(-1.0, 0.0, 0.0));
        let scene = PhysicsScene::new(vec![a, b], vec![], vec![]);
        let e = s.next_event(&scene);
        assert_eq!(e.kind, EventType::StateTransition);
        assert_eq!(e.time, 0.0);
    }
}
