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
//! Closed-form ball motion
//!
//! Every regime has an exact update for an arbitrary elapsed time and an
//! exact time until its terminal condition. With `g` gravity, `μs` sliding,
//! `μr` rolling and `μsp` spinning friction:
//!
//! ```text
//! contact velocity   u = v + ω × (-R·Y)
//! sliding time         = 2/7 · |u| / (g·μs)
//! rolling time         = |v| / (g·μr)
//! spinning time        = 2R / (5·μsp·g) · |ωy|
//! airborne time        = largest root of -½g·t² + vy·t + y
//! ```
//!
//! Position under any regime is quadratic in time, which is what the cached
//! velocity and acceleration coefficients capture for event prediction.
//!
//! # References
//!
//! - Alciatore, D. G. (2004). The Illustrated Principles of Pool and
//!   Billiards. Sterling. Technical proofs TP 4.1 and 4.2.
//! - Mathavan, S., Jackson, M. R., & Parkin, R. M. (2010). A theoretical
//!   analysis of billiard ball dynamics under cushion impacts. Proceedings of
//!   the IMechE Part C, 224(9), 1863-1873.

use super::polynomial::{Poly2, EPSILON};
use super::PhysicsSolver;
use crate::objects::{Ball, BallState, MotionType};
use glam::DVec3;

/// Velocity of the ball surface point touching the slate
pub fn contact_point_velocity(ball: &Ball) -> DVec3 {
    ball.velocity + ball.angular_velocity.cross(-DVec3::Y * ball.radius())
}

/// Sign that is zero at zero
fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl PhysicsSolver {
    /// Classify the regime implied by the ball's velocities
    ///
    /// Checked in order: vertical speed, contact-point slip, translation or
    /// horizontal spin, vertical spin.
    pub fn calculate_motion(&self, ball: &Ball) -> MotionType {
        let v = ball.velocity;
        let w = ball.angular_velocity;

        if v.y * v.y > EPSILON {
            return MotionType::Airborne;
        }
        if contact_point_velocity(ball).length_squared() > EPSILON {
            return MotionType::Sliding;
        }
        if v.length_squared() > EPSILON || w.x * w.x + w.z * w.z > EPSILON {
            return MotionType::Rolling;
        }
        if w.y * w.y > EPSILON {
            return MotionType::StationarySpin;
        }
        MotionType::Stationary
    }

    /// Time until the ball changes regime on its own, and the regime it enters
    ///
    /// `f64::INFINITY` means the regime never ends without an external impact.
    pub fn motion_transition(&self, ball: &Ball) -> (f64, MotionType) {
        match ball.state {
            BallState::Normal => {}
            BallState::Struck => return (0.0, self.calculate_motion(ball)),
            BallState::Pocketed | BallState::Invalid => {
                return (f64::INFINITY, MotionType::Stationary)
            }
        }

        match ball.motion {
            MotionType::Stationary => (f64::INFINITY, MotionType::Stationary),
            MotionType::Rolling => {
                let roll = self.rolling_time(ball);
                if self.spinning_time(ball) > roll {
                    (roll, MotionType::StationarySpin)
                } else {
                    (roll, MotionType::Stationary)
                }
            }
            MotionType::Sliding => (self.sliding_time(ball), MotionType::Rolling),
            MotionType::StationarySpin => (self.spinning_time(ball), MotionType::Stationary),
            MotionType::Airborne => (self.airborne_time(ball), MotionType::Landing),
            MotionType::Landing => (f64::INFINITY, MotionType::Landing),
        }
    }

    /// Time until the contact point stops slipping
    pub fn sliding_time(&self, ball: &Ball) -> f64 {
        let c = &self.constants;
        2.0 / 7.0 * contact_point_velocity(ball).length() / (c.gravity * c.sliding_friction)
    }

    /// Time until a rolling ball stops translating
    pub fn rolling_time(&self, ball: &Ball) -> f64 {
        let c = &self.constants;
        ball.velocity.length() / (c.gravity * c.rolling_friction)
    }

    /// Time until vertical spin decays
    pub fn spinning_time(&self, ball: &Ball) -> f64 {
        let c = &self.constants;
        2.0 * ball.radius() / (5.0 * c.spinning_friction * c.gravity) * ball.angular_velocity.y.abs()
    }

    /// Time until an airborne ball is back at slate height
    pub fn airborne_time(&self, ball: &Ball) -> f64 {
        let flight = Poly2::new(-0.5 * self.constants.gravity, ball.velocity.y, ball.position.y);
        match flight.largest_root() {
            Some(root) if root >= 0.0 => root,
            _ => f64::INFINITY,
        }
    }

    /// Advance a ball by `dt` under its current regime
    ///
    /// Orientation and the cached coefficients are left untouched.
    pub fn step_ball(&self, ball: &Ball, dt: f64) -> Ball {
        let c = &self.constants;
        let g = c.gravity;
        let radius = ball.radius();
        let spin_time = dt.min(self.spinning_time(ball));
        let spin_direction = sign(ball.angular_velocity.y);
        let mut next = *ball;

        match ball.motion {
            MotionType::Sliding => {
                let slip = contact_point_velocity(ball).normalize_or_zero();
                let factor = 5.0 / (2.0 * radius) * g;
                let spin_xz = c.sliding_friction * dt * DVec3::Y.cross(slip);
                let spin_y = c.spinning_friction * spin_time * spin_direction * DVec3::Y;

                self.set_position(
                    &mut next,
                    ball.position + ball.velocity * dt - 0.5 * c.sliding_friction * g * dt * dt * slip,
                );
                self.set_velocity(&mut next, ball.velocity - c.sliding_friction * g * dt * slip);
                self.set_angular_velocity(
                    &mut next,
                    ball.angular_velocity + factor * (spin_xz - spin_y),
                );
            }
            MotionType::Rolling => {
                let heading = ball.velocity.normalize_or_zero();
                let velocity = ball.velocity - c.rolling_friction * g * dt * heading;
                let factor = 5.0 / (2.0 * radius) * g * c.spinning_friction * spin_direction;
                let spin_xz = DVec3::Y.cross(velocity) / radius;
                let spin_y = (ball.angular_velocity.y - factor * spin_time) * DVec3::Y;

                self.set_position(
                    &mut next,
                    ball.position + ball.velocity * dt - 0.5 * c.rolling_friction * g * dt * dt * heading,
                );
                self.set_velocity(&mut next, velocity);
                self.set_angular_velocity(&mut next, spin_xz + spin_y);
            }
            MotionType::Airborne => {
                let v = ball.velocity;
                let height = ball.position.y + v.y * dt - 0.5 * g * dt * dt;
                self.set_position(
                    &mut next,
                    DVec3::new(ball.position.x + v.x * dt, height, ball.position.z + v.z * dt),
                );
                self.set_velocity(&mut next, DVec3::new(v.x, v.y - g * dt, v.z));
            }
            MotionType::Stationary => {
                next.velocity = DVec3::ZERO;
                next.angular_velocity = DVec3::ZERO;
            }
            MotionType::StationarySpin => {
                let factor = 5.0 / (2.0 * radius) * g * c.spinning_friction * spin_direction;
                self.set_angular_velocity(
                    &mut next,
                    ball.angular_velocity - factor * spin_time * DVec3::Y,
                );
            }
            // Waits in place for the slate impact
            MotionType::Landing => {}
        }
        next
    }

    /// Recompute the cached position polynomial for the ball's regime
    pub fn cache_coefficients(&self, ball: &mut Ball) {
        let c = &self.constants;
        let (velocity, acceleration) = match ball.motion {
            MotionType::Stationary | MotionType::StationarySpin | MotionType::Landing => {
                (DVec3::ZERO, DVec3::ZERO)
            }
            MotionType::Rolling => (
                ball.velocity,
                -0.5 * c.rolling_friction * c.gravity * ball.velocity.normalize_or_zero(),
            ),
            MotionType::Sliding => (
                ball.velocity,
                -0.5 * c.sliding_friction * c.gravity * contact_point_velocity(ball).normalize_or_zero(),
            ),
            MotionType::Airborne => (ball.velocity, -0.5 * c.gravity * DVec3::Y),
        };
        ball.velocity_coefficient = velocity;
        ball.acceleration_coefficient = acceleration;
    }

    /// Reclassify the regime and refresh the cached coefficients
    pub(crate) fn settle(&self, ball: &mut Ball) {
        ball.motion = self.calculate_motion(ball);
        self.cache_coefficients(ball);
    }

    /// Set position, keeping the ball on or above the slate
    pub(crate) fn set_position(&self, ball: &mut Ball, position: DVec3) {
        ball.position = DVec3::new(position.x, position.y.max(0.0), position.z);
    }

    /// Set velocity, dropping vertical motion in planar mode and clamping to
    /// zero below the sleep threshold
    pub(crate) fn set_velocity(&self, ball: &mut Ball, mut velocity: DVec3) {
        if self.constants.planar {
            velocity.y = 0.0;
        }
        let sleep = self.constants.sleep_velocity;
        ball.velocity = if velocity.length_squared() > sleep * sleep {
            velocity
        } else {
            DVec3::ZERO
        };
    }

    /// Set angular velocity, clamping to zero below the sleep threshold
    pub(crate) fn set_angular_velocity(&self, ball: &mut Ball, angular_velocity: DVec3) {
        let sleep = self.constants.sleep_angular_velocity;
        ball.angular_velocity = if angular_velocity.length_squared() > sleep * sleep {
            angular_velocity
        } else {
            DVec3::ZERO
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConstants;
    use glam::DQuat;

    const R: f64 = 0.028575;

    fn solver() -> PhysicsSolver {
        PhysicsSolver::new(SolverConstants::default())
    }

    fn rolling_ball(speed: f64) -> Ball {
        let mut ball = Ball::new(1, DVec3::ZERO, DQuat::IDENTITY, 0.17, R);
        ball.velocity = DVec3::new(speed, 0.0, 0.0);
        ball.angular_velocity = DVec3::Y.cross(ball.velocity) / R;
        ball
    }

    #[test]
    fn test_classification() {
        let s = solver();
        let mut ball = Ball::new(1, DVec3::ZERO, DQuat::IDENTITY, 0.17, R);
        assert_eq!(s.calculate_motion(&ball), MotionType::Stationary);

        ball.angular_velocity = DVec3::new(0.0, 3.0, 0.0);
        assert_eq!(s.calculate_motion(&ball), MotionType::StationarySpin);

        let ball = rolling_ball(0.5);
        assert_eq!(s.calculate_motion(&ball), MotionType::Rolling);

        let mut ball = rolling_ball(0.5);
        ball.angular_velocity = DVec3::ZERO;
        assert_eq!(s.calculate_motion(&ball), MotionType::Sliding);

        ball.velocity.y = 0.2;
        assert_eq!(s.calculate_motion(&ball), MotionType::Airborne);
    }

    #[test]
    fn test_rolling_transition_time() {
        let s = solver();
        let mut ball = rolling_ball(0.5);
        ball.motion = MotionType::Rolling;
        let (time, next) = s.motion_transition(&ball);
        assert_eq!(next, MotionType::Stationary);
        assert!((time - 0.5 / (9.81 * 0.015)).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_with_spin_ends_spinning() {
        let s = solver();
        let mut ball = rolling_ball(0.01);
        ball.angular_velocity.y = 50.0;
        ball.motion = MotionType::Rolling;
        assert_eq!(s.motion_transition(&ball).1, MotionType::StationarySpin);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let s = solver();
        let mut ball = rolling_ball(0.5);
        ball.state = BallState::Struck;
        assert_eq!(s.motion_transition(&ball), (0.0, MotionType::Rolling));
        ball.state = BallState::Pocketed;
        assert!(s.motion_transition(&ball).0.is_infinite());
        ball.state = BallState::Invalid;
        assert!(s.motion_transition(&ball).0.is_infinite());
    }

    #[test]
    fn test_sliding_reaches_rolling() {
        let s = solver();
        let mut ball = Ball::new(1, DVec3::ZERO, DQuat::IDENTITY, 0.17, R);
        ball.velocity = DVec3::new(2.0, 0.0, 0.0);
        ball.motion = s.calculate_motion(&ball);
        assert_eq!(ball.motion, MotionType::Sliding);

        let t = s.sliding_time(&ball);
        let after = s.step_ball(&ball, t);
        // Stun shot: 5/7 of the speed survives into natural roll
        assert!((after.velocity.x - 2.0 * 5.0 / 7.0).abs() < 1e-9);
        assert!(contact_point_velocity(&after).length() < 1e-9);
    }

    #[test]
    fn test_rolling_step_keeps_rolling_constraint() {
        let s = solver();
        let mut ball = rolling_ball(1.0);
        ball.motion = MotionType::Rolling;
        let after = s.step_ball(&ball, 0.5);
        assert!(contact_point_velocity(&after).length() < 1e-12);
        let expected = 1.0 * 0.5 - 0.5 * 0.015 * 9.81 * 0.25;
        assert!((after.position.x - expected).abs() < 1e-12);
    }

    #[test]
    fn test_airborne_time_and_height_clamp() {
        let s = solver();
        let mut ball = Ball::new(1, DVec3::ZERO, DQuat::IDENTITY, 0.17, R);
        ball.velocity = DVec3::new(0.0, 1.0, 0.0);
        ball.motion = MotionType::Airborne;
        let t = s.airborne_time(&ball);
        assert!((t - 2.0 / 9.81).abs() < 1e-12);

        let after = s.step_ball(&ball, 2.0 * t);
        assert_eq!(after.position.y, 0.0);
    }

    #[test]
    fn test_stationary_spin_decays() {
        let s = solver();
        let mut ball = Ball::new(1, DVec3::ZERO, DQuat::IDENTITY, 0.17, R);
        ball.angular_velocity = DVec3::new(0.0, -4.0, 0.0);
        ball.motion = MotionType::StationarySpin;
        let t = s.spinning_time(&ball);
        let after = s.step_ball(&ball, t);
        assert_eq!(after.angular_velocity, DVec3::ZERO);
    }

    #[test]
    fn test_sleep_clamping_and_planar() {
        let mut constants = SolverConstants::default();
        constants.planar = true;
        let s = PhysicsSolver::new(constants);
        let mut ball = Ball::new(1, DVec3::ZERO, DQuat::IDENTITY, 0.17, R);

        s.set_velocity(&mut ball, DVec3::new(1e-4, 0.0, 0.0));
        assert_eq!(ball.velocity, DVec3::ZERO);
        s.set_velocity(&mut ball, DVec3::new(1.0, 2.0, 0.0));
        assert_eq!(ball.velocity, DVec3::new(1.0, 0.0, 0.0));
        s.set_angular_velocity(&mut ball, DVec3::splat(1e-5));
        assert_eq!(ball.angular_velocity, DVec3::ZERO);
    }

    #[test]
    fn test_coefficients_follow_regime() {
        let s = solver();
        let mut ball = rolling_ball(0.5);
        ball.motion = MotionType::Rolling;
        s.cache_coefficients(&mut ball);
        assert_eq!(ball.velocity_coefficient(), ball.velocity);
        assert!((ball.acceleration_coefficient().x + 0.5 * 0.015 * 9.81).abs() < 1e-12);

        ball.motion = MotionType::Landing;
        s.cache_coefficients(&mut ball);
        assert_eq!(ball.acceleration_coefficient(), DVec3::ZERO);
    }
}
