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
//! Billiard ball representation
//!
//! A ball is a plain data aggregate. The solver reads a copy, transforms it
//! through pure functions and writes the result back by index, so the type
//! carries no behaviour beyond construction and accessors.
//!
//! The world frame is Y-up with the table in the XZ plane; a ball resting on
//! the slate has its centre at `y = 0`.

use crate::error::{PhysicsError, PhysicsResult};
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Governing regime of a ball's motion
///
/// Discriminants are distinct bits so that the regimes of several balls can
/// be OR-ed into a mask and tested for movement in one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MotionType {
    /// No linear or angular velocity
    Stationary = 1,
    /// Contact point has zero velocity, ball decelerates by rolling friction
    Rolling = 2,
    /// Contact point slips over the cloth, ball decelerates by sliding friction
    Sliding = 4,
    /// Only spin about the vertical axis remains
    StationarySpin = 8,
    /// Ball is off the slate under gravity
    Airborne = 16,
    /// Ball has just reached the slate and awaits the floor impact
    Landing = 32,
}

impl MotionType {
    /// Regimes in which a ball does not translate
    pub const STATIONARY_MASK: u8 = MotionType::Stationary as u8 | MotionType::StationarySpin as u8;

    /// Bit value of this regime
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Whether a mask of OR-ed regimes contains at least one translating regime
    pub fn is_moving_mask(mask: u8) -> bool {
        mask & !Self::STATIONARY_MASK != 0
    }

    /// Whether a ball in this regime translates
    pub fn is_moving(self) -> bool {
        Self::is_moving_mask(self.bits())
    }
}

/// Lifecycle state of a ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallState {
    /// In play
    Normal,
    /// Just struck by the cue; the next event returns it to `Normal`
    Struck,
    /// Captured by a hole
    Pocketed,
    /// Removed from play
    Invalid,
}

/// Rigid ball with cached closed-form motion coefficients
///
/// While the motion regime and velocity stay unchanged the ball position is
/// `position + velocity_coefficient * t + acceleration_coefficient * t²`.
///
/// # Examples
///
/// ```
/// use billiard_physics::objects::{Ball, MotionType};
/// use glam::{DQuat, DVec3};
///
/// let ball = Ball::new(1, DVec3::ZERO, DQuat::IDENTITY, 0.156, 0.028575);
/// assert_eq!(ball.motion, MotionType::Stationary);
/// assert!((ball.inverse_mass() * ball.mass() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    /// Unique identifier, stable for the lifetime of the ball
    pub identifier: u32,
    /// Current motion regime
    pub motion: MotionType,
    /// Current lifecycle state
    pub state: BallState,
    /// Centre position (m)
    pub position: DVec3,
    /// Linear velocity (m/s)
    pub velocity: DVec3,
    /// Angular velocity (rad/s)
    pub angular_velocity: DVec3,
    /// Visual orientation, never consulted by collision math
    pub rotation: DQuat,
    mass: f64,
    radius: f64,
    inertia: f64,
    inverse_inertia: f64,
    inverse_mass: f64,
    pub(crate) velocity_coefficient: DVec3,
    pub(crate) acceleration_coefficient: DVec3,
}

impl Ball {
    /// Create a stationary ball
    ///
    /// # Panics
    ///
    /// Panics if mass or radius is not positive and finite. For fallible
    /// construction, use `try_new`.
    pub fn new(identifier: u32, position: DVec3, rotation: DQuat, mass: f64, radius: f64) -> Self {
        assert!(mass > 0.0 && mass.is_finite(), "Ball mass must be positive and finite");
        assert!(radius > 0.0 && radius.is_finite(), "Ball radius must be positive and finite");
        Self::build(identifier, position, rotation, mass, radius)
    }

    /// Try to create a stationary ball
    ///
    /// Returns `InvalidParameter` if mass or radius is not positive and finite.
    pub fn try_new(
        identifier: u32,
        position: DVec3,
        rotation: DQuat,
        mass: f64,
        radius: f64,
    ) -> PhysicsResult<Self> {
        if !(mass > 0.0 && mass.is_finite()) {
            return Err(PhysicsError::InvalidParameter(format!(
                "Ball {} mass {} must be positive and finite",
                identifier, mass
            )));
        }
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(PhysicsError::InvalidParameter(format!(
                "Ball {} radius {} must be positive and finite",
                identifier, radius
            )));
        }
        if !position.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "Ball {} position must be finite",
                identifier
            )));
        }
        Ok(Self::build(identifier, position, rotation, mass, radius))
    }

    fn build(identifier: u32, position: DVec3, rotation: DQuat, mass: f64, radius: f64) -> Self {
        // Solid sphere
        let inertia = 2.0 / 5.0 * mass * radius * radius;
        Ball {
            identifier,
            motion: MotionType::Stationary,
            state: BallState::Normal,
            position,
            velocity: DVec3::ZERO,
            angular_velocity: DVec3::ZERO,
            rotation,
            mass,
            radius,
            inertia,
            inverse_inertia: 1.0 / inertia,
            inverse_mass: 1.0 / mass,
            velocity_coefficient: DVec3::ZERO,
            acceleration_coefficient: DVec3::ZERO,
        }
    }

    /// Mass (kg)
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Radius (m)
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Moment of inertia about any axis through the centre (kg·m²)
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Reciprocal of the moment of inertia
    pub fn inverse_inertia(&self) -> f64 {
        self.inverse_inertia
    }

    /// Reciprocal of the mass
    pub fn inverse_mass(&self) -> f64 {
        self.inverse_mass
    }

    /// Linear term of the cached position polynomial
    pub fn velocity_coefficient(&self) -> DVec3 {
        self.velocity_coefficient
    }

    /// Quadratic term of the cached position polynomial
    pub fn acceleration_coefficient(&self) -> DVec3 {
        self.acceleration_coefficient
    }

    /// Position predicted by the cached coefficients after `t` seconds
    pub fn predicted_position(&self, t: f64) -> DVec3 {
        (self.acceleration_coefficient * t + self.velocity_coefficient) * t + self.position
    }

    /// Whether the ball takes part in collisions
    pub fn is_in_play(&self) -> bool {
        self.state == BallState::Normal
    }

    /// Whether all kinematic quantities are finite
    pub fn is_valid(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.angular_velocity.is_finite()
    }
}

/// Position and velocities handed to the engine when a ball is put back in play
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Kinematics {
    /// Centre position (m)
    pub position: DVec3,
    /// Linear velocity (m/s)
    pub velocity: DVec3,
    /// Angular velocity (rad/s)
    pub angular_velocity: DVec3,
}

impl Kinematics {
    /// A ball at rest at `position`
    pub fn at_rest(position: DVec3) -> Self {
        Kinematics {
            position,
            velocity: DVec3::ZERO,
            angular_velocity: DVec3::ZERO,
        }
    }
}
