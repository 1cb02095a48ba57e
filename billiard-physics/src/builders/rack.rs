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
//! Triangle rack for eight-ball
//!
//! Rows are laid out from the back of the rack (five balls) to the apex
//! (one ball). The apex sits on the foot spot and points at the head spot,
//! where the cue ball is placed.

use super::table::TableDimensions;
use crate::error::{PhysicsError, PhysicsResult};
use crate::objects::Ball;
use glam::{DQuat, DVec3, EulerRot};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Ball numbers in rack order, back row first; the 8 is in the middle of
/// the third row and the 1 on the apex
const RACK_ORDER: [u32; 15] = [5, 13, 15, 6, 12, 11, 7, 14, 4, 10, 8, 3, 9, 2, 1];

/// Identifier of the cue ball
pub const CUE_BALL_ID: u32 = 0;

/// Rack placement and ball properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RackConfig {
    /// Ball radius (m)
    pub ball_radius: f64,
    /// Ball mass (kg)
    pub ball_mass: f64,
    /// Apex position
    pub foot_spot: DVec3,
    /// Cue ball position
    pub head_spot: DVec3,
    /// Extra clearance between neighbouring balls (m)
    pub gap: f64,
    /// Seed for the visual orientations
    pub seed: u64,
}

impl Default for RackConfig {
    fn default() -> Self {
        let table = TableDimensions::default();
        RackConfig {
            ball_radius: table.ball_radius,
            ball_mass: 0.156,
            foot_spot: table.foot_spot(),
            head_spot: table.head_spot(),
            gap: 0.0,
            seed: 0,
        }
    }
}

/// Fifteen racked object balls followed by the cue ball
pub fn triangle_rack(config: &RackConfig) -> PhysicsResult<Vec<Ball>> {
    if !(config.gap >= 0.0 && config.gap.is_finite()) {
        return Err(PhysicsError::InvalidParameter(format!(
            "Rack gap {} must be non-negative and finite",
            config.gap
        )));
    }

    let along = (config.foot_spot - config.head_spot).normalize_or_zero();
    if along == DVec3::ZERO {
        return Err(PhysicsError::InvalidParameter(
            "Foot spot and head spot must differ".to_string(),
        ));
    }
    let across = along.cross(DVec3::Y);

    let mut rng = Pcg32::seed_from_u64(config.seed);
    let mut random_rotation = || {
        DQuat::from_euler(
            EulerRot::XYZ,
            rng.random_range(0.0..TAU),
            rng.random_range(0.0..TAU),
            rng.random_range(0.0..TAU),
        )
    };

    let spacing = 2.0 * config.ball_radius + config.gap;
    let row_depth = spacing * 3f64.sqrt() * 0.5;

    let mut balls = Vec::with_capacity(RACK_ORDER.len() + 1);
    let mut numbers = RACK_ORDER.iter();
    for row in (1..=5usize).rev() {
        let depth = (row - 1) as f64 * row_depth;
        for i in 0..row {
            let lateral = (i as f64 - (row - 1) as f64 * 0.5) * spacing;
            let position = config.foot_spot + along * depth + across * lateral;
            let Some(&number) = numbers.next() else {
                break;
            };
            balls.push(Ball::try_new(
                number,
                position,
                random_rotation(),
                config.ball_mass,
                config.ball_radius,
            )?);
        }
    }

    balls.push(Ball::try_new(
        CUE_BALL_ID,
        config.head_spot,
        random_rotation(),
        config.ball_mass,
        config.ball_radius,
    )?);
    Ok(balls)
}
