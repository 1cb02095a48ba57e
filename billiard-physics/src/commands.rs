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
//! Commands acting on a billiard state
//!
//! Commands capture player intent as plain data so it can be stored with a
//! reset point, replayed on a fork for previews, or compared against the
//! previous frame's intent.

use crate::error::PhysicsResult;
use crate::objects::Cue;
use crate::state::BilliardState;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Something that can be executed against a [`BilliardState`]
pub trait BilliardCommand {
    /// Execute the command
    ///
    /// Returns whether the command took effect. Contract violations, such as
    /// an unknown ball, are errors.
    fn execute(&self, state: &mut BilliardState) -> PhysicsResult<bool>;
}

/// Cue placement relative to the ball
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CueTransform {
    /// Rotation about the vertical axis (degrees)
    pub yaw: f64,
    /// Elevation of the cue butt (degrees)
    pub pitch: f64,
    /// Tip contact point in the cue frame, as a fraction of the ball radius
    pub offset: DVec2,
}

/// Strike a ball with a cue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeCommand {
    /// Ball to strike
    pub ball_id: u32,
    /// Cue speed just before impact (m/s)
    pub speed: f64,
    /// Cue used for the strike
    pub cue: Cue,
    /// Cue placement
    pub transform: CueTransform,
    /// Lower bound applied to the transform pitch (degrees)
    pub minimum_pitch: f64,
}

impl StrikeCommand {
    /// Create a level strike through the ball centre
    pub fn new(ball_id: u32, speed: f64, cue: Cue) -> Self {
        StrikeCommand {
            ball_id,
            speed,
            cue,
            transform: CueTransform::default(),
            minimum_pitch: 0.0,
        }
    }

    /// Set the cue placement
    pub fn with_transform(mut self, transform: CueTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the minimum pitch
    pub fn with_minimum_pitch(mut self, minimum_pitch: f64) -> Self {
        self.minimum_pitch = minimum_pitch;
        self
    }

    /// Pitch actually used for the strike
    pub fn effective_pitch(&self) -> f64 {
        self.transform.pitch.max(self.minimum_pitch)
    }

    /// Whether `other` differs from this command by more than `threshold`
    /// in any field
    pub fn has_changed(&self, other: &StrikeCommand, threshold: f64) -> bool {
        self.ball_id != other.ball_id
            || (self.transform.yaw - other.transform.yaw).abs() > threshold
            || (self.transform.pitch - other.transform.pitch).abs() > threshold
            || (self.speed - other.speed).abs() > threshold
            || (self.transform.offset - other.transform.offset).length() > threshold
            || (self.minimum_pitch - other.minimum_pitch).abs() > threshold
    }
}

impl BilliardCommand for StrikeCommand {
    fn execute(&self, state: &mut BilliardState) -> PhysicsResult<bool> {
        state.strike(
            self.ball_id,
            &self.cue,
            self.speed,
            self.transform.yaw,
            self.effective_pitch(),
            self.transform.offset,
        )
    }
}
