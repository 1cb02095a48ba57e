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

use crate::error::{PhysicsError, PhysicsResult};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Pocket with a circular capture region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    identifier: u32,
    radius: f64,
    position: DVec3,
}

impl Hole {
    /// Create a hole
    ///
    /// # Panics
    ///
    /// Panics if the radius is not positive and finite.
    pub fn new(identifier: u32, radius: f64, position: DVec3) -> Self {
        assert!(radius > 0.0 && radius.is_finite(), "Hole radius must be positive and finite");
        Hole {
            identifier,
            radius,
            position,
        }
    }

    /// Try to create a hole
    pub fn try_new(identifier: u32, radius: f64, position: DVec3) -> PhysicsResult<Self> {
        if !(radius > 0.0 && radius.is_finite()) || !position.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "Hole {} radius {} must be positive and position finite",
                identifier, radius
            )));
        }
        Ok(Self::new(identifier, radius, position))
    }

    /// Identifier
    pub fn identifier(&self) -> u32 {
        self.identifier
    }

    /// Capture radius
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Centre of the capture region
    pub fn position(&self) -> DVec3 {
        self.position
    }
}
