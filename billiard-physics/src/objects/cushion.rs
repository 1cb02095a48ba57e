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
//! Straight cushion segments

use crate::error::{PhysicsError, PhysicsResult};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// One straight cushion segment, immutable after construction
///
/// The contact line of the rubber sits `height` above the table plane. The
/// normal is `direction × Y` and is not oriented toward the playing area; the
/// resolver orients it per contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cushion {
    identifier: u32,
    height: f64,
    p0: DVec3,
    p1: DVec3,
    direction: DVec3,
    normal: DVec3,
    length: f64,
}

impl Cushion {
    /// Create a cushion segment between `p0` and `p1`
    ///
    /// # Panics
    ///
    /// Panics if the endpoints coincide or are not finite.
    pub fn new(identifier: u32, p0: DVec3, p1: DVec3, height: f64) -> Self {
        match Self::try_new(identifier, p0, p1, height) {
            Ok(cushion) => cushion,
            Err(e) => panic!("{}", e),
        }
    }

    /// Try to create a cushion segment
    pub fn try_new(identifier: u32, p0: DVec3, p1: DVec3, height: f64) -> PhysicsResult<Self> {
        if !p0.is_finite() || !p1.is_finite() || !height.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "Cushion {} geometry must be finite",
                identifier
            )));
        }
        let length = (p1 - p0).length();
        if length <= 0.0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "Cushion {} endpoints must be distinct",
                identifier
            )));
        }
        let direction = (p1 - p0) / length;
        Ok(Cushion {
            identifier,
            height,
            p0,
            p1,
            direction,
            normal: direction.cross(DVec3::Y),
            length,
        })
    }

    /// Split an open polyline into consecutive segments
    ///
    /// Segment `i` joins `points[i]` and `points[i + 1]` and is given the
    /// identifier `first_identifier + i`.
    pub fn from_polyline(
        first_identifier: u32,
        points: &[DVec3],
        height: f64,
    ) -> PhysicsResult<Vec<Cushion>> {
        if points.len() < 2 {
            return Err(PhysicsError::InvalidParameter(format!(
                "Cushion polyline needs at least 2 points, got {}",
                points.len()
            )));
        }
        points
            .windows(2)
            .zip(first_identifier..)
            .map(|(pair, id)| Cushion::try_new(id, pair[0], pair[1], height))
            .collect()
    }

    /// Identifier
    pub fn identifier(&self) -> u32 {
        self.identifier
    }

    /// Height of the contact line above the table plane
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Endpoint `0` or `1`
    ///
    /// # Panics
    ///
    /// Panics for any other index.
    pub fn vertex(&self, index: usize) -> DVec3 {
        match index {
            0 => self.p0,
            1 => self.p1,
            _ => panic!("Cushion vertex index {} out of range", index),
        }
    }

    /// Unit direction from `p0` to `p1`
    pub fn direction(&self) -> DVec3 {
        self.direction
    }

    /// Unit normal, perpendicular to the segment in the table plane
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    /// Segment length
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Closest point on the segment to `point`, with the segment lifted by `lift`
    pub fn closest_point(&self, point: DVec3, lift: DVec3) -> DVec3 {
        let a = self.p0 + lift;
        let t = ((point - a).dot(self.direction)).clamp(0.0, self.length);
        a + self.direction * t
    }
}
