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
//! Eight-ball table geometry
//!
//! The table is centred on the origin with its long side on the X axis.
//! Each of the six rails is a four-point polyline: the two inner points lie
//! on the cloth edge, the two outer points are the pocket jaws cut back into
//! the rail at the corner or middle pocket angle.

use crate::error::{PhysicsError, PhysicsResult};
use crate::objects::{Ball, Cushion, Hole, Polygon};
use crate::scene::PhysicsScene;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Playing surface measurements (m, degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableDimensions {
    /// Cloth extent along X
    pub length: f64,
    /// Cloth extent along Z
    pub width: f64,
    /// Ball radius, used for the cushion nose height
    pub ball_radius: f64,
    /// Corner pocket mouth
    pub corner_mouth: f64,
    /// Middle pocket mouth
    pub middle_mouth: f64,
    /// Corner pocket jaw angle
    pub corner_angle: f64,
    /// Middle pocket jaw angle
    pub middle_angle: f64,
    /// Rail depth behind the cloth edge
    pub cushion_depth: f64,
    /// Pocket capture radius
    pub hole_radius: f64,
}

impl Default for TableDimensions {
    fn default() -> Self {
        TableDimensions {
            length: 2.24,
            width: 1.12,
            ball_radius: 0.028575,
            corner_mouth: 0.117,
            middle_mouth: 0.117,
            corner_angle: 45.0,
            middle_angle: 80.0,
            cushion_depth: 0.055,
            hole_radius: 0.05,
        }
    }
}

impl TableDimensions {
    /// Racking spot, a quarter of the length from the foot end
    pub fn foot_spot(&self) -> DVec3 {
        DVec3::new(-self.length * 0.25, 0.0, 0.0)
    }

    /// Cue ball spot, a quarter of the length from the head end
    pub fn head_spot(&self) -> DVec3 {
        DVec3::new(self.length * 0.25, 0.0, 0.0)
    }

    /// Cushion nose height above the ball centre plane
    pub fn cushion_height(&self) -> f64 {
        2.0 / 5.0 * self.ball_radius
    }

    /// Check that every measurement is usable
    pub fn validate(&self) -> PhysicsResult<()> {
        let lengths = [
            ("length", self.length),
            ("width", self.width),
            ("ball radius", self.ball_radius),
            ("corner mouth", self.corner_mouth),
            ("middle mouth", self.middle_mouth),
            ("cushion depth", self.cushion_depth),
            ("hole radius", self.hole_radius),
        ];
        for (name, value) in lengths {
            if !(value > 0.0 && value.is_finite()) {
                return Err(PhysicsError::InvalidParameter(format!(
                    "Table {} {} must be positive and finite",
                    name, value
                )));
            }
        }
        for (name, value) in [("corner", self.corner_angle), ("middle", self.middle_angle)] {
            if !(value > 0.0 && value < 90.0) {
                return Err(PhysicsError::InvalidParameter(format!(
                    "Table {} pocket angle {} must be in (0, 90) degrees",
                    name, value
                )));
            }
        }
        if self.middle_mouth >= self.length * 0.5 || self.corner_mouth >= self.width * 0.5 {
            return Err(PhysicsError::InvalidParameter(
                "Pocket mouths do not fit on the table".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fixed table geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Pockets: four corners, then the two middles
    pub holes: Vec<Hole>,
    /// Cushion segments, three per rail
    pub cushions: Vec<Cushion>,
    /// Area including the pocket jaws (0), and the cloth only (1)
    pub playing_areas: Vec<Polygon>,
}

impl Table {
    /// Scene with this table and `balls`
    pub fn scene(&self, balls: Vec<Ball>) -> PhysicsScene {
        PhysicsScene::new(balls, self.holes.clone(), self.cushions.clone())
    }
}

/// Build a six-pocket table
pub fn eight_pool_table(dimensions: &TableDimensions) -> PhysicsResult<Table> {
    dimensions.validate()?;

    let d = dimensions;
    let half_length = d.length * 0.5;
    let half_width = d.width * 0.5;
    let corner = d.corner_angle.to_radians();
    let middle = d.middle_angle.to_radians();

    // Foot-side long rail on the -Z edge, running from the corner to the middle pocket
    let foot_long = {
        let z = -half_width;
        let p1 = DVec3::new(-half_length + corner.sin() * d.corner_mouth, 0.0, z);
        let p0 = DVec3::new(p1.x - d.cushion_depth / corner.tan(), 0.0, z - d.cushion_depth);
        let p2 = DVec3::new(-d.middle_mouth * 0.5, 0.0, z);
        let p3 = DVec3::new(p2.x + d.cushion_depth / middle.tan(), 0.0, z - d.cushion_depth);
        [p0, p1, p2, p3]
    };

    // Short rail on the -X edge
    let foot_short = {
        let x = -half_length;
        let p1 = DVec3::new(x, 0.0, -half_width + corner.cos() * d.corner_mouth);
        let p0 = DVec3::new(x - d.cushion_depth, 0.0, p1.z - d.cushion_depth / corner.tan());
        let p2 = DVec3::new(x, 0.0, half_width - corner.cos() * d.corner_mouth);
        let p3 = DVec3::new(x - d.cushion_depth, 0.0, p2.z + d.cushion_depth / corner.tan());
        [p0, p1, p2, p3]
    };

    let mirror_x = |p: DVec3| DVec3::new(-p.x, p.y, p.z);
    let mirror_z = |p: DVec3| DVec3::new(p.x, p.y, -p.z);

    let rails = [
        foot_long,
        foot_short,
        foot_long.map(mirror_x),
        foot_long.map(|p| mirror_z(mirror_x(p))),
        foot_long.map(mirror_z),
        foot_short.map(mirror_x),
    ];

    let height = d.cushion_height();
    let mut cushions = Vec::with_capacity(rails.len() * 3);
    for (rail, points) in rails.iter().enumerate() {
        cushions.extend(Cushion::from_polyline(rail as u32 * 3, points, height)?);
    }

    let all_points: Vec<DVec3> = rails.iter().flatten().copied().collect();
    let cloth_points: Vec<DVec3> = rails.iter().flat_map(|r| [r[1], r[2]]).collect();
    let playing_areas = vec![
        Polygon::new(0, convex_hull(&all_points)),
        Polygon::new(1, convex_hull(&cloth_points)),
    ];

    let c0 = DVec3::new(-half_length, 0.0, -half_width);
    let c1 = DVec3::new(half_length, 0.0, -half_width);
    let c2 = DVec3::new(half_length, 0.0, half_width);
    let c3 = DVec3::new(-half_length, 0.0, half_width);
    let holes = [c0, c1, c2, c3, (c0 + c1) * 0.5, (c2 + c3) * 0.5]
        .into_iter()
        .zip(0u32..)
        .map(|(position, id)| Hole::try_new(id, d.hole_radius, position))
        .collect::<PhysicsResult<Vec<_>>>()?;

    log::debug!(
        "Built {:.2}x{:.2} table: {} cushions, {} holes",
        d.length,
        d.width,
        cushions.len(),
        holes.len()
    );

    Ok(Table {
        holes,
        cushions,
        playing_areas,
    })
}

/// Convex hull of the XZ projection, counter-clockwise, monotone chain
pub fn convex_hull(points: &[DVec3]) -> Vec<DVec3> {
    if points.len() <= 1 {
        return points.to_vec();
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.z.total_cmp(&b.z)));

    let cross = |o: DVec3, a: DVec3, b: DVec3| (a.x - o.x) * (b.z - o.z) - (a.z - o.z) * (b.x - o.x);

    let mut hull: Vec<DVec3> = Vec::with_capacity(sorted.len() * 2);
    for &p in &sorted {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}
