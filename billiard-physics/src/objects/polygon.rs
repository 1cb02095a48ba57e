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
//! Table-plane area queries
//!
//! Game rules need to know which balls lie inside a playing area (for
//! example the kitchen, or the cloth as opposed to the rail tops). The
//! polygon test only looks at the X and Z coordinates.

use super::ball::{Ball, BallState};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Closed polygon in the table plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Identifier
    pub identifier: u32,
    /// Vertices in order; the last connects back to the first
    pub points: Vec<DVec3>,
}

impl Polygon {
    /// Create a polygon
    pub fn new(identifier: u32, points: Vec<DVec3>) -> Self {
        Polygon { identifier, points }
    }

    /// Even-odd containment test on the XZ projection
    pub fn contains(&self, point: DVec3) -> bool {
        let points = &self.points;
        if points.len() < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = points.len() - 1;
        for i in 0..points.len() {
            let (a, b) = (points[i], points[j]);
            if (a.z < point.z && b.z >= point.z) || (b.z < point.z && a.z >= point.z) {
                let x = a.x + (point.z - a.z) / (b.z - a.z) * (b.x - a.x);
                if x < point.x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

/// Identifiers of balls whose centre lies inside `polygon`
pub fn balls_inside_polygon(polygon: &Polygon, balls: &[Ball]) -> Vec<u32> {
    balls
        .iter()
        .filter(|b| polygon.contains(b.position))
        .map(|b| b.identifier)
        .collect()
}

/// Identifiers of balls whose centre lies outside `polygon`
pub fn balls_outside_polygon(polygon: &Polygon, balls: &[Ball]) -> Vec<u32> {
    balls
        .iter()
        .filter(|b| !polygon.contains(b.position))
        .map(|b| b.identifier)
        .collect()
}

/// Identifiers of pocketed balls
pub fn pocketed_balls(balls: &[Ball]) -> Vec<u32> {
    balls
        .iter()
        .filter(|b| b.state == BallState::Pocketed)
        .map(|b| b.identifier)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DQuat;

    fn square() -> Polygon {
        Polygon::new(
            0,
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 1.0),
                DVec3::new(0.0, 0.0, 1.0),
            ],
        )
    }

    #[test]
    fn test_contains_ignores_height() {
        let poly = square();
        assert!(poly.contains(DVec3::new(0.5, 0.0, 0.5)));
        assert!(poly.contains(DVec3::new(0.5, 3.0, 0.5)));
        assert!(!poly.contains(DVec3::new(1.5, 0.0, 0.5)));
        assert!(!poly.contains(DVec3::new(0.5, 0.0, -0.1)));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape opening toward +z
        let poly = Polygon::new(
            1,
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(3.0, 0.0, 0.0),
                DVec3::new(3.0, 0.0, 3.0),
                DVec3::new(2.0, 0.0, 3.0),
                DVec3::new(2.0, 0.0, 1.0),
                DVec3::new(1.0, 0.0, 1.0),
                DVec3::new(1.0, 0.0, 3.0),
                DVec3::new(0.0, 0.0, 3.0),
            ],
        );
        assert!(poly.contains(DVec3::new(0.5, 0.0, 2.0)));
        assert!(!poly.contains(DVec3::new(1.5, 0.0, 2.0)));
        assert!(poly.contains(DVec3::new(1.5, 0.0, 0.5)));
    }

    #[test]
    fn test_ball_queries() {
        let poly = square();
        let inside = Ball::new(1, DVec3::new(0.5, 0.0, 0.5), DQuat::IDENTITY, 0.1, 0.03);
        let outside = Ball::new(2, DVec3::new(2.0, 0.0, 0.5), DQuat::IDENTITY, 0.1, 0.03);
        let mut pocketed = Ball::new(3, DVec3::new(5.0, 0.0, 5.0), DQuat::IDENTITY, 0.1, 0.03);
        pocketed.state = BallState::Pocketed;
        let balls = [inside, outside, pocketed];

        assert_eq!(balls_inside_polygon(&poly, &balls), vec![1]);
        assert_eq!(balls_outside_polygon(&poly, &balls), vec![2, 3]);
        assert_eq!(pocketed_balls(&balls), vec![3]);
    }
}
