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
//! Scene storage and description format
//!
//! A [`PhysicsScene`] owns three flat arrays. Cross references between
//! objects are array indices; identifiers are looked up by linear scan, which
//! is cheap for the few dozen balls on a table and needs no side index to
//! keep in sync.
//!
//! [`SceneDescription`] is the serializable placement format external
//! producers hand to the engine. Descriptions carry a semver format version
//! checked against [`SCENE_FORMAT_VERSION`]:
//!
//! - major versions must match
//! - for 1.0 and later, the description's minor version must not exceed the
//!   engine's
//! - for 0.x, minor versions must match exactly

use crate::config::EngineConfig;
use crate::error::{PhysicsError, PhysicsResult};
use crate::objects::{Ball, Cushion, Hole};
use glam::{DQuat, DVec3};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Scene description format understood by this engine
pub const SCENE_FORMAT_VERSION: &str = "1.0.0";

/// Balls, holes and cushions owned as one unit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhysicsScene {
    /// Balls, indexed by position
    pub balls: Vec<Ball>,
    /// Pockets
    pub holes: Vec<Hole>,
    /// Cushion segments
    pub cushions: Vec<Cushion>,
}

impl PhysicsScene {
    /// Assemble a scene from its parts
    pub fn new(balls: Vec<Ball>, holes: Vec<Hole>, cushions: Vec<Cushion>) -> Self {
        PhysicsScene {
            balls,
            holes,
            cushions,
        }
    }

    /// Index of the ball with `identifier`
    pub fn ball_index(&self, identifier: u32) -> Option<usize> {
        self.balls.iter().position(|b| b.identifier == identifier)
    }

    /// Ball with `identifier`
    pub fn ball(&self, identifier: u32) -> Option<&Ball> {
        self.balls.iter().find(|b| b.identifier == identifier)
    }

    /// Check identifier uniqueness and finiteness of all balls
    pub fn validate(&self) -> PhysicsResult<()> {
        validate_balls(&self.balls)
    }
}

/// Reject duplicated identifiers and non-finite kinematics
pub(crate) fn validate_balls(balls: &[Ball]) -> PhysicsResult<()> {
    let mut seen = HashSet::with_capacity(balls.len());
    for ball in balls {
        if !seen.insert(ball.identifier) {
            return Err(PhysicsError::DuplicateIdentifier(ball.identifier));
        }
        if !ball.is_valid() {
            return Err(PhysicsError::InvalidParameter(format!(
                "Ball {} has non-finite kinematics",
                ball.identifier
            )));
        }
    }
    Ok(())
}

/// Placement of one ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallDescription {
    /// Unique identifier
    pub identifier: u32,
    /// Mass (kg)
    pub mass: f64,
    /// Radius (m)
    pub radius: f64,
    /// Centre position (m)
    pub position: DVec3,
    /// Initial linear velocity
    #[serde(default)]
    pub velocity: DVec3,
    /// Initial angular velocity
    #[serde(default)]
    pub angular_velocity: DVec3,
    /// Initial orientation
    #[serde(default = "identity")]
    pub rotation: DQuat,
}

fn identity() -> DQuat {
    DQuat::IDENTITY
}

/// Placement of one pocket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleDescription {
    /// Unique identifier
    pub identifier: u32,
    /// Capture radius (m)
    pub radius: f64,
    /// Centre (m)
    pub position: DVec3,
}

/// Cushion polyline; each consecutive pair of points becomes one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CushionDescription {
    /// Identifier of the first segment, later segments count up from it
    pub identifier: u32,
    /// Polyline points, at least two
    pub points: Vec<DVec3>,
    /// Height of the contact line above the table plane (m)
    #[serde(default)]
    pub height: f64,
}

/// Serializable scene with its physical configuration
///
/// # Example
///
/// ```
/// use billiard_physics::scene::SceneDescription;
///
/// let json = r#"{
///     "format_version": "1.0.0",
///     "balls": [
///         { "identifier": 0, "mass": 0.17, "radius": 0.028575, "position": [0.0, 0.0, 0.0] }
///     ]
/// }"#;
/// let description = SceneDescription::from_json_str(json).unwrap();
/// let scene = description.build_scene().unwrap();
/// assert_eq!(scene.balls.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Semver version of the description format
    pub format_version: String,
    /// Engine configuration, defaults when absent
    #[serde(default)]
    pub config: EngineConfig,
    /// Balls
    #[serde(default)]
    pub balls: Vec<BallDescription>,
    /// Pockets
    #[serde(default)]
    pub holes: Vec<HoleDescription>,
    /// Cushion polylines
    #[serde(default)]
    pub cushions: Vec<CushionDescription>,
}

impl SceneDescription {
    /// Empty description in the current format
    pub fn new(config: EngineConfig) -> Self {
        SceneDescription {
            format_version: SCENE_FORMAT_VERSION.to_string(),
            config,
            balls: Vec::new(),
            holes: Vec::new(),
            cushions: Vec::new(),
        }
    }

    /// Describe an existing scene
    ///
    /// Every cushion segment becomes its own two-point polyline.
    pub fn from_scene(scene: &PhysicsScene, config: EngineConfig) -> Self {
        SceneDescription {
            format_version: SCENE_FORMAT_VERSION.to_string(),
            config,
            balls: scene
                .balls
                .iter()
                .map(|b| BallDescription {
                    identifier: b.identifier,
                    mass: b.mass(),
                    radius: b.radius(),
                    position: b.position,
                    velocity: b.velocity,
                    angular_velocity: b.angular_velocity,
                    rotation: b.rotation,
                })
                .collect(),
            holes: scene
                .holes
                .iter()
                .map(|h| HoleDescription {
                    identifier: h.identifier(),
                    radius: h.radius(),
                    position: h.position(),
                })
                .collect(),
            cushions: scene
                .cushions
                .iter()
                .map(|c| CushionDescription {
                    identifier: c.identifier(),
                    points: vec![c.vertex(0), c.vertex(1)],
                    height: c.height(),
                })
                .collect(),
        }
    }

    /// Parse a description and check its format version
    pub fn from_json_str(json: &str) -> PhysicsResult<Self> {
        let description: SceneDescription = serde_json::from_str(json)?;
        description.check_version()?;
        Ok(description)
    }

    /// Read and parse a description file
    pub fn from_json_file(path: impl AsRef<Path>) -> PhysicsResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> PhysicsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Fail unless the format version is compatible with this engine
    pub fn check_version(&self) -> PhysicsResult<()> {
        if is_version_compatible(&self.format_version, SCENE_FORMAT_VERSION) {
            Ok(())
        } else {
            Err(PhysicsError::IncompatibleVersion {
                found: self.format_version.clone(),
                expected: SCENE_FORMAT_VERSION.to_string(),
            })
        }
    }

    /// Build the scene, validating every object
    pub fn build_scene(&self) -> PhysicsResult<PhysicsScene> {
        self.check_version()?;

        let balls = self
            .balls
            .iter()
            .map(|d| {
                let mut ball = Ball::try_new(d.identifier, d.position, d.rotation, d.mass, d.radius)?;
                ball.velocity = d.velocity;
                ball.angular_velocity = d.angular_velocity;
                Ok(ball)
            })
            .collect::<PhysicsResult<Vec<_>>>()?;
        validate_balls(&balls)?;

        let holes = self
            .holes
            .iter()
            .map(|d| Hole::try_new(d.identifier, d.radius, d.position))
            .collect::<PhysicsResult<Vec<_>>>()?;

        let mut cushions = Vec::new();
        for d in &self.cushions {
            cushions.extend(Cushion::from_polyline(d.identifier, &d.points, d.height)?);
        }

        Ok(PhysicsScene::new(balls, holes, cushions))
    }
}

/// Check whether a description format version can be read by this engine
fn is_version_compatible(description_version: &str, engine_version: &str) -> bool {
    let description = match Version::parse(description_version) {
        Ok(v) => v,
        Err(_) => return false,
    };
    let engine = match Version::parse(engine_version) {
        Ok(v) => v,
        Err(_) => return false,
    };

    if description.major != engine.major {
        return false;
    }

    if description.major != 0 {
        description.minor <= engine.minor
    } else {
        // 0.x minors are breaking
        description.minor == engine.minor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(id: u32, x: f64) -> BallDescription {
        BallDescription {
            identifier: id,
            mass: 0.17,
            radius: 0.028575,
            position: DVec3::new(x, 0.0, 0.0),
            velocity: DVec3::ZERO,
            angular_velocity: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
        }
    }

    #[test]
    fn test_version_compatibility() {
        assert!(is_version_compatible("1.0.0", "1.0.0"));
        assert!(is_version_compatible("1.0.5", "1.2.0"));
        assert!(!is_version_compatible("1.3.0", "1.2.0"));
        assert!(!is_version_compatible("2.0.0", "1.2.0"));
        assert!(is_version_compatible("0.2.1", "0.2.0"));
        assert!(!is_version_compatible("0.1.0", "0.2.0"));
        assert!(!is_version_compatible("not-a-version", "1.0.0"));
    }

    #[test]
    fn test_incompatible_description_rejected() {
        let json = r#"{ "format_version": "2.0.0" }"#;
        let err = SceneDescription::from_json_str(json).unwrap_err();
        assert!(matches!(err, PhysicsError::IncompatibleVersion { .. }));
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let mut description = SceneDescription::new(EngineConfig::default());
        description.balls = vec![ball(1, 0.0), ball(1, 0.5)];
        let err = description.build_scene().unwrap_err();
        assert!(matches!(err, PhysicsError::DuplicateIdentifier(1)));
    }

    #[test]
    fn test_bad_mass_rejected() {
        let mut description = SceneDescription::new(EngineConfig::default());
        let mut bad = ball(1, 0.0);
        bad.mass = 0.0;
        description.balls = vec![bad];
        assert!(matches!(
            description.build_scene(),
            Err(PhysicsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_cushion_polyline_expands() {
        let mut description = SceneDescription::new(EngineConfig::default());
        description.cushions = vec![CushionDescription {
            identifier: 5,
            points: vec![DVec3::ZERO, DVec3::X, DVec3::new(1.0, 0.0, 1.0)],
            height: 0.01,
        }];
        let scene = description.build_scene().unwrap();
        assert_eq!(scene.cushions.len(), 2);
        assert_eq!(scene.cushions[1].identifier(), 6);
    }

    #[test]
    fn test_scene_description_roundtrip() {
        let balls = vec![
            Ball::new(0, DVec3::ZERO, DQuat::IDENTITY, 0.17, 0.028575),
            Ball::new(4, DVec3::new(0.5, 0.0, 0.2), DQuat::IDENTITY, 0.16, 0.028575),
        ];
        let holes = vec![Hole::new(0, 0.05, DVec3::new(1.0, 0.0, 0.5))];
        let cushions = vec![Cushion::new(0, DVec3::ZERO, DVec3::X, 0.01)];
        let scene = PhysicsScene::new(balls, holes, cushions);

        let description = SceneDescription::from_scene(&scene, EngineConfig::default());
        let json = description.to_json_string().unwrap();
        let rebuilt = SceneDescription::from_json_str(&json).unwrap().build_scene().unwrap();
        assert_eq!(rebuilt.balls.len(), 2);
        assert_eq!(rebuilt.ball(4).map(|b| b.mass()), Some(0.16));
        assert_eq!(rebuilt.cushions[0].vertex(1), DVec3::X);
    }

    #[test]
    fn test_lookup_by_identifier() {
        let scene = PhysicsScene::new(
            vec![
                Ball::new(7, DVec3::ZERO, DQuat::IDENTITY, 0.17, 0.03),
                Ball::new(3, DVec3::X, DQuat::IDENTITY, 0.17, 0.03),
            ],
            vec![],
            vec![],
        );
        assert_eq!(scene.ball_index(3), Some(1));
        assert!(scene.ball(9).is_none());
        assert!(scene.validate().is_ok());
    }
}
