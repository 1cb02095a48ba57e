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
//! Engine configuration
//!
//! Physical constants are configuration, not code. Everything the solver and
//! the event batching job consume lives here, serializable with serde so a
//! table can be tuned from a JSON document.
//!
//! # Environment Configuration
//!
//! Set `BILLIARD_PHYSICS_CONFIG` to load configuration from a file:
//! ```bash
//! export BILLIARD_PHYSICS_CONFIG=/path/to/table.json
//! ```
//!
//! # Reference Values
//!
//! Default values follow the measured properties collected in
//! - Alciatore, D. G. "Pool and Billiards Physics Resources",
//!   <https://billiards.colostate.edu/faq/physics/physical-properties/>

use crate::error::{PhysicsError, PhysicsResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a JSON configuration file
pub const CONFIG_ENV_VAR: &str = "BILLIARD_PHYSICS_CONFIG";

/// Contact behaviour between two bodies
///
/// Reused for ball-ball, ball-cushion, ball-slate and cue-ball contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactParameters {
    /// Fraction of the normal relative velocity that is reversed, in [0, 1]
    pub normal_restitution: f64,
    /// Fraction of the tangential relative velocity that is reversed, in [-1, 1]
    pub tangential_restitution: f64,
    /// Coulomb friction coefficient bounding the tangential impulse, >= 0
    pub friction: f64,
}

impl ImpactParameters {
    /// Create a new set of impact parameters
    pub fn new(normal_restitution: f64, tangential_restitution: f64, friction: f64) -> Self {
        ImpactParameters {
            normal_restitution,
            tangential_restitution,
            friction,
        }
    }

    /// Check that all coefficients are inside their physical range
    pub fn validate(&self, label: &str) -> PhysicsResult<()> {
        if !(0.0..=1.0).contains(&self.normal_restitution) {
            return Err(PhysicsError::InvalidParameter(format!(
                "{} normal restitution {} must be in [0, 1]",
                label, self.normal_restitution
            )));
        }
        if !(-1.0..=1.0).contains(&self.tangential_restitution) {
            return Err(PhysicsError::InvalidParameter(format!(
                "{} tangential restitution {} must be in [-1, 1]",
                label, self.tangential_restitution
            )));
        }
        if !(self.friction >= 0.0 && self.friction.is_finite()) {
            return Err(PhysicsError::InvalidParameter(format!(
                "{} friction {} must be non-negative and finite",
                label, self.friction
            )));
        }
        Ok(())
    }
}

/// Constants consumed by the physics solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConstants {
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Ball-cloth sliding friction, typically in [0.15, 0.4]
    pub sliding_friction: f64,
    /// Ball-cloth spinning friction from the finite contact patch
    pub spinning_friction: f64,
    /// Ball-cloth rolling friction, typically in [0.005, 0.015]
    pub rolling_friction: f64,
    /// Ball landing on the slate
    pub ball_to_slate: ImpactParameters,
    /// Ball hitting a cushion line or cushion vertex
    pub ball_to_cushion: ImpactParameters,
    /// Ball hitting another ball
    pub ball_to_ball: ImpactParameters,
    /// Linear speeds below this are clamped to zero (m/s)
    pub sleep_velocity: f64,
    /// Angular speeds below this are clamped to zero (rad/s)
    pub sleep_angular_velocity: f64,
    /// Absolute error of the polynomial root solver (s)
    pub polynomial_error_bound: f64,
    /// Distance within which a predicted line contact still counts as a
    /// segment contact. Must be a few orders of magnitude above the
    /// polynomial error bound.
    pub cushion_error_tolerance: f64,
    /// Extra separation applied along the contact normal after a collision (m)
    pub collision_displacement: f64,
    /// Suppress all vertical motion
    pub planar: bool,
}

impl Default for SolverConstants {
    fn default() -> Self {
        SolverConstants {
            gravity: 9.81,
            sliding_friction: 0.2,
            spinning_friction: 0.2,
            rolling_friction: 0.015,
            ball_to_slate: ImpactParameters::new(0.5, 0.5, 0.4),
            ball_to_cushion: ImpactParameters::new(0.8, 0.8, 0.2),
            ball_to_ball: ImpactParameters::new(0.94, 0.94, 0.06),
            sleep_velocity: 1e-3,
            sleep_angular_velocity: 1e-3,
            polynomial_error_bound: 1e-8,
            cushion_error_tolerance: 1e-4,
            collision_displacement: 1e-3,
            planar: false,
        }
    }
}

impl SolverConstants {
    /// Check every constant for physical and numerical sanity
    pub fn validate(&self) -> PhysicsResult<()> {
        if !(self.gravity > 0.0 && self.gravity.is_finite()) {
            return Err(PhysicsError::InvalidParameter(format!(
                "Gravity {} must be positive and finite",
                self.gravity
            )));
        }

        for (name, value) in [
            ("sliding friction", self.sliding_friction),
            ("spinning friction", self.spinning_friction),
            ("rolling friction", self.rolling_friction),
            ("sleep velocity", self.sleep_velocity),
            ("sleep angular velocity", self.sleep_angular_velocity),
            ("collision displacement", self.collision_displacement),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(PhysicsError::InvalidParameter(format!(
                    "{} {} must be non-negative and finite",
                    name, value
                )));
            }
        }

        self.ball_to_slate.validate("Ball-slate")?;
        self.ball_to_cushion.validate("Ball-cushion")?;
        self.ball_to_ball.validate("Ball-ball")?;

        if !(self.polynomial_error_bound > 0.0 && self.polynomial_error_bound.is_finite()) {
            return Err(PhysicsError::InvalidParameter(format!(
                "Polynomial error bound {} must be positive and finite",
                self.polynomial_error_bound
            )));
        }
        if self.cushion_error_tolerance <= self.polynomial_error_bound {
            return Err(PhysicsError::InvalidParameter(format!(
                "Cushion error tolerance {} must exceed the polynomial error bound {}",
                self.cushion_error_tolerance, self.polynomial_error_bound
            )));
        }
        Ok(())
    }
}

/// Constants controlling how many events one external tick may absorb
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConstants {
    /// Upper bound on events resolved per batch
    pub max_events_per_step: usize,
    /// A batch keeps resolving events until their accumulated time reaches this (s)
    pub min_event_time: f64,
}

impl Default for JobConstants {
    fn default() -> Self {
        JobConstants {
            max_events_per_step: 128,
            min_event_time: 0.01,
        }
    }
}

impl JobConstants {
    /// Check the batch limits
    pub fn validate(&self) -> PhysicsResult<()> {
        if self.max_events_per_step == 0 {
            return Err(PhysicsError::InvalidParameter(
                "Maximum events per step must be at least 1".to_string(),
            ));
        }
        if !(self.min_event_time >= 0.0 && self.min_event_time.is_finite()) {
            return Err(PhysicsError::InvalidParameter(format!(
                "Minimum event time {} must be non-negative and finite",
                self.min_event_time
            )));
        }
        Ok(())
    }
}

/// Complete engine configuration
///
/// # Example
///
/// ```
/// use billiard_physics::config::EngineConfig;
///
/// let config = EngineConfig::from_json_str(r#"{ "solver": { "planar": true } }"#).unwrap();
/// assert!(config.solver.planar);
/// assert_eq!(config.solver.gravity, 9.81);
/// assert_eq!(config.job.max_events_per_step, 128);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Solver constants
    pub solver: SolverConstants,
    /// Event batching constants
    pub job: JobConstants,
}

impl EngineConfig {
    /// Parse and validate a configuration from JSON text
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> PhysicsResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            log::warn!("Rejected engine configuration: {}", e);
            return Err(e);
        }
        Ok(config)
    }

    /// Read, parse and validate a configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> PhysicsResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Load the configuration named by `BILLIARD_PHYSICS_CONFIG`
    ///
    /// Falls back to defaults when the variable is not set. A set variable
    /// pointing at an unreadable or invalid file is an error.
    pub fn from_env() -> PhysicsResult<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => {
                log::info!("Loading engine configuration from {}", path);
                Self::from_json_file(path)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> PhysicsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate solver and job constants
    pub fn validate(&self) -> PhysicsResult<()> {
        self.solver.validate()?;
        self.job.validate()
    }
}
