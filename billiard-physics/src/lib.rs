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
//! # Billiard Physics
//!
//! An event-driven rigid-body engine for billiard-type ball games. Instead of
//! integrating with a fixed timestep, the engine predicts the exact time of
//! the next physical event and jumps there:
//!
//! - motion regime changes (sliding, rolling, spinning, airborne, at rest)
//! - ball-ball, ball-cushion and ball-vertex contacts
//! - pocket captures
//!
//! Motion between events is closed-form, contact times are roots of
//! quartic polynomials, and contacts are resolved with a bilinear impulse law
//! (ball-ball, cushion, slate) or a friction-cone constrained impulse (cue).
//!
//! ## Features
//!
//! - **Exact prediction**: events are never skipped, whatever the frame rate
//! - **Frame clock**: [`BilliardState`] interpolates display balls between events
//! - **Previews**: strike trajectories computed on independent forks
//! - **Parallelism**: optional Rayon evaluation of many candidate strikes
//! - **Serializable setup**: JSON configuration and versioned scene descriptions
//!
//! ## Example
//!
//! ```rust
//! use billiard_physics::builders::{eight_pool_table, triangle_rack, RackConfig, TableDimensions};
//! use billiard_physics::{BilliardState, Cue, EngineConfig};
//! use glam::DVec2;
//!
//! let table = eight_pool_table(&TableDimensions::default()).unwrap();
//! let balls = triangle_rack(&RackConfig::default()).unwrap();
//! let mut state = BilliardState::new(table.scene(balls), &EngineConfig::default()).unwrap();
//!
//! // Aim from the head spot at the apex (along -X)
//! let hit = state.strike(0, &Cue::default(), 3.0, -90.0, 0.0, DVec2::ZERO).unwrap();
//! assert!(hit);
//!
//! let report = state.tick(1.0 / 60.0);
//! assert_eq!(report.stability_change, Some(false));
//! ```

#![warn(missing_docs)]

/// Engine configuration
pub mod config;

/// Error types
pub mod error;

/// Balls, cushions, holes, cue and polygons
pub mod objects;

/// Event prediction, motion and impact resolution
pub mod solver;

/// Scene storage and description format
pub mod scene;

/// Frame clock and event batching
pub mod state;

/// Commands acting on a billiard state
pub mod commands;

/// Strike previews
pub mod trajectory;

/// Standard table and rack layouts
pub mod builders;

pub use commands::{BilliardCommand, CueTransform, StrikeCommand};
pub use config::{EngineConfig, ImpactParameters, JobConstants, SolverConstants};
pub use error::{PhysicsError, PhysicsResult};
pub use objects::{Ball, BallState, Cue, Cushion, Hole, Kinematics, MotionType, Polygon};
pub use scene::{PhysicsScene, SceneDescription};
pub use solver::{Event, EventType, PhysicsSolver};
pub use state::{BilliardState, ResetPoint, TickReport};
