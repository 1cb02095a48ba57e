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
//! Scene objects
//!
//! Balls, cushions, holes, the cue and table-plane polygons. All of them are
//! plain values; the solver and the orchestrator own the behaviour.

pub mod ball;
pub mod cue;
pub mod cushion;
pub mod hole;
pub mod polygon;

pub use ball::{Ball, BallState, Kinematics, MotionType};
pub use cue::Cue;
pub use cushion::Cushion;
pub use hole::Hole;
pub use polygon::{balls_inside_polygon, balls_outside_polygon, pocketed_balls, Polygon};
