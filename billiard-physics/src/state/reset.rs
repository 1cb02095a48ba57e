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
//! Snapshots of a resting table

use crate::commands::StrikeCommand;
use crate::objects::Ball;
use std::time::SystemTime;

/// Ball snapshot taken while the table was at rest
///
/// The command, if any, is the one about to be executed after the snapshot.
/// Restoring a reset point does not re-run it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResetPoint {
    /// Authoritative balls at snapshot time
    pub balls: Vec<Ball>,
    /// Wall-clock time of the snapshot
    pub created: SystemTime,
    /// Command executed right after the snapshot
    pub command: Option<StrikeCommand>,
}

impl ResetPoint {
    /// Snapshot `balls` now
    pub fn new(balls: Vec<Ball>, command: Option<StrikeCommand>) -> Self {
        ResetPoint {
            balls,
            created: SystemTime::now(),
            command,
        }
    }

    /// Seconds elapsed since the snapshot, zero if the clock went backwards
    pub fn age(&self) -> f64 {
        self.created
            .elapsed()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}
