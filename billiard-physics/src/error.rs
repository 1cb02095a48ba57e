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
//! Error types for the billiard physics engine
//!
//! Only caller contract violations and malformed input surface as errors.
//! Numerical dead ends inside the solver (no real root in range, a line hit
//! outside a cushion segment) are resolved internally and never reach this
//! type, and a miscue is an ordinary `Ok(false)` outcome.

use crate::objects::BallState;
use thiserror::Error;

/// Result alias used throughout the crate
pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// Errors reported by scene construction, configuration and the orchestrator
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Construction input or configuration value is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No ball with the given identifier exists in the scene
    #[error("Unknown ball identifier {0}")]
    UnknownBall(u32),

    /// Two balls were given the same identifier
    #[error("Duplicate ball identifier {0}")]
    DuplicateIdentifier(u32),

    /// A strike was requested for a ball that is not in play
    #[error("Ball {id} cannot be struck while in state {state:?}")]
    BallNotStrikeable {
        /// Identifier of the ball
        id: u32,
        /// Lifecycle state the ball was found in
        state: BallState,
    },

    /// The operation requires a stationary scene
    #[error("Billiard state must be stationary")]
    Unstable,

    /// Scene description was written for an incompatible format version
    #[error("Scene format version {found} is incompatible with engine format version {expected}")]
    IncompatibleVersion {
        /// Version found in the description
        found: String,
        /// Version supported by this engine
        expected: String,
    },

    /// Reading a configuration or scene file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing a configuration or scene document failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PhysicsError::UnknownBall(7);
        assert_eq!(err.to_string(), "Unknown ball identifier 7");

        let err = PhysicsError::BallNotStrikeable { id: 3, state: BallState::Pocketed };
        assert!(err.to_string().contains("Pocketed"));

        assert_eq!(PhysicsError::Unstable.to_string(), "Billiard state must be stationary");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: PhysicsError = parse.unwrap_err().into();
        assert!(matches!(err, PhysicsError::Json(_)));
    }
}
