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
//! Cue stick

use crate::config::ImpactParameters;
use crate::error::{PhysicsError, PhysicsResult};
use serde::{Deserialize, Serialize};

/// Cue stick modelled as a uniform rod with a rounded tip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    identifier: u32,
    mass: f64,
    length: f64,
    radius: f64,
    impact: ImpactParameters,
    inertia: f64,
    inverse_inertia: f64,
    inverse_mass: f64,
    max_tip_offset: f64,
}

impl Cue {
    /// Create a cue
    ///
    /// # Panics
    ///
    /// Panics if mass, length or radius is not positive and finite.
    pub fn new(identifier: u32, mass: f64, length: f64, radius: f64, impact: ImpactParameters) -> Self {
        match Self::try_new(identifier, mass, length, radius, impact) {
            Ok(cue) => cue,
            Err(e) => panic!("{}", e),
        }
    }

    /// Try to create a cue
    pub fn try_new(
        identifier: u32,
        mass: f64,
        length: f64,
        radius: f64,
        impact: ImpactParameters,
    ) -> PhysicsResult<Self> {
        for (name, value) in [("mass", mass), ("length", length), ("radius", radius)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(PhysicsError::InvalidParameter(format!(
                    "Cue {} {} {} must be positive and finite",
                    identifier, name, value
                )));
            }
        }
        impact.validate("Cue")?;

        // Rod about its centre plus the tip disc correction
        let inertia = mass * length * length / 12.0 + mass * radius * radius / 4.0;
        Ok(Cue {
            identifier,
            mass,
            length,
            radius,
            impact,
            inertia,
            inverse_inertia: 1.0 / inertia,
            inverse_mass: 1.0 / mass,
            max_tip_offset: 1.0,
        })
    }

    /// Limit the legal tip offset to a fraction of the ball radius
    pub fn with_max_tip_offset(mut self, fraction: f64) -> Self {
        self.max_tip_offset = fraction.max(0.0);
        self
    }

    /// Identifier
    pub fn identifier(&self) -> u32 {
        self.identifier
    }

    /// Mass (kg)
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Length (m)
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Tip radius (m)
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Contact behaviour of the tip against a ball
    pub fn impact(&self) -> ImpactParameters {
        self.impact
    }

    /// Moment of inertia
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Reciprocal of the moment of inertia
    pub fn inverse_inertia(&self) -> f64 {
        self.inverse_inertia
    }

    /// Reciprocal of the mass
    pub fn inverse_mass(&self) -> f64 {
        self.inverse_mass
    }

    /// Largest legal tip offset as a fraction of the ball radius
    pub fn max_tip_offset(&self) -> f64 {
        self.max_tip_offset
    }
}

impl Default for Cue {
    /// A 0.54 kg, 1.45 m cue with a 6.5 mm tip
    fn default() -> Self {
        Cue::new(0, 0.54, 1.45, 0.0065, ImpactParameters::new(0.75, 0.0, 0.7))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_inertia() {
        let cue = Cue::new(1, 0.5, 1.5, 0.01, ImpactParameters::new(0.8, 0.0, 0.6));
        let expected = 0.5 * 1.5 * 1.5 / 12.0 + 0.5 * 0.01 * 0.01 / 4.0;
        assert!((cue.inertia() - expected).abs() < 1e-15);
        assert!((cue.inverse_inertia() * expected - 1.0).abs() < 1e-12);
        assert_eq!(cue.max_tip_offset(), 1.0);
    }

    #[test]
    fn test_max_tip_offset() {
        let cue = Cue::default().with_max_tip_offset(0.5);
        assert_eq!(cue.max_tip_offset(), 0.5);
    }

    #[test]
    fn test_invalid_cue_rejected() {
        let impact = ImpactParameters::new(0.8, 0.0, 0.6);
        assert!(Cue::try_new(0, 0.5, 0.0, 0.01, impact).is_err());
        assert!(Cue::try_new(0, 0.5, 1.0, 0.01, ImpactParameters::new(2.0, 0.0, 0.6)).is_err());
    }

    #[test]
    #[should_panic(expected = "mass")]
    fn test_new_panics_on_bad_mass() {
        Cue::new(0, -1.0, 1.0, 0.01, ImpactParameters::new(0.8, 0.0, 0.6));
    }
}
