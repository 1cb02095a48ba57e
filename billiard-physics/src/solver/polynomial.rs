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
//! Polynomial root solvers
//!
//! Event prediction reduces every contact test to "smallest non-negative root
//! below a bound" of a quadratic or a quartic in time.
//!
//! # Quadratic
//!
//! Closed form with the cancellation-free pairing
//!
//! ```text
//! q  = -(c1 + sign(c1) * sqrt(c1² - 4 c2 c0)) / 2
//! r1 = q / c2
//! r2 = c0 / q
//! ```
//!
//! # Quartic
//!
//! The interval `[0, bound]` is mapped onto the Bernstein basis. The number of
//! sign changes in the five Bernstein coefficients bounds the number of roots
//! in the interval from above (Descartes' rule of signs on the Bernstein
//! form):
//!
//! - zero changes: no root
//! - one change: exactly one root
//! - more: split the interval in half and try the left half first
//!
//! An isolated root is refined by bisection down to the error bound. The
//! subdivision depth is limited to `ceil(log2(bound / error_bound)) + 1`; an
//! interval still ambiguous at that depth is reported as "no root".
//!
//! # References
//!
//! - Farouki, R. T. (2012). The Bernstein polynomial basis: A centennial
//!   retrospective. Computer Aided Geometric Design, 29(6), 379-419.
//! - Press, W. H. et al. (2007). Numerical Recipes (3rd ed.), Section 5.6.

/// Coefficients whose magnitude is at or below this are treated as zero
pub const EPSILON: f64 = f64::EPSILON;

/// Hard ceiling on quartic subdivision depth
const MAX_SUBDIVISION_DEPTH: u32 = 64;

/// Hard ceiling on bisection iterations
const MAX_BISECTION_STEPS: u32 = 256;

/// Quadratic `c2·x² + c1·x + c0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poly2 {
    /// Quadratic coefficient
    pub c2: f64,
    /// Linear coefficient
    pub c1: f64,
    /// Constant coefficient
    pub c0: f64,
}

impl Poly2 {
    /// Create a quadratic from its coefficients, highest degree first
    pub fn new(c2: f64, c1: f64, c0: f64) -> Self {
        Poly2 { c2, c1, c0 }
    }

    /// Evaluate with Horner's scheme
    pub fn evaluate(&self, x: f64) -> f64 {
        (self.c2 * x + self.c1) * x + self.c0
    }

    /// Real roots, or `None` when there are none
    ///
    /// A degenerate quadratic yields its single linear root twice.
    fn roots(&self) -> Option<(f64, f64)> {
        if self.c2.abs() <= EPSILON {
            if self.c1.abs() <= EPSILON {
                return None;
            }
            let root = -self.c0 / self.c1;
            return Some((root, root));
        }

        let discriminant = self.c1 * self.c1 - 4.0 * self.c2 * self.c0;
        if discriminant < 0.0 {
            return None;
        }

        let q = -0.5 * (self.c1 + self.c1.signum() * discriminant.sqrt());
        let r1 = q / self.c2;
        // q == 0 only for the double root at zero
        let r2 = if q != 0.0 { self.c0 / q } else { r1 };
        Some((r1, r2))
    }

    /// Smallest root in `[0, upper_bound)`
    ///
    /// # Example
    ///
    /// ```
    /// use billiard_physics::solver::polynomial::Poly2;
    ///
    /// // (x - 1)(x - 3)
    /// let p = Poly2::new(1.0, -4.0, 3.0);
    /// assert!((p.smallest_root(10.0).unwrap() - 1.0).abs() < 1e-12);
    /// assert!(p.smallest_root(0.5).is_none());
    /// ```
    pub fn smallest_root(&self, upper_bound: f64) -> Option<f64> {
        let (r1, r2) = self.roots()?;
        [r1, r2]
            .into_iter()
            .filter(|r| *r >= 0.0 && *r < upper_bound)
            .fold(None, |best: Option<f64>, r| match best {
                Some(b) if b <= r => Some(b),
                _ => Some(r),
            })
    }

    /// Largest real root, regardless of sign
    pub fn largest_root(&self) -> Option<f64> {
        let (r1, r2) = self.roots()?;
        Some(r1.max(r2))
    }
}

/// Quartic `c4·x⁴ + c3·x³ + c2·x² + c1·x + c0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poly4 {
    /// Quartic coefficient
    pub c4: f64,
    /// Cubic coefficient
    pub c3: f64,
    /// Quadratic coefficient
    pub c2: f64,
    /// Linear coefficient
    pub c1: f64,
    /// Constant coefficient
    pub c0: f64,
}

/// Outcome of isolating a root inside an interval
#[derive(Debug, Clone, Copy, PartialEq)]
enum Isolation {
    /// Exactly one root lies in `[lo, hi]`
    Isolated(f64, f64),
    /// No root lies in the interval
    Empty,
    /// Depth ran out before the roots could be separated
    Unresolved,
}

impl Poly4 {
    /// Create a quartic from its coefficients, highest degree first
    pub fn new(c4: f64, c3: f64, c2: f64, c1: f64, c0: f64) -> Self {
        Poly4 { c4, c3, c2, c1, c0 }
    }

    /// Evaluate with Horner's scheme
    pub fn evaluate(&self, x: f64) -> f64 {
        (((self.c4 * x + self.c3) * x + self.c2) * x + self.c1) * x + self.c0
    }

    /// Smallest root in `[0, upper_bound]`, refined to `error_bound`
    ///
    /// Falls back to the quadratic solver when both leading coefficients
    /// vanish. A non-finite or non-positive bound finds nothing.
    ///
    /// # Example
    ///
    /// ```
    /// use billiard_physics::solver::polynomial::Poly4;
    ///
    /// // (x - 1)(x - 2)(x² + 1) = x⁴ - 3x³ + 3x² - 3x + 2
    /// let p = Poly4::new(1.0, -3.0, 3.0, -3.0, 2.0);
    /// let root = p.smallest_root(10.0, 1e-9).unwrap();
    /// assert!((root - 1.0).abs() < 1e-8);
    /// ```
    pub fn smallest_root(&self, upper_bound: f64, error_bound: f64) -> Option<f64> {
        if self.c4.abs() <= EPSILON && self.c3.abs() <= EPSILON {
            return Poly2::new(self.c2, self.c1, self.c0).smallest_root(upper_bound);
        }
        if !(upper_bound > 0.0) || !upper_bound.is_finite() {
            return None;
        }

        let depth = max_depth(upper_bound, error_bound);
        match self.isolate(0.0, upper_bound, depth) {
            Isolation::Isolated(lo, hi) => Some(self.bisect(lo, hi, error_bound)),
            Isolation::Empty => None,
            Isolation::Unresolved => {
                log::trace!(
                    "Quartic root isolation exhausted depth {} on [0, {}]",
                    depth,
                    upper_bound
                );
                None
            }
        }
    }

    /// Sign changes between the Bernstein coefficients on `[a, b]`
    ///
    /// The inner three coefficients are scaled by the binomial factors 4, 6
    /// and 4, which leaves their signs intact.
    fn sign_changes(&self, a: f64, b: f64) -> u32 {
        let Poly4 { c4, c3, c2, c1, c0 } = *self;
        let (a2, b2) = (a * a, b * b);
        let (a3, b3) = (a2 * a, b2 * b);

        let s4 = self.evaluate(a);
        let s3 = 4.0 * c0
            + c1 * (3.0 * a + b)
            + 2.0 * c2 * (a2 + a * b)
            + c3 * (a3 + 3.0 * a2 * b)
            + 4.0 * c4 * a3 * b;
        let s2 = 6.0 * c0
            + 3.0 * c1 * (a + b)
            + c2 * (a2 + 4.0 * a * b + b2)
            + 3.0 * c3 * (a2 * b + a * b2)
            + 6.0 * c4 * a2 * b2;
        let s1 = 4.0 * c0
            + c1 * (a + 3.0 * b)
            + 2.0 * c2 * (b2 + a * b)
            + c3 * (b3 + 3.0 * a * b2)
            + 4.0 * c4 * a * b3;
        let s0 = self.evaluate(b);

        [s4, s3, s2, s1, s0]
            .windows(2)
            .filter(|w| (w[0] > 0.0) != (w[1] > 0.0))
            .count() as u32
    }

    fn isolate(&self, lo: f64, hi: f64, depth: u32) -> Isolation {
        match self.sign_changes(lo, hi) {
            0 => return Isolation::Empty,
            1 => return Isolation::Isolated(lo, hi),
            _ if depth == 0 => return Isolation::Unresolved,
            _ => {}
        }

        let mid = 0.5 * (lo + hi);
        match self.isolate(lo, mid, depth - 1) {
            Isolation::Empty => self.isolate(mid, hi, depth - 1),
            // An ambiguous left half may hide the earliest root
            other => other,
        }
    }

    fn bisect(&self, mut lo: f64, mut hi: f64, error_bound: f64) -> f64 {
        let f_lo = self.evaluate(lo);
        if f_lo == 0.0 {
            return lo;
        }
        let lo_positive = f_lo > 0.0;

        for _ in 0..MAX_BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if 0.5 * (hi - lo) < error_bound {
                return mid;
            }
            let value = self.evaluate(mid);
            if value.abs() < EPSILON {
                return mid;
            }
            if (value > 0.0) == lo_positive {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }
}

fn max_depth(upper_bound: f64, error_bound: f64) -> u32 {
    let ratio = upper_bound / error_bound.max(EPSILON);
    if !ratio.is_finite() || ratio <= 1.0 {
        return if ratio <= 1.0 { 1 } else { MAX_SUBDIVISION_DEPTH };
    }
    ((ratio.log2().ceil() as u32) + 1).min(MAX_SUBDIVISION_DEPTH)
}
