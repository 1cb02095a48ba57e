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
//! Accuracy of the quadratic and quartic root solvers on hand-built polynomials

use billiard_physics::solver::polynomial::{Poly2, Poly4};

/// Expand `(x - r1)(x - r2)(x² + 1)`
fn two_real_roots(r1: f64, r2: f64) -> Poly4 {
    // (x² - s x + p)(x² + 1) with s = r1 + r2, p = r1 r2
    let s = r1 + r2;
    let p = r1 * r2;
    Poly4::new(1.0, -s, p + 1.0, -s, p)
}

/// Expand `(x - a)(x - b)(x - c)(x - d)`
fn four_real_roots(a: f64, b: f64, c: f64, d: f64) -> Poly4 {
    let e1 = a + b + c + d;
    let e2 = a * b + a * c + a * d + b * c + b * d + c * d;
    let e3 = a * b * c + a * b * d + a * c * d + b * c * d;
    let e4 = a * b * c * d;
    Poly4::new(1.0, -e1, e2, -e3, e4)
}

#[test]
fn test_quartic_returns_smaller_of_two_roots() {
    let error_bound = 1e-8;
    let poly = two_real_roots(0.75, 2.5);
    let root = poly.smallest_root(10.0, error_bound).unwrap();
    assert!((root - 0.75).abs() <= error_bound);
}

#[test]
fn test_quartic_four_close_roots() {
    let error_bound = 1e-10;
    let poly = four_real_roots(0.1, 0.2, 0.3, 0.4);
    let root = poly.smallest_root(1.0, error_bound).unwrap();
    assert!((root - 0.1).abs() <= error_bound);
}

#[test]
fn test_quartic_root_beyond_bound() {
    let poly = two_real_roots(3.0, 4.0);
    assert!(poly.smallest_root(2.5, 1e-8).is_none());
    let root = poly.smallest_root(3.5, 1e-8).unwrap();
    assert!((root - 3.0).abs() < 1e-8);
}

#[test]
fn test_quartic_negative_roots_ignored() {
    let poly = two_real_roots(-2.0, 1.5);
    let root = poly.smallest_root(5.0, 1e-9).unwrap();
    assert!((root - 1.5).abs() < 1e-9);
}

#[test]
fn test_quartic_without_real_roots() {
    // (x² + 1)(x² + 4)
    let poly = Poly4::new(1.0, 0.0, 5.0, 0.0, 4.0);
    assert!(poly.smallest_root(100.0, 1e-8).is_none());
}

#[test]
fn test_quartic_invalid_bounds() {
    let poly = two_real_roots(0.5, 1.0);
    assert!(poly.smallest_root(0.0, 1e-8).is_none());
    assert!(poly.smallest_root(-1.0, 1e-8).is_none());
    assert!(poly.smallest_root(f64::INFINITY, 1e-8).is_none());
    assert!(poly.smallest_root(f64::NAN, 1e-8).is_none());
}

#[test]
fn test_quartic_degenerates_to_quadratic() {
    // 0·x⁴ + 0·x³ + (x - 2)(x - 5)
    let poly = Poly4::new(0.0, 0.0, 1.0, -7.0, 10.0);
    let root = poly.smallest_root(100.0, 1e-8).unwrap();
    assert!((root - 2.0).abs() < 1e-12);
}

#[test]
fn test_quartic_contact_like_coefficients() {
    // Decelerating ball: distance² to a point at 1 m, minus a 5 cm reach
    let a = -0.5 * 0.2 * 9.81;
    let b = 2.0;
    let c = -1.0;
    let reach = 0.05;
    let poly = Poly4::new(a * a, 2.0 * a * b, 2.0 * a * c + b * b, 2.0 * b * c, c * c - reach * reach);
    let t = poly.smallest_root(10.0, 1e-10).unwrap();

    let position = (a * t + b) * t + c;
    assert!((position.abs() - reach).abs() < 1e-8);
    assert!(position < 0.0);
}

#[test]
fn test_quadratic_avoids_cancellation() {
    // (x - 1e-8)(x - 1e8)
    let poly = Poly2::new(1.0, -(1e8 + 1e-8), 1.0);
    let root = poly.smallest_root(f64::INFINITY).unwrap();
    assert!((root - 1e-8).abs() / 1e-8 < 1e-9);
}

#[test]
fn test_quadratic_largest_root_for_flight_time() {
    // -g/2 t² + vy t, the ball returns to the slate at 2 vy / g
    let g = 9.81;
    let vy = 1.2;
    let poly = Poly2::new(-0.5 * g, vy, 0.0);
    let t = poly.largest_root().unwrap();
    assert!((t - 2.0 * vy / g).abs() < 1e-12);
}
