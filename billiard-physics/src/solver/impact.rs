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
//! Impact resolution
//!
//! # Bilinear law
//!
//! Ball-ball, ball-cushion, ball-vertex and ball-slate contacts share a
//! bilinear impulse law on the relative contact-point velocity `v` with
//! normal `n`:
//!
//! ```text
//! vn = v·n,  vt = v - vn·n
//! Jn = -(1 + e)·vn·mn·n
//! Jt = -t̂ · min(μ·|Jn|, (1 + et)·|vt|·mt)
//! ```
//!
//! where `mn` and `mt` are the effective masses along the normal and the
//! tangent. Bodies are first separated along the normal by the penetration
//! depth plus the configured slop; the impulse is skipped when they are
//! already separating.
//!
//! # Cue strike
//!
//! The cue uses the algebraic impulse model of Chatterjee and Ruina: the
//! combined inverse-inertia operator `W` of ball and cue at the contact point
//! gives a plastic frictionless impulse `P_I` and an elastic one `P_II`; the
//! final impulse interpolates between them by the restitution and is pulled
//! back onto the friction cone when it falls outside.
//!
//! # References
//!
//! - Chatterjee, A., & Ruina, A. (1998). A New Algebraic Rigid-Body Collision
//!   Law Based on Impulse Space Considerations. Journal of Applied Mechanics,
//!   65(4), 939-951.
//! - Shepherd, M. (2011). Billiards physics notes on the bilinear law.

use super::PhysicsSolver;
use crate::config::ImpactParameters;
use crate::objects::{Ball, Cue, Cushion};
use glam::{DMat3, DVec2, DVec3};

/// Skew-symmetric matrix `[v]×` with `[v]× · r = v × r`
fn cross_matrix(v: DVec3) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(0.0, v.z, -v.y),
        DVec3::new(-v.z, 0.0, v.x),
        DVec3::new(v.y, -v.x, 0.0),
    )
}

/// Impulse from the bilinear law for contact velocity `v` along normal `n`
fn bilinear_impulse(v: DVec3, n: DVec3, params: &ImpactParameters, mass_n: f64, mass_t: f64) -> DVec3 {
    let vn = v.dot(n);
    let vt = v - vn * n;

    let normal = -(1.0 + params.normal_restitution) * vn * mass_n;
    let friction_limit = params.friction * normal.abs();
    let stick_limit = (1.0 + params.tangential_restitution) * vt.length() * mass_t;
    let tangential = friction_limit.min(stick_limit);

    normal * n - tangential * vt.normalize_or_zero()
}

impl PhysicsSolver {
    /// Resolve contact between two balls
    ///
    /// The normal points from `b2` toward `b1`. Returns the contact point on
    /// the surface of `b2`.
    pub fn resolve_ball_to_ball_impact(&self, b1: &mut Ball, b2: &mut Ball) -> DVec3 {
        let centre_line = b1.position - b2.position;
        let normal = centre_line.normalize_or_zero();
        let contact = b2.position + normal * b2.radius();
        let r1 = contact - b1.position;
        let r2 = contact - b2.position;

        let v = b1.velocity + b1.angular_velocity.cross(r1)
            - b2.velocity
            - b2.angular_velocity.cross(r2);

        let push = 0.5
            * ((b1.radius() + b2.radius() - centre_line.length()).abs()
                + self.constants.collision_displacement);
        self.set_position(b1, b1.position + normal * push);
        self.set_position(b2, b2.position - normal * push);

        if normal.dot(v) < 0.0 {
            let mass = 1.0 / (b1.inverse_mass() + b2.inverse_mass());
            let impulse = bilinear_impulse(v, normal, &self.constants.ball_to_ball, mass, 2.0 / 7.0 * mass);

            self.set_velocity(b1, b1.velocity + b1.inverse_mass() * impulse);
            self.set_velocity(b2, b2.velocity - b2.inverse_mass() * impulse);
            self.set_angular_velocity(
                b1,
                b1.angular_velocity + b1.inverse_inertia() * r1.cross(impulse),
            );
            self.set_angular_velocity(
                b2,
                b2.angular_velocity - b2.inverse_inertia() * r2.cross(impulse),
            );
        }

        self.settle(b1);
        self.settle(b2);
        contact
    }

    /// Resolve contact between a ball and the interior of a cushion segment
    ///
    /// Returns the contact point on the ball surface.
    pub fn resolve_ball_cushion_impact(&self, ball: &mut Ball, cushion: &Cushion) -> DVec3 {
        let lift = self.cushion_lift(cushion);
        let closest = cushion.closest_point(ball.position, lift);

        // Orient from the cushion toward the ball
        let mut normal = cushion.normal();
        if normal.dot(closest - ball.position) > 0.0 {
            normal = -normal;
        }
        let contact = ball.position - normal * ball.radius();

        let depth = ((closest - ball.position).length() - ball.radius()).abs();
        self.resolve_against_fixed(ball, normal, depth, &self.constants.ball_to_cushion);
        contact
    }

    /// Resolve contact between a ball and cushion endpoint `vertex`
    ///
    /// Returns the contact point on the ball surface.
    pub fn resolve_ball_vertex_impact(&self, ball: &mut Ball, cushion: &Cushion, vertex: usize) -> DVec3 {
        let point = cushion.vertex(vertex) + self.cushion_lift(cushion);
        let normal = (ball.position - point).normalize_or_zero();
        let contact = ball.position - normal * ball.radius();

        let depth = ((point - ball.position).length() - ball.radius()).abs();
        self.resolve_against_fixed(ball, normal, depth, &self.constants.ball_to_cushion);
        contact
    }

    /// Resolve a landing ball against the slate
    pub fn resolve_ball_slate_impact(&self, ball: &mut Ball) {
        let r = -DVec3::Y * ball.radius();
        let v = ball.velocity + ball.angular_velocity.cross(r);
        let impulse = bilinear_impulse(
            v,
            -DVec3::Y,
            &self.constants.ball_to_slate,
            ball.mass(),
            2.0 / 7.0 * ball.mass(),
        );

        ball.position.y = 0.0;
        self.set_velocity(ball, ball.velocity + ball.inverse_mass() * impulse);
        self.set_angular_velocity(ball, ball.angular_velocity + ball.inverse_inertia() * r.cross(impulse));
        self.settle(ball);
    }

    /// Separate a ball from an immovable body along `normal` and apply the
    /// bilinear impulse when the ball is approaching
    fn resolve_against_fixed(&self, ball: &mut Ball, normal: DVec3, depth: f64, params: &ImpactParameters) {
        self.set_position(
            ball,
            ball.position + normal * (depth + self.constants.collision_displacement),
        );

        if ball.velocity.dot(normal) <= 0.0 {
            let r = -normal * ball.radius();
            let v = ball.velocity + ball.angular_velocity.cross(r);
            let impulse = bilinear_impulse(v, normal, params, ball.mass(), 2.0 / 7.0 * ball.mass());
            self.set_velocity(ball, ball.velocity + ball.inverse_mass() * impulse);
            self.set_angular_velocity(
                ball,
                ball.angular_velocity + ball.inverse_inertia() * r.cross(impulse),
            );
        }
        self.settle(ball);
    }

    /// Strike a ball with the cue
    ///
    /// `yaw_deg` rotates the cue about the vertical axis, `pitch_deg` elevates
    /// it. `offset` is the tip contact point in the cue frame as a fraction of
    /// the ball radius (`x` right, `y` up). Returns `false` on a miscue, in
    /// which case the ball is left untouched.
    pub fn resolve_ball_cue_impact(
        &self,
        ball: &mut Ball,
        cue: &Cue,
        speed: f64,
        yaw_deg: f64,
        pitch_deg: f64,
        offset: DVec2,
    ) -> bool {
        let params = cue.impact();
        let radius = ball.radius();
        let mu = params.friction;

        // Beyond this offset the tip cannot grip the ball
        let grip = mu * radius / (1.0 + mu * mu).sqrt();
        let limit = grip.min(cue.max_tip_offset() * radius);

        let mut contact_local = DVec3::new(offset.x, offset.y, 0.0) * radius;
        if contact_local.length() >= limit {
            log::debug!(
                "Miscue on ball {}: offset {:.3} exceeds {:.3}",
                ball.identifier,
                contact_local.length(),
                limit
            );
            return false;
        }
        contact_local.z = -(radius * radius - contact_local.length_squared()).sqrt();

        // Cue frame in world coordinates; local z runs along the cue toward the ball
        let frame = DMat3::from_rotation_y(yaw_deg.to_radians()) * DMat3::from_rotation_x(pitch_deg.to_radians());
        let contact = frame * contact_local;
        let cue_centre = contact + frame * DVec3::new(0.0, 0.0, -0.5 * cue.length());

        let ball_inertia = DMat3::IDENTITY * ball.inverse_inertia();
        let cue_inertia = DMat3::IDENTITY * cue.inverse_inertia();
        let arm_ball = cross_matrix(contact);
        let arm_cue = cross_matrix(contact - cue_centre);
        let w = DMat3::IDENTITY * (ball.inverse_mass() + cue.inverse_mass())
            - (arm_ball * ball_inertia * arm_ball
                + arm_cue * frame * cue_inertia * frame.transpose() * arm_cue);
        let m = w.inverse();

        let velocity = frame.z_axis * speed;
        let normal = -frame.z_axis;
        let impulse = algebraic_impulse(w, m, velocity, normal, &params);

        self.set_velocity(ball, ball.velocity - ball.inverse_mass() * impulse);
        self.set_angular_velocity(
            ball,
            ball.angular_velocity - ball.inverse_inertia() * contact.cross(impulse),
        );
        self.settle(ball);
        true
    }
}

/// Energy and friction constrained impulse for relative velocity `v`
fn algebraic_impulse(w: DMat3, m: DMat3, v: DVec3, n: DVec3, params: &ImpactParameters) -> DVec3 {
    let e = params.normal_restitution;
    let et = params.tangential_restitution;
    let mu = params.friction;

    // Plastic frictionless and fully elastic limits
    let plastic = -n * n.dot(v) / n.dot(w * n);
    let elastic = -(m * v);
    let difference = elastic - plastic;

    let candidate = (1.0 + e) * plastic + (1.0 + et) * difference;
    let candidate_n = n.dot(candidate);
    let k = if (candidate - candidate_n * n).length() > mu * candidate_n {
        let elastic_t = (elastic - n * n.dot(elastic)).length();
        let denominator = elastic_t - mu * n.dot(difference);
        if denominator > f64::EPSILON {
            mu * (1.0 + e) * n.dot(plastic) / denominator
        } else {
            0.0
        }
    } else {
        1.0 + et
    };

    (1.0 + e) * plastic + k * difference
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConstants;
    use crate::objects::MotionType;
    use glam::DQuat;

    const R: f64 = 0.028575;
    const M: f64 = 0.17;

    fn solver_with(ball_to_ball: ImpactParameters) -> PhysicsSolver {
        let mut constants = SolverConstants::default();
        constants.planar = true;
        constants.ball_to_ball = ball_to_ball;
        PhysicsSolver::new(constants)
    }

    fn ball_at(id: u32, position: DVec3) -> Ball {
        Ball::new(id, position, DQuat::IDENTITY, M, R)
    }

    #[test]
    fn test_cross_matrix() {
        let v = DVec3::new(1.0, 2.0, 3.0);
        let r = DVec3::new(-0.5, 0.25, 4.0);
        assert!((cross_matrix(v) * r - v.cross(r)).length() < 1e-12);
    }

    #[test]
    fn test_head_on_elastic_transfer() {
        let s = solver_with(ImpactParameters::new(1.0, 0.0, 0.0));
        let mut a = ball_at(0, DVec3::new(-R, 0.0, 0.0));
        let mut b = ball_at(1, DVec3::new(R, 0.0, 0.0));
        a.velocity = DVec3::new(1.0, 0.0, 0.0);
        a.angular_velocity = DVec3::Y.cross(a.velocity) / R;

        s.resolve_ball_to_ball_impact(&mut a, &mut b);
        assert!(a.velocity.length() < 1e-9);
        assert!((b.velocity - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-9);
        assert!(b.position.x - a.position.x > 2.0 * R);
    }

    #[test]
    fn test_separating_balls_only_pushed() {
        let s = solver_with(ImpactParameters::new(1.0, 0.0, 0.0));
        let mut a = ball_at(0, DVec3::new(-R, 0.0, 0.0));
        let mut b = ball_at(1, DVec3::new(R, 0.0, 0.0));
        a.velocity = DVec3::new(-1.0, 0.0, 0.0);
        s.resolve_ball_to_ball_impact(&mut a, &mut b);
        assert_eq!(a.velocity, DVec3::new(-1.0, 0.0, 0.0));
        assert_eq!(b.velocity, DVec3::ZERO);
    }

    #[test]
    fn test_normal_speed_never_grows() {
        let s = solver_with(ImpactParameters::new(0.9, 0.5, 0.2));
        let mut a = ball_at(0, DVec3::ZERO);
        let mut b = ball_at(1, DVec3::new(1.6 * R, 0.0, 1.2 * R));
        a.velocity = DVec3::new(1.0, 0.0, 0.3);
        a.angular_velocity = DVec3::new(3.0, 5.0, -10.0);
        let n = (a.position - b.position).normalize();
        let before = (a.velocity - b.velocity).dot(n).abs();

        s.resolve_ball_to_ball_impact(&mut a, &mut b);
        let after = (a.velocity - b.velocity).dot(n).abs();
        assert!(after <= before + 1e-12);
    }

    #[test]
    fn test_cushion_reflects_normal_velocity() {
        let mut constants = SolverConstants::default();
        constants.planar = true;
        constants.ball_to_cushion = ImpactParameters::new(1.0, 0.0, 0.0);
        let s = PhysicsSolver::new(constants);

        let cushion = Cushion::new(0, DVec3::new(-1.0, 0.0, 0.5), DVec3::new(1.0, 0.0, 0.5), 0.0);
        let mut ball = ball_at(0, DVec3::new(0.0, 0.0, 0.5 - R));
        ball.velocity = DVec3::new(0.3, 0.0, 1.0);

        let contact = s.resolve_ball_cushion_impact(&mut ball, &cushion);
        assert!((contact.z - 0.5).abs() < 1e-9);
        assert!((ball.velocity.z + 1.0).abs() < 1e-9);
        assert!((ball.velocity.x - 0.3).abs() < 1e-9);
        assert!(ball.position.z < 0.5 - R);
    }

    #[test]
    fn test_vertex_impact_pushes_away() {
        let mut constants = SolverConstants::default();
        constants.planar = true;
        let s = PhysicsSolver::new(constants);
        let cushion = Cushion::new(0, DVec3::new(0.0, 0.0, 0.5), DVec3::new(1.0, 0.0, 0.5), 0.0);
        let mut ball = ball_at(0, DVec3::new(0.0, 0.0, 0.5 - R));
        ball.velocity = DVec3::new(0.0, 0.0, 1.0);

        s.resolve_ball_vertex_impact(&mut ball, &cushion, 0);
        assert!(ball.velocity.z < 0.0);
        assert!((ball.position - cushion.vertex(0)).length() > R);
    }

    #[test]
    fn test_slate_impact_bounces() {
        let s = PhysicsSolver::new(SolverConstants::default());
        let mut ball = ball_at(0, DVec3::ZERO);
        ball.velocity = DVec3::new(0.0, -2.0, 0.0);
        s.resolve_ball_slate_impact(&mut ball);
        assert!((ball.velocity.y - 1.0).abs() < 1e-9);
        assert_eq!(ball.motion, MotionType::Airborne);
    }

    #[test]
    fn test_centre_strike_has_no_spin() {
        let s = PhysicsSolver::new(SolverConstants::default());
        let mut ball = ball_at(0, DVec3::ZERO);
        let cue = Cue::default();
        assert!(s.resolve_ball_cue_impact(&mut ball, &cue, 2.0, 0.0, 0.0, DVec2::ZERO));
        assert!(ball.velocity.z > 0.0);
        assert!(ball.velocity.x.abs() < 1e-12);
        assert!(ball.angular_velocity.length() < 1e-9);
        assert_eq!(ball.motion, MotionType::Sliding);
    }

    #[test]
    fn test_yaw_rotates_strike_direction() {
        let s = PhysicsSolver::new(SolverConstants::default());
        let mut ball = ball_at(0, DVec3::ZERO);
        assert!(s.resolve_ball_cue_impact(&mut ball, &Cue::default(), 2.0, 90.0, 0.0, DVec2::ZERO));
        assert!(ball.velocity.x > 0.0);
        assert!(ball.velocity.z.abs() < 1e-9);
    }

    #[test]
    fn test_top_spin_from_high_strike() {
        let s = PhysicsSolver::new(SolverConstants::default());
        let mut ball = ball_at(0, DVec3::ZERO);
        assert!(s.resolve_ball_cue_impact(&mut ball, &Cue::default(), 2.0, 0.0, 0.0, DVec2::new(0.0, 0.3)));
        // Forward roll about +x for motion along +z
        assert!(ball.angular_velocity.x > 0.0);
    }

    #[test]
    fn test_miscue_leaves_ball_untouched() {
        let s = PhysicsSolver::new(SolverConstants::default());
        let mut ball = ball_at(0, DVec3::ZERO);
        let before = ball;
        assert!(!s.resolve_ball_cue_impact(&mut ball, &Cue::default(), 2.0, 0.0, 0.0, DVec2::new(0.9, 0.0)));
        assert_eq!(ball, before);
    }
}
