// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sequential-impulse contact solver.
//!
//! Runs serial Gauss–Seidel passes over the solid contacts. Each pass
//! resolves, per contact, the normal row, a torsional correction about the
//! normal, a tipping correction about the two tangents and the two friction
//! rows, applying every impulse to the bodies immediately. Accumulated
//! impulses are clamped (normal `>= 0`, friction within
//! `±friction * lambda_n`, tipping within `±lambda_n * patch_radius`). A contact whose last pass moved no body
//! by more than the configured epsilons is skipped for the rest of the step.

use tumble_math::{clamp, Vec3};

use crate::config::WorldConfig;
use crate::contact::{Contact, ImpulseEntry};

/// Velocity state of one body while the solver runs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct SolverBody {
    pub(crate) inverse_mass: f32,
    pub(crate) inverse_inertia: Vec3,
    pub(crate) velocity: Vec3,
    pub(crate) angular_velocity: Vec3,
}

impl SolverBody {
    /// Immovable, motionless body used for static colliders.
    pub(crate) const FIXED: Self = Self {
        inverse_mass: 0.0,
        inverse_inertia: Vec3::ZERO,
        velocity: Vec3::ZERO,
        angular_velocity: Vec3::ZERO,
    };

    pub(crate) fn apply(&mut self, linear: Vec3, angular: Vec3, lambda: f32) {
        self.velocity = self.velocity.add(&linear.scale(lambda * self.inverse_mass));
        self.angular_velocity = self.angular_velocity.add(&self.inverse_inertia.mul_elem(&angular).scale(lambda));
    }
}

/// Computes rows, effective masses and biases for every contact.
pub(crate) fn prepare(bodies: &[SolverBody], contacts: &mut [&mut Contact], dt: f32, config: &WorldConfig) {
    for c in contacts.iter_mut() {
        let a = bodies[c.solver_a];
        let b = bodies[c.solver_b];
        c.init_velocity_constraint(dt, &a, &b, config);
    }
}

/// Pre-applies the averaged impulse history, projected onto the fresh rows.
pub(crate) fn warm_start(bodies: &mut [SolverBody], contacts: &mut [&mut Contact], config: &WorldConfig) {
    for c in contacts.iter_mut() {
        let Some(avg) = c.history.average() else {
            continue;
        };
        let on_a = avg.on_a.scale(config.warm_start_factor);
        let on_b = avg.on_b.scale(config.warm_start_factor);
        let mut lambdas = c.rows.map(|row| 0.5 * (row.va.dot(&on_a) + row.vb.dot(&on_b)));
        lambdas[0] = lambdas[0].max(0.0);
        let limit = c.material.friction * lambdas[0];
        lambdas[1] = clamp(lambdas[1], -limit, limit);
        lambdas[2] = clamp(lambdas[2], -limit, limit);

        let (mut a, mut b) = (bodies[c.solver_a], bodies[c.solver_b]);
        for (row, lambda) in c.rows.iter_mut().zip(lambdas) {
            row.accumulated = lambda;
            row.apply(&mut a, &mut b, lambda);
        }
        bodies[c.solver_a] = a;
        bodies[c.solver_b] = b;
    }
}

/// One Gauss–Seidel pass. Returns `true` when every contact has converged.
pub(crate) fn iterate(bodies: &mut [SolverBody], contacts: &mut [&mut Contact], config: &WorldConfig) -> bool {
    let mut all_converged = true;
    for c in contacts.iter_mut() {
        if c.converged {
            continue;
        }
        let (mut a, mut b) = (bodies[c.solver_a], bodies[c.solver_b]);
        let start = (a, b);
        solve_contact(c, &mut a, &mut b, config);

        let settled = a.velocity.sub(&start.0.velocity).length() < config.linear_epsilon
            && a.angular_velocity.sub(&start.0.angular_velocity).length() < config.angular_epsilon
            && b.velocity.sub(&start.1.velocity).length() < config.linear_epsilon
            && b.angular_velocity.sub(&start.1.angular_velocity).length() < config.angular_epsilon;
        c.converged = settled;
        all_converged &= settled;

        bodies[c.solver_a] = a;
        bodies[c.solver_b] = b;
    }
    all_converged
}

fn solve_contact(c: &mut Contact, a: &mut SolverBody, b: &mut SolverBody, config: &WorldConfig) {
    let normal = &mut c.rows[0];
    let lambda = -normal.effective_mass * (normal.velocity(a, b) + normal.bias);
    let old = normal.accumulated;
    normal.accumulated = (old + lambda).max(0.0);
    let applied = normal.accumulated - old;
    normal.apply(a, b, applied);
    let lambda_n = normal.accumulated;
    let n = normal.vb;

    if c.twist_mass > 0.0 {
        let spin = b.angular_velocity.sub(&a.angular_velocity).dot(&n);
        let limit = c.material.friction * lambda_n * config.spin_radius;
        let old = c.twist;
        c.twist = clamp(old - c.twist_mass * spin, -limit, limit);
        let applied = c.twist - old;
        a.apply(Vec3::ZERO, -n, applied);
        b.apply(Vec3::ZERO, n, applied);
    }

    // A flat patch resists relative rotation about the tangents up to the
    // torque its normal load can carry.
    if c.patch_radius() > 0.0 {
        let limit = lambda_n * c.patch_radius();
        for i in 0..2 {
            let axis = c.rows[i + 1].vb;
            let spin = b.angular_velocity.sub(&a.angular_velocity).dot(&axis);
            let old = c.tilt[i];
            c.tilt[i] = clamp(old - c.tilt_mass[i] * spin, -limit, limit);
            let applied = c.tilt[i] - old;
            a.apply(Vec3::ZERO, -axis, applied);
            b.apply(Vec3::ZERO, axis, applied);
        }
    }

    let limit = c.material.friction * lambda_n;
    for row in &mut c.rows[1..] {
        let lambda = -row.effective_mass * row.velocity(a, b);
        let old = row.accumulated;
        row.accumulated = clamp(old + lambda, -limit, limit);
        let applied = row.accumulated - old;
        row.apply(a, b, applied);
    }
}

/// Pushes this step's total linear impulse into each contact's history.
pub(crate) fn commit(contacts: &mut [&mut Contact]) {
    for c in contacts.iter_mut() {
        let mut entry = ImpulseEntry::default();
        for row in &c.rows {
            entry.on_a = entry.on_a.add(&row.va.scale(row.accumulated));
            entry.on_b = entry.on_b.add(&row.vb.scale(row.accumulated));
        }
        c.history.push(entry);
    }
}

/// Full solve: prepare, warm start, iterate until converged or out of
/// passes, commit. Returns the number of passes run.
pub(crate) fn solve(bodies: &mut [SolverBody], contacts: &mut [&mut Contact], dt: f32, config: &WorldConfig) -> u32 {
    prepare(bodies, contacts, dt, config);
    warm_start(bodies, contacts, config);
    let mut passes = 0;
    while passes < config.solver_iterations {
        passes += 1;
        if iterate(bodies, contacts, config) {
            break;
        }
    }
    commit(contacts);
    passes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{BodyHandle, ColliderHandle};
    use crate::material::Material;
    use tumble_geom::narrow::Penetration;
    use tumble_math::Prng;

    fn sliding_box() -> (Vec<SolverBody>, Contact) {
        let bodies = vec![
            SolverBody::FIXED,
            SolverBody {
                inverse_mass: 1.0,
                inverse_inertia: Vec3::splat(6.0),
                velocity: Vec3::new(3.0, -1.0, 0.5),
                angular_velocity: Vec3::new(0.0, 2.0, 0.0),
            },
        ];
        let mut c = Contact::new(ColliderHandle(0), ColliderHandle(1), None, Some(BodyHandle(0)), 4);
        c.update(
            &Penetration {
                vector: Vec3::new(0.0, 0.05, 0.0),
                point_a: Vec3::new(0.3, 0.0, -0.2),
                point_b: Vec3::new(0.3, -0.05, -0.2),
                patch_radius: 0.0,
            },
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(0.0, 0.45, 0.0),
        );
        c.material = Material::default().combine(&Material::default());
        c.solver_a = 0;
        c.solver_b = 1;
        (bodies, c)
    }

    #[test]
    fn friction_stays_inside_cone_every_pass() {
        let config = WorldConfig::default().with_epsilons(0.0, 0.0);
        let (mut bodies, mut c) = sliding_box();
        let mut contacts = [&mut c];
        prepare(&bodies, &mut contacts, 1.0 / 60.0, &config);
        warm_start(&mut bodies, &mut contacts, &config);
        for _ in 0..10 {
            iterate(&mut bodies, &mut contacts, &config);
            let c = &contacts[0];
            let lambda_n = c.rows[0].accumulated;
            assert!(lambda_n >= 0.0);
            for row in &c.rows[1..] {
                assert!(row.accumulated.abs() <= c.material.friction * lambda_n + 1e-6);
            }
            assert!(c.twist.abs() <= c.material.friction * lambda_n * config.spin_radius + 1e-6);
        }
    }

    fn random_body(prng: &mut Prng) -> SolverBody {
        SolverBody {
            inverse_mass: prng.next_range(0.1, 4.0),
            inverse_inertia: Vec3::new(
                prng.next_range(0.1, 12.0),
                prng.next_range(0.1, 12.0),
                prng.next_range(0.1, 12.0),
            ),
            velocity: prng.next_vec3(-5.0, 5.0),
            angular_velocity: prng.next_vec3(-4.0, 4.0),
        }
    }

    fn random_material(prng: &mut Prng) -> Material {
        Material::new(prng.next_f32(), prng.next_range(0.0, 1.2), prng.next_range(0.1, 0.9))
    }

    #[test]
    fn friction_cone_holds_for_random_contacts() {
        let config = WorldConfig::default().with_epsilons(0.0, 0.0);
        let mut prng = Prng::from_seed(0xc0_e5);
        for case in 0..500 {
            let fixed_a = case % 5 == 0;
            let mut bodies = vec![
                if fixed_a { SolverBody::FIXED } else { random_body(&mut prng) },
                random_body(&mut prng),
            ];
            let n = prng.next_quat().rotate(Vec3::UNIT_Y);
            let depth = prng.next_range(0.0, 0.2);
            let point_a = prng.next_vec3(-1.0, 1.0);
            let found = Penetration {
                vector: n.scale(depth),
                point_a,
                point_b: point_a.sub(&n.scale(depth)),
                patch_radius: if case % 3 == 0 { prng.next_range(0.0, 0.6) } else { 0.0 },
            };
            let body_a = if fixed_a { None } else { Some(BodyHandle(0)) };
            let mut c = Contact::new(ColliderHandle(0), ColliderHandle(1), body_a, Some(BodyHandle(1)), 4);
            c.update(&found, prng.next_vec3(-1.0, 1.0), prng.next_vec3(-1.0, 1.0));
            c.material = random_material(&mut prng).combine(&random_material(&mut prng));
            c.solver_a = 0;
            c.solver_b = 1;
            if case % 2 == 0 {
                for _ in 0..prng.next_index(4) + 1 {
                    c.history.push(ImpulseEntry {
                        on_a: prng.next_vec3(-2.0, 2.0),
                        on_b: prng.next_vec3(-2.0, 2.0),
                    });
                }
            }

            let mut contacts = [&mut c];
            prepare(&bodies, &mut contacts, 1.0 / 60.0, &config);
            warm_start(&mut bodies, &mut contacts, &config);
            assert_within_cone(contacts[0], &config, case);
            for _ in 0..10 {
                iterate(&mut bodies, &mut contacts, &config);
                assert_within_cone(contacts[0], &config, case);
            }
        }
    }

    fn assert_within_cone(c: &Contact, config: &WorldConfig, case: usize) {
        let lambda_n = c.rows[0].accumulated;
        assert!(lambda_n >= 0.0, "case {case}: negative normal impulse {lambda_n}");
        let limit = c.material.friction * lambda_n;
        for row in &c.rows[1..] {
            assert!(
                row.accumulated.abs() <= limit + 1e-6 * (1.0 + limit),
                "case {case}: tangent {} outside cone {limit}",
                row.accumulated
            );
        }
        let twist_limit = limit * config.spin_radius;
        assert!(c.twist.abs() <= twist_limit + 1e-6 * (1.0 + twist_limit), "case {case}");
        let tilt_limit = lambda_n * c.patch_radius();
        for tilt in c.tilt {
            assert!(tilt.abs() <= tilt_limit + 1e-6 * (1.0 + tilt_limit), "case {case}");
        }
    }

    #[test]
    fn normal_impulse_stops_approach() {
        let config = WorldConfig::default();
        let (mut bodies, mut c) = sliding_box();
        let mut contacts = [&mut c];
        solve(&mut bodies, &mut contacts, 1.0 / 60.0, &config);
        // B no longer moves into A along the normal (+Y).
        let n = contacts[0].normal();
        let rb = contacts[0].lever_arms().1;
        let vb = bodies[1].velocity.add(&bodies[1].angular_velocity.cross(&rb));
        assert!(vb.dot(&n) > -1e-3);
        assert!(contacts[0].normal_impulse() > 0.0);
        assert_eq!(contacts[0].history().len(), 1);
    }

    #[test]
    fn separating_pair_gets_no_impulse() {
        let config = WorldConfig::default();
        let (mut bodies, mut c) = sliding_box();
        bodies[1].velocity = Vec3::new(0.0, 2.0, 0.0);
        bodies[1].angular_velocity = Vec3::ZERO;
        let mut contacts = [&mut c];
        solve(&mut bodies, &mut contacts, 1.0 / 60.0, &config);
        assert_eq!(contacts[0].normal_impulse(), 0.0);
        assert_eq!(bodies[1].velocity, Vec3::new(0.0, 2.0, 0.0));
    }
}
