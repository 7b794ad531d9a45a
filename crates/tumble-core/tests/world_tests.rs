// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! End-to-end behaviour of the world pipeline.

use tumble_core::{
    BodyDesc, BodyHandle, ColliderDesc, ColliderShape, CollisionMode, World, WorldConfig, WorldError,
};
use tumble_math::{Prng, Vec3};

const DT: f32 = 1.0 / 60.0;

fn world(config: WorldConfig) -> World {
    match World::new(config) {
        Ok(w) => w,
        Err(err) => unreachable!("test config is valid: {err}"),
    }
}

fn ball_body(world: &mut World, desc: BodyDesc, radius: f32) -> BodyHandle {
    let body = world.add_body(desc.with_sphere_inertia(radius));
    let added = world.add_collider(ColliderDesc::new(ColliderShape::ball(radius)).with_body(body));
    assert!(added.is_ok());
    body
}

fn cube_body(world: &mut World, y: f32) -> BodyHandle {
    let body = world.add_body(
        BodyDesc::dynamic(1.0)
            .with_box_inertia(Vec3::ONE)
            .with_position(Vec3::new(0.0, y, 0.0)),
    );
    let added = world.add_collider(ColliderDesc::new(ColliderShape::cuboid(Vec3::ONE)).with_body(body));
    assert!(added.is_ok());
    body
}

fn ground(world: &mut World, size: Vec3) {
    assert!(world.add_collider(ColliderDesc::new(ColliderShape::cuboid(size))).is_ok());
}

fn step(world: &mut World) -> tumble_core::StepStats {
    match world.step(DT) {
        Ok(stats) => stats,
        Err(err) => unreachable!("valid dt: {err}"),
    }
}

#[test]
fn sphere_settles_on_static_box() {
    let mut w = world(WorldConfig::default());
    ground(&mut w, Vec3::new(10.0, 1.0, 10.0));
    let ball = ball_body(&mut w, BodyDesc::dynamic(1.0).with_position(Vec3::new(0.0, 2.0, 0.0)), 0.5);

    for _ in 0..300 {
        step(&mut w);
    }

    let Some(body) = w.body(ball) else {
        unreachable!("ball was added");
    };
    assert!(body.velocity().length() < 1e-2, "still moving: {:?}", body.velocity());
    let y = body.position().y();
    let slop = w.config().slop;
    assert!(y <= 1.0 && y >= 1.0 - slop - 1e-3, "resting height {y}");

    let reports: Vec<_> = w.contacts().collect();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].depth <= slop + 1e-3);
    assert!(reports[0].normal_impulse > 0.0);
}

#[test]
fn contact_normal_points_from_a_to_b() {
    let mut w = world(WorldConfig::default().with_gravity(Vec3::ZERO));
    ground(&mut w, Vec3::new(10.0, 1.0, 10.0));
    ball_body(&mut w, BodyDesc::dynamic(1.0).with_position(Vec3::new(0.0, 0.95, 0.0)), 0.5);
    step(&mut w);

    let Some(report) = w.contacts().next() else {
        unreachable!("ball dips into the ground");
    };
    let center = |h| w.collider_shape(h).map(|s| s.center());
    let (Some(ca), Some(cb)) = (center(report.collider_a), center(report.collider_b)) else {
        unreachable!("both colliders are live");
    };
    assert!(report.normal.dot(&cb.sub(&ca)) > 0.0);
    assert!((report.normal.length() - 1.0).abs() < 1e-5);
}

#[test]
fn resting_stack_without_gravity_needs_no_correction() {
    let config = WorldConfig::default().with_gravity(Vec3::ZERO);
    let mut w = world(config);
    ground(&mut w, Vec3::new(4.0, 1.0, 4.0));
    // Each box dips 5 mm into the one below, inside the default slop.
    let lower = cube_body(&mut w, 0.995);
    let upper = cube_body(&mut w, 1.99);

    for _ in 0..10 {
        let stats = step(&mut w);
        assert_eq!(stats.contacts, 2);
        for handle in [lower, upper] {
            let Some(body) = w.body(handle) else {
                unreachable!("boxes were added");
            };
            let (dv, dw) = body.solver_delta();
            assert!(dv.length() < config.linear_epsilon, "{dv:?}");
            assert!(dw.length() < config.angular_epsilon, "{dw:?}");
        }
    }
}

#[test]
fn loaded_stack_settles_without_drifting() {
    let mut w = world(WorldConfig::default());
    ground(&mut w, Vec3::new(4.0, 1.0, 4.0));
    let lower = cube_body(&mut w, 1.0);
    let upper = cube_body(&mut w, 2.0);

    for _ in 0..600 {
        step(&mut w);
    }

    let slop = w.config().slop;
    for (handle, height) in [(lower, 1.0), (upper, 2.0)] {
        let Some(body) = w.body(handle) else {
            unreachable!("boxes were added");
        };
        let p = body.position();
        assert!(p.x().abs() < 1e-2 && p.z().abs() < 1e-2, "drifted to {p:?}");
        assert!((p.y() - height).abs() < 4.0 * slop, "sank to {p:?}");
        assert!(body.velocity().length() < 2e-2, "still moving: {:?}", body.velocity());
        assert!(body.angular_velocity().length() < 1e-2, "tipping: {:?}", body.angular_velocity());
    }

    let reports: Vec<_> = w.contacts().collect();
    assert_eq!(reports.len(), 2);
    for report in &reports {
        assert!(report.depth <= 2.0 * slop, "depth {}", report.depth);
        assert!(report.normal_impulse > 0.0);
        // Warm starting has a history to draw on.
        assert!(w.contact(report.handle).is_some_and(|c| !c.history().is_empty()));
    }
}

#[test]
fn trigger_contacts_are_reported_but_not_solved() {
    let mut w = world(WorldConfig::default());
    let trigger = ColliderDesc::new(ColliderShape::cuboid(Vec3::splat(4.0))).with_mode(CollisionMode::Trigger);
    assert!(w.add_collider(trigger).is_ok());
    let ball = ball_body(&mut w, BodyDesc::dynamic(1.0), 0.5);

    assert!(w.step(0.1).is_ok());
    let reports: Vec<_> = w.contacts().collect();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].trigger);
    assert_eq!(reports[0].normal_impulse, 0.0);
    assert_eq!(w.body(ball).map(|b| b.velocity()), Some(Vec3::new(0.0, -9.81 * 0.1, 0.0)));
}

#[test]
fn ignored_colliders_never_touch() {
    let mut w = world(WorldConfig::default().with_gravity(Vec3::ZERO));
    let ghost = ColliderDesc::new(ColliderShape::cuboid(Vec3::splat(4.0))).with_mode(CollisionMode::Ignore);
    assert!(w.add_collider(ghost).is_ok());
    ball_body(&mut w, BodyDesc::dynamic(1.0), 0.5);
    let stats = step(&mut w);
    assert_eq!(stats.shape_pairs, 0);
    assert_eq!(w.contacts().count(), 0);
}

#[test]
fn separated_pair_drops_its_contact() {
    let mut w = world(WorldConfig::default().with_gravity(Vec3::ZERO));
    assert!(w
        .add_collider(ColliderDesc::new(ColliderShape::ball(0.5)).with_translation(Vec3::new(0.8, 0.0, 0.0)))
        .is_ok());
    let ball = ball_body(&mut w, BodyDesc::dynamic(1.0), 0.5);

    let first = step(&mut w);
    assert_eq!((first.created, first.contacts), (1, 1));

    if let Some(body) = w.body_mut(ball) {
        body.set_position(Vec3::new(-5.0, 0.0, 0.0));
    }
    let second = step(&mut w);
    assert_eq!((second.destroyed, second.contacts), (1, 0));
    assert_eq!(w.contacts().count(), 0);
}

#[test]
fn sleeping_body_wakes_when_hit() {
    let mut w = world(WorldConfig::default().with_gravity(Vec3::ZERO));
    let sleeper = ball_body(&mut w, BodyDesc::dynamic(1.0).asleep(), 0.5);
    ball_body(
        &mut w,
        BodyDesc::dynamic(1.0)
            .with_position(Vec3::new(0.9, 0.0, 0.0))
            .with_velocity(Vec3::new(-1.0, 0.0, 0.0)),
        0.5,
    );
    step(&mut w);
    let Some(body) = w.body(sleeper) else {
        unreachable!("sleeper was added");
    };
    assert!(!body.is_sleeping());
    assert!(body.velocity().x() < 0.0);
}

#[test]
fn sleeping_body_on_ground_stays_put() {
    let mut w = world(WorldConfig::default());
    ground(&mut w, Vec3::new(10.0, 1.0, 10.0));
    let start = Vec3::new(0.0, 0.95, 0.0);
    let sleeper = ball_body(&mut w, BodyDesc::dynamic(1.0).with_position(start).asleep(), 0.5);
    for _ in 0..5 {
        let stats = step(&mut w);
        assert_eq!(stats.candidate_pairs, 0);
    }
    assert_eq!(w.body(sleeper).map(|b| b.position()), Some(start));
    assert!(w.body(sleeper).is_some_and(|b| b.is_sleeping()));
}

#[test]
fn invalid_timestep_is_rejected() {
    let mut w = World::default();
    assert_eq!(w.step(-0.1), Err(WorldError::InvalidTimestep(-0.1)));
    assert!(matches!(w.end_step(f32::NAN), Err(WorldError::InvalidTimestep(_))));
    assert!(matches!(
        World::new(WorldConfig::default().with_solver_iterations(0)),
        Err(WorldError::Config(_))
    ));
}

#[test]
fn parallel_narrow_phase_matches_serial() {
    let run = |threshold: usize| {
        let mut w = world(WorldConfig::default().with_parallel_threshold(threshold));
        ground(&mut w, Vec3::new(20.0, 1.0, 20.0));
        let mut prng = Prng::from_seed(7);
        let balls: Vec<BodyHandle> = (0..40)
            .map(|_| {
                let p = prng.next_vec3(-3.0, 3.0).add(&Vec3::new(0.0, 4.0, 0.0));
                ball_body(&mut w, BodyDesc::dynamic(1.0).with_position(p), 0.5)
            })
            .collect();
        for _ in 0..90 {
            step(&mut w);
        }
        balls
            .iter()
            .filter_map(|h| w.body(*h).map(|b| (b.position(), b.velocity())))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(0), run(usize::MAX));
}
