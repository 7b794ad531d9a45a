// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Integration tests for narrow-phase detection through the `Shape` union.

use proptest::prelude::*;
use tumble_geom::narrow::{detect, PairKind};
use tumble_geom::{Capsule, Obb, Shape, ShapeKind, Sphere};
use tumble_math::{Prng, Quat, Vec3};

fn arb_vec3(lo: f32, hi: f32) -> impl Strategy<Value = Vec3> {
    (lo..hi, lo..hi, lo..hi).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    #[test]
    fn sphere_sphere_depth_matches_distance(
        ca in arb_vec3(-5.0, 5.0),
        cb in arb_vec3(-5.0, 5.0),
        ra in 0.05_f32..3.0,
        rb in 0.05_f32..3.0,
    ) {
        let d = ca.distance(&cb);
        let found = detect(&Sphere::new(ca, ra).into(), &Sphere::new(cb, rb).into());
        prop_assert_eq!(found.is_some(), d < ra + rb);
        if let Some(p) = found {
            prop_assert!((p.depth() - (ra + rb - d)).abs() < 1e-4);
        }
    }
}

#[test]
fn unit_boxes_along_x() {
    let a: Shape = Obb::new(Vec3::ZERO, Quat::identity(), Vec3::ONE).into();
    let far: Shape = Obb::new(Vec3::new(1.5, 0.0, 0.0), Quat::identity(), Vec3::ONE).into();
    let near: Shape = Obb::new(Vec3::new(0.5, 0.0, 0.0), Quat::identity(), Vec3::ONE).into();
    assert_eq!(detect(&a, &far), None);
    let hit = detect(&a, &near).map(|p| p.vector);
    assert!(hit.is_some_and(|v| v.sub(&Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5));
}

#[test]
fn every_pair_kind_reports_a_to_b() {
    // B always sits to +X of A and overlaps it; the vector must point +X
    // whichever order the routine runs in internally.
    let boxed = |x: f32| Shape::from(Obb::new(Vec3::new(x, 0.0, 0.0), Quat::identity(), Vec3::ONE));
    let ball = |x: f32| Shape::from(Sphere::new(Vec3::new(x, 0.0, 0.0), 0.5));
    let pill = |x: f32| {
        Shape::from(Capsule::new(
            Vec3::new(x, 0.0, 0.0),
            Quat::from_axis_angle(Vec3::UNIT_X, 0.3),
            0.5,
            1.0,
        ))
    };
    let makers: [&dyn Fn(f32) -> Shape; 3] = [&boxed, &ball, &pill];
    for make_a in makers {
        for make_b in makers {
            let a = make_a(0.0);
            let b = make_b(0.8);
            let Some(p) = detect(&a, &b) else {
                unreachable!("{:?} vs {:?} should overlap", a.kind(), b.kind());
            };
            assert!(p.vector.x() > 0.0, "{:?} vs {:?}: {:?}", a.kind(), b.kind(), p.vector);
            assert!(p.depth() > 0.0);
            assert!(p.point_a.is_finite() && p.point_b.is_finite());
        }
    }
}

#[test]
fn classify_covers_every_kind_pair() {
    let kinds = [ShapeKind::Obb, ShapeKind::Sphere, ShapeKind::Capsule];
    let mut seen = Vec::new();
    for a in kinds {
        for b in kinds {
            seen.push(PairKind::classify(a, b).kind);
        }
    }
    for kind in [
        PairKind::ObbObb,
        PairKind::ObbSphere,
        PairKind::ObbCapsule,
        PairKind::SphereSphere,
        PairKind::SphereCapsule,
        PairKind::CapsuleCapsule,
    ] {
        assert!(seen.contains(&kind), "{kind:?} unreachable");
    }
}

#[test]
fn random_box_pairs_never_produce_nan() {
    let mut prng = Prng::from_seed(17);
    for _ in 0..500 {
        let a = Obb::new(prng.next_vec3(-1.0, 1.0), prng.next_quat(), prng.next_vec3(0.2, 2.0));
        let b = Obb::new(prng.next_vec3(-1.0, 1.0), prng.next_quat(), prng.next_vec3(0.2, 2.0));
        if let Some(p) = detect(&a.into(), &b.into()) {
            assert!(p.vector.is_finite());
            assert!(p.point_a.is_finite() && p.point_b.is_finite());
            assert!(p.depth() > 0.0);
        }
    }
}
