// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Contact identity: swapping and arena lookups.

use proptest::prelude::*;
use tumble_core::{BodyHandle, ColliderHandle, Contact, ContactSet, Penetration};
use tumble_math::Vec3;

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (-10.0_f32..10.0, -10.0_f32..10.0, -10.0_f32..10.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    #[test]
    fn double_swap_restores_every_field(
        vector in arb_vec3(),
        point_a in arb_vec3(),
        point_b in arb_vec3(),
        center_a in arb_vec3(),
        center_b in arb_vec3(),
    ) {
        let mut c = Contact::new(
            ColliderHandle::from_raw(3),
            ColliderHandle::from_raw(8),
            Some(BodyHandle::from_raw(1)),
            None,
            4,
        );
        c.update(&Penetration { vector, point_a, point_b, patch_radius: 0.0 }, center_a, center_b);
        let original = c.clone();

        c.swap();
        prop_assert_eq!(c.collider_a(), original.collider_b());
        prop_assert_eq!(c.body_b(), original.body_a());
        prop_assert_eq!(c.penetration(), -original.penetration());
        prop_assert_eq!(c.lever_arms(), (original.lever_arms().1, original.lever_arms().0));

        c.swap();
        prop_assert_eq!(c, original);
    }
}

#[test]
fn reversed_lookup_swaps_in_place() {
    let a = (ColliderHandle::from_raw(0), Some(BodyHandle::from_raw(0)));
    let b = (ColliderHandle::from_raw(1), None);
    let mut set = ContactSet::new();
    let (handle, created) = set.find_or_create(a, b, 4);
    assert!(created);
    if let Some(c) = set.get_mut(handle) {
        c.update(
            &Penetration {
                vector: Vec3::new(0.0, -0.1, 0.0),
                point_a: Vec3::new(0.0, -0.5, 0.0),
                point_b: Vec3::new(0.0, -0.4, 0.0),
                patch_radius: 0.0,
},
            Vec3::ZERO,
            Vec3::new(0.0, -1.0, 0.0),
        );
    }

    let (same, created) = set.find_or_create(b, a, 4);
    assert!(!created);
    assert_eq!(same, handle);
    let Some(c) = set.get(handle) else {
        unreachable!("contact is live");
    };
    assert_eq!(c.collider_a(), b.0);
    assert_eq!(c.body_b(), a.1);
    assert!(c.normal().sub(&Vec3::UNIT_Y).length() < 1e-6);
    assert_eq!(c.point_a(), Vec3::new(0.0, -0.4, 0.0));
    assert_eq!(set.find(b.0, a.0), Some(handle));
}
