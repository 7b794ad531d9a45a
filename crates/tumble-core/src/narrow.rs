// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Narrow-phase driver: expands trajectory pairs into shape pairs and runs
//! detection over them, in parallel when the `parallel` feature is on.

use rustc_hash::FxHashMap;
use tumble_geom::narrow::{detect_with, Dispatch, PairKind, Penetration};
use tumble_geom::Shape;

use crate::handle::ColliderHandle;
use crate::trajectory::Trajectory;

/// One shape pair to test. `a` always holds the smaller collider handle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) a: ColliderHandle,
    pub(crate) b: ColliderHandle,
    pub(crate) shape_a: Shape,
    pub(crate) shape_b: Shape,
    pub(crate) dispatch: Dispatch,
}

impl Candidate {
    fn new(a: (ColliderHandle, Shape), b: (ColliderHandle, Shape)) -> Self {
        let ((a, shape_a), (b, shape_b)) = if a.0 <= b.0 { (a, b) } else { (b, a) };
        Self { a, b, shape_a, shape_b, dispatch: PairKind::classify(shape_a.kind(), shape_b.kind()) }
    }

    fn detect(&self) -> Option<Penetration> {
        detect_with(self.dispatch, &self.shape_a, &self.shape_b)
    }
}

/// Expands broad-phase pairs (by proxy id) into shape pairs, in pair order.
pub(crate) fn collect(
    pairs: &[(usize, usize)],
    trajectories: &[Trajectory],
    lookup: &FxHashMap<usize, usize>,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    for (i, j) in pairs {
        let (Some(ti), Some(tj)) = (lookup.get(i), lookup.get(j)) else {
            continue;
        };
        let (ta, tb) = (&trajectories[*ti], &trajectories[*tj]);
        for a in ta.members() {
            for b in tb.members() {
                if a.1.aabb().overlaps(&b.1.aabb()) {
                    out.push(Candidate::new(*a, *b));
                }
            }
        }
    }
    out
}

/// Runs detection for every candidate; `results[k]` belongs to
/// `candidates[k]` whichever path runs.
#[cfg_attr(not(feature = "parallel"), allow(unused_variables))]
pub(crate) fn run(candidates: &[Candidate], parallel_threshold: usize) -> Vec<Option<Penetration>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
        if candidates.len() >= parallel_threshold {
            return candidates.par_iter().map(Candidate::detect).collect();
        }
    }
    candidates.iter().map(Candidate::detect).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::TrajectoryOwner;
    use tumble_geom::{Obb, Sphere};
    use tumble_math::{Prng, Quat, Vec3};

    #[test]
    fn smaller_handle_goes_first() {
        let ball: Shape = Sphere::new(Vec3::ZERO, 1.0).into();
        let cube: Shape = Obb::new(Vec3::ZERO, Quat::identity(), Vec3::ONE).into();
        let c = Candidate::new((ColliderHandle(5), ball), (ColliderHandle(2), cube));
        assert_eq!((c.a, c.b), (ColliderHandle(2), ColliderHandle(5)));
        assert_eq!(c.dispatch, PairKind::classify(cube.kind(), ball.kind()));
    }

    #[test]
    fn parallel_and_serial_paths_agree() {
        let mut prng = Prng::from_seed(99);
        let candidates: Vec<Candidate> = (0..200_u32)
            .map(|k| {
                let a: Shape = Obb::new(prng.next_vec3(-1.0, 1.0), prng.next_quat(), prng.next_vec3(0.5, 1.5)).into();
                let b: Shape = Sphere::new(prng.next_vec3(-1.0, 1.0), prng.next_range(0.2, 1.0)).into();
                Candidate::new((ColliderHandle(2 * k), a), (ColliderHandle(2 * k + 1), b))
            })
            .collect();
        let serial = run(&candidates, usize::MAX);
        let fanned = run(&candidates, 0);
        assert_eq!(serial, fanned);
        assert!(serial.iter().any(Option::is_some));
    }

    #[test]
    fn members_of_distant_colliders_are_skipped() {
        let mut near = Trajectory::new(TrajectoryOwner::Collider(ColliderHandle(0)), true);
        near.push(ColliderHandle(0), Sphere::new(Vec3::ZERO, 1.0).into());
        let mut body = Trajectory::new(TrajectoryOwner::Collider(ColliderHandle(1)), false);
        body.push(ColliderHandle(1), Sphere::new(Vec3::new(1.5, 0.0, 0.0), 1.0).into());
        body.push(ColliderHandle(2), Sphere::new(Vec3::new(9.0, 0.0, 0.0), 1.0).into());
        let lookup: FxHashMap<usize, usize> = [(0, 0), (1, 1)].into_iter().collect();
        let found = collect(&[(0, 1)], &[near, body], &lookup);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].b, ColliderHandle(1));
    }
}
