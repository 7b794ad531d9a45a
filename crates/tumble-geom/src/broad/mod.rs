// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Broad-phase interfaces and implementations.
//!
//! Determinism contract (applies to all implementations here):
//! - Pair identity is canonicalized as `(min_id, max_id)`.
//! - The emitted pair list is strictly sorted lexicographically by that tuple.
//! - Overlap is inclusive on faces (touching AABBs are considered overlapping).
//! - Two resting proxies never pair.
//!
//! [`SweepAndPrune`] is the production structure; [`AllPairs`] is the
//! `O(n^2)` reference that tests compare it against.

mod all_pairs;
mod sweep;

pub use all_pairs::AllPairs;
pub use sweep::SweepAndPrune;

use crate::types::aabb::Aabb;

/// What the broad phase knows about one trajectory.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Proxy {
    /// World bounds for this step.
    pub aabb: Aabb,
    /// Static or sleeping: pairs between two resting proxies are skipped.
    pub resting: bool,
}

impl Proxy {
    /// Proxy for a moving trajectory.
    pub fn moving(aabb: Aabb) -> Self {
        Self { aabb, resting: false }
    }

    /// Proxy for a static or sleeping trajectory.
    pub fn resting(aabb: Aabb) -> Self {
        Self { aabb, resting: true }
    }
}

/// Broad-phase interface for inserting proxies and querying overlapping pairs.
///
/// Implementations must return pairs deterministically: the pair `(a, b)` is
/// canonicalized such that `a < b`, and the full list is sorted ascending by
/// `(a, b)`.
pub trait BroadPhase {
    /// Inserts or updates the proxy with the given `id`.
    fn upsert(&mut self, id: usize, proxy: Proxy);
    /// Removes a proxy if present.
    fn remove(&mut self, id: usize);
    /// Returns a canonical, deterministically-ordered list of candidate pairs.
    fn pairs(&mut self) -> Vec<(usize, usize)>;
}

/// Whether two proxies form a candidate pair.
pub(crate) fn admits(a: &Proxy, b: &Proxy) -> bool {
    !(a.resting && b.resting) && a.aabb.overlaps(&b.aabb)
}

/// Orders `(a, b)` so the smaller id comes first.
pub(crate) fn canonical(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
