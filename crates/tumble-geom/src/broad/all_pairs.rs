// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::collections::BTreeMap;

use super::{admits, BroadPhase, Proxy};

/// Brute-force `O(n^2)` broad phase.
///
/// Serves as the correctness baseline for [`super::SweepAndPrune`]: both must
/// emit identical pair lists for identical inputs.
#[derive(Debug, Default, Clone)]
pub struct AllPairs {
    items: BTreeMap<usize, Proxy>,
}

impl AllPairs {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of proxies.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when no proxies are stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl BroadPhase for AllPairs {
    fn upsert(&mut self, id: usize, proxy: Proxy) {
        self.items.insert(id, proxy);
    }

    fn remove(&mut self, id: usize) {
        self.items.remove(&id);
    }

    fn pairs(&mut self) -> Vec<(usize, usize)> {
        // BTreeMap iteration is sorted by id, so (a, b) comes out canonical
        // and already in lexicographic order.
        let items: Vec<(usize, Proxy)> = self.items.iter().map(|(id, p)| (*id, *p)).collect();
        let mut out = Vec::new();
        for (i, (a_id, a)) in items.iter().enumerate() {
            for (b_id, b) in items.iter().skip(i + 1) {
                if admits(a, b) {
                    out.push((*a_id, *b_id));
                }
            }
        }
        out
    }
}
