// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::cmp::Ordering;

use rustc_hash::FxHashMap;

use super::{admits, canonical, BroadPhase, Proxy};

#[derive(Debug, Clone, Copy)]
enum Edit {
    Upsert(usize, Proxy),
    Remove(usize),
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: usize,
    proxy: Proxy,
    removed: bool,
}

impl Entry {
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.proxy
            .aabb
            .min()
            .x()
            .total_cmp(&other.proxy.aabb.min().x())
            .then(self.id.cmp(&other.id))
    }
}

/// Sort-and-sweep broad phase along the X axis.
///
/// Edits are queued and applied at the start of [`BroadPhase::pairs`]. The
/// entry array stays sorted by `(aabb.min.x, id)` between calls, so frame to
/// frame coherence keeps the insertion-sort pass close to linear.
#[derive(Debug, Default, Clone)]
pub struct SweepAndPrune {
    entries: Vec<Entry>,
    index: FxHashMap<usize, usize>,
    pending: Vec<Edit>,
}

impl SweepAndPrune {
    /// Creates an empty structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of applied entries; queued edits land on the next `pairs`.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no entries are applied.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let mut removed_any = false;
        for edit in self.pending.drain(..) {
            match edit {
                Edit::Upsert(id, proxy) => match self.index.get(&id) {
                    Some(&slot) => self.entries[slot].proxy = proxy,
                    None => {
                        self.index.insert(id, self.entries.len());
                        self.entries.push(Entry { id, proxy, removed: false });
                    }
                },
                Edit::Remove(id) => {
                    if let Some(slot) = self.index.remove(&id) {
                        self.entries[slot].removed = true;
                        removed_any = true;
                    }
                }
            }
        }
        if removed_any {
            self.entries.retain(|e| !e.removed);
        }
        insertion_sort(&mut self.entries);
        self.index.clear();
        for (slot, e) in self.entries.iter().enumerate() {
            self.index.insert(e.id, slot);
        }
    }
}

fn insertion_sort(entries: &mut [Entry]) {
    for i in 1..entries.len() {
        let mut j = i;
        while j > 0 && entries[j - 1].key_cmp(&entries[j]) == Ordering::Greater {
            entries.swap(j - 1, j);
            j -= 1;
        }
    }
}

impl BroadPhase for SweepAndPrune {
    fn upsert(&mut self, id: usize, proxy: Proxy) {
        self.pending.push(Edit::Upsert(id, proxy));
    }

    fn remove(&mut self, id: usize) {
        self.pending.push(Edit::Remove(id));
    }

    fn pairs(&mut self) -> Vec<(usize, usize)> {
        self.flush();
        let mut out = Vec::new();
        for (i, a) in self.entries.iter().enumerate() {
            let max_x = a.proxy.aabb.max().x();
            for b in &self.entries[i + 1..] {
                if b.proxy.aabb.min().x() > max_x {
                    break;
                }
                if admits(&a.proxy, &b.proxy) {
                    out.push(canonical(a.id, b.id));
                }
            }
        }
        out.sort_unstable();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Aabb;
    use tumble_math::Vec3;

    fn cube(x: f32) -> Aabb {
        Aabb::from_center_half_extents(Vec3::new(x, 0.0, 0.0), Vec3::ONE)
    }

    #[test]
    fn edits_apply_on_next_pairs_call() {
        let mut sap = SweepAndPrune::new();
        sap.upsert(3, Proxy::moving(cube(0.0)));
        sap.upsert(1, Proxy::moving(cube(1.0)));
        assert!(sap.is_empty());
        assert_eq!(sap.pairs(), vec![(1, 3)]);
        assert_eq!(sap.len(), 2);

        sap.remove(3);
        sap.upsert(3, Proxy::moving(cube(50.0)));
        assert_eq!(sap.pairs(), Vec::<(usize, usize)>::new());
        assert_eq!(sap.len(), 2);
    }

    #[test]
    fn resting_pairs_are_skipped() {
        let mut sap = SweepAndPrune::new();
        sap.upsert(0, Proxy::resting(cube(0.0)));
        sap.upsert(1, Proxy::resting(cube(0.5)));
        sap.upsert(2, Proxy::moving(cube(1.0)));
        assert_eq!(sap.pairs(), vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn reorders_after_motion() {
        let mut sap = SweepAndPrune::new();
        for (id, x) in [0.0, 10.0, 20.0, 30.0].into_iter().enumerate() {
            sap.upsert(id, Proxy::moving(cube(x)));
        }
        assert!(sap.pairs().is_empty());
        // Reverse the ends: 3 jumps to the front, 0 lands next to 2.
        sap.upsert(3, Proxy::moving(cube(0.5)));
        sap.upsert(0, Proxy::moving(cube(21.0)));
        assert_eq!(sap.pairs(), vec![(0, 2)]);
        sap.upsert(1, Proxy::moving(cube(-0.5)));
        assert_eq!(sap.pairs(), vec![(0, 2), (1, 3)]);
    }
}
