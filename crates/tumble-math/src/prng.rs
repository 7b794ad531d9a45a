// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::{Quat, Vec3};

/// Seeded `xoroshiro128+` generator for reproducible scenes and fixtures.
///
/// * Not cryptographically secure; used for test scenes, fuzz-style sweeps
///   and benchmark setups so runs are identical across machines.
/// * The engine itself never draws random numbers.
#[derive(Debug, Clone, Copy)]
pub struct Prng {
    state: [u64; 2],
}

impl Prng {
    /// Constructs a generator from a single 64-bit seed via SplitMix64
    /// expansion.
    pub fn from_seed(seed: u64) -> Self {
        fn splitmix64(state: &mut u64) -> u64 {
            *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
            let mut z = *state;
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
            z ^ (z >> 31)
        }

        let mut sm = seed;
        let mut state = [splitmix64(&mut sm), splitmix64(&mut sm)];
        if state == [0, 0] {
            state[0] = 0x9e37_79b9_7f4a_7c15;
        }
        Self { state }
    }

    /// Next raw 64-bit output.
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(55) ^ s1 ^ (s1 << 14);
        self.state[1] = s1.rotate_left(36);

        result
    }

    /// Returns the next float in `[0, 1)` built from the high 23 bits.
    pub fn next_f32(&mut self) -> f32 {
        let raw = self.next_u64();
        let bits = ((raw >> 41) as u32) | 0x3f80_0000;
        f32::from_bits(bits) - 1.0
    }

    /// Returns a float uniformly drawn from `[min, max)`.
    pub fn next_range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }

    /// Returns an index in `0..len` (`len` must be non-zero).
    pub fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "next_index requires a non-empty range");
        let span = len.max(1) as u64;
        let bound = u64::MAX - u64::MAX % span;
        loop {
            let candidate = self.next_u64();
            if candidate < bound {
                return (candidate % span) as usize;
            }
        }
    }

    /// Returns a vector whose components are drawn from `[min, max)`.
    pub fn next_vec3(&mut self, min: f32, max: f32) -> Vec3 {
        Vec3::new(
            self.next_range(min, max),
            self.next_range(min, max),
            self.next_range(min, max),
        )
    }

    /// Returns a random orientation (axis from the unit cube, angle in
    /// `[0, 2π)`); a degenerate axis yields identity.
    pub fn next_quat(&mut self) -> Quat {
        let axis = self.next_vec3(-1.0, 1.0);
        let angle = self.next_range(0.0, core::f32::consts::TAU);
        Quat::from_axis_angle(axis, angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Prng::from_seed(42);
        let mut b = Prng::from_seed(42);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn next_range_stays_in_bounds() {
        let mut prng = Prng::from_seed(7);
        for _ in 0..1000 {
            let v = prng.next_range(-3.0, 5.0);
            assert!((-3.0..5.0).contains(&v), "{v} escaped [-3, 5)");
        }
    }

    #[test]
    fn next_index_covers_range() {
        let mut prng = Prng::from_seed(99);
        let mut seen = [false; 5];
        for _ in 0..200 {
            seen[prng.next_index(5)] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
