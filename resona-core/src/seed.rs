//! Evolving pseudo-random seed for pattern generation.
//!
//! The generator draws phases from a fixed-size byte buffer that is
//! byte-cyclic-shifted after every draw, so successive draws within a session
//! diverge predictably without any external randomness. The seed is owned and
//! constructor-injected; there is no hidden module state.
//!
//! This is a plain deterministic shift-register, NOT a cryptographic
//! primitive. Do not use it for anything security-sensitive.

use crate::dsp::{wrap_tau, TAU};

/// Length of the rotating seed buffer in bytes.
pub const SEED_LEN: usize = 32;

/// A rotating 32-byte seed. `Copy` on purpose: snapshotting a seed is how
/// callers replay a generation session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResonanceSeed {
    bytes: [u8; SEED_LEN],
}

impl ResonanceSeed {
    /// Wrap an explicit byte buffer.
    #[inline]
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self { bytes }
    }

    /// Expand a 64-bit value into a full seed buffer.
    ///
    /// Simple LCG expansion; keeps `rand` out of the no_std core the same way
    /// the modulation nodes avoid it on the audio path.
    pub fn from_u64(mut x: u64) -> Self {
        let mut bytes = [0u8; SEED_LEN];
        for chunk in bytes.chunks_exact_mut(8) {
            x = x
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            chunk.copy_from_slice(&x.to_le_bytes());
        }
        Self { bytes }
    }

    /// Deterministic perturbation in [0, 0.1), read from the head of the
    /// buffer. Does not advance the seed; two reads between rotations agree.
    #[inline]
    pub fn influence(&self) -> f32 {
        unit(&self.bytes[0..4]) % 0.1
    }

    /// Derive the next phase in [0, 2π) and advance the seed by one rotation.
    #[inline]
    pub fn next_phase(&mut self) -> f32 {
        let phase = wrap_tau(unit(&self.bytes[4..8]) * TAU);
        self.rotate();
        phase
    }

    /// Byte-cyclic right shift: the last byte wraps to the front.
    fn rotate(&mut self) {
        let last = self.bytes[SEED_LEN - 1];
        for i in (1..SEED_LEN).rev() {
            self.bytes[i] = self.bytes[i - 1];
        }
        self.bytes[0] = last;
    }
}

/// Map 4 little-endian bytes onto [0, 1).
#[inline]
fn unit(bytes: &[u8]) -> f32 {
    let raw = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    raw as f32 / (u32::MAX as f32 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_has_full_period() {
        let start = ResonanceSeed::from_u64(0xDEAD_BEEF);
        let mut s = start;
        for _ in 0..SEED_LEN {
            let _ = s.next_phase();
        }
        assert_eq!(s, start);
    }

    #[test]
    fn phases_stay_in_range() {
        let mut s = ResonanceSeed::from_u64(42);
        for _ in 0..100 {
            let p = s.next_phase();
            assert!((0.0..TAU).contains(&p), "p={p}");
        }
    }

    #[test]
    fn influence_is_small_and_stable() {
        let s = ResonanceSeed::from_u64(7);
        let a = s.influence();
        let b = s.influence();
        assert_eq!(a, b);
        assert!((0.0..0.1).contains(&a), "a={a}");
    }

    #[test]
    fn equal_seeds_draw_equal_sequences() {
        let mut a = ResonanceSeed::from_u64(99);
        let mut b = ResonanceSeed::from_u64(99);
        for _ in 0..16 {
            assert_eq!(a.next_phase(), b.next_phase());
        }
    }

    #[test]
    fn distinct_seeds_diverge() {
        let mut a = ResonanceSeed::from_u64(1);
        let mut b = ResonanceSeed::from_u64(2);
        let same = (0..8).all(|_| a.next_phase() == b.next_phase());
        assert!(!same);
    }
}
