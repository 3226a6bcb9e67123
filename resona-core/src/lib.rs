#![cfg_attr(not(feature = "std"), no_std)]
//! Resona Core — no_std-ready primitives for the resonance pattern engine.
//!
//! Features
//! - `std`      : (default) use the Rust standard library
//! - `no-std`   : build with `#![no_std]` and use `libm`/`micromath` math backends
//! - `fast-math`: enable a polynomial sine approximation for hot paths
//!
//! Modules
//! - [`dsp`]     : math backend, clamps, phase wrapping, Welford statistics
//! - [`seed`]    : explicit rotating seed (deterministic, not cryptographic)
//! - [`pattern`] : harmonic pattern value types and the deterministic generator
//!
//! Design
//! - No heap allocations; pattern sets are fixed arrays
//! - Everything here is pure and deterministic — the stateful learning and
//!   embed/reverse passes live in `resona-engine`

pub mod dsp;
pub mod pattern;
pub mod seed;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::dsp::{clamp, clamp01, clamp_i16, mean, variance, wrap_tau, I16_FULL_SCALE, TAU};
    pub use crate::pattern::{
        HarmonicPattern, PatternError, PatternGenerator, PatternKey, PatternSet, BASE_FREQUENCY,
        HARMONIC_COUNT,
    };
    pub use crate::seed::{ResonanceSeed, SEED_LEN};
}

#[cfg(test)]
mod smoke {

    #[test]
    fn prelude_exists() {
        use crate::prelude::*;
        let mut g = PatternGenerator::new(ResonanceSeed::from_u64(1));
        let set = g.generate(0.8, 48_000, 0.1).unwrap();
        assert_eq!(set.len(), HARMONIC_COUNT);
        let _ = clamp_i16(1_000_000);
    }
}
