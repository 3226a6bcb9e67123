//! Numeric helpers shared by the pattern generator and the engine crates.
//!
//! Design goals:
//! - `no_std` ready (guarded by the crate feature `no-std`)
//! - Math backend selection that works in both `std` and `no_std` contexts
//! - Optional `fast-math` approximations for hot paths
//! - Clean, side-effect free helpers that are easy to test
//!
//! Features used by this file:
//! - `fast-math` : enables a polynomial sine (faster, approx.)
//! - `micromath` / `no-std` : alternate math backends
//!
//! Conventions:
//! - All functions are `#[inline]` where useful to help the optimizer.
//! - Argument and return domains are documented per function.

#![allow(clippy::excessive_precision)]

use core::f32::consts::PI;

use cfg_if::cfg_if;
use num_traits::Float;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // micromath preferred if explicitly requested (works in no_std)
    if #[cfg(feature = "micromath")] {
        use micromath::F32Ext as _;
        #[inline] fn m_sin(x: f32) -> f32 { x.sin() }
        #[inline] fn m_exp(x: f32) -> f32 { x.exp() }
    // libm (C math) in no_std
    } else if #[cfg(feature = "no-std")] {
        #[inline] fn m_sin(x: f32) -> f32 { libm::sinf(x) }
        #[inline] fn m_exp(x: f32) -> f32 { libm::expf(x) }
    // std backend
    } else {
        #[inline] fn m_sin(x: f32) -> f32 { x.sin() }
        #[inline] fn m_exp(x: f32) -> f32 { x.exp() }
    }
}

// --------------------------------- Constants -------------------------------------

/// 2π (commonly useful)
pub const TAU: f32 = 2.0 * PI;

/// Positive full scale of a signed 16-bit sample, as a float.
pub const I16_FULL_SCALE: f32 = 32767.0;

// --------------------------------- Utilities -------------------------------------

#[inline]
pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
    if x < lo { lo } else if x > hi { hi } else { x }
}

/// Clamp into the unit interval [0, 1].
#[inline]
pub fn clamp01(x: f32) -> f32 {
    clamp(x, 0.0, 1.0)
}

/// Wrap an angle into [0, 2π).
#[inline]
pub fn wrap_tau(mut p: f32) -> f32 {
    p = p - (p / TAU).floor() * TAU;
    if p >= TAU { p - TAU } else { p }
}

/// Saturate an i32 accumulator back into the i16 sample range.
#[inline]
pub fn clamp_i16(x: i32) -> i16 {
    if x > i32::from(i16::MAX) {
        i16::MAX
    } else if x < i32::from(i16::MIN) {
        i16::MIN
    } else {
        x as i16
    }
}

// --------------------------------- Trig / exp ------------------------------------

/// Backend-selected sine. With `fast-math`, a 5th-order polynomial after range
/// reduction into [-π, π]; max abs error ~1e-3, plenty for pattern modulation.
#[inline]
pub fn sinf(x: f32) -> f32 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            let mut xr = x;
            let k = (xr / TAU).round();
            xr -= k * TAU;

            // 5th-order odd polynomial: sin(x) ≈ x * (a + b x^2 + c x^4)
            let x2 = xr * xr;
            xr * (0.999_979_313_3 + x2 * (-0.166_624_432_0 + x2 * 0.008_308_978_98))
        } else {
            m_sin(x)
        }
    }
}

/// Backend-selected natural exponential.
#[inline]
pub fn expf(x: f32) -> f32 {
    m_exp(x)
}

// --------------------------------- Statistics ------------------------------------

/// Arithmetic mean. An empty input yields zero.
#[inline]
pub fn mean<T, I>(values: I) -> T
where
    T: Float,
    I: IntoIterator<Item = T>,
{
    let mut sum = T::zero();
    let mut n = T::zero();
    for v in values {
        sum = sum + v;
        n = n + T::one();
    }
    if n > T::zero() { sum / n } else { T::zero() }
}

/// Population variance via Welford's single-pass update.
/// Empty and one-element inputs yield zero.
pub fn variance<T, I>(values: I) -> T
where
    T: Float,
    I: IntoIterator<Item = T>,
{
    let mut n = T::zero();
    let mut mean = T::zero();
    let mut m2 = T::zero();
    for v in values {
        n = n + T::one();
        let d = v - mean;
        mean = mean + d / n;
        m2 = m2 + d * (v - mean);
    }
    if n > T::zero() { m2 / n } else { T::zero() }
}

// --------------------------------- Tests (std only) ------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_tau_lands_in_range() {
        for x in [-100.0, -TAU, -0.1, 0.0, 1.0, TAU, TAU + 0.5, 777.7] {
            let w = wrap_tau(x);
            assert!((0.0..TAU).contains(&w), "x={x} w={w}");
        }
    }

    #[test]
    fn clamp_i16_saturates() {
        assert_eq!(clamp_i16(40_000), i16::MAX);
        assert_eq!(clamp_i16(-40_000), i16::MIN);
        assert_eq!(clamp_i16(123), 123);
        assert_eq!(clamp_i16(-32_768), i16::MIN);
    }

    #[test]
    fn sinf_tracks_reference() {
        for i in -50..50 {
            let x = i as f32 * 0.37;
            assert!((sinf(x) - x.sin()).abs() < 2e-3, "x={x}");
        }
    }

    #[test]
    fn variance_matches_hand_computation() {
        // values 2,4,4,4,5,5,7,9 → population variance 4
        let xs = [2.0f32, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let v: f32 = variance(xs.iter().copied());
        assert!((v - 4.0).abs() < 1e-5, "v={v}");
    }

    #[test]
    fn degenerate_statistics_are_zero() {
        let empty: [f32; 0] = [];
        assert_eq!(variance::<f32, _>(empty.iter().copied()), 0.0);
        assert_eq!(variance::<f32, _>([3.5f32].iter().copied()), 0.0);
        assert_eq!(mean::<f32, _>(empty.iter().copied()), 0.0);
    }
}
