//! Validation metrics for processed sample buffers.
//!
//! Two small diagnostics: a pattern-strength score measuring how smooth a
//! buffer is sample-to-sample (embedded harmonics raise it on noisy
//! material), and a residual report comparing a recovered buffer against a
//! reference. Both are pure reads; nothing here mutates engine state.

use resona_core::dsp::I16_FULL_SCALE;

/// Buffers scoring at or above this are considered pattern-bearing.
pub const STRENGTH_THRESHOLD: f32 = 0.95;

/// Smoothness score in [0, 1]: the mean of `1 - min(|Δ|, 1)` over consecutive
/// normalized samples. Fewer than two samples score 0.
pub fn pattern_strength(samples: &[i16]) -> f32 {
    if samples.len() < 2 {
        return 0.0;
    }
    let mut acc = 0.0f32;
    for w in samples.windows(2) {
        let a = f32::from(w[0]) / I16_FULL_SCALE;
        let b = f32::from(w[1]) / I16_FULL_SCALE;
        acc += 1.0 - (b - a).abs().min(1.0);
    }
    acc / (samples.len() - 1) as f32
}

/// Whether `samples` clear the [`STRENGTH_THRESHOLD`].
#[inline]
pub fn is_resonant(samples: &[i16]) -> bool {
    pattern_strength(samples) >= STRENGTH_THRESHOLD
}

/// Residual statistics between a reference and a recovered buffer.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ResidualReport {
    /// Mean absolute difference on the 16-bit scale.
    pub mean_abs: f32,
    /// Largest absolute difference.
    pub peak_abs: i32,
    /// Number of sample pairs compared (the shorter buffer wins).
    pub compared: usize,
}

/// Compare `recovered` against `reference` pairwise.
pub fn residual(reference: &[i16], recovered: &[i16]) -> ResidualReport {
    let compared = reference.len().min(recovered.len());
    if compared == 0 {
        return ResidualReport::default();
    }

    let mut sum = 0.0f64;
    let mut peak = 0i32;
    for (a, b) in reference.iter().zip(recovered.iter()) {
        let d = (i32::from(*a) - i32::from(*b)).abs();
        sum += f64::from(d);
        if d > peak {
            peak = d;
        }
    }

    ResidualReport {
        mean_abs: (sum / compared as f64) as f32,
        peak_abs: peak,
        compared,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_is_perfectly_smooth() {
        let samples = vec![0i16; 512];
        assert_eq!(pattern_strength(&samples), 1.0);
        assert!(is_resonant(&samples));
    }

    #[test]
    fn alternating_full_scale_scores_low() {
        let samples: Vec<i16> = (0..512)
            .map(|i| if i % 2 == 0 { i16::MAX } else { i16::MIN })
            .collect();
        assert!(pattern_strength(&samples) < 0.05);
        assert!(!is_resonant(&samples));
    }

    #[test]
    fn short_buffers_score_zero() {
        assert_eq!(pattern_strength(&[]), 0.0);
        assert_eq!(pattern_strength(&[123]), 0.0);
    }

    #[test]
    fn identical_buffers_have_zero_residual() {
        let a = vec![100i16, -200, 300, -400];
        let r = residual(&a, &a);
        assert_eq!(r.mean_abs, 0.0);
        assert_eq!(r.peak_abs, 0);
        assert_eq!(r.compared, 4);
    }

    #[test]
    fn residual_tracks_known_differences() {
        let a = [0i16, 0, 0, 0];
        let b = [10i16, -10, 20, -20];
        let r = residual(&a, &b);
        assert_eq!(r.peak_abs, 20);
        assert!((r.mean_abs - 15.0).abs() < 1e-6);
    }

    #[test]
    fn residual_compares_up_to_the_shorter_buffer() {
        let a = [0i16; 8];
        let b = [5i16; 4];
        let r = residual(&a, &b);
        assert_eq!(r.compared, 4);
        assert_eq!(r.mean_abs, 5.0);
    }
}
