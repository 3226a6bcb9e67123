//! Confidence-weighted online estimator for pattern removal corrections.
//!
//! One [`AdaptiveState`] per unique `(frequency, phase)` key, created lazily
//! on first update and kept for the lifetime of the corrector. Feeding
//! (observed, expected) sample pairs — typically from a calibration pass —
//! nudges a clamped correction factor that the reverser multiplies into its
//! removal deltas.
//!
//! The learning rate is damped by a confidence score derived from the
//! variance of recent errors: noisy feedback lowers confidence, which in turn
//! damps the update. A decaying "quantum field" jitter buffer evolves
//! alongside and feeds the reverser's per-key state snapshots. It is plain
//! pseudo-randomness, nothing cryptographic.

use std::collections::{HashMap, VecDeque};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use resona_core::dsp::{clamp, expf, variance};
use resona_core::pattern::PatternKey;

/// Maximum retained error samples per key.
pub const HISTORY_LEN: usize = 1024;

/// Length of the per-key jitter buffer.
pub const QUANTUM_FIELD_LEN: usize = 512;

/// Base learning rate, damped per update by the current confidence.
pub const LEARNING_RATE: f32 = 0.01;

/// How many recent errors feed the confidence estimate.
const CONFIDENCE_WINDOW: usize = 100;

const CORRECTION_MIN: f32 = 0.5;
const CORRECTION_MAX: f32 = 2.0;
const INITIAL_CORRECTION: f32 = 1.0;
const INITIAL_CONFIDENCE: f32 = 0.5;

/// Per-key learning state. Owned exclusively by the corrector; read access
/// goes through the accessors below.
#[derive(Clone, Debug)]
pub struct AdaptiveState {
    correction: f32,
    confidence: f32,
    history: VecDeque<f32>,
    quantum_field: Box<[f32; QUANTUM_FIELD_LEN]>,
}

impl AdaptiveState {
    fn new() -> Self {
        Self {
            correction: INITIAL_CORRECTION,
            confidence: INITIAL_CONFIDENCE,
            history: VecDeque::with_capacity(HISTORY_LEN),
            quantum_field: Box::new([0.0; QUANTUM_FIELD_LEN]),
        }
    }

    /// Current correction factor, always within [0.5, 2.0].
    #[inline]
    pub fn correction(&self) -> f32 {
        self.correction
    }

    /// Current confidence, always within (0, 1].
    #[inline]
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// The jitter buffer; each element stays within [-1, 1] by construction.
    #[inline]
    pub fn quantum_field(&self) -> &[f32] {
        &self.quantum_field[..]
    }
}

/// Owner of all per-key learning state.
///
/// Single-threaded by design: updates to one key must be serialized to keep
/// the append-only history and the clamped correction consistent. Distinct
/// keys own disjoint state and could be sharded if that ever matters.
pub struct AdaptiveCorrector {
    states: HashMap<PatternKey, AdaptiveState>,
    rng: SmallRng,
}

impl AdaptiveCorrector {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Deterministic jitter draws; used by calibration rigs and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            states: HashMap::new(),
            rng,
        }
    }

    /// Feed one (observed, expected) pair for `key` and return the new
    /// correction factor. State for unseen keys is created here.
    pub fn update(&mut self, key: PatternKey, observed: f32, expected: f32) -> f32 {
        let Self { states, rng } = self;
        let state = states.entry(key).or_insert_with(|| {
            tracing::debug!(frequency = f64::from(key.frequency()), "creating adaptive state");
            AdaptiveState::new()
        });

        let error = expected - observed;

        // Evolve the jitter buffer: slow random walk, damped hard when the
        // feedback error is large.
        let damping = expf(-error.abs());
        for slot in state.quantum_field.iter_mut() {
            let jitter: f32 = rng.gen_range(-1.0..1.0);
            *slot = (*slot * 0.9 + jitter * 0.1) * damping;
        }

        state.correction = clamp(
            state.correction + LEARNING_RATE * error * state.confidence,
            CORRECTION_MIN,
            CORRECTION_MAX,
        );

        if state.history.len() == HISTORY_LEN {
            state.history.pop_front();
        }
        state.history.push_back(error);

        let recent = state.history.iter().rev().take(CONFIDENCE_WINDOW).copied();
        state.confidence = 1.0 / (1.0 + variance(recent).sqrt());

        tracing::trace!(
            frequency = f64::from(key.frequency()),
            correction = f64::from(state.correction),
            confidence = f64::from(state.confidence),
            "adaptive correction updated"
        );

        state.correction
    }

    /// Current correction for `key`; 1.0 for keys never updated.
    #[inline]
    pub fn correction(&self, key: PatternKey) -> f32 {
        self.states
            .get(&key)
            .map_or(INITIAL_CORRECTION, AdaptiveState::correction)
    }

    /// Current confidence for `key`; the initial 0.5 for keys never updated.
    #[inline]
    pub fn confidence(&self, key: PatternKey) -> f32 {
        self.states
            .get(&key)
            .map_or(INITIAL_CONFIDENCE, AdaptiveState::confidence)
    }

    /// The jitter buffer for `key`, if the key has ever been updated.
    #[inline]
    pub fn quantum_field(&self, key: PatternKey) -> Option<&[f32]> {
        self.states.get(&key).map(AdaptiveState::quantum_field)
    }

    /// Read-only view of the full state for `key`.
    #[inline]
    pub fn state(&self, key: PatternKey) -> Option<&AdaptiveState> {
        self.states.get(&key)
    }

    /// Number of keys with live state.
    #[inline]
    pub fn tracked_keys(&self) -> usize {
        self.states.len()
    }
}

impl Default for AdaptiveCorrector {
    fn default() -> Self {
        Self::new()
    }
}
