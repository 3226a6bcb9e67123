//! Resona Engine — adaptive correction + embed/reverse passes.
//!
//! Crate layout:
//! - [`corrector`] : per-key online learning state (`AdaptiveCorrector`)
//! - [`embed`]     : stateless additive embedding pass
//! - [`reverse`]   : pattern removal with cached per-key snapshots
//! - [`validate`]  : pattern-strength and residual diagnostics
//!
//! The engine is single-threaded by design: per-key learning state is
//! mutated sequentially, and confidence estimates depend on observing the
//! error history in one consistent order. Distinct keys own disjoint state;
//! the embed pass is stateless and parallelizes across disjoint ranges.

pub mod corrector;
pub mod embed;
pub mod reverse;
pub mod validate;

// Re-export the commonly used items to make downstream imports ergonomic.
pub use corrector::{AdaptiveCorrector, AdaptiveState};
pub use embed::embed;
pub use reverse::{ResonanceState, Reverser};
pub use validate::{pattern_strength, residual, ResidualReport};
