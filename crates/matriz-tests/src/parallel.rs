//! Sequential vs tiled equivalence at the public API level
//!
//! Sizes straddle the per-family thresholds, so each pair of cases runs the
//! same operation once through the dense kernel and once through the pool,
//! and the results must be bit-identical.
