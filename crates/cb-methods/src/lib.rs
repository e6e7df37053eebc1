//! # cb-methods
//!
//! Numerical methods: the recombining binomial lattice over the underlying
//! equity price and the grid of time steps it lives on.
//!
//! # Modules
//!
//! * [`lattice`]: [`LatticeGrid`], [`TimeGrid`] and the CRR [`BinomialTree`]
//!   with proportional dividend jumps

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Lattice methods: time grids and binomial trees.
pub mod lattice;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use lattice::{BinomialTree, LatticeGrid, TimeGrid};
