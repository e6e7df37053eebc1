//! # cb-math
//!
//! Mathematical utilities: the bracketing root finder used by coupon
//! calibration, and floating-point comparison helpers for aligning event
//! times with lattice steps.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Time comparison helpers.
pub mod comparison;

/// 1D root-finding solvers.
pub mod solvers1d;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use comparison::on_or_after;
pub use solvers1d::{brent, RootSolution, SolverConfig};
