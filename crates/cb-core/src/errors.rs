//! Error types for convbond.
//!
//! A single `thiserror`-derived enum covers the three failure classes of the
//! library: rejected inputs, calibration brackets without a sign change, and
//! solver budgets exhausted before the tolerance was met. Input checks go
//! through the [`ensure!`](crate::ensure) macro.

use thiserror::Error;

use crate::Real;

/// The top-level error type used throughout convbond.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// An input failed validation. Raised before any lattice is built.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The initial bracket of a root search has no sign change.
    #[error("no root bracketed: f({lower}) = {f_lower:.6e} and f({upper}) = {f_upper:.6e} have the same sign")]
    RootNotFound {
        /// Lower end of the bracket.
        lower: Real,
        /// Upper end of the bracket.
        upper: Real,
        /// Objective value at the lower end.
        f_lower: Real,
        /// Objective value at the upper end.
        f_upper: Real,
    },

    /// The iteration budget ran out before the tolerance was met.
    #[error("did not converge after {iterations} iterations: best estimate {best_estimate} (residual {residual:.2e})")]
    DidNotConverge {
        /// The best available estimate of the root. Not exact.
        best_estimate: Real,
        /// Number of iterations performed.
        iterations: u32,
        /// Objective value at `best_estimate`.
        residual: Real,
    },
}

impl Error {
    /// Creates an [`Error::InvalidInput`].
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// Whether this error reports a rejected input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Shorthand `Result` type used throughout convbond.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::InvalidInput(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use cb_core::{ensure, errors::Error};
/// fn positive(x: f64) -> cb_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::InvalidInput(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidInput(
                format!($($msg)*)
            ));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_positive(x: Real) -> Result<Real> {
        ensure!(x > 0.0, "x must be positive, got {x}");
        Ok(x)
    }

    #[test]
    fn ensure_maps_to_invalid_input() {
        assert_eq!(check_positive(2.0), Ok(2.0));
        let err = check_positive(-1.0).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(err.to_string(), "invalid input: x must be positive, got -1");
    }

    #[test]
    fn did_not_converge_reports_estimate() {
        let err = Error::DidNotConverge {
            best_estimate: 0.0512,
            iterations: 100,
            residual: 1e-6,
        };
        let msg = err.to_string();
        assert!(msg.contains("100 iterations"), "{msg}");
        assert!(msg.contains("0.0512"), "{msg}");
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn root_not_found_display() {
        let err = Error::RootNotFound {
            lower: 0.0,
            upper: 1.0,
            f_lower: 0.5,
            f_upper: 2.0,
        };
        assert!(err.to_string().starts_with("no root bracketed"));
    }
}
