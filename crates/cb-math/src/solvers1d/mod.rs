//! 1D root-finding solvers.
//!
//! [`brent`] is the Brent–Dekker "zeroin" method: a bracketing,
//! derivative-free search that chooses between bisection, secant and inverse
//! quadratic interpolation at every step, keeping the iterate inside the
//! shrinking bracket. It has no knowledge of bonds; calibration wraps it.

use cb_core::{
    ensure,
    errors::{Error, Result},
    Real,
};
use log::trace;

/// Default absolute accuracy on the root.
pub const DEFAULT_ACCURACY: Real = 1.0e-10;

/// Default iteration budget.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Configuration for the root finder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Absolute accuracy on the root.
    pub accuracy: Real,
    /// Relative accuracy, scaled by the magnitude of the current iterate.
    pub relative_accuracy: Real,
    /// Maximum number of iterations before giving up.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            accuracy: DEFAULT_ACCURACY,
            relative_accuracy: f64::EPSILON,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Sets the absolute accuracy.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: Real) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Sets the relative accuracy.
    #[must_use]
    pub fn with_relative_accuracy(mut self, relative_accuracy: Real) -> Self {
        self.relative_accuracy = relative_accuracy;
        self
    }

    /// Sets the iteration budget.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.accuracy > 0.0 && self.accuracy.is_finite(),
            "solver accuracy must be positive, got {}",
            self.accuracy
        );
        ensure!(
            self.relative_accuracy >= 0.0 && self.relative_accuracy.is_finite(),
            "solver relative accuracy must be non-negative, got {}",
            self.relative_accuracy
        );
        ensure!(self.max_iterations > 0, "solver needs at least one iteration");
        Ok(())
    }
}

/// A converged root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootSolution {
    /// The root.
    pub root: Real,
    /// Iterations performed after the bracket check.
    pub iterations: u32,
    /// Objective value at `root`.
    pub residual: Real,
}

fn evaluate<F>(f: &F, x: Real) -> Result<Real>
where
    F: Fn(Real) -> Real,
{
    let fx = f(x);
    ensure!(fx.is_finite(), "objective is not finite at x = {x}: {fx}");
    Ok(fx)
}

// ── Brent ─────────────────────────────────────────────────────────────────────

/// Brent's method for finding a root of `f(x)` in `[x_min, x_max]`.
///
/// Combines bisection, secant, and inverse quadratic interpolation. The
/// bracket shrinks at every step, so convergence is guaranteed once the
/// endpoints have opposite signs.
///
/// The step logic is the classic `zeroin` routine from R. P. Brent,
/// *Algorithms for Minimization without Derivatives* (1973), chapter 4.
///
/// # Errors
/// * [`Error::RootNotFound`] if `f(x_min)` and `f(x_max)` share a sign.
/// * [`Error::DidNotConverge`] with the best estimate if
///   `config.max_iterations` is reached first.
/// * [`Error::InvalidInput`] for a degenerate bracket, a bad config or a
///   non-finite objective value.
///
/// # Example
/// ```
/// use cb_math::solvers1d::{brent, SolverConfig};
///
/// let sol = brent(|x| x * x - 2.0, 0.0, 2.0, &SolverConfig::default()).unwrap();
/// assert!((sol.root - 2.0_f64.sqrt()).abs() < 1e-10);
/// ```
pub fn brent<F>(f: F, x_min: Real, x_max: Real, config: &SolverConfig) -> Result<RootSolution>
where
    F: Fn(Real) -> Real,
{
    config.validate()?;
    ensure!(
        x_min.is_finite() && x_max.is_finite() && x_min < x_max,
        "Brent: invalid bracket [{x_min}, {x_max}]"
    );

    let mut a = x_min;
    let mut b = x_max;
    let mut fa = evaluate(&f, a)?;
    let mut fb = evaluate(&f, b)?;

    if fa * fb > 0.0 {
        return Err(Error::RootNotFound {
            lower: x_min,
            upper: x_max,
            f_lower: fa,
            f_upper: fb,
        });
    }
    if fa == 0.0 {
        return Ok(RootSolution {
            root: a,
            iterations: 0,
            residual: fa,
        });
    }
    if fb == 0.0 {
        return Ok(RootSolution {
            root: b,
            iterations: 0,
            residual: fb,
        });
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for iteration in 0..config.max_iterations {
        if fb * fc > 0.0 {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol = 2.0 * config.relative_accuracy * b.abs() + 0.5 * config.accuracy;
        let xm = 0.5 * (c - b);
        trace!("brent iteration {iteration}: x = {b}, f(x) = {fb:e}, half-width = {xm:e}");
        if xm.abs() <= tol || fb == 0.0 {
            return Ok(RootSolution {
                root: b,
                iterations: iteration,
                residual: fb,
            });
        }
        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (p, q) = if a == c {
                // secant
                let p = 2.0 * xm * s;
                let q = 1.0 - s;
                (p, q)
            } else {
                // inverse quadratic interpolation
                let q = fa / fc;
                let r = fb / fc;
                let p = s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0));
                let q = (q - 1.0) * (r - 1.0) * (s - 1.0);
                (p, q)
            };
            let (p, q) = if p > 0.0 { (p, -q) } else { (-p, q) };
            if 2.0 * p < (3.0 * xm * q - (tol * q).abs()) && 2.0 * p < (e * q).abs() {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }
        a = b;
        fa = fb;
        b += if d.abs() > tol {
            d
        } else if xm > 0.0 {
            tol
        } else {
            -tol
        };
        fb = evaluate(&f, b)?;
    }

    // Report whichever tracked point has the smaller residual.
    let (best, residual) = if fc.abs() < fb.abs() { (c, fc) } else { (b, fb) };
    Err(Error::DidNotConverge {
        best_estimate: best,
        iterations: config.max_iterations,
        residual,
    })
}
