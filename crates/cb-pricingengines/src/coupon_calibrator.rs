//! Coupon calibration.
//!
//! Finds the coupon rate at which the lattice price, as a fraction of face,
//! equals a target (1.0 for issuance at par). The engine is a black box to
//! the root finder; every evaluation prices a fresh copy of the bond.

use std::cell::RefCell;

use cb_core::{
    ensure,
    errors::{Error, Result},
    Rate, Real,
};
use cb_instruments::{ConvertibleBond, PricingEngine};
use cb_math::solvers1d::{brent, SolverConfig};
use log::debug;

use crate::BinomialConvertibleEngine;

/// Default upper end of the initial coupon bracket.
pub const DEFAULT_INITIAL_UPPER: Rate = 1.0;

/// Default number of times the upper bound may be doubled.
pub const DEFAULT_MAX_EXPANSIONS: u32 = 8;

/// A calibrated coupon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouponCalibration {
    /// Annual coupon rate.
    pub coupon_rate: Rate,
    /// Root-finder iterations.
    pub iterations: u32,
    /// `price / face − target` at `coupon_rate`.
    pub residual: Real,
}

/// Solves for the coupon rate that prices a bond at a target.
#[derive(Debug, Clone, Copy)]
pub struct CouponCalibrator {
    engine: BinomialConvertibleEngine,
    solver: SolverConfig,
    initial_upper: Rate,
    max_expansions: u32,
}

impl CouponCalibrator {
    /// Calibrator with default bracket and solver settings.
    pub fn new(engine: BinomialConvertibleEngine) -> Self {
        Self {
            engine,
            solver: SolverConfig::default(),
            initial_upper: DEFAULT_INITIAL_UPPER,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }

    /// Set the root-finder configuration.
    #[must_use]
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Set the upper end of the initial bracket `[0, upper]`.
    #[must_use]
    pub fn with_initial_upper(mut self, upper: Rate) -> Self {
        self.initial_upper = upper;
        self
    }

    /// Set how many times the upper bound may be doubled.
    #[must_use]
    pub fn with_max_expansions(mut self, max_expansions: u32) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    /// The pricing engine.
    pub fn engine(&self) -> &BinomialConvertibleEngine {
        &self.engine
    }

    /// `price(bond with coupon c) / face − target`.
    fn objective(&self, bond: &ConvertibleBond, coupon_rate: Rate, target: Real) -> Result<Real> {
        let repriced = bond.with_coupon_rate(coupon_rate)?;
        let npv = self.engine.calculate(&repriced)?.npv;
        Ok(npv / repriced.face_value() - target)
    }

    /// Coupon rate at which `bond` prices at `target × face`.
    ///
    /// The coupon rate already in `bond` is ignored.
    ///
    /// # Errors
    /// * `InvalidInput` for a non-positive target or bracket, or if pricing
    ///   rejects the inputs.
    /// * `RootNotFound` if even a zero coupon prices above the target, or if
    ///   no bracket is found within the allowed expansions.
    /// * `DidNotConverge` if the solver runs out of iterations.
    pub fn calibrate(&self, bond: &ConvertibleBond, target: Real) -> Result<CouponCalibration> {
        ensure!(
            target > 0.0 && target.is_finite(),
            "target price must be positive, got {target}"
        );
        ensure!(
            self.initial_upper > 0.0 && self.initial_upper.is_finite(),
            "initial coupon bracket must be positive, got {}",
            self.initial_upper
        );

        let f_lower = self.objective(bond, 0.0, target)?;
        let mut upper = self.initial_upper;
        let mut f_upper = self.objective(bond, upper, target)?;
        let mut expansions = 0;
        while f_lower < 0.0 && f_upper < 0.0 && expansions < self.max_expansions {
            upper *= 2.0;
            expansions += 1;
            f_upper = self.objective(bond, upper, target)?;
            debug!("coupon bracket expanded to [0, {upper}]: f = {f_upper:e}");
        }
        if f_lower * f_upper > 0.0 {
            return Err(Error::RootNotFound {
                lower: 0.0,
                upper,
                f_lower,
                f_upper,
            });
        }
        debug!(
            "calibrating coupon to target {target} on [0, {upper}] after {expansions} expansions"
        );

        // brent wants a plain function; keep the first pricing error aside.
        let failure = RefCell::new(None);
        let solution = brent(
            |c| match self.objective(bond, c, target) {
                Ok(value) => value,
                Err(e) => {
                    failure.borrow_mut().get_or_insert(e);
                    Real::NAN
                }
            },
            0.0,
            upper,
            &self.solver,
        );
        if let Some(e) = failure.into_inner() {
            return Err(e);
        }
        let solution = solution?;
        debug!(
            "calibrated coupon {:.10} in {} iterations (residual {:e})",
            solution.root, solution.iterations, solution.residual
        );

        Ok(CouponCalibration {
            coupon_rate: solution.root,
            iterations: solution.iterations,
            residual: solution.residual,
        })
    }
}
