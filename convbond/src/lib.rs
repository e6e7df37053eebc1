//! # convbond
//!
//! Convertible bond pricing on a binomial lattice, with coupon calibration.
//!
//! This crate is a **façade** over the `cb-*` workspace crates: it
//! re-exports their public items and provides the two entry points most
//! callers need, [`price`] and [`calibrate_coupon`].
//!
//! ```rust
//! use convbond::{
//!     calibrate_coupon, price, BondTerms, Compounding, DividendSchedule, EmbeddedOptions,
//!     LatticeGrid, MarketParameters, DEFAULT_TARGET_PRICE,
//! };
//!
//! let market = MarketParameters::new(100.0, 0.2, 0.05, 0.0, Compounding::Compounded(1)).unwrap();
//! let terms = BondTerms::new(100.0, 0.05, 1, 2.0, 0.0);
//! let dividends = DividendSchedule::empty();
//! let options = EmbeddedOptions::none();
//! let grid = LatticeGrid::default();
//!
//! let npv = price(&market, &terms, &dividends, &options, &grid).unwrap();
//! assert!((npv - 100.0).abs() < 1e-9);
//!
//! let coupon =
//!     calibrate_coupon(&market, &terms, &dividends, &options, &grid, DEFAULT_TARGET_PRICE)
//!         .unwrap();
//! assert!((coupon - 0.05).abs() < 1e-8);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use cb_core as core;

/// Root finding and comparison helpers.
pub use cb_math as math;

/// Lattice construction.
pub use cb_methods as methods;

/// Bond terms, options, dividends and market inputs.
pub use cb_instruments as instruments;

/// Pricing engines and calibration.
pub use cb_pricingengines as pricingengines;

pub use cb_core::{Compounding, Error, Price, Rate, Real, Result, Time};
pub use cb_instruments::{
    BondTerms, ConversionStyle, ConvertibleBond, DividendEvent, DividendProtection,
    DividendSchedule, EmbeddedOptions, MarketParameters, OptionLeg, PricingEngine,
    PricingResults, SoftCall,
};
pub use cb_math::solvers1d::SolverConfig;
pub use cb_methods::lattice::LatticeGrid;
pub use cb_pricingengines::{BinomialConvertibleEngine, CouponCalibration, CouponCalibrator};

use log::debug;

/// Target price, as a fraction of face, for issuance at par.
pub const DEFAULT_TARGET_PRICE: Real = 1.0;

/// Price a convertible bond.
///
/// # Errors
/// `InvalidInput` if any input is out of range or the lattice is too coarse
/// for the maturity.
pub fn price(
    market: &MarketParameters,
    terms: &BondTerms,
    dividends: &DividendSchedule,
    options: &EmbeddedOptions,
    grid: &LatticeGrid,
) -> Result<Price> {
    let bond = ConvertibleBond::new(*terms, *options, dividends.clone())?;
    BinomialConvertibleEngine::new(*market, *grid).npv(&bond)
}

/// Coupon rate at which the bond prices at `target × face`.
///
/// The coupon rate in `terms` is ignored.
///
/// # Errors
/// As [`price`], plus `RootNotFound` when no coupon reaches the target and
/// `DidNotConverge` when the solver runs out of iterations.
pub fn calibrate_coupon(
    market: &MarketParameters,
    terms: &BondTerms,
    dividends: &DividendSchedule,
    options: &EmbeddedOptions,
    grid: &LatticeGrid,
    target: Real,
) -> Result<Rate> {
    let bond = ConvertibleBond::new(terms.with_coupon_rate(0.0), *options, dividends.clone())?;
    let engine = BinomialConvertibleEngine::new(*market, *grid);
    let calibration = CouponCalibrator::new(engine).calibrate(&bond, target)?;
    debug!(
        "coupon {:.8} prices at {target} of face ({} iterations)",
        calibration.coupon_rate, calibration.iterations
    );
    Ok(calibration.coupon_rate)
}
