//! # cb-pricingengines
//!
//! Lattice pricing and coupon calibration for convertible bonds.
//!
//! ## Engines
//!
//! - [`BinomialConvertibleEngine`]: CRR lattice with an equity/debt split
//!   and call, put, conversion and dividend-protection features
//! - [`CouponCalibrator`]: coupon rate that prices the bond at a target

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod binomial_convertible_engine;
pub mod coupon_calibrator;

pub use binomial_convertible_engine::BinomialConvertibleEngine;
pub use coupon_calibrator::{CouponCalibration, CouponCalibrator};
