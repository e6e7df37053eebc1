//! Embedded call, put and conversion features.
//!
//! Strikes are fractions of face value. A leg is either present, with a
//! start time from which it stays exercisable until maturity, or absent;
//! the raw input convention of a zero strike meaning "no such option" is
//! handled once by the `from_raw` constructors.

use cb_core::{ensure, errors::Result, Price, Real, Time};
use cb_math::comparison::on_or_after;

use crate::convertible_bond::{BondTerms, ConversionStyle};

// ────────────────────────────────────────────────────────────────────────────
// Option legs
// ────────────────────────────────────────────────────────────────────────────

/// A hard call or put: exercisable from `start_time` to maturity at
/// `strike × face`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionLeg {
    /// First time the option may be exercised.
    pub start_time: Time,
    /// Exercise price as a fraction of face value.
    pub strike: Real,
}

impl OptionLeg {
    /// Create a validated leg.
    pub fn new(start_time: Time, strike: Real) -> Result<Self> {
        let leg = Self { start_time, strike };
        leg.validate()?;
        Ok(leg)
    }

    /// Map the raw convention: a zero strike means the leg is absent.
    pub fn from_raw(start_time: Time, strike: Real) -> Result<Option<Self>> {
        if strike == 0.0 {
            return Ok(None);
        }
        Self::new(start_time, strike).map(Some)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(
            self.start_time >= 0.0 && self.start_time.is_finite(),
            "option start time must be non-negative, got {}",
            self.start_time
        );
        ensure!(
            self.strike > 0.0 && self.strike.is_finite(),
            "option strike must be positive (use no leg for an absent option), got {}",
            self.strike
        );
        Ok(())
    }

    fn active(&self, t: Time) -> bool {
        on_or_after(t, self.start_time)
    }
}

/// An issuer call that is only exercisable while the share price is at or
/// above `barrier`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoftCall {
    /// Start time and strike.
    pub leg: OptionLeg,
    /// Share price level that enables the call.
    pub barrier: Price,
}

impl SoftCall {
    /// Create a validated soft call.
    pub fn new(start_time: Time, strike: Real, barrier: Price) -> Result<Self> {
        let call = Self {
            leg: OptionLeg { start_time, strike },
            barrier,
        };
        call.validate()?;
        Ok(call)
    }

    /// Map the raw convention: a zero strike means the call is absent.
    pub fn from_raw(start_time: Time, strike: Real, barrier: Price) -> Result<Option<Self>> {
        if strike == 0.0 {
            return Ok(None);
        }
        Self::new(start_time, strike, barrier).map(Some)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.leg.validate()?;
        ensure!(
            self.barrier >= 0.0 && self.barrier.is_finite(),
            "soft call barrier must be non-negative, got {}",
            self.barrier
        );
        Ok(())
    }
}

/// The issuer and holder options attached to a bond.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmbeddedOptions {
    /// Issuer call conditional on the share price.
    pub soft_call: Option<SoftCall>,
    /// Unconditional issuer call.
    pub hard_call: Option<OptionLeg>,
    /// Holder put.
    pub put: Option<OptionLeg>,
}

impl EmbeddedOptions {
    /// No embedded options.
    pub fn none() -> Self {
        Self::default()
    }

    /// Set the soft call.
    #[must_use]
    pub fn with_soft_call(mut self, soft_call: SoftCall) -> Self {
        self.soft_call = Some(soft_call);
        self
    }

    /// Set the hard call.
    #[must_use]
    pub fn with_hard_call(mut self, hard_call: OptionLeg) -> Self {
        self.hard_call = Some(hard_call);
        self
    }

    /// Set the put.
    #[must_use]
    pub fn with_put(mut self, put: OptionLeg) -> Self {
        self.put = Some(put);
        self
    }

    /// Validate every present leg against the bond's maturity.
    pub fn validate(&self, maturity: Time) -> Result<()> {
        let legs = [
            ("soft call", self.soft_call.map(|c| c.leg)),
            ("hard call", self.hard_call),
            ("put", self.put),
        ];
        if let Some(call) = &self.soft_call {
            call.validate()?;
        }
        for (name, leg) in legs {
            let Some(leg) = leg else { continue };
            leg.validate()?;
            ensure!(
                leg.start_time <= maturity,
                "{name} start time {} is after maturity {maturity}",
                leg.start_time
            );
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OptionSchedule
// ────────────────────────────────────────────────────────────────────────────

/// Which features are exercisable at a given time and share price.
///
/// Built from validated terms by [`ConvertibleBond::option_schedule`]. All
/// prices returned are in currency units (`strike × face`).
///
/// [`ConvertibleBond::option_schedule`]: crate::ConvertibleBond::option_schedule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionSchedule {
    face_value: Price,
    maturity: Time,
    no_conversion_period: Time,
    style: ConversionStyle,
    options: EmbeddedOptions,
}

impl OptionSchedule {
    /// Schedule for `terms` with the given options.
    pub fn new(terms: &BondTerms, options: EmbeddedOptions) -> Self {
        Self {
            face_value: terms.face_value,
            maturity: terms.maturity,
            no_conversion_period: terms.no_conversion_period,
            style: terms.conversion_style,
            options,
        }
    }

    /// Whether the holder may convert at `t`.
    pub fn conversion_available(&self, t: Time) -> bool {
        if !on_or_after(t, self.no_conversion_period) {
            return false;
        }
        match self.style {
            ConversionStyle::American => true,
            ConversionStyle::European => on_or_after(t, self.maturity),
        }
    }

    /// Soft call price at `t` if the call is active and `spot ≥ barrier`.
    pub fn soft_call_price(&self, t: Time, spot: Price) -> Option<Price> {
        self.options
            .soft_call
            .filter(|call| call.leg.active(t) && spot >= call.barrier)
            .map(|call| call.leg.strike * self.face_value)
    }

    /// Hard call price at `t` if the call is active.
    pub fn hard_call_price(&self, t: Time) -> Option<Price> {
        self.options
            .hard_call
            .filter(|call| call.active(t))
            .map(|call| call.strike * self.face_value)
    }

    /// Put price at `t` if the put is active.
    pub fn put_price(&self, t: Time) -> Option<Price> {
        self.options
            .put
            .filter(|put| put.active(t))
            .map(|put| put.strike * self.face_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn terms(style: ConversionStyle) -> BondTerms {
        BondTerms::new(100.0, 0.05, 2, 5.0, 1.0)
            .with_conversion_style(style)
            .with_no_conversion_period(1.0)
    }

    #[test]
    fn zero_strike_means_absent() {
        assert_eq!(OptionLeg::from_raw(1.0, 0.0).unwrap(), None);
        assert_eq!(SoftCall::from_raw(1.0, 0.0, 130.0).unwrap(), None);
        let leg = OptionLeg::from_raw(1.0, 1.1).unwrap().unwrap();
        assert_eq!(leg.start_time, 1.0);
        assert!(OptionLeg::from_raw(1.0, -0.5).unwrap_err().is_invalid_input());
        assert!(OptionLeg::from_raw(-1.0, 1.0).unwrap_err().is_invalid_input());
        assert!(SoftCall::from_raw(1.0, 1.0, -1.0).unwrap_err().is_invalid_input());
    }

    #[test]
    fn present_legs_need_a_positive_strike() {
        assert!(OptionLeg::new(0.0, 0.0).unwrap_err().is_invalid_input());
        assert!(SoftCall::new(0.0, 0.0, 130.0).unwrap_err().is_invalid_input());
        // struct literals bypass the constructors but not bond validation
        let zero = OptionLeg {
            start_time: 0.0,
            strike: 0.0,
        };
        let options = EmbeddedOptions {
            hard_call: Some(zero),
            ..EmbeddedOptions::none()
        };
        assert!(options.validate(5.0).unwrap_err().is_invalid_input());
        let options = EmbeddedOptions {
            soft_call: Some(SoftCall { leg: zero, barrier: 100.0 }),
            ..EmbeddedOptions::none()
        };
        assert!(options.validate(5.0).unwrap_err().is_invalid_input());
    }

    #[test]
    fn american_conversion_after_lockout() {
        let s = OptionSchedule::new(&terms(ConversionStyle::American), EmbeddedOptions::none());
        assert!(!s.conversion_available(0.5));
        assert!(s.conversion_available(1.0));
        assert!(s.conversion_available(3.0));
        assert!(s.conversion_available(5.0));
    }

    #[test]
    fn european_conversion_only_at_maturity() {
        let s = OptionSchedule::new(&terms(ConversionStyle::European), EmbeddedOptions::none());
        assert!(!s.conversion_available(3.0));
        assert!(!s.conversion_available(4.99));
        assert!(s.conversion_available(5.0));
    }

    #[test]
    fn option_prices() {
        let options = EmbeddedOptions::none()
            .with_soft_call(SoftCall::new(2.0, 1.05, 130.0).unwrap())
            .with_hard_call(OptionLeg::new(3.0, 1.2).unwrap())
            .with_put(OptionLeg::new(1.0, 1.1).unwrap());
        let s = OptionSchedule::new(&terms(ConversionStyle::American), options);

        assert_eq!(s.soft_call_price(1.0, 200.0), None);
        assert_eq!(s.soft_call_price(2.5, 129.0), None);
        assert_abs_diff_eq!(s.soft_call_price(2.5, 130.0).unwrap(), 105.0, epsilon = 1e-12);

        assert_eq!(s.hard_call_price(2.9), None);
        assert_abs_diff_eq!(s.hard_call_price(3.0).unwrap(), 120.0, epsilon = 1e-12);

        assert_eq!(s.put_price(0.5), None);
        assert_abs_diff_eq!(s.put_price(1.0).unwrap(), 110.0, epsilon = 1e-12);
    }

    #[test]
    fn absent_legs_are_never_active() {
        let s = OptionSchedule::new(&terms(ConversionStyle::American), EmbeddedOptions::none());
        assert_eq!(s.soft_call_price(5.0, 1e6), None);
        assert_eq!(s.hard_call_price(5.0), None);
        assert_eq!(s.put_price(5.0), None);
    }

    #[test]
    fn start_after_maturity_is_rejected() {
        let options = EmbeddedOptions::none().with_put(OptionLeg::new(6.0, 1.0).unwrap());
        assert!(options.validate(5.0).unwrap_err().is_invalid_input());
        assert!(options.validate(6.0).is_ok());
    }
}
