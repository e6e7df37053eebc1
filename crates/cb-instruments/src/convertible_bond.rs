//! Convertible bond terms and the validated instrument.

use cb_core::{ensure, errors::Result, Price, Rate, Real, Time, TIME_TOLERANCE};

use crate::dividends::{DividendProtection, DividendSchedule};
use crate::option_schedule::{EmbeddedOptions, OptionSchedule};

/// When the holder may convert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConversionStyle {
    /// Only at maturity.
    European,
    /// Any time after the no-conversion period.
    #[default]
    American,
}

impl ConversionStyle {
    /// Map the integer convention: `0` → European, anything else → American.
    pub fn from_flag(flag: u32) -> Self {
        if flag == 0 {
            ConversionStyle::European
        } else {
            ConversionStyle::American
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// BondTerms
// ────────────────────────────────────────────────────────────────────────────

/// Contractual terms of a convertible bond.
///
/// Times are year fractions from the valuation date. Validation happens in
/// [`ConvertibleBond::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BondTerms {
    /// Face (notional) amount.
    pub face_value: Price,
    /// Annual coupon rate.
    pub coupon_rate: Rate,
    /// Coupons per year.
    pub coupon_frequency: u32,
    /// Time to maturity.
    pub maturity: Time,
    /// Shares received per bond on conversion.
    pub conversion_ratio: Real,
    /// Conversion is not allowed before this time.
    pub no_conversion_period: Time,
    /// European or American conversion.
    pub conversion_style: ConversionStyle,
    /// Extra redemption paid at maturity, as a fraction of face.
    pub redemption_premium: Real,
    /// Dividend rate above which the conversion ratio is adjusted.
    pub dividend_protection: Option<Rate>,
}

impl BondTerms {
    /// American convertible with no lockout, premium or protection.
    pub fn new(
        face_value: Price,
        coupon_rate: Rate,
        coupon_frequency: u32,
        maturity: Time,
        conversion_ratio: Real,
    ) -> Self {
        Self {
            face_value,
            coupon_rate,
            coupon_frequency,
            maturity,
            conversion_ratio,
            no_conversion_period: 0.0,
            conversion_style: ConversionStyle::American,
            redemption_premium: 0.0,
            dividend_protection: None,
        }
    }

    /// Set the conversion style.
    #[must_use]
    pub fn with_conversion_style(mut self, style: ConversionStyle) -> Self {
        self.conversion_style = style;
        self
    }

    /// Set the no-conversion period.
    #[must_use]
    pub fn with_no_conversion_period(mut self, period: Time) -> Self {
        self.no_conversion_period = period;
        self
    }

    /// Set the redemption premium.
    #[must_use]
    pub fn with_redemption_premium(mut self, premium: Real) -> Self {
        self.redemption_premium = premium;
        self
    }

    /// Set the dividend-protection threshold; `0` disables protection.
    #[must_use]
    pub fn with_dividend_protection(mut self, threshold: Rate) -> Self {
        self.dividend_protection = (threshold != 0.0).then_some(threshold);
        self
    }

    /// Set the coupon rate.
    #[must_use]
    pub fn with_coupon_rate(mut self, coupon_rate: Rate) -> Self {
        self.coupon_rate = coupon_rate;
        self
    }

    /// Check every field.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.face_value > 0.0 && self.face_value.is_finite(),
            "face value must be positive, got {}",
            self.face_value
        );
        ensure!(
            self.coupon_rate >= 0.0 && self.coupon_rate.is_finite(),
            "coupon rate must be non-negative, got {}",
            self.coupon_rate
        );
        ensure!(self.coupon_frequency >= 1, "coupon frequency must be at least 1");
        ensure!(
            self.maturity > 0.0 && self.maturity.is_finite(),
            "maturity must be positive, got {}",
            self.maturity
        );
        ensure!(
            self.conversion_ratio >= 0.0 && self.conversion_ratio.is_finite(),
            "conversion ratio must be non-negative, got {}",
            self.conversion_ratio
        );
        ensure!(
            self.no_conversion_period >= 0.0 && self.no_conversion_period.is_finite(),
            "no-conversion period must be non-negative, got {}",
            self.no_conversion_period
        );
        ensure!(
            self.redemption_premium >= 0.0 && self.redemption_premium.is_finite(),
            "redemption premium must be non-negative, got {}",
            self.redemption_premium
        );
        if let Some(h) = self.dividend_protection {
            ensure!(
                (0.0..1.0).contains(&h),
                "dividend protection threshold must lie in [0, 1), got {h}"
            );
        }
        Ok(())
    }

    /// Amount of each coupon.
    pub fn coupon_amount(&self) -> Price {
        self.face_value * self.coupon_rate / Real::from(self.coupon_frequency)
    }

    /// Coupon payment times, latest first: `maturity − k/frequency` for
    /// every `k` that leaves a strictly positive time.
    pub fn coupon_times(&self) -> Vec<Time> {
        let period = 1.0 / Real::from(self.coupon_frequency);
        (0u32..)
            .map(|k| self.maturity - Real::from(k) * period)
            .take_while(|&t| t > TIME_TOLERANCE)
            .collect()
    }

    /// Amount repaid at maturity if the bond is not converted.
    pub fn redemption_value(&self) -> Price {
        self.face_value * (1.0 + self.redemption_premium)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ConvertibleBond
// ────────────────────────────────────────────────────────────────────────────

/// A validated convertible bond: terms, embedded options and the dividends
/// paid on the underlying share over its life.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertibleBond {
    terms: BondTerms,
    options: EmbeddedOptions,
    dividends: DividendSchedule,
}

impl ConvertibleBond {
    /// Assemble a bond, validating every field and their consistency.
    ///
    /// # Errors
    /// `InvalidInput` for out-of-range terms, option legs starting after
    /// maturity, or dividends beyond maturity.
    pub fn new(
        terms: BondTerms,
        options: EmbeddedOptions,
        dividends: DividendSchedule,
    ) -> Result<Self> {
        terms.validate()?;
        options.validate(terms.maturity)?;
        if let Some(last) = dividends.last_time() {
            ensure!(
                last <= terms.maturity,
                "dividend at {last} is after maturity {}",
                terms.maturity
            );
        }
        Ok(Self {
            terms,
            options,
            dividends,
        })
    }

    /// The same bond paying a different coupon.
    pub fn with_coupon_rate(&self, coupon_rate: Rate) -> Result<Self> {
        let terms = self.terms.with_coupon_rate(coupon_rate);
        terms.validate()?;
        Ok(Self {
            terms,
            options: self.options,
            dividends: self.dividends.clone(),
        })
    }

    /// Contractual terms.
    pub fn terms(&self) -> &BondTerms {
        &self.terms
    }

    /// Embedded options.
    pub fn options(&self) -> &EmbeddedOptions {
        &self.options
    }

    /// Dividends on the underlying.
    pub fn dividends(&self) -> &DividendSchedule {
        &self.dividends
    }

    /// Face value.
    pub fn face_value(&self) -> Price {
        self.terms.face_value
    }

    /// Coupon payment times, latest first.
    pub fn coupon_times(&self) -> Vec<Time> {
        self.terms.coupon_times()
    }

    /// Exercise schedule for the embedded options.
    pub fn option_schedule(&self) -> OptionSchedule {
        OptionSchedule::new(&self.terms, self.options)
    }

    /// Conversion ratio over time, after dividend protection.
    pub fn dividend_protection(&self) -> DividendProtection {
        DividendProtection::new(
            self.terms.conversion_ratio,
            self.terms.dividend_protection,
            &self.dividends,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option_schedule::OptionLeg;
    use approx::assert_abs_diff_eq;

    #[test]
    fn flags() {
        assert_eq!(ConversionStyle::from_flag(0), ConversionStyle::European);
        assert_eq!(ConversionStyle::from_flag(1), ConversionStyle::American);
        assert_eq!(ConversionStyle::default(), ConversionStyle::American);
        let terms = BondTerms::new(100.0, 0.05, 2, 5.0, 1.0).with_dividend_protection(0.0);
        assert_eq!(terms.dividend_protection, None);
        let terms = terms.with_dividend_protection(0.02);
        assert_eq!(terms.dividend_protection, Some(0.02));
    }

    #[test]
    fn coupon_schedule_runs_back_from_maturity() {
        let terms = BondTerms::new(100.0, 0.06, 2, 2.0, 1.0);
        assert_abs_diff_eq!(terms.coupon_amount(), 3.0, epsilon = 1e-15);
        assert_eq!(terms.coupon_times(), vec![2.0, 1.5, 1.0, 0.5]);

        // a stub period leaves the first coupon before a full period
        let times = BondTerms::new(100.0, 0.06, 1, 2.3, 1.0).coupon_times();
        assert_eq!(times.len(), 3);
        assert_abs_diff_eq!(times[2], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn redemption_includes_premium() {
        let terms = BondTerms::new(100.0, 0.0, 1, 1.0, 1.0).with_redemption_premium(0.1);
        assert_abs_diff_eq!(terms.redemption_value(), 110.0, epsilon = 1e-12);
    }

    #[test]
    fn new_validates_terms() {
        let ok = BondTerms::new(100.0, 0.05, 2, 5.0, 1.0);
        let none = EmbeddedOptions::none;
        let empty = DividendSchedule::empty;
        assert!(ConvertibleBond::new(ok, none(), empty()).is_ok());

        let bad = [
            BondTerms { face_value: 0.0, ..ok },
            BondTerms { coupon_rate: -0.01, ..ok },
            BondTerms { coupon_frequency: 0, ..ok },
            BondTerms { maturity: 0.0, ..ok },
            BondTerms { conversion_ratio: -1.0, ..ok },
            BondTerms { no_conversion_period: -1.0, ..ok },
            BondTerms { redemption_premium: -0.1, ..ok },
            BondTerms { dividend_protection: Some(1.0), ..ok },
        ];
        for terms in bad {
            let err = ConvertibleBond::new(terms, none(), empty()).unwrap_err();
            assert!(err.is_invalid_input(), "{terms:?}");
        }
    }

    #[test]
    fn new_checks_against_maturity() {
        let terms = BondTerms::new(100.0, 0.05, 2, 5.0, 1.0);
        let late_put = EmbeddedOptions::none().with_put(OptionLeg::new(5.5, 1.0).unwrap());
        assert!(ConvertibleBond::new(terms, late_put, DividendSchedule::empty()).is_err());
        let late_dividend = DividendSchedule::from_rows(&[[5.5, 0.02]]).unwrap();
        assert!(ConvertibleBond::new(terms, EmbeddedOptions::none(), late_dividend).is_err());
    }

    #[test]
    fn with_coupon_rate_keeps_everything_else() {
        let dividends = DividendSchedule::from_rows(&[[1.0, 0.03]]).unwrap();
        let bond = ConvertibleBond::new(
            BondTerms::new(100.0, 0.05, 2, 5.0, 1.0).with_dividend_protection(0.02),
            EmbeddedOptions::none().with_put(OptionLeg::new(3.0, 1.0).unwrap()),
            dividends,
        )
        .unwrap();
        let repriced = bond.with_coupon_rate(0.08).unwrap();
        assert_eq!(repriced.terms().coupon_rate, 0.08);
        assert_eq!(repriced.options(), bond.options());
        assert!(repriced.options().put.is_some());
        assert_eq!(repriced.dividends(), bond.dividends());
        assert_eq!(
            repriced.dividend_protection().ratio_at(2.0),
            bond.dividend_protection().ratio_at(2.0)
        );
        assert!(bond.with_coupon_rate(-0.01).is_err());
    }
}
