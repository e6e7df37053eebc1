//! Market inputs for a single pricing call.

use cb_core::{
    ensure, errors::Result, Compounding, DiscountFactor, Price, Rate, Real, Spread, Time,
    Volatility,
};

/// Spot, volatility, rates and compounding, fixed for one pricing call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketParameters {
    /// Spot price of the underlying share.
    pub spot: Price,
    /// Annualized volatility of the share price.
    pub volatility: Volatility,
    /// Risk-free rate.
    pub risk_free_rate: Rate,
    /// Issuer credit spread over the risk-free rate.
    pub credit_spread: Spread,
    /// Compounding convention for both rates.
    pub compounding: Compounding,
}

impl MarketParameters {
    /// Create validated market parameters.
    pub fn new(
        spot: Price,
        volatility: Volatility,
        risk_free_rate: Rate,
        credit_spread: Spread,
        compounding: Compounding,
    ) -> Result<Self> {
        let market = Self {
            spot,
            volatility,
            risk_free_rate,
            credit_spread,
            compounding,
        };
        market.validate()?;
        Ok(market)
    }

    /// Check every field; engines call this before building a lattice.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.spot > 0.0 && self.spot.is_finite(),
            "spot price must be positive, got {}",
            self.spot
        );
        ensure!(
            self.volatility > 0.0 && self.volatility.is_finite(),
            "volatility must be positive, got {}",
            self.volatility
        );
        ensure!(
            self.risk_free_rate >= 0.0 && self.risk_free_rate.is_finite(),
            "risk-free rate must be non-negative, got {}",
            self.risk_free_rate
        );
        ensure!(
            self.credit_spread >= 0.0 && self.credit_spread.is_finite(),
            "credit spread must be non-negative, got {}",
            self.credit_spread
        );
        Ok(())
    }

    /// Risk-free growth of one unit over `dt`.
    pub fn risk_free_growth(&self, dt: Time) -> Real {
        self.compounding.compound_factor(self.risk_free_rate, dt)
    }

    /// Risk-free discount factor over `dt`.
    pub fn risk_free_discount(&self, dt: Time) -> DiscountFactor {
        self.compounding.discount_factor(self.risk_free_rate, dt)
    }

    /// Discount factor over `dt` at the risky rate `r + spread`.
    pub fn risky_discount(&self, dt: Time) -> DiscountFactor {
        self.compounding
            .discount_factor(self.risk_free_rate + self.credit_spread, dt)
    }
}
