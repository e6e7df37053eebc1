//! Compounding conventions.
//!
//! Rates enter the pricer with an integer convention: `0` means continuous
//! compounding and any positive `n` means `n` compounding periods per year.
//! [`Compounding::from_frequency`] maps that convention to the enum once, at
//! the input boundary.

use crate::{DiscountFactor, Rate, Real, Time};

/// How interest is compounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compounding {
    /// Continuously compounded: `e^(r·t)`
    #[default]
    Continuous,
    /// Compounded `n` times per year: `(1 + r/n)^(n·t)`
    Compounded(u32),
}

impl Compounding {
    /// Map the integer convention: `0` → continuous, `n` → `n` periods/year.
    pub fn from_frequency(periods_per_year: u32) -> Self {
        match periods_per_year {
            0 => Compounding::Continuous,
            n => Compounding::Compounded(n),
        }
    }

    /// The number of compounding periods per year (`0` for continuous).
    pub fn frequency(&self) -> u32 {
        match self {
            Compounding::Continuous => 0,
            Compounding::Compounded(n) => *n,
        }
    }

    /// Growth of one unit invested at `rate` over `t` years.
    pub fn compound_factor(&self, rate: Rate, t: Time) -> Real {
        match self {
            Compounding::Continuous => (rate * t).exp(),
            Compounding::Compounded(n) => {
                let freq = Real::from(*n);
                (1.0 + rate / freq).powf(freq * t)
            }
        }
    }

    /// Discount factor for `t` years at `rate`.
    pub fn discount_factor(&self, rate: Rate, t: Time) -> DiscountFactor {
        1.0 / self.compound_factor(rate, t)
    }
}
