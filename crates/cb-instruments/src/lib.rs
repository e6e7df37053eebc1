//! # cb-instruments
//!
//! The convertible bond and everything a pricing call needs to know about
//! it: market inputs, contractual terms, the embedded call/put/conversion
//! features, the dividend schedule and its protection ratchet.
//!
//! All inputs are validated once, when [`ConvertibleBond`] is assembled;
//! pricing engines read them without re-checking.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod convertible_bond;
pub mod dividends;
pub mod instrument;
pub mod market;
pub mod option_schedule;

pub use convertible_bond::{BondTerms, ConversionStyle, ConvertibleBond};
pub use dividends::{DividendEvent, DividendProtection, DividendSchedule};
pub use instrument::{PricingEngine, PricingResults};
pub use market::MarketParameters;
pub use option_schedule::{EmbeddedOptions, OptionLeg, OptionSchedule, SoftCall};
