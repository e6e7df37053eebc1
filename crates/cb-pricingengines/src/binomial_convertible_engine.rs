//! Binomial convertible bond engine.
//!
//! Backward induction on a Cox-Ross-Rubinstein tree for the share price.
//! Each node carries the bond value split into an equity component, which
//! is discounted at the risk-free rate, and a debt component, which is
//! discounted at the risky rate `r + spread` (Tsiveriotis-Fernandes).
//!
//! At every node the continuation value is compared, in order, against the
//! soft call, the put, the hard call and finally conversion:
//!
//! ```text
//! value = hold
//! value = min(value, max(C, K_soft·F))    soft call, while S ≥ barrier
//! value = max(value, K_put·F)             put
//! value = min(value, max(K_call·F, C))    hard call
//! value = max(C, value)                   conversion
//! ```
//!
//! where `C = ratio·S` is the conversion value (only when conversion is
//! allowed). Whichever outcome binds decides the split: holding keeps the
//! continuation components, conversion makes the node pure equity, and a
//! cash redemption under a call or put makes it pure debt. Coupons are
//! added to the debt component after the decision.

use cb_core::{errors::Result, Price, Real, Size};
use cb_instruments::{
    BondTerms, ConvertibleBond, MarketParameters, OptionSchedule, PricingEngine, PricingResults,
};
use cb_methods::lattice::{BinomialTree, LatticeGrid, TimeGrid};
use log::debug;

/// Binomial lattice engine for [`ConvertibleBond`].
///
/// # Example
/// ```
/// use cb_core::Compounding;
/// use cb_instruments::{
///     BondTerms, ConvertibleBond, DividendSchedule, EmbeddedOptions, MarketParameters,
///     PricingEngine,
/// };
/// use cb_methods::lattice::LatticeGrid;
/// use cb_pricingengines::BinomialConvertibleEngine;
///
/// let market = MarketParameters::new(100.0, 0.2, 0.05, 0.0, Compounding::Compounded(1)).unwrap();
/// let bond = ConvertibleBond::new(
///     BondTerms::new(100.0, 0.05, 1, 2.0, 0.0),
///     EmbeddedOptions::none(),
///     DividendSchedule::empty(),
/// )
/// .unwrap();
/// let engine = BinomialConvertibleEngine::new(market, LatticeGrid::default());
/// let npv = engine.calculate(&bond).unwrap().npv;
/// assert!((npv - 100.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinomialConvertibleEngine {
    market: MarketParameters,
    grid: LatticeGrid,
}

/// Value at a node, split by discounting curve.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Split {
    equity: Real,
    debt: Real,
}

impl Split {
    fn equity(value: Real) -> Self {
        Self {
            equity: value,
            debt: 0.0,
        }
    }

    fn debt(value: Real) -> Self {
        Self {
            equity: 0.0,
            debt: value,
        }
    }

    fn value(&self) -> Real {
        self.equity + self.debt
    }
}

impl BinomialConvertibleEngine {
    /// Create an engine for the given market and lattice resolution.
    pub fn new(market: MarketParameters, grid: LatticeGrid) -> Self {
        Self { market, grid }
    }

    /// Market inputs.
    pub fn market(&self) -> &MarketParameters {
        &self.market
    }

    /// Lattice resolution.
    pub fn grid(&self) -> LatticeGrid {
        self.grid
    }

    /// The same engine with a different resolution.
    #[must_use]
    pub fn with_grid(mut self, grid: LatticeGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Price only.
    pub fn npv(&self, bond: &ConvertibleBond) -> Result<Price> {
        self.calculate(bond).map(|r| r.npv)
    }
}

/// Coupon paid at each step: every coupon date maps to its nearest step.
fn coupon_schedule(terms: &BondTerms, grid: &TimeGrid) -> Vec<Price> {
    let mut coupons = vec![0.0; grid.size()];
    let amount = terms.coupon_amount();
    if amount > 0.0 {
        for t in terms.coupon_times() {
            coupons[grid.closest_index(t)] += amount;
        }
    }
    coupons
}

/// Resolve the embedded options at one node.
fn exercise(
    hold: Split,
    conversion: Option<Price>,
    soft_call: Option<Price>,
    put: Option<Price>,
    hard_call: Option<Price>,
) -> Split {
    // The holder converts instead of accepting cash only when strictly better.
    let called = |price: Price| match conversion {
        Some(c) if c > price => Split::equity(c),
        _ => Split::debt(price),
    };

    let mut node = hold;
    if let Some(price) = soft_call {
        let forced = called(price);
        if forced.value() < node.value() {
            node = forced;
        }
    }
    if let Some(price) = put {
        if price > node.value() {
            node = Split::debt(price);
        }
    }
    if let Some(price) = hard_call {
        let forced = called(price);
        if forced.value() < node.value() {
            node = forced;
        }
    }
    if let Some(c) = conversion {
        if c > node.value() {
            node = Split::equity(c);
        }
    }
    node
}

impl PricingEngine<ConvertibleBond> for BinomialConvertibleEngine {
    fn calculate(&self, bond: &ConvertibleBond) -> Result<PricingResults> {
        let market = &self.market;
        market.validate()?;
        let terms = bond.terms();

        let grid = self.grid.time_grid(terms.maturity)?;
        let dt = grid.dt();
        let tree = BinomialTree::cox_ross_rubinstein(
            market.spot,
            market.volatility,
            &grid,
            market.risk_free_growth(dt),
        )?
        .with_dividends(bond.dividends().iter().map(|d| (d.time, d.rate)))?;

        let equity_discount = market.risk_free_discount(dt);
        let debt_discount = market.risky_discount(dt);
        let schedule: OptionSchedule = bond.option_schedule();
        let ratios = bond.dividend_protection().ratios_on(grid.times());
        let coupons = coupon_schedule(terms, &grid);
        let n: Size = tree.steps();

        debug!(
            "convertible lattice: {n} steps, dt = {dt:.6}, up = {:.6}, p = {:.6}",
            tree.up(),
            tree.probability(0, 0, 1)
        );

        let conversion_at = |i: Size, s: Price| {
            schedule
                .conversion_available(grid.time(i))
                .then(|| ratios[i] * s)
        };

        // Terminal layer: redeem or convert, then the final coupon.
        let redemption = terms.redemption_value();
        let mut equity = Vec::with_capacity(n + 1);
        let mut debt = Vec::with_capacity(n + 1);
        for j in 0..tree.size(n) {
            let node = match conversion_at(n, tree.underlying(n, j)) {
                Some(c) if c > redemption => Split::equity(c),
                _ => Split::debt(redemption),
            };
            equity.push(node.equity);
            debt.push(node.debt + coupons[n]);
        }

        // Roll back; node j at step i only reads j and j + 1 of step i + 1.
        for i in (0..n).rev() {
            let t = grid.time(i);
            let hard_call = schedule.hard_call_price(t);
            let put = schedule.put_price(t);
            for j in 0..tree.size(i) {
                let pu = tree.probability(i, j, 1);
                let pd = tree.probability(i, j, 0);
                let up = tree.descendant(i, j, 1);
                let down = tree.descendant(i, j, 0);
                let hold = Split {
                    equity: equity_discount * (pu * equity[up] + pd * equity[down]),
                    debt: debt_discount * (pu * debt[up] + pd * debt[down]),
                };

                let s = tree.underlying(i, j);
                let node = exercise(
                    hold,
                    conversion_at(i, s),
                    schedule.soft_call_price(t, s),
                    put,
                    hard_call,
                );
                equity[j] = node.equity;
                debt[j] = node.debt + coupons[i];
            }
        }

        let npv = equity[0] + debt[0];
        debug!(
            "convertible price {npv:.8} (equity {:.8}, debt {:.8})",
            equity[0], debt[0]
        );

        Ok(PricingResults::from_npv(npv)
            .with_result("equity_component", equity[0])
            .with_result("debt_component", debt[0])
            .with_result("conversion_value", ratios[0] * market.spot)
            .with_result("up_probability", tree.probability(0, 0, 1))
            .with_result("steps", n as Real))
    }
}
