//! Recombining binomial tree over the underlying equity price.
//!
//! Cox-Ross-Rubinstein layout: `up = exp(σ√Δt)`, `down = 1/up`, with the
//! up-probability chosen so the one-step expected return equals the
//! risk-free growth factor. Discrete proportional dividends scale whole time
//! layers of the price grid, so the branching stays recombining.

use cb_core::{ensure, errors::Result, Rate, Real, Size, Time, Volatility};
use cb_math::comparison::on_or_after;

use super::TimeGrid;

/// A recombining binomial tree for the underlying equity price.
///
/// The tree has `steps + 1` time layers, with layer `i` having `i + 1` nodes.
/// Node `(i, j)` represents the state after `j` up-moves and `i − j`
/// down-moves, scaled by the dividends paid up to `t_i`.
#[derive(Debug, Clone)]
pub struct BinomialTree {
    x0: Real,
    dt: Time,
    times: Vec<Time>,
    up: Real,
    down: Real,
    pu: Real,
    pd: Real,
    dividend_factors: Vec<Real>,
}

impl BinomialTree {
    // ── Accessors ────────────────────────────────────────────────────────

    /// Number of time steps.
    pub fn steps(&self) -> Size {
        self.times.len() - 1
    }

    /// Time increment per step.
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Time of layer `i`.
    pub fn time(&self, i: Size) -> Time {
        self.times[i]
    }

    /// Up-move multiplier.
    pub fn up(&self) -> Real {
        self.up
    }

    /// Down-move multiplier (`1 / up`).
    pub fn down(&self) -> Real {
        self.down
    }

    /// Number of nodes at time step `i` (always `i + 1` for a binomial tree).
    pub fn size(&self, i: Size) -> Size {
        i + 1
    }

    /// Index of the descendant node at step `i+1` for a given `branch`.
    ///
    /// `branch = 0` → down, `branch = 1` → up.
    pub fn descendant(&self, _i: Size, index: Size, branch: Size) -> Size {
        index + branch
    }

    /// Underlying value (stock price) at node `(i, index)`, after dividends.
    pub fn underlying(&self, i: Size, index: Size) -> Real {
        self.x0
            * self.down.powi((i - index) as i32)
            * self.up.powi(index as i32)
            * self.dividend_factors[i]
    }

    /// Transition probability for `branch` (0 = down, 1 = up).
    pub fn probability(&self, _i: Size, _index: Size, branch: Size) -> Real {
        if branch == 1 {
            self.pu
        } else {
            self.pd
        }
    }

    /// Cumulative dividend factor `∏ (1 − q)` applied to layer `i`.
    pub fn dividend_factor(&self, i: Size) -> Real {
        self.dividend_factors[i]
    }

    // ── Construction ─────────────────────────────────────────────────────

    /// Cox-Ross-Rubinstein tree (equal jumps, drift in the probabilities).
    ///
    /// `growth` is the risk-free compound factor over one step, `Δt = grid.dt()`.
    ///
    /// # Errors
    /// `InvalidInput` if `x0 ≤ 0`, `σ ≤ 0`, `Δt ≤ 0`, or if the step is too
    /// coarse for the rate and the up-probability leaves `[0, 1]`.
    pub fn cox_ross_rubinstein(
        x0: Real,
        volatility: Volatility,
        grid: &TimeGrid,
        growth: Real,
    ) -> Result<Self> {
        ensure!(x0 > 0.0 && x0.is_finite(), "spot price must be positive, got {x0}");
        ensure!(
            volatility > 0.0 && volatility.is_finite(),
            "volatility must be positive, got {volatility}"
        );
        let dt = grid.dt();
        ensure!(dt > 0.0, "time step must be positive, got {dt}");
        ensure!(growth > 0.0 && growth.is_finite(), "invalid growth factor {growth}");

        let up = (volatility * dt.sqrt()).exp();
        let down = 1.0 / up;
        let pu = (growth - down) / (up - down);
        ensure!(
            (0.0..=1.0).contains(&pu),
            "CRR: risk-neutral probability {pu} outside [0, 1] (increase steps per year)"
        );
        Ok(Self {
            x0,
            dt,
            times: grid.times().to_vec(),
            up,
            down,
            pu,
            pd: 1.0 - pu,
            dividend_factors: vec![1.0; grid.size()],
        })
    }

    /// Apply discrete proportional dividends `(time, rate)`.
    ///
    /// Every layer whose time is at or after a dividend's time is scaled by
    /// `1 − rate`.
    pub fn with_dividends<I>(mut self, dividends: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Time, Rate)>,
    {
        for (time, rate) in dividends {
            ensure!(
                (0.0..1.0).contains(&rate),
                "dividend rate must lie in [0, 1), got {rate}"
            );
            for (factor, &t) in self.dividend_factors.iter_mut().zip(&self.times) {
                if on_or_after(t, time) {
                    *factor *= 1.0 - rate;
                }
            }
        }
        Ok(self)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid() -> TimeGrid {
        TimeGrid::uniform(1.0, 4).unwrap()
    }

    fn growth(rate: Real, dt: Time) -> Real {
        (rate * dt).exp()
    }

    #[test]
    fn recombines() {
        let g = grid();
        let tree = BinomialTree::cox_ross_rubinstein(100.0, 0.2, &g, growth(0.05, g.dt())).unwrap();
        assert_abs_diff_eq!(tree.up() * tree.down(), 1.0, epsilon = 1e-15);
        // up then down == down then up == spot
        assert_abs_diff_eq!(tree.underlying(2, 1), 100.0, epsilon = 1e-12);
        assert_eq!(tree.size(3), 4);
        assert_eq!(tree.descendant(2, 1, 0), 1);
        assert_eq!(tree.descendant(2, 1, 1), 2);
    }

    #[test]
    fn martingale_under_risk_free_growth() {
        let g = grid();
        let gr = growth(0.05, g.dt());
        let tree = BinomialTree::cox_ross_rubinstein(100.0, 0.3, &g, gr).unwrap();
        for i in 0..tree.steps() {
            for j in 0..tree.size(i) {
                let expected = tree.probability(i, j, 1) * tree.underlying(i + 1, j + 1)
                    + tree.probability(i, j, 0) * tree.underlying(i + 1, j);
                assert_abs_diff_eq!(expected, gr * tree.underlying(i, j), epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn dividends_scale_layers_from_event_time() {
        let g = grid();
        let tree = BinomialTree::cox_ross_rubinstein(100.0, 0.2, &g, growth(0.0, g.dt()))
            .unwrap()
            .with_dividends([(0.5, 0.1), (0.75, 0.2)])
            .unwrap();
        assert_abs_diff_eq!(tree.dividend_factor(1), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(tree.dividend_factor(2), 0.9, epsilon = 1e-15);
        assert_abs_diff_eq!(tree.dividend_factor(3), 0.72, epsilon = 1e-15);
        assert_abs_diff_eq!(tree.dividend_factor(4), 0.72, epsilon = 1e-15);
        assert_abs_diff_eq!(tree.underlying(2, 1), 90.0, epsilon = 1e-12);
        // still recombining after the jump
        assert_abs_diff_eq!(
            tree.underlying(4, 2),
            tree.underlying(2, 1) * 0.8,
            epsilon = 1e-12
        );
    }

    #[test]
    fn rejects_invalid_inputs() {
        let g = grid();
        let gr = growth(0.05, g.dt());
        assert!(BinomialTree::cox_ross_rubinstein(0.0, 0.2, &g, gr).is_err());
        assert!(BinomialTree::cox_ross_rubinstein(100.0, 0.0, &g, gr).is_err());
        assert!(BinomialTree::cox_ross_rubinstein(100.0, -0.2, &g, gr).is_err());
        let tree = BinomialTree::cox_ross_rubinstein(100.0, 0.2, &g, gr).unwrap();
        assert!(tree.with_dividends([(0.5, 1.0)]).unwrap_err().is_invalid_input());
    }

    #[test]
    fn rejects_probability_outside_unit_interval() {
        // σ√Δt = 0.005 while the rate drift per step is 0.25.
        let g = grid();
        let err = BinomialTree::cox_ross_rubinstein(100.0, 0.01, &g, growth(1.0, g.dt()))
            .unwrap_err();
        assert!(err.is_invalid_input());
    }
}
