//! Lattice methods for convertible pricing.
//!
//! # Overview
//!
//! * [`LatticeGrid`]: the user-facing resolution: steps per year
//! * [`TimeGrid`]: the uniform grid of step times derived for one maturity
//! * [`BinomialTree`]: recombining CRR tree with proportional dividend jumps

pub mod binomial_tree;

pub use binomial_tree::BinomialTree;

use cb_core::{ensure, errors::Result, Real, Size, Time};

/// Steps per year used when none is given.
pub const DEFAULT_STEPS_PER_YEAR: u32 = 50;

// ─── LatticeGrid ──────────────────────────────────────────────────────────────

/// Lattice resolution, expressed as a number of steps per year.
///
/// The number of steps for a given maturity is
/// `round(steps_per_year × maturity)`, which must be at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatticeGrid {
    steps_per_year: u32,
}

impl Default for LatticeGrid {
    fn default() -> Self {
        Self {
            steps_per_year: DEFAULT_STEPS_PER_YEAR,
        }
    }
}

impl LatticeGrid {
    /// Create a grid with `steps_per_year` steps per year.
    pub fn new(steps_per_year: u32) -> Result<Self> {
        ensure!(steps_per_year > 0, "steps per year must be positive");
        Ok(Self { steps_per_year })
    }

    /// Steps per year.
    pub fn steps_per_year(&self) -> u32 {
        self.steps_per_year
    }

    /// Total number of steps for a bond of the given maturity.
    pub fn total_steps(&self, maturity: Time) -> Result<Size> {
        ensure!(self.steps_per_year > 0, "steps per year must be positive");
        ensure!(
            maturity > 0.0 && maturity.is_finite(),
            "maturity must be positive, got {maturity}"
        );
        let steps = (Real::from(self.steps_per_year) * maturity).round();
        ensure!(
            steps >= 1.0,
            "{} steps per year leaves no step before maturity {maturity}",
            self.steps_per_year
        );
        Ok(steps as Size)
    }

    /// The uniform time grid from 0 to `maturity`.
    pub fn time_grid(&self, maturity: Time) -> Result<TimeGrid> {
        TimeGrid::uniform(maturity, self.total_steps(maturity)?)
    }
}

// ─── TimeGrid ─────────────────────────────────────────────────────────────────

/// A uniform grid of time points `t_i = i · dt`, `i = 0..=steps`.
#[derive(Debug, Clone)]
pub struct TimeGrid {
    times: Vec<Time>,
    dt: Time,
}

impl TimeGrid {
    /// Create a uniform time grid from 0 to `end` with `steps` intervals.
    pub fn uniform(end: Time, steps: Size) -> Result<Self> {
        ensure!(steps > 0, "time grid needs at least one step");
        ensure!(end > 0.0 && end.is_finite(), "time grid end must be positive, got {end}");
        let dt = end / steps as Real;
        let mut times: Vec<Time> = (0..=steps).map(|i| i as Real * dt).collect();
        // Pin the last point so maturity checks are exact.
        times[steps] = end;
        Ok(Self { times, dt })
    }

    /// Number of time points (= steps + 1).
    pub fn size(&self) -> Size {
        self.times.len()
    }

    /// Number of steps (= time points − 1).
    pub fn steps(&self) -> Size {
        self.times.len() - 1
    }

    /// Time at index `i`.
    pub fn time(&self, i: Size) -> Time {
        self.times[i]
    }

    /// Step length.
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Final time.
    pub fn end(&self) -> Time {
        self.times[self.steps()]
    }

    /// All time points.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Index of the grid point closest to `t`, clamped to the grid.
    pub fn closest_index(&self, t: Time) -> Size {
        let i = (t / self.dt).round();
        if i <= 0.0 {
            0
        } else {
            (i as Size).min(self.steps())
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
