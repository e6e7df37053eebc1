//! Discrete proportional dividends and the conversion-ratio ratchet.
//!
//! A dividend of rate `q` at time `τ` drops the share price by the factor
//! `1 − q`. Bonds with dividend protection compensate the holder for
//! dividends above a threshold `h` by raising the conversion ratio.

use cb_core::{ensure, errors::Result, Rate, Real, Size, Time};
use cb_math::comparison::on_or_after;

/// A single dividend: the share price drops by `rate` at `time`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DividendEvent {
    /// Ex-dividend time in years.
    pub time: Time,
    /// Proportional drop in `[0, 1)`.
    pub rate: Rate,
}

impl DividendEvent {
    /// Create a dividend event.
    pub fn new(time: Time, rate: Rate) -> Self {
        Self { time, rate }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DividendSchedule
// ────────────────────────────────────────────────────────────────────────────

/// Dividend events sorted ascending by time.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<DividendEvent>", into = "Vec<DividendEvent>")
)]
pub struct DividendSchedule {
    events: Vec<DividendEvent>,
}

impl DividendSchedule {
    /// Create a schedule, checking each event and the ordering.
    ///
    /// Times must be finite, non-negative and non-decreasing; rates must lie
    /// in `[0, 1)`.
    pub fn new(events: Vec<DividendEvent>) -> Result<Self> {
        for (i, e) in events.iter().enumerate() {
            ensure!(
                e.time >= 0.0 && e.time.is_finite(),
                "dividend {i}: time must be non-negative, got {}",
                e.time
            );
            ensure!(
                (0.0..1.0).contains(&e.rate),
                "dividend {i}: rate must lie in [0, 1), got {}",
                e.rate
            );
        }
        ensure!(
            events.windows(2).all(|w| w[0].time <= w[1].time),
            "dividend times must be sorted ascending"
        );
        Ok(Self { events })
    }

    /// No dividends.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a two-column `(time, rate)` table.
    ///
    /// ```
    /// use cb_instruments::DividendSchedule;
    ///
    /// let s = DividendSchedule::from_rows(&[[0.5, 0.02], [1.5, 0.02]]).unwrap();
    /// assert_eq!(s.len(), 2);
    /// assert!(DividendSchedule::from_rows(&[vec![0.5]]).is_err());
    /// ```
    pub fn from_rows<R: AsRef<[Real]>>(rows: &[R]) -> Result<Self> {
        let events = rows
            .iter()
            .enumerate()
            .map(|(i, row)| match row.as_ref() {
                &[time, rate] => Ok(DividendEvent { time, rate }),
                other => Err(cb_core::Error::invalid_input(format!(
                    "dividend row {i}: expected 2 columns (time, rate), got {}",
                    other.len()
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(events)
    }

    /// Iterate over the events.
    pub fn iter(&self) -> std::slice::Iter<'_, DividendEvent> {
        self.events.iter()
    }

    /// Number of events.
    pub fn len(&self) -> Size {
        self.events.len()
    }

    /// Whether there are no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Time of the last event.
    pub fn last_time(&self) -> Option<Time> {
        self.events.last().map(|e| e.time)
    }
}

impl<'a> IntoIterator for &'a DividendSchedule {
    type Item = &'a DividendEvent;
    type IntoIter = std::slice::Iter<'a, DividendEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl TryFrom<Vec<DividendEvent>> for DividendSchedule {
    type Error = cb_core::Error;

    fn try_from(events: Vec<DividendEvent>) -> Result<Self> {
        Self::new(events)
    }
}

impl From<DividendSchedule> for Vec<DividendEvent> {
    fn from(schedule: DividendSchedule) -> Self {
        schedule.events
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DividendProtection
// ────────────────────────────────────────────────────────────────────────────

/// Piecewise-constant conversion ratio under dividend protection.
///
/// Each dividend with `q > h` multiplies the ratio by `(1 − h)/(1 − q)`
/// from its time onward, so the holder's conversion value is only diluted
/// by the threshold rate. The ratio never decreases.
#[derive(Debug, Clone, PartialEq)]
pub struct DividendProtection {
    base_ratio: Real,
    // (time, ratio in force from `time` on), ascending.
    steps: Vec<(Time, Real)>,
}

impl DividendProtection {
    /// Build the ratchet for `base_ratio` under an optional threshold.
    pub fn new(base_ratio: Real, threshold: Option<Rate>, dividends: &DividendSchedule) -> Self {
        let mut steps = Vec::new();
        if let Some(h) = threshold.filter(|&h| h > 0.0) {
            let mut ratio = base_ratio;
            for event in dividends.iter().filter(|e| e.rate > h) {
                ratio *= (1.0 - h) / (1.0 - event.rate);
                steps.push((event.time, ratio));
            }
        }
        Self { base_ratio, steps }
    }

    /// Unadjusted conversion ratio.
    pub fn base_ratio(&self) -> Real {
        self.base_ratio
    }

    /// Conversion ratio in force at `t`.
    pub fn ratio_at(&self, t: Time) -> Real {
        self.steps
            .iter()
            .take_while(|(time, _)| on_or_after(t, *time))
            .last()
            .map_or(self.base_ratio, |&(_, ratio)| ratio)
    }

    /// Conversion ratio at each of `times`.
    pub fn ratios_on(&self, times: &[Time]) -> Vec<Real> {
        times.iter().map(|&t| self.ratio_at(t)).collect()
    }

    /// Whether any dividend triggers an adjustment.
    pub fn is_active(&self) -> bool {
        !self.steps.is_empty()
    }
}
