//! Axis-aligned regions in time-space and their Lebesgue measure

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, StppError};

/// Closed interval `[min, max]` with finite bounds and `min <= max`.
///
/// Outside the crate an `Interval` only comes from [`Interval::new`] or
/// deserialization, both of which validate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Interval {
    pub(crate) min: f64,
    pub(crate) max: f64,
}

impl Interval {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(StppError::InvalidRegion(format!(
                "interval bounds must be finite, got [{}, {}]",
                min, max
            )));
        }
        if min > max {
            return Err(StppError::InvalidRegion(format!(
                "interval lower bound {} exceeds upper bound {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// `n` evenly spaced points from `min` to `max` inclusive
    pub fn linspace(&self, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![self.min],
            _ => {
                let step = self.width() / (n - 1) as f64;
                (0..n)
                    .map(|i| if i == n - 1 { self.max } else { self.min + step * i as f64 })
                    .collect()
            }
        }
    }
}

impl TryFrom<[f64; 2]> for Interval {
    type Error = StppError;

    fn try_from(bounds: [f64; 2]) -> Result<Self> {
        Interval::new(bounds[0], bounds[1])
    }
}

impl From<Interval> for [f64; 2] {
    fn from(interval: Interval) -> Self {
        [interval.min, interval.max]
    }
}

/// Cartesian product of closed intervals, time dimension first
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    intervals: Vec<Interval>,
}

impl Region {
    pub fn new(intervals: Vec<Interval>) -> Self {
        Self { intervals }
    }

    /// Combined region `T × S`
    pub fn space_time(time: Interval, space: &[Interval]) -> Self {
        let mut intervals = Vec::with_capacity(space.len() + 1);
        intervals.push(time);
        intervals.extend_from_slice(space);
        Self { intervals }
    }

    pub fn dims(&self) -> usize {
        self.intervals.len()
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }
}

/// Lebesgue measure of an axis-aligned region: the product of interval widths.
///
/// The empty region is the empty product and measures 1.
pub fn measure(region: &Region) -> f64 {
    region.intervals.iter().map(Interval::width).product()
}
