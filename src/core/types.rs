//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// 2D location in the spatial region
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Location {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

/// A single point of a realization: occurrence time and location
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub t: f64,
    pub s: Location,
}

impl Event {
    pub fn new(t: f64, x: f64, y: f64) -> Self {
        Self { t, s: Location::new(x, y) }
    }

    /// Time-major flat representation `[t, x, y]`
    pub fn to_array(&self) -> [f64; 3] {
        [self.t, self.s.x, self.s.y]
    }
}

/// One realization of the process, ascending in time
pub type EventSequence = Vec<Event>;

/// Number of coordinates per event (time plus two spatial dimensions)
pub const EVENT_DIMS: usize = 3;
