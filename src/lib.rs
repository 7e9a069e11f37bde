//! STPPG - Spatio-Temporal Point Process Generator
//!
//! Simulates marked spatio-temporal Hawkes processes: homogeneous Poisson
//! proposals thinned against a self-exciting intensity (Ogata's algorithm).

pub mod core;
pub mod intensity;
pub mod kernel;
pub mod region;
pub mod sampler;
pub mod surface;

pub use crate::core::{Event, EventSequence, Location, Result, SimulationConfig, StppError};
pub use intensity::{HawkesIntensity, Intensity};
pub use kernel::{ExcitationKernel, Kernel};
pub use region::{measure, Interval, Region};
pub use sampler::{Batch, SamplerConfig, SpatialTemporalPointProcess};
