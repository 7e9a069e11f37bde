//! Spatio-temporal point process sampler
//!
//! Two stages per sequence:
//! 1. Homogeneous Poisson proposals over `T × S` at the intensity's upper
//!    bound, sorted by time.
//! 2. Ogata thinning: each proposal is kept with probability
//!    `λ(t, s) / λ̄`, where `λ` is evaluated against the events retained so
//!    far.
//!
//! Sequences whose thinning hits an intensity above the bound, or that
//! retain too few events, are discarded whole and redrawn.

pub mod batch;

pub use batch::Batch;

use rand::Rng;
use rand_distr::{Distribution, Poisson};

use crate::core::error::{Result, StppError};
use crate::core::types::{Event, EventSequence, Location};
use crate::intensity::Intensity;
use crate::region::{measure, Interval, Region};

/// Largest expected proposal count `λ̄ · |T × S|` accepted per attempt
pub const MAX_PROPOSAL_MEAN: f64 = 1e8;

/// Sampler tuning that is not part of the process itself
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SamplerConfig {
    /// Attempts allowed per batch slot before giving up; `None` retries
    /// forever. `Some(0)` is rejected when sampling starts.
    pub max_attempts: Option<usize>,
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == Some(0) {
            return Err(StppError::InvalidConfig(
                "max_attempts must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Retained events, stored as parallel arrays for kernel evaluation
struct History {
    times: Vec<f64>,
    locations: Vec<Location>,
}

impl History {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            times: Vec::with_capacity(capacity),
            locations: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, event: Event) {
        self.times.push(event.t);
        self.locations.push(event.s);
    }

    fn len(&self) -> usize {
        self.times.len()
    }

    fn into_events(self) -> EventSequence {
        self.times
            .into_iter()
            .zip(self.locations)
            .map(|(t, s)| Event { t, s })
            .collect()
    }
}

pub struct SpatialTemporalPointProcess<I> {
    lam: I,
    config: SamplerConfig,
}

impl<I: Intensity> SpatialTemporalPointProcess<I> {
    pub fn new(lam: I) -> Self {
        Self { lam, config: SamplerConfig::default() }
    }

    pub fn with_config(lam: I, config: SamplerConfig) -> Self {
        Self { lam, config }
    }

    pub fn intensity(&self) -> &I {
        &self.lam
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Homogeneous Poisson pattern on `T × S` with rate `upper_bound()`,
    /// ascending in time.
    ///
    /// The expected count must be finite and at most [`MAX_PROPOSAL_MEAN`].
    pub fn homogeneous_poisson_sampling<R: Rng + ?Sized>(
        &self,
        time: Interval,
        space: &[Interval],
        rng: &mut R,
    ) -> Result<EventSequence> {
        let [sx, sy] = planar(space)?;
        let region = Region::space_time(time, space);
        let mean = self.lam.upper_bound() * measure(&region);
        if !mean.is_finite() || mean > MAX_PROPOSAL_MEAN {
            return Err(StppError::InvalidRegion(format!(
                "expected proposal count {} over T x S is not finite or exceeds {}",
                mean, MAX_PROPOSAL_MEAN
            )));
        }

        let n = if mean > 0.0 {
            let poisson = Poisson::new(mean).map_err(|e| {
                StppError::InvalidConfig(format!("proposal mean {} rejected: {}", mean, e))
            })?;
            poisson.sample(rng) as usize
        } else {
            0
        };

        // Each coordinate is drawn as its own column
        let ts: Vec<f64> = (0..n).map(|_| rng.gen_range(time.min()..time.max())).collect();
        let xs: Vec<f64> = (0..n).map(|_| rng.gen_range(sx.min()..sx.max())).collect();
        let ys: Vec<f64> = (0..n).map(|_| rng.gen_range(sy.min()..sy.max())).collect();

        let mut points: EventSequence = ts
            .into_iter()
            .zip(xs)
            .zip(ys)
            .map(|((t, x), y)| Event::new(t, x, y))
            .collect();
        points.sort_by(|a, b| a.t.total_cmp(&b.t));
        Ok(points)
    }

    /// Thin time-sorted proposals against the history-dependent intensity.
    ///
    /// Returns [`StppError::BoundViolation`] as soon as an evaluated intensity
    /// exceeds the upper bound or is not finite (two proposals at the same
    /// instant make the diffusion kernels blow up); nothing retained up to
    /// that point is returned.
    pub fn inhomogeneous_poisson_thinning<R: Rng + ?Sized>(
        &self,
        homo_points: &[Event],
        verbose: bool,
        rng: &mut R,
    ) -> Result<EventSequence> {
        let lam_bar = self.lam.upper_bound();
        let mut retained = History::with_capacity(homo_points.len());
        let report_every = (homo_points.len() / 10).max(1);

        if verbose {
            tracing::info!(
                "generate {} samples from homogeneous poisson point process",
                homo_points.len()
            );
        }

        for (i, point) in homo_points.iter().enumerate() {
            let lam_value =
                self.lam
                    .value(point.t, &retained.times, point.s, &retained.locations)?;
            let d: f64 = rng.gen();

            if !(lam_value <= lam_bar) {
                tracing::warn!(
                    "intensity {} is greater than upper bound {} at t={}",
                    lam_value,
                    lam_bar,
                    point.t
                );
                return Err(StppError::BoundViolation {
                    value: lam_value,
                    bound: lam_bar,
                    time: point.t,
                });
            }

            if lam_value >= d * lam_bar {
                retained.push(*point);
            }

            if verbose && i != 0 && i % report_every == 0 {
                tracing::info!(
                    "{} raw samples have been checked, {} samples have been retained",
                    i,
                    retained.len()
                );
            }
        }

        if verbose {
            tracing::info!(
                "thinning retained {} of {} samples based on {}",
                retained.len(),
                homo_points.len(),
                self.lam.label()
            );
        }
        Ok(retained.into_events())
    }

    /// Draw one accepted sequence with at least `min_n_points` events.
    ///
    /// `slot` only labels diagnostics and errors.
    pub fn generate_sequence<R: Rng + ?Sized>(
        &self,
        time: Interval,
        space: &[Interval],
        min_n_points: usize,
        slot: usize,
        verbose: bool,
        rng: &mut R,
    ) -> Result<EventSequence> {
        self.config.validate()?;
        let mut attempts = 0;
        loop {
            if let Some(max_attempts) = self.config.max_attempts {
                if attempts >= max_attempts {
                    return Err(StppError::RetriesExhausted { slot, attempts });
                }
            }
            attempts += 1;

            let homo_points = self.homogeneous_poisson_sampling(time, space, rng)?;
            match self.inhomogeneous_poisson_thinning(&homo_points, verbose, rng) {
                Ok(points) if points.len() >= min_n_points => {
                    tracing::debug!(
                        "sequence {} accepted after {} attempts with {} events",
                        slot,
                        attempts,
                        points.len()
                    );
                    return Ok(points);
                }
                Ok(_) => continue,
                Err(StppError::BoundViolation { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Generate `batch_size` independent sequences and pack them into a
    /// zero-padded [`Batch`].
    pub fn generate<R: Rng + ?Sized>(
        &self,
        time: Interval,
        space: &[Interval],
        batch_size: usize,
        min_n_points: usize,
        verbose: bool,
        rng: &mut R,
    ) -> Result<Batch> {
        if batch_size == 0 {
            return Err(StppError::InvalidConfig("batch size must be at least 1".to_string()));
        }
        planar(space)?;

        let mut sequences = Vec::with_capacity(batch_size);
        for slot in 0..batch_size {
            let points = self.generate_sequence(time, space, min_n_points, slot, verbose, rng)?;
            if verbose {
                tracing::info!("{}-th sequence is generated", slot + 1);
            }
            sequences.push(points);
        }
        Ok(Batch::from_sequences(sequences))
    }
}

/// Kernels are planar: exactly an x and a y interval
fn planar(space: &[Interval]) -> Result<[Interval; 2]> {
    match space {
        [sx, sy] => Ok([*sx, *sy]),
        _ => Err(StppError::InvalidRegion(format!(
            "expected 2 spatial dimensions, got {}",
            space.len()
        ))),
    }
}
