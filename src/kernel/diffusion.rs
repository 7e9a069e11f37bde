//! Isotropic diffusion kernel (Musmeci and Vere-Jones, 1992)

use std::f64::consts::PI;

use super::{validate_amplitude_decay, validate_spread, Kernel};
use crate::core::error::Result;
use crate::core::types::Location;

/// `C·exp(−βΔt) / (2π σx σy Δt) · exp(−(Δx²/σx² + Δy²/σy²) / 2Δt)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StdDiffusionKernel {
    c: f64,
    beta: f64,
    sigma_x: f64,
    sigma_y: f64,
}

impl Default for StdDiffusionKernel {
    fn default() -> Self {
        Self { c: 1.0, beta: 1.0, sigma_x: 1.0, sigma_y: 1.0 }
    }
}

impl StdDiffusionKernel {
    pub fn new(c: f64, beta: f64, sigma_x: f64, sigma_y: f64) -> Result<Self> {
        validate_amplitude_decay(c, beta)?;
        validate_spread("sigma_x", sigma_x)?;
        validate_spread("sigma_y", sigma_y)?;
        Ok(Self { c, beta, sigma_x, sigma_y })
    }

    pub fn amplitude(&self) -> f64 {
        self.c
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    fn value(&self, dt: f64, dx: f64, dy: f64) -> f64 {
        let sx2 = self.sigma_x * self.sigma_x;
        let sy2 = self.sigma_y * self.sigma_y;
        (-self.beta * dt).exp()
            * (self.c / (2.0 * PI * self.sigma_x * self.sigma_y * dt))
            * ((-1.0 / (2.0 * dt)) * (dx * dx / sx2 + dy * dy / sy2)).exp()
    }
}

impl Kernel for StdDiffusionKernel {
    fn nu(&self, t: f64, s: Location, his_t: &[f64], his_s: &[Location]) -> Result<Vec<f64>> {
        debug_assert_eq!(his_t.len(), his_s.len());
        Ok(his_t
            .iter()
            .zip(his_s)
            .map(|(&ht, &hs)| {
                let delta = s - hs;
                self.value(t - ht, delta.x, delta.y)
            })
            .collect())
    }
}
