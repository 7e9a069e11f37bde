//! Anisotropic (correlated) Gaussian diffusion kernel
//!
//! Generalises the isotropic diffusion kernel with a mean offset and a
//! correlation term, so the diffusion ellipse can be shifted and rotated.

use serde::{Deserialize, Serialize};

use super::{gaussian_diffusion, validate_amplitude_decay, validate_spread, Kernel};
use crate::core::error::{Result, StppError};
use crate::core::types::Location;

/// Mean offset, spreads and correlation of one diffusion ellipse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GaussianShape {
    pub mu_x: f64,
    pub mu_y: f64,
    pub sigma_x: f64,
    pub sigma_y: f64,
    pub rho: f64,
}

impl Default for GaussianShape {
    fn default() -> Self {
        Self { mu_x: 0.0, mu_y: 0.0, sigma_x: 1.0, sigma_y: 1.0, rho: 0.0 }
    }
}

impl GaussianShape {
    pub fn validate(&self) -> Result<()> {
        if !self.mu_x.is_finite() || !self.mu_y.is_finite() {
            return Err(StppError::InvalidKernel(format!(
                "mean offset must be finite, got ({}, {})",
                self.mu_x, self.mu_y
            )));
        }
        validate_spread("sigma_x", self.sigma_x)?;
        validate_spread("sigma_y", self.sigma_y)?;
        // (1 - rho^2) normalizes the density; |rho| -> 1 collapses the ellipse
        if !(self.rho.abs() < 1.0) {
            return Err(StppError::InvalidKernel(format!(
                "correlation rho must satisfy |rho| < 1, got {}",
                self.rho
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianDiffusionKernel {
    shape: GaussianShape,
    beta: f64,
    c: f64,
}

impl Default for GaussianDiffusionKernel {
    fn default() -> Self {
        Self { shape: GaussianShape::default(), beta: 1.0, c: 1.0 }
    }
}

impl GaussianDiffusionKernel {
    pub fn new(shape: GaussianShape, beta: f64, c: f64) -> Result<Self> {
        validate_amplitude_decay(c, beta)?;
        shape.validate()?;
        Ok(Self { shape, beta, c })
    }

    pub fn shape(&self) -> &GaussianShape {
        &self.shape
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn amplitude(&self) -> f64 {
        self.c
    }
}

impl Kernel for GaussianDiffusionKernel {
    fn nu(&self, t: f64, s: Location, his_t: &[f64], his_s: &[Location]) -> Result<Vec<f64>> {
        debug_assert_eq!(his_t.len(), his_s.len());
        Ok(his_t
            .iter()
            .zip(his_s)
            .map(|(&ht, &hs)| {
                let delta = s - hs;
                gaussian_diffusion(t - ht, delta.x, delta.y, &self.shape, self.beta, self.c)
            })
            .collect())
    }
}
