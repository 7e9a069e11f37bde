//! Excitation kernels
//!
//! A kernel describes how the influence of one past event spreads over
//! space and decays over time. Every variant exposes the same operation,
//! [`Kernel::nu`], which maps the event under evaluation and the parallel
//! history arrays to one non-negative contribution per historical event.
//!
//! Differences are always taken as `current - historical`. Kernels do not
//! guard `dt`: callers evaluate strictly later events, and as `dt -> 0+`
//! the value grows without bound, matching the diffusion model near the
//! triggering event.

pub mod diffusion;
pub mod gaussian;
pub mod mixture;
pub mod spatial;

pub use diffusion::StdDiffusionKernel;
pub use gaussian::{GaussianDiffusionKernel, GaussianShape};
pub use mixture::{
    GaussianMixtureDiffusionKernel, MixtureKernel, SpatialVariantGaussianMixtureDiffusionKernel,
};
pub use spatial::{SpatialField, SpatialShape, SpatialVariantGaussianDiffusionKernel};

use crate::core::error::{Result, StppError};
use crate::core::types::Location;

pub trait Kernel: Send + Sync {
    /// Contribution of each historical event `(his_t[i], his_s[i])` to the
    /// rate at `(t, s)`.
    fn nu(&self, t: f64, s: Location, his_t: &[f64], his_s: &[Location]) -> Result<Vec<f64>>;
}

/// Every kernel variant behind one type, for runs assembled from configuration
#[derive(Debug, Clone)]
pub enum ExcitationKernel {
    Diffusion(StdDiffusionKernel),
    Gaussian(GaussianDiffusionKernel),
    Mixture(GaussianMixtureDiffusionKernel),
    SpatialGaussian(SpatialVariantGaussianDiffusionKernel),
    SpatialMixture(SpatialVariantGaussianMixtureDiffusionKernel),
}

impl ExcitationKernel {
    pub fn name(&self) -> &'static str {
        match self {
            ExcitationKernel::Diffusion(_) => "diffusion",
            ExcitationKernel::Gaussian(_) => "gaussian",
            ExcitationKernel::Mixture(_) => "mixture",
            ExcitationKernel::SpatialGaussian(_) => "spatial_gaussian",
            ExcitationKernel::SpatialMixture(_) => "spatial_mixture",
        }
    }
}

impl Kernel for ExcitationKernel {
    fn nu(&self, t: f64, s: Location, his_t: &[f64], his_s: &[Location]) -> Result<Vec<f64>> {
        match self {
            ExcitationKernel::Diffusion(k) => k.nu(t, s, his_t, his_s),
            ExcitationKernel::Gaussian(k) => k.nu(t, s, his_t, his_s),
            ExcitationKernel::Mixture(k) => k.nu(t, s, his_t, his_s),
            ExcitationKernel::SpatialGaussian(k) => k.nu(t, s, his_t, his_s),
            ExcitationKernel::SpatialMixture(k) => k.nu(t, s, his_t, his_s),
        }
    }
}

/// Amplitude `C` and decay rate `beta` shared by all Gaussian-type kernels
pub(crate) fn validate_amplitude_decay(c: f64, beta: f64) -> Result<()> {
    if !c.is_finite() || c < 0.0 {
        return Err(StppError::InvalidKernel(format!(
            "amplitude C must be finite and non-negative, got {}",
            c
        )));
    }
    if !beta.is_finite() || beta < 0.0 {
        return Err(StppError::InvalidKernel(format!(
            "decay rate beta must be finite and non-negative, got {}",
            beta
        )));
    }
    Ok(())
}

pub(crate) fn validate_spread(name: &str, sigma: f64) -> Result<()> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(StppError::InvalidKernel(format!(
            "{} must be finite and positive, got {}",
            name, sigma
        )));
    }
    Ok(())
}

/// Bivariate Gaussian diffusion density scaled by exponential time decay.
///
/// `shape` must already be validated (`sigma > 0`, `|rho| < 1`).
#[inline]
pub(crate) fn gaussian_diffusion(
    dt: f64,
    dx: f64,
    dy: f64,
    shape: &GaussianShape,
    beta: f64,
    c: f64,
) -> f64 {
    let GaussianShape { mu_x, mu_y, sigma_x, sigma_y, rho } = *shape;
    let one_minus_rho2 = 1.0 - rho * rho;
    let ux = dx - mu_x;
    let uy = dy - mu_y;
    let quad = ux * ux / (sigma_x * sigma_x) + uy * uy / (sigma_y * sigma_y)
        - 2.0 * rho * ux * uy / (sigma_x * sigma_y);

    (-beta * dt).exp()
        * (c / (2.0 * std::f64::consts::PI * sigma_x * sigma_y * dt * one_minus_rho2.sqrt()))
        * (-quad / (2.0 * dt * one_minus_rho2)).exp()
}
