//! Weighted superposition of diffusion kernels

use super::{
    validate_amplitude_decay, GaussianDiffusionKernel, GaussianShape, Kernel, SpatialShape,
    SpatialVariantGaussianDiffusionKernel,
};
use crate::core::error::{Result, StppError};
use crate::core::types::Location;

/// `Σ w_k · kernel_k`
///
/// Weights scale relative contributions and need not sum to one.
#[derive(Debug, Clone)]
pub struct MixtureKernel<K> {
    weights: Vec<f64>,
    components: Vec<K>,
}

pub type GaussianMixtureDiffusionKernel = MixtureKernel<GaussianDiffusionKernel>;
pub type SpatialVariantGaussianMixtureDiffusionKernel =
    MixtureKernel<SpatialVariantGaussianDiffusionKernel>;

impl<K: Kernel> MixtureKernel<K> {
    pub fn new(weights: Vec<f64>, components: Vec<K>) -> Result<Self> {
        if components.is_empty() {
            return Err(StppError::InvalidKernel(
                "mixture needs at least one component".to_string(),
            ));
        }
        if weights.len() != components.len() {
            return Err(StppError::InvalidKernel(format!(
                "mixture has {} weights for {} components",
                weights.len(),
                components.len()
            )));
        }
        if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(StppError::InvalidKernel(format!(
                "mixture weights must be finite and non-negative, got {}",
                w
            )));
        }
        Ok(Self { weights, components })
    }

    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn components(&self) -> &[K] {
        &self.components
    }
}

impl MixtureKernel<GaussianDiffusionKernel> {
    /// Components sharing one decay rate and amplitude
    pub fn gaussian(weights: Vec<f64>, shapes: &[GaussianShape], beta: f64, c: f64) -> Result<Self> {
        validate_amplitude_decay(c, beta)?;
        let components = shapes
            .iter()
            .map(|shape| GaussianDiffusionKernel::new(*shape, beta, c))
            .collect::<Result<Vec<_>>>()?;
        Self::new(weights, components)
    }
}

impl MixtureKernel<SpatialVariantGaussianDiffusionKernel> {
    /// Spatially varying components sharing one decay rate and amplitude
    pub fn spatial(weights: Vec<f64>, shapes: Vec<SpatialShape>, beta: f64, c: f64) -> Result<Self> {
        validate_amplitude_decay(c, beta)?;
        let components = shapes
            .into_iter()
            .map(|shape| SpatialVariantGaussianDiffusionKernel::new(shape, beta, c))
            .collect::<Result<Vec<_>>>()?;
        Self::new(weights, components)
    }
}

impl<K: Kernel> Kernel for MixtureKernel<K> {
    fn nu(&self, t: f64, s: Location, his_t: &[f64], his_s: &[Location]) -> Result<Vec<f64>> {
        let mut total = vec![0.0; his_t.len()];
        for (w, component) in self.weights.iter().zip(&self.components) {
            let values = component.nu(t, s, his_t, his_s)?;
            for (acc, v) in total.iter_mut().zip(values) {
                *acc += w * v;
            }
        }
        Ok(total)
    }
}
