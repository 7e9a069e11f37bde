//! Conditional intensity of the spatio-temporal Hawkes process
//!
//! `λ(t, s) = μ + Σ_{t_i < t} ν(t, s; t_i, s_i)`

use std::fmt;

use crate::core::error::{Result, StppError};
use crate::core::types::Location;
use crate::kernel::Kernel;

/// Default dominating rate used by thinning
pub const DEFAULT_UPPER_BOUND: f64 = 1e4;

/// History-dependent event rate with a declared global upper bound
pub trait Intensity {
    /// Rate at `(t, s)` given the events retained so far
    fn value(&self, t: f64, his_t: &[f64], s: Location, his_s: &[Location]) -> Result<f64>;

    /// Constant that must dominate `value` everywhere in the sampled region
    fn upper_bound(&self) -> f64;

    /// Descriptive label for diagnostics
    fn label(&self) -> &str {
        "intensity"
    }
}

#[derive(Debug, Clone)]
pub struct HawkesIntensity<K> {
    mu: f64,
    kernel: K,
    maximum: f64,
}

impl<K: Kernel> HawkesIntensity<K> {
    pub fn new(mu: f64, kernel: K, maximum: f64) -> Result<Self> {
        if !mu.is_finite() || mu < 0.0 {
            return Err(StppError::InvalidIntensity(format!(
                "background rate must be finite and non-negative, got {}",
                mu
            )));
        }
        if !maximum.is_finite() || maximum <= 0.0 {
            return Err(StppError::InvalidIntensity(format!(
                "upper bound must be finite and positive, got {}",
                maximum
            )));
        }
        Ok(Self { mu, kernel, maximum })
    }

    pub fn with_default_bound(mu: f64, kernel: K) -> Result<Self> {
        Self::new(mu, kernel, DEFAULT_UPPER_BOUND)
    }

    pub fn background(&self) -> f64 {
        self.mu
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

impl<K: Kernel> Intensity for HawkesIntensity<K> {
    fn value(&self, t: f64, his_t: &[f64], s: Location, his_s: &[Location]) -> Result<f64> {
        if his_t.is_empty() {
            return Ok(self.mu);
        }
        let excitation: f64 = self.kernel.nu(t, s, his_t, his_s)?.iter().sum();
        Ok(self.mu + excitation)
    }

    fn upper_bound(&self) -> f64 {
        self.maximum
    }

    fn label(&self) -> &str {
        "Hawkes process"
    }
}

impl<K: Kernel> fmt::Display for HawkesIntensity<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{GaussianDiffusionKernel, StdDiffusionKernel};

    #[test]
    fn test_empty_history_is_background() {
        let lam = HawkesIntensity::with_default_bound(0.37, StdDiffusionKernel::default()).unwrap();
        let value = lam.value(0.5, &[], Location::new(0.2, 0.2), &[]).unwrap();
        assert_eq!(value, 0.37);
        assert_eq!(lam.upper_bound(), DEFAULT_UPPER_BOUND);
    }

    #[test]
    fn test_background_plus_kernel_sum() {
        let kernel = GaussianDiffusionKernel::default();
        let lam = HawkesIntensity::new(0.1, kernel, 100.0).unwrap();
        let his_t = [0.1, 0.3];
        let his_s = [Location::new(0.0, 0.0), Location::new(0.5, 0.5)];
        let s = Location::new(0.25, 0.25);

        let contributions = kernel.nu(1.0, s, &his_t, &his_s).unwrap();
        let expected = 0.1 + contributions.iter().sum::<f64>();
        assert_eq!(lam.value(1.0, &his_t, s, &his_s).unwrap(), expected);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let kernel = StdDiffusionKernel::default();
        assert!(matches!(
            HawkesIntensity::new(-1.0, kernel, 10.0),
            Err(StppError::InvalidIntensity(_))
        ));
        assert!(HawkesIntensity::new(0.0, kernel, 0.0).is_err());
        assert!(HawkesIntensity::new(0.0, kernel, f64::INFINITY).is_err());
    }

    #[test]
    fn test_label() {
        let lam = HawkesIntensity::with_default_bound(1.0, StdDiffusionKernel::default()).unwrap();
        assert_eq!(lam.to_string(), "Hawkes process");
    }
}
