//! Spatially varying Gaussian diffusion kernel
//!
//! Same functional form as [`GaussianDiffusionKernel`](super::GaussianDiffusionKernel),
//! but the mean offset, spreads and correlation are functions of where the
//! triggering event happened. Each historical event is evaluated with the
//! ellipse read off at its own location.

use std::fmt;
use std::sync::Arc;

use super::{gaussian_diffusion, validate_amplitude_decay, GaussianShape, Kernel};
use crate::core::error::{Result, StppError};
use crate::core::types::Location;
use crate::region::Interval;

/// Scalar parameter as a function of location
#[derive(Clone)]
pub struct SpatialField {
    f: Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>,
    label: &'static str,
}

impl SpatialField {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        Self { f: Arc::new(f), label: "fn" }
    }

    pub fn constant(value: f64) -> Self {
        Self { f: Arc::new(move |_, _| value), label: "constant" }
    }

    /// `intercept + slope_x·x + slope_y·y`
    pub fn linear(intercept: f64, slope_x: f64, slope_y: f64) -> Self {
        Self {
            f: Arc::new(move |x, y| intercept + slope_x * x + slope_y * y),
            label: "linear",
        }
    }

    #[inline]
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        (self.f)(x, y)
    }
}

impl fmt::Debug for SpatialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpatialField({})", self.label)
    }
}

/// Location-dependent counterpart of [`GaussianShape`]
#[derive(Debug, Clone)]
pub struct SpatialShape {
    pub mu_x: SpatialField,
    pub mu_y: SpatialField,
    pub sigma_x: SpatialField,
    pub sigma_y: SpatialField,
    pub rho: SpatialField,
}

impl Default for SpatialShape {
    fn default() -> Self {
        Self {
            mu_x: SpatialField::constant(0.0),
            mu_y: SpatialField::constant(0.0),
            sigma_x: SpatialField::constant(1.0),
            sigma_y: SpatialField::constant(1.0),
            rho: SpatialField::constant(0.0),
        }
    }
}

impl From<GaussianShape> for SpatialShape {
    fn from(shape: GaussianShape) -> Self {
        Self {
            mu_x: SpatialField::constant(shape.mu_x),
            mu_y: SpatialField::constant(shape.mu_y),
            sigma_x: SpatialField::constant(shape.sigma_x),
            sigma_y: SpatialField::constant(shape.sigma_y),
            rho: SpatialField::constant(shape.rho),
        }
    }
}

impl SpatialShape {
    /// Evaluate every field at `at` and check the resulting ellipse
    pub fn at(&self, at: Location) -> Result<GaussianShape> {
        let field = |name: &'static str, f: &SpatialField| -> Result<f64> {
            let value = f.eval(at.x, at.y);
            if value.is_finite() {
                Ok(value)
            } else {
                Err(StppError::InvalidFieldValue { field: name, value, x: at.x, y: at.y })
            }
        };

        let shape = GaussianShape {
            mu_x: field("mu_x", &self.mu_x)?,
            mu_y: field("mu_y", &self.mu_y)?,
            sigma_x: field("sigma_x", &self.sigma_x)?,
            sigma_y: field("sigma_y", &self.sigma_y)?,
            rho: field("rho", &self.rho)?,
        };

        let invalid = |name, value| StppError::InvalidFieldValue { field: name, value, x: at.x, y: at.y };
        if shape.sigma_x <= 0.0 {
            return Err(invalid("sigma_x", shape.sigma_x));
        }
        if shape.sigma_y <= 0.0 {
            return Err(invalid("sigma_y", shape.sigma_y));
        }
        if shape.rho.abs() >= 1.0 {
            return Err(invalid("rho", shape.rho));
        }
        Ok(shape)
    }
}

#[derive(Debug, Clone)]
pub struct SpatialVariantGaussianDiffusionKernel {
    shape: SpatialShape,
    beta: f64,
    c: f64,
}

impl Default for SpatialVariantGaussianDiffusionKernel {
    fn default() -> Self {
        Self { shape: SpatialShape::default(), beta: 1.0, c: 1.0 }
    }
}

impl SpatialVariantGaussianDiffusionKernel {
    pub fn new(shape: SpatialShape, beta: f64, c: f64) -> Result<Self> {
        validate_amplitude_decay(c, beta)?;
        Ok(Self { shape, beta, c })
    }

    /// Construct and check the fields on an `ngrid × ngrid` lattice over the
    /// spatial region, so an out-of-domain field fails before sampling.
    pub fn new_validated(
        shape: SpatialShape,
        beta: f64,
        c: f64,
        space: [Interval; 2],
        ngrid: usize,
    ) -> Result<Self> {
        let kernel = Self::new(shape, beta, c)?;
        kernel.validate_over(space, ngrid)?;
        Ok(kernel)
    }

    pub fn validate_over(&self, space: [Interval; 2], ngrid: usize) -> Result<()> {
        let [sx, sy] = space;
        let ys = sy.linspace(ngrid);
        for x in sx.linspace(ngrid) {
            for &y in &ys {
                self.shape.at(Location::new(x, y))?;
            }
        }
        Ok(())
    }

    pub fn shape(&self) -> &SpatialShape {
        &self.shape
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn amplitude(&self) -> f64 {
        self.c
    }
}

impl Kernel for SpatialVariantGaussianDiffusionKernel {
    fn nu(&self, t: f64, s: Location, his_t: &[f64], his_s: &[Location]) -> Result<Vec<f64>> {
        debug_assert_eq!(his_t.len(), his_s.len());
        his_t
            .iter()
            .zip(his_s)
            .map(|(&ht, &hs)| {
                let shape = self.shape.at(hs)?;
                let delta = s - hs;
                Ok(gaussian_diffusion(t - ht, delta.x, delta.y, &shape, self.beta, self.c))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::GaussianDiffusionKernel;

    fn history() -> (Vec<f64>, Vec<Location>) {
        (
            vec![0.0, 0.2, 0.5, 0.9],
            vec![
                Location::new(0.1, 0.9),
                Location::new(0.3, 0.3),
                Location::new(0.6, 0.4),
                Location::new(0.95, 0.05),
            ],
        )
    }

    #[test]
    fn test_constant_fields_match_plain_kernel() {
        let shape = GaussianShape { mu_x: 0.05, mu_y: -0.02, sigma_x: 0.3, sigma_y: 0.6, rho: -0.4 };
        let plain = GaussianDiffusionKernel::new(shape, 1.7, 0.9).unwrap();
        let varying = SpatialVariantGaussianDiffusionKernel::new(shape.into(), 1.7, 0.9).unwrap();

        let (his_t, his_s) = history();
        let s = Location::new(0.5, 0.5);
        assert_eq!(
            plain.nu(1.2, s, &his_t, &his_s).unwrap(),
            varying.nu(1.2, s, &his_t, &his_s).unwrap()
        );
    }

    #[test]
    fn test_parameters_read_at_historical_location() {
        // Spread grows to the right of the region
        let shape = SpatialShape {
            sigma_x: SpatialField::linear(0.1, 1.0, 0.0),
            ..SpatialShape::default()
        };
        let kernel = SpatialVariantGaussianDiffusionKernel::new(shape, 1.0, 1.0).unwrap();

        let wide = SpatialVariantGaussianDiffusionKernel::new(
            SpatialShape { sigma_x: SpatialField::constant(1.1), ..SpatialShape::default() },
            1.0,
            1.0,
        )
        .unwrap();

        let his_s = [Location::new(1.0, 0.0)];
        let a = kernel.nu(1.0, Location::new(0.0, 0.0), &[0.0], &his_s).unwrap();
        let b = wide.nu(1.0, Location::new(0.0, 0.0), &[0.0], &his_s).unwrap();
        assert!((a[0] - b[0]).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_domain_field_reported() {
        let shape = SpatialShape { rho: SpatialField::new(|x, _| x), ..SpatialShape::default() };
        let kernel = SpatialVariantGaussianDiffusionKernel::new(shape, 1.0, 1.0).unwrap();

        let ok = kernel.nu(1.0, Location::new(0.0, 0.0), &[0.0], &[Location::new(0.5, 0.0)]);
        assert!(ok.is_ok());

        let err = kernel
            .nu(1.0, Location::new(0.0, 0.0), &[0.0], &[Location::new(1.0, 0.0)])
            .unwrap_err();
        assert!(matches!(err, StppError::InvalidFieldValue { field: "rho", .. }));
    }

    #[test]
    fn test_grid_validation_fails_fast() {
        let unit = Interval::new(0.0, 1.0).unwrap();
        let shape = SpatialShape {
            sigma_y: SpatialField::linear(0.5, 0.0, -1.0),
            ..SpatialShape::default()
        };
        let result = SpatialVariantGaussianDiffusionKernel::new_validated(
            shape,
            1.0,
            1.0,
            [unit, unit],
            11,
        );
        assert!(matches!(result, Err(StppError::InvalidFieldValue { field: "sigma_y", .. })));

        let fine = SpatialVariantGaussianDiffusionKernel::new_validated(
            SpatialShape::default(),
            1.0,
            1.0,
            [unit, unit],
            11,
        );
        assert!(fine.is_ok());
    }
}
