//! Simulation configuration
//!
//! A run is described by a TOML document: the sampling window, the batch
//! to produce, the intensity model and its excitation kernel. Every field
//! has a default, so an empty document is a valid configuration.
//!
//! ```toml
//! seed = 42
//! batch_size = 4
//! min_points = 3
//! time = [0.0, 10.0]
//! space = [[0.0, 1.0], [0.0, 1.0]]
//!
//! [intensity]
//! background = 0.2
//! upper_bound = 50.0
//!
//! [kernel]
//! type = "mixture"
//! beta = 1.0
//! C = 0.5
//! weights = [0.6, 0.4]
//! components = [
//!     { sigma_x = 0.1, sigma_y = 0.2 },
//!     { mu_x = 0.05, rho = 0.5 },
//! ]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, StppError};
use crate::intensity::{HawkesIntensity, DEFAULT_UPPER_BOUND};
use crate::kernel::{
    ExcitationKernel, GaussianDiffusionKernel, GaussianMixtureDiffusionKernel, GaussianShape,
    SpatialField, SpatialShape, SpatialVariantGaussianDiffusionKernel,
    SpatialVariantGaussianMixtureDiffusionKernel, StdDiffusionKernel,
};
use crate::region::Interval;
use crate::sampler::{SamplerConfig, SpatialTemporalPointProcess};

/// Lattice resolution used to check spatial fields before sampling
pub const FIELD_CHECK_GRID: usize = 32;

/// The process assembled from a configuration
pub type ConfiguredProcess = SpatialTemporalPointProcess<HawkesIntensity<ExcitationKernel>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Seed for the ChaCha stream driving proposals and thinning
    pub seed: u64,

    /// Number of sequences in the generated batch
    pub batch_size: usize,

    /// Sequences retaining fewer events than this are redrawn
    pub min_points: usize,

    /// Progress diagnostics at info level
    pub verbose: bool,

    /// Attempts per sequence before giving up.
    ///
    /// Unset means retry until a sequence is accepted, which never ends when
    /// `min_points` is out of reach for the configured bound and region.
    pub max_attempts: Option<usize>,

    /// Time window `[min, max]`
    pub time: Interval,

    /// Spatial window `[[x_min, x_max], [y_min, y_max]]`
    pub space: [Interval; 2],

    pub intensity: IntensityConfig,

    pub kernel: KernelConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let unit = Interval { min: 0.0, max: 1.0 };
        Self {
            seed: 12345,
            batch_size: 10,
            min_points: 5,
            verbose: false,
            max_attempts: None,
            time: unit,
            space: [unit, unit],
            intensity: IntensityConfig::default(),
            kernel: KernelConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntensityConfig {
    /// Background rate μ
    pub background: f64,

    /// Dominating rate λ̄ for thinning; must exceed the intensity everywhere
    /// in the window or sequences are discarded
    pub upper_bound: f64,
}

impl Default for IntensityConfig {
    fn default() -> Self {
        Self { background: 0.1, upper_bound: DEFAULT_UPPER_BOUND }
    }
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum KernelConfig {
    Diffusion {
        #[serde(default = "one", alias = "C")]
        c: f64,
        #[serde(default = "one")]
        beta: f64,
        #[serde(default = "one")]
        sigma_x: f64,
        #[serde(default = "one")]
        sigma_y: f64,
    },
    Gaussian {
        #[serde(default = "one", alias = "C")]
        c: f64,
        #[serde(default = "one")]
        beta: f64,
        #[serde(flatten)]
        shape: GaussianShape,
    },
    Mixture {
        #[serde(default = "one", alias = "C")]
        c: f64,
        #[serde(default = "one")]
        beta: f64,
        weights: Vec<f64>,
        components: Vec<GaussianShape>,
    },
    SpatialGaussian {
        #[serde(default = "one", alias = "C")]
        c: f64,
        #[serde(default = "one")]
        beta: f64,
        #[serde(flatten)]
        shape: SpatialShapeConfig,
    },
    SpatialMixture {
        #[serde(default = "one", alias = "C")]
        c: f64,
        #[serde(default = "one")]
        beta: f64,
        weights: Vec<f64>,
        components: Vec<SpatialShapeConfig>,
    },
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig::Diffusion { c: 1.0, beta: 1.0, sigma_x: 1.0, sigma_y: 1.0 }
    }
}

impl KernelConfig {
    /// Build the kernel; spatial fields are checked over `space`
    pub fn build(&self, space: [Interval; 2]) -> Result<ExcitationKernel> {
        let kernel = match self {
            KernelConfig::Diffusion { c, beta, sigma_x, sigma_y } => {
                ExcitationKernel::Diffusion(StdDiffusionKernel::new(*c, *beta, *sigma_x, *sigma_y)?)
            }
            KernelConfig::Gaussian { c, beta, shape } => {
                ExcitationKernel::Gaussian(GaussianDiffusionKernel::new(*shape, *beta, *c)?)
            }
            KernelConfig::Mixture { c, beta, weights, components } => ExcitationKernel::Mixture(
                GaussianMixtureDiffusionKernel::gaussian(weights.clone(), components, *beta, *c)?,
            ),
            KernelConfig::SpatialGaussian { c, beta, shape } => {
                ExcitationKernel::SpatialGaussian(SpatialVariantGaussianDiffusionKernel::new_validated(
                    shape.to_shape(),
                    *beta,
                    *c,
                    space,
                    FIELD_CHECK_GRID,
                )?)
            }
            KernelConfig::SpatialMixture { c, beta, weights, components } => {
                let shapes = components.iter().map(SpatialShapeConfig::to_shape).collect();
                let mixture =
                    SpatialVariantGaussianMixtureDiffusionKernel::spatial(weights.clone(), shapes, *beta, *c)?;
                for component in mixture.components() {
                    component.validate_over(space, FIELD_CHECK_GRID)?;
                }
                ExcitationKernel::SpatialMixture(mixture)
            }
        };
        Ok(kernel)
    }
}

/// A spatial field in configuration: a number, or a plane over (x, y)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum FieldConfig {
    Constant(f64),
    Linear {
        intercept: f64,
        #[serde(default)]
        slope_x: f64,
        #[serde(default)]
        slope_y: f64,
    },
}

impl FieldConfig {
    pub fn to_field(&self) -> SpatialField {
        match *self {
            FieldConfig::Constant(value) => SpatialField::constant(value),
            FieldConfig::Linear { intercept, slope_x, slope_y } => {
                SpatialField::linear(intercept, slope_x, slope_y)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpatialShapeConfig {
    pub mu_x: FieldConfig,
    pub mu_y: FieldConfig,
    pub sigma_x: FieldConfig,
    pub sigma_y: FieldConfig,
    pub rho: FieldConfig,
}

impl Default for SpatialShapeConfig {
    fn default() -> Self {
        Self {
            mu_x: FieldConfig::Constant(0.0),
            mu_y: FieldConfig::Constant(0.0),
            sigma_x: FieldConfig::Constant(1.0),
            sigma_y: FieldConfig::Constant(1.0),
            rho: FieldConfig::Constant(0.0),
        }
    }
}

impl SpatialShapeConfig {
    pub fn to_shape(&self) -> SpatialShape {
        SpatialShape {
            mu_x: self.mu_x.to_field(),
            mu_y: self.mu_y.to_field(),
            sigma_x: self.sigma_x.to_field(),
            sigma_y: self.sigma_y.to_field(),
            rho: self.rho.to_field(),
        }
    }
}

impl SimulationConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(StppError::InvalidConfig("batch_size must be at least 1".to_string()));
        }
        self.sampler_config().validate()
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig { max_attempts: self.max_attempts }
    }

    pub fn build_intensity(&self) -> Result<HawkesIntensity<ExcitationKernel>> {
        let kernel = self.kernel.build(self.space)?;
        HawkesIntensity::new(self.intensity.background, kernel, self.intensity.upper_bound)
    }

    pub fn build_process(&self) -> Result<ConfiguredProcess> {
        Ok(SpatialTemporalPointProcess::with_config(
            self.build_intensity()?,
            self.sampler_config(),
        ))
    }
}
