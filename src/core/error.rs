use thiserror::Error;

#[derive(Error, Debug)]
pub enum StppError {
    #[error("Invalid kernel parameter: {0}")]
    InvalidKernel(String),

    #[error("Invalid intensity parameter: {0}")]
    InvalidIntensity(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Spatial field {field} evaluated to {value} at ({x}, {y})")]
    InvalidFieldValue {
        field: &'static str,
        value: f64,
        x: f64,
        y: f64,
    },

    #[error("Intensity {value} is greater than upper bound {bound} at t={time}")]
    BoundViolation { value: f64, bound: f64, time: f64 },

    #[error("Sequence {slot} was not generated after {attempts} attempts")]
    RetriesExhausted { slot: usize, attempts: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StppError>;
