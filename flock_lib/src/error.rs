use thiserror::Error;

/// Rejected run options. This is the only error the simulation core produces,
/// once a [`crate::flock::Flock`] exists nothing in it can fail.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("parameter `{name}` must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },

    #[error("parameter `{name}` must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },

    #[error("bounds along axis {axis} are empty: min {min} is not below max {max}")]
    EmptyBounds { axis: usize, min: f32, max: f32 },

    #[error("initial speed range is inverted: {min} > {max}")]
    InvertedSpeedRange { min: f32, max: f32 },

    #[error("population is fixed at {expected} boids, reconfiguration asked for {requested}")]
    PopulationChanged { expected: usize, requested: usize },
}
