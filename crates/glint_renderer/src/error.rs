//! Construction-time validation errors.
//!
//! Rendering itself never fails: every path terminates within `max_depth`
//! bounces. Anything that would make the numerics undefined is rejected
//! before the first ray is traced.

use thiserror::Error;

/// Errors raised while validating camera, render or scene parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Image dimensions must be positive, got {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Samples per pixel must be at least 1")]
    ZeroSamples,

    #[error("Max ray depth must be at least 1")]
    ZeroDepth,

    #[error("Vertical field of view must be in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f32),

    #[error("Defocus angle must be in [0, 180) degrees, got {0}")]
    InvalidDefocusAngle(f32),

    #[error("Focus distance must be finite and positive, got {0}")]
    InvalidFocusDistance(f32),

    #[error("Camera look-from and look-at points coincide")]
    DegenerateView,

    #[error("Camera up vector is zero or parallel to the view direction")]
    DegenerateUpVector,

    #[error("Sphere {index} has invalid radius {radius}")]
    InvalidRadius { index: usize, radius: f32 },

    #[error("Sphere {index} has a non-finite center")]
    InvalidCenter { index: usize },

    #[error("Material {index} is invalid: {reason}")]
    InvalidMaterial { index: usize, reason: &'static str },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised when blending frames into an accumulator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccumulateError {
    #[error("Frame is {got_width}x{got_height} but accumulator is {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },
}

pub type AccumulateResult<T> = Result<T, AccumulateError>;
