use thiserror::Error;

/// Rejected caller input. Every variant is detected before any field is
/// touched, so the grid stays usable after an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    #[error("unknown fluid type: {0:?} (expected water, oil, honey or air)")]
    UnknownFluidType(String),
    #[error("unknown environment type: {0:?} (expected bounded or periodic)")]
    UnknownEnvironment(String),
    #[error("unknown shape: {0:?}")]
    UnknownShape(String),
    #[error("unknown injection edge: {0:?} (expected top or left)")]
    UnknownEdge(String),
    #[error("custom mask shape mismatch: expected {expected:?} (rows, cols), found {found:?}")]
    MaskShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("shape {shape} requires parameter {param}")]
    MissingShapeParam {
        shape: &'static str,
        param: &'static str,
    },
    #[error("invalid {param} for shape {shape}: {value}")]
    InvalidShapeParam {
        shape: &'static str,
        param: &'static str,
        value: f64,
    },
    #[error("grid must be at least 3x3, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("grid spacing must be positive and finite, got dx={dx}, dy={dy}")]
    InvalidSpacing { dx: f64, dy: f64 },
    #[error("explicit grid spacing needs both dx and dy")]
    IncompleteSpacing,
}

pub type Result<T> = std::result::Result<T, FluidError>;
