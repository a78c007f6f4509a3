use thiserror::Error;

/// Errors reported by the operator builder, the time stepper and the sampler.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported dimension {0}, expected 1 or 2")]
    InvalidDimension(usize),

    #[error("grid needs at least 3 points per axis, got {nx}")]
    GridTooSmall { nx: usize },

    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("field has {found} elements, expected {expected}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("query point {index} at {value} lies outside the sampling grid")]
    OutOfRangeQuery { index: usize, value: f64 },

    #[error("sampling grid must hold at least two strictly ascending points")]
    UnsortedGrid,

    #[error("the source cannot be recovered when c * dt = 0")]
    ZeroCourant,

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
