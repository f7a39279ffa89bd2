use warmkhorn_core::Entropy;
use warmkhorn_core::Probability;

/// Reasons a geometry or transport problem cannot be built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("{0} point cloud is empty")]
    Empty(&'static str),
    #[error("point dimension must be positive")]
    ZeroDimension,
    #[error("{side} coordinates have length {len}, not a multiple of dimension {dim}")]
    Ragged {
        side: &'static str,
        len: usize,
        dim: usize,
    },
    #[error("{side} coordinate {index} is not finite")]
    Coordinate { side: &'static str, index: usize },
    #[error("{side} marginal has length {got}, expected {expected}")]
    Length {
        side: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("{side} marginal has invalid weight {weight} at index {index}")]
    Weight {
        side: &'static str,
        index: usize,
        weight: Probability,
    },
    #[error("{0} marginal carries no mass")]
    Mass(&'static str),
    #[error("epsilon must be positive and finite, got {0}")]
    Epsilon(Entropy),
}
