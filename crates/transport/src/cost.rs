use serde::Deserialize;
use serde::Serialize;
use warmkhorn_core::Energy;

/// Ground cost between two points of the same dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostFn {
    /// ‖x − y‖²
    #[default]
    SqEuclidean,
    /// ‖x − y‖
    Euclidean,
}

impl CostFn {
    pub fn apply(&self, x: &[f32], y: &[f32]) -> Energy {
        debug_assert_eq!(x.len(), y.len(), "points of different dimension");
        let squared = x
            .iter()
            .zip(y)
            .map(|(a, b)| a - b)
            .map(|d| d * d)
            .sum::<Energy>();
        match self {
            CostFn::SqEuclidean => squared,
            CostFn::Euclidean => squared.sqrt(),
        }
    }
}
