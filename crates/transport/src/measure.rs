use super::support::Support;

/// Ground cost between elements of two support spaces.
///
/// Defines the cost of transporting one unit of mass from a point in
/// the source space to a point in the target space. This is the quantity
/// that optimal transport minimizes in expectation.
///
/// # Implementations
///
/// - [`PointCloud`](crate::PointCloud): a [`CostFn`](crate::CostFn) evaluated
///   between the i-th source sample and the j-th target sample
pub trait Measure {
    /// Source support space.
    type X: Support;
    /// Target support space.
    type Y: Support;
    /// Returns the cost of transporting mass from `x` to `y`.
    fn distance(&self, x: &Self::X, y: &Self::Y) -> f32;
}
