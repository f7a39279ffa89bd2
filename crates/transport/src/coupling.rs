use super::density::Density;
use super::measure::Measure;
use super::support::Support;
use warmkhorn_core::Energy;
use warmkhorn_core::Probability;

/// A transport plan (coupling) between two probability distributions.
///
/// A coupling is a joint distribution π(x,y) whose marginals approximate the
/// source distribution P and target distribution Q. The transport cost is
/// the expected ground cost under this joint distribution.
///
/// # Type Parameters
///
/// - `X`: Source support space
/// - `Y`: Target support space
/// - `M`: Ground cost defining transport costs
/// - `P`: Source distribution (marginal over X)
/// - `Q`: Target distribution (marginal over Y)
pub trait Coupling {
    /// Source support space.
    type X: Support;
    /// Target support space.
    type Y: Support;
    /// Ground cost for transport.
    type M: Measure<X = Self::X, Y = Self::Y>;
    /// Source probability distribution.
    type P: Density<Support = Self::X>;
    /// Target probability distribution.
    type Q: Density<Support = Self::Y>;
    /// Returns the mass transported from `x` to `y` in the coupling.
    ///
    /// Entropic plans are dense, so this is computed lazily from the dual
    /// potentials rather than stored for all (x, y) pairs.
    fn flow(&self, x: &Self::X, y: &Self::Y) -> Probability;
    /// Returns the total transport cost of this coupling.
    ///
    /// This is the sum of `flow(x, y) * distance(x, y)` over all pairs.
    fn cost(&self) -> Energy;
}
