use super::axis::Axis;
use super::coupling::Coupling;
use super::marginal::Marginal;
use super::output::SinkhornOutput;
use super::pointcloud::PointCloud;
use super::problem::LinearProblem;
use warmkhorn_core::Energy;
use warmkhorn_core::Probability;

/// Entropic transport plan `P_ij = exp((f_i + g_j − C_ij)/eps)` recovered
/// from a solve, evaluated lazily against the problem's geometry.
pub struct Plan<'a> {
    output: &'a SinkhornOutput,
    problem: &'a LinearProblem,
}

impl Plan<'_> {
    /// Dense n × m coupling, row-major.
    pub fn matrix(&self) -> Vec<Probability> {
        self.problem
            .geometry()
            .transport_from_potentials(&self.output.f, &self.output.g, self.output.epsilon)
    }
    /// Marginal left over after contracting `axis`:
    /// `Axis::Y` gives the source marginal, `Axis::X` the target marginal.
    pub fn marginal(&self, axis: Axis) -> Vec<Probability> {
        self.problem.geometry().marginal_from_potentials(
            &self.output.f,
            &self.output.g,
            self.output.epsilon,
            axis,
        )
    }
    /// Total mass moved by the plan.
    pub fn mass(&self) -> Probability {
        self.marginal(Axis::X).into_iter().sum()
    }
}

impl Coupling for Plan<'_> {
    type X = usize;
    type Y = usize;
    type M = PointCloud;
    type P = Marginal;
    type Q = Marginal;

    fn flow(&self, x: &Self::X, y: &Self::Y) -> Probability {
        let cost = self.problem.geometry().cost(*x, *y);
        ((self.output.f[*x] + self.output.g[*y] - cost) / self.output.epsilon).exp()
    }
    fn cost(&self) -> Energy {
        let (n, m) = self.problem.shape();
        (0..n)
            .flat_map(|x| (0..m).map(move |y| (x, y)))
            .map(|(x, y)| self.flow(&x, &y) * self.problem.geometry().cost(x, y))
            .inspect(|c| debug_assert!(c.is_finite()))
            .sum::<Energy>()
    }
}

impl<'a> From<(&'a SinkhornOutput, &'a LinearProblem)> for Plan<'a> {
    fn from((output, problem): (&'a SinkhornOutput, &'a LinearProblem)) -> Self {
        debug_assert_eq!(output.f.len(), problem.shape().0);
        debug_assert_eq!(output.g.len(), problem.shape().1);
        Self { output, problem }
    }
}
