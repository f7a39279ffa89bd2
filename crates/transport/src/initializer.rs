use super::problem::LinearProblem;
use warmkhorn_core::Entropy;

/// Produces the starting dual vectors of a Sinkhorn solve.
///
/// In log-domain mode these are potentials `f`, `g`; in kernel mode they are
/// scalings `u = exp(f/eps)`, `v = exp(g/eps)`. Implementations must honour
/// `lse_mode` so one initializer serves both solver modes.
pub trait Initializer {
    /// Initial source vector, one entry per source sample.
    fn init_dual_a(&self, problem: &LinearProblem, lse_mode: bool) -> Vec<Entropy> {
        neutral(problem.shape().0, lse_mode)
    }
    /// Initial target vector, one entry per target sample.
    fn init_dual_b(&self, problem: &LinearProblem, lse_mode: bool) -> Vec<Entropy> {
        neutral(problem.shape().1, lse_mode)
    }
}

/// Zero potentials, or equivalently unit scalings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInitializer;

impl Initializer for DefaultInitializer {}

impl<I: Initializer + ?Sized> Initializer for &I {
    fn init_dual_a(&self, problem: &LinearProblem, lse_mode: bool) -> Vec<Entropy> {
        (**self).init_dual_a(problem, lse_mode)
    }
    fn init_dual_b(&self, problem: &LinearProblem, lse_mode: bool) -> Vec<Entropy> {
        (**self).init_dual_b(problem, lse_mode)
    }
}

fn neutral(len: usize, lse_mode: bool) -> Vec<Entropy> {
    vec![if lse_mode { 0. } else { 1. }; len]
}
