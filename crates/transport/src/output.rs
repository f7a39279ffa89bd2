use super::plan::Plan;
use super::problem::LinearProblem;
use serde::Deserialize;
use serde::Serialize;
use warmkhorn_core::Energy;
use warmkhorn_core::Entropy;

/// Result of one Sinkhorn solve.
///
/// Potentials are always reported in the log domain, whichever mode
/// produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkhornOutput {
    /// Source potential.
    pub f: Vec<Entropy>,
    /// Target potential.
    pub g: Vec<Entropy>,
    /// Target marginal error at each convergence check.
    pub errors: Vec<Energy>,
    /// Entropic dual objective at the returned potentials.
    pub reg_ot_cost: Energy,
    /// Error fell below threshold.
    pub converged: bool,
    /// Error became non-finite.
    pub diverged: bool,
    /// Iterations actually run.
    pub n_iters: usize,
    /// Mode the solve ran in.
    pub lse_mode: bool,
    /// Regularization strength used.
    pub epsilon: Entropy,
}

impl SinkhornOutput {
    /// Marginal error at the last convergence check.
    pub fn error(&self) -> Option<Energy> {
        self.errors.last().copied()
    }
    /// The coupling these potentials induce on `problem`.
    pub fn plan<'a>(&'a self, problem: &'a LinearProblem) -> Plan<'a> {
        Plan::from((self, problem))
    }
}
