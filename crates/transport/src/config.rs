use serde::Deserialize;
use serde::Serialize;
use warmkhorn_core::Energy;

/// Hyperparameters of a Sinkhorn solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SinkhornConfig {
    /// Iterate on potentials in the log domain rather than on scalings.
    pub lse_mode: bool,
    /// Stop once the target marginal error falls below this.
    pub threshold: Energy,
    /// p of the Lp norm used for the marginal error.
    pub norm_error: usize,
    /// Iterations between two convergence checks.
    pub inner_iterations: usize,
    /// Iterations that always run before early stopping.
    pub min_iterations: usize,
    /// Iteration cap, checked between blocks of `inner_iterations`.
    ///
    /// A cap that is not a multiple of `inner_iterations` is rounded up to
    /// the next block boundary, so `n_iters` can exceed it by less than one
    /// block.
    pub max_iterations: usize,
}

impl Default for SinkhornConfig {
    fn default() -> Self {
        Self {
            lse_mode: true,
            threshold: warmkhorn_core::SINKHORN_THRESHOLD,
            norm_error: warmkhorn_core::SINKHORN_NORM_ERROR,
            inner_iterations: warmkhorn_core::SINKHORN_INNER_ITERATIONS,
            min_iterations: warmkhorn_core::SINKHORN_MIN_ITERATIONS,
            max_iterations: warmkhorn_core::SINKHORN_MAX_ITERATIONS,
        }
    }
}

impl SinkhornConfig {
    pub fn with_lse_mode(self, lse_mode: bool) -> Self {
        Self { lse_mode, ..self }
    }
    pub fn with_threshold(self, threshold: Energy) -> Self {
        Self { threshold, ..self }
    }
    pub fn with_norm_error(self, norm_error: usize) -> Self {
        Self {
            norm_error: norm_error.max(1),
            ..self
        }
    }
    pub fn with_inner_iterations(self, inner_iterations: usize) -> Self {
        Self {
            inner_iterations: inner_iterations.max(1),
            ..self
        }
    }
    pub fn with_min_iterations(self, min_iterations: usize) -> Self {
        Self {
            min_iterations,
            ..self
        }
    }
    pub fn with_max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }
}
