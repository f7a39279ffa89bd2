use super::axis::Axis;
use super::config::SinkhornConfig;
use super::initializer::DefaultInitializer;
use super::initializer::Initializer;
use super::output::SinkhornOutput;
use super::problem::LinearProblem;
use warmkhorn_core::Energy;
use warmkhorn_core::Entropy;

/// Entropic optimal transport via Sinkhorn iteration.
///
/// Alternately projects the coupling onto the target and source marginal
/// constraints until the target marginal error falls below threshold.
///
/// # Modes
///
/// - **log domain** (`lse_mode`): iterates on potentials with c-transforms,
///   `g ← eps·ln b − eps·LSE_i((f_i − C_ij)/eps)` then the mirror update of `f`.
///   Stable for any epsilon.
/// - **kernel domain**: iterates on scalings, `v ← b / Kᵀu` then `u ← a / Kv`
///   with `K = exp(−C/eps)`. Cheaper, but the kernel underflows once
///   epsilon is small relative to the costs.
///
/// # Warm starts
///
/// The starting dual vectors come from an [`Initializer`]. A better guess of
/// the optimal potentials means fewer iterations to convergence.
#[derive(Debug, Clone)]
pub struct Sinkhorn<I = DefaultInitializer> {
    config: SinkhornConfig,
    initializer: I,
}

impl Sinkhorn {
    pub fn new(config: SinkhornConfig) -> Self {
        Self::from(config)
    }
}

impl<I> Sinkhorn<I> {
    /// Same hyperparameters, different starting point.
    pub fn with_initializer<J: Initializer>(self, initializer: J) -> Sinkhorn<J> {
        Sinkhorn {
            config: self.config,
            initializer,
        }
    }
    pub fn config(&self) -> &SinkhornConfig {
        &self.config
    }
    pub fn initializer(&self) -> &I {
        &self.initializer
    }
}

impl<I: Initializer> Sinkhorn<I> {
    /// Runs the fixed-point iteration on `problem`.
    ///
    /// Iterations run in blocks of `inner_iterations`; after each block the
    /// target marginal error is recorded. Stops when the error is below
    /// threshold (and `min_iterations` have run), when it stops being finite,
    /// or when `max_iterations` is reached.
    pub fn solve(&self, problem: &LinearProblem) -> SinkhornOutput {
        let ref config = self.config;
        let lse_mode = config.lse_mode;
        let eps = problem.epsilon();
        let mut fu = self.initializer.init_dual_a(problem, lse_mode);
        let mut gv = self.initializer.init_dual_b(problem, lse_mode);
        let mut errors = Vec::new();
        let mut n_iters = 0;
        let (converged, diverged) = loop {
            if n_iters >= config.max_iterations {
                break (false, false);
            }
            for _ in 0..config.inner_iterations {
                if lse_mode {
                    Self::lse_step(problem, &mut fu, &mut gv, eps);
                } else {
                    Self::kernel_step(problem, &mut fu, &mut gv, eps);
                }
            }
            n_iters += config.inner_iterations;
            let error = Self::error(problem, &fu, &gv, eps, lse_mode, config.norm_error);
            errors.push(error);
            log::trace!("sinkhorn {:>5} iterations, marginal error {:.3e}", n_iters, error);
            if !error.is_finite() {
                break (false, true);
            }
            if error < config.threshold && n_iters >= config.min_iterations {
                break (true, false);
            }
        };
        let (f, g) = if lse_mode {
            (fu, gv)
        } else {
            let geom = problem.geometry();
            (
                geom.potential_from_scaling(&fu, eps),
                geom.potential_from_scaling(&gv, eps),
            )
        };
        let reg_ot_cost = problem.dual_objective(&f, &g);
        log::debug!(
            "sinkhorn ({}) {} after {} iterations, error {:.3e}, cost {:.4}",
            if lse_mode { "lse" } else { "kernel" },
            if converged {
                "converged"
            } else if diverged {
                "diverged"
            } else {
                "stopped"
            },
            n_iters,
            errors.last().copied().unwrap_or(Energy::NAN),
            reg_ot_cost,
        );
        SinkhornOutput {
            f,
            g,
            errors,
            reg_ot_cost,
            converged,
            diverged,
            n_iters,
            lse_mode,
            epsilon: eps,
        }
    }

    /// Target c-transform of `f`, then source c-transform of the new `g`.
    fn lse_step(problem: &LinearProblem, f: &mut Vec<Entropy>, g: &mut Vec<Entropy>, eps: Entropy) {
        let geom = problem.geometry();
        *g = geom.update_potential(f, g, &problem.b().ln(), eps, Axis::X);
        *f = geom.update_potential(f, g, &problem.a().ln(), eps, Axis::Y);
    }
    /// Target scaling from `u`, then source scaling from the new `v`.
    fn kernel_step(problem: &LinearProblem, u: &mut Vec<Entropy>, v: &mut Vec<Entropy>, eps: Entropy) {
        let geom = problem.geometry();
        *v = geom.update_scaling(u, problem.b().weights(), eps, Axis::X);
        *u = geom.update_scaling(v, problem.a().weights(), eps, Axis::Y);
    }
    /// Lp distance between the coupling's target marginal and `b`.
    fn error(
        problem: &LinearProblem,
        fu: &[Entropy],
        gv: &[Entropy],
        eps: Entropy,
        lse_mode: bool,
        p: usize,
    ) -> Energy {
        let geom = problem.geometry();
        let marginal = if lse_mode {
            geom.marginal_from_potentials(fu, gv, eps, Axis::X)
        } else {
            geom.marginal_from_scalings(fu, gv, eps, Axis::X)
        };
        let p = p.max(1) as i32;
        marginal
            .iter()
            .zip(problem.b().weights())
            .map(|(x, y)| (x - y).abs().powi(p))
            .sum::<Energy>()
            .powf(1. / p as Energy)
    }
}

impl Default for Sinkhorn {
    fn default() -> Self {
        Self::from(SinkhornConfig::default())
    }
}

impl From<SinkhornConfig> for Sinkhorn {
    fn from(config: SinkhornConfig) -> Self {
        Self {
            config,
            initializer: DefaultInitializer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coupling;
    use crate::Marginal;
    use crate::PointCloud;

    /// Small, well-conditioned problem both modes can solve.
    fn problem(batch_size: Option<usize>) -> LinearProblem {
        let x = (0..12)
            .flat_map(|i| [(i as f32 * 0.7).sin(), (i as f32 * 0.3).cos()])
            .collect();
        let y = (0..9)
            .flat_map(|j| [(j as f32 * 0.5).cos() + 0.5, (j as f32 * 1.1).sin()])
            .collect();
        let geom = PointCloud::new(x, y, 2)
            .unwrap()
            .with_epsilon(0.2)
            .unwrap()
            .with_batch_size(batch_size);
        let b = Marginal::from((1..=9).map(|j| j as f32).collect::<Vec<_>>()).normalized();
        LinearProblem::new(geom, Marginal::uniform(12), b).unwrap()
    }

    #[test]
    fn both_modes_converge_and_agree() {
        let problem = problem(None);
        let config = SinkhornConfig::default()
            .with_threshold(1e-4)
            .with_max_iterations(5000);
        let lse = Sinkhorn::new(config).solve(&problem);
        let ker = Sinkhorn::new(config.with_lse_mode(false)).solve(&problem);
        assert!(lse.converged && !lse.diverged);
        assert!(ker.converged && !ker.diverged);
        // potentials are only defined up to f + c, g − c
        let shift = lse.f[0] - ker.f[0];
        assert!(lse.f.iter().zip(&ker.f).all(|(a, b)| (a - b - shift).abs() < 1e-2));
        assert!(lse.g.iter().zip(&ker.g).all(|(a, b)| (a - b + shift).abs() < 1e-2));
        assert!((lse.reg_ot_cost - ker.reg_ot_cost).abs() < 1e-2);
    }

    #[test]
    fn coupling_matches_marginals() {
        let problem = problem(Some(5));
        let output = Sinkhorn::default().solve(&problem);
        assert!(output.converged);
        let plan = output.plan(&problem);
        let source = plan.marginal(Axis::Y);
        let target = plan.marginal(Axis::X);
        let l1 = |p: &[f32], q: &Marginal| {
            p.iter()
                .zip(q.weights())
                .map(|(x, y)| (x - y).abs())
                .sum::<f32>()
        };
        assert!(l1(&source, problem.a()) < 1e-4);
        assert!(l1(&target, problem.b()) < 1e-3);
        assert!((plan.mass() - 1.).abs() < 1e-3);
        assert_eq!(plan.matrix().len(), 12 * 9);
        assert!(plan.cost() > 0.);
        assert!((plan.flow(&2, &3) - plan.matrix()[2 * 9 + 3]).abs() < 1e-6);
    }

    #[test]
    fn batching_does_not_change_the_solve() {
        let full = Sinkhorn::default().solve(&problem(None));
        let batched = Sinkhorn::default().solve(&problem(Some(4)));
        assert_eq!(full.n_iters, batched.n_iters);
        assert!(full.f.iter().zip(&batched.f).all(|(a, b)| (a - b).abs() < 1e-4));
    }

    #[test]
    fn iterations_are_counted_in_blocks() {
        let problem = problem(None);
        for inner in [1, 7, 10] {
            let config = SinkhornConfig::default().with_inner_iterations(inner);
            let output = Sinkhorn::new(config).solve(&problem);
            assert_eq!(output.n_iters % inner, 0);
            assert_eq!(output.errors.len() * inner, output.n_iters);
        }
    }

    #[test]
    fn respects_iteration_bounds() {
        let problem = problem(None);
        let capped = SinkhornConfig::default().with_max_iterations(20);
        let output = Sinkhorn::new(capped.with_threshold(0.)).solve(&problem);
        assert!(!output.converged);
        assert_eq!(output.n_iters, 20);
        let ragged = capped.with_max_iterations(25).with_threshold(0.);
        let output = Sinkhorn::new(ragged).solve(&problem);
        assert!(!output.converged);
        assert_eq!(output.n_iters, 30);
        assert_eq!(output.errors.len(), 3);
        let floored = SinkhornConfig::default().with_min_iterations(300);
        let output = Sinkhorn::new(floored).solve(&problem);
        assert!(output.converged);
        assert!(output.n_iters >= 300);
    }

    #[test]
    fn warm_start_from_solution_converges_immediately() {
        struct Oracle(Vec<f32>);
        impl Initializer for Oracle {
            fn init_dual_a(&self, problem: &LinearProblem, lse_mode: bool) -> Vec<f32> {
                if lse_mode {
                    self.0.clone()
                } else {
                    problem.geometry().scaling_from_potential(&self.0, problem.epsilon())
                }
            }
        }
        let problem = problem(None);
        let cold = Sinkhorn::default().solve(&problem);
        let warm = Sinkhorn::default()
            .with_initializer(Oracle(cold.f.clone()))
            .solve(&problem);
        assert!(warm.converged);
        assert_eq!(warm.n_iters, SinkhornConfig::default().inner_iterations);
        assert!(warm.n_iters <= cold.n_iters);
    }

    #[test]
    fn non_finite_initial_potentials_are_scrubbed() {
        struct Poison;
        impl Initializer for Poison {
            fn init_dual_a(&self, problem: &LinearProblem, _: bool) -> Vec<f32> {
                vec![f32::NAN; problem.shape().0]
            }
        }
        let output = Sinkhorn::default()
            .with_initializer(&Poison)
            .solve(&problem(None));
        assert!(output.converged);
        assert!(!output.diverged);
        assert!(output.f.iter().chain(&output.g).all(|x| x.is_finite()));
    }
}
