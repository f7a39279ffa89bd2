use super::model::MetaMlp;
use super::model::MetaMlpConfig;
use super::objective::DualObjective;
use super::objective::rows;
use super::objective::scalar;
use super::state::MetaAux;
use super::state::MetaState;
use burn::module::AutodiffModule;
use burn::optim::AdamConfig;
use burn::optim::Optimizer;
use burn::tensor::backend::AutodiffBackend;
use warmkhorn_core::Energy;
use warmkhorn_core::Entropy;
use warmkhorn_transport::DefaultInitializer;
use warmkhorn_transport::Initializer;
use warmkhorn_transport::LinearProblem;
use warmkhorn_transport::Marginal;
use warmkhorn_transport::PointCloud;

/// Adam with the numerical epsilon used throughout training.
pub fn optimizer<B: AutodiffBackend>() -> impl Optimizer<MetaMlp<B>, B> + use<B> {
    AdamConfig::new().with_epsilon(1e-8).init()
}

/// Learned warm start for Sinkhorn on a fixed geometry.
///
/// The network sees the marginals of a problem and predicts its source
/// potential. Fields are public so the state can be threaded through
/// [`DualObjective::update`] by hand:
///
/// ```ignore
/// let (loss, aux, state) = meta.objective.update(meta.state, a, b);
/// meta.state = state;
/// ```
pub struct MetaInitializer<B: AutodiffBackend, O> {
    pub objective: DualObjective<B>,
    pub state: MetaState<B, O>,
}

/// Fresh meta initializer for `geom`, trained with Adam at the default
/// step size.
///
/// # Panics
///
/// If `config.potential_size` differs from the number of source samples.
pub fn adam<B: AutodiffBackend>(
    geom: &PointCloud,
    config: &MetaMlpConfig,
    device: &B::Device,
) -> MetaInitializer<B, impl Optimizer<MetaMlp<B>, B> + use<B>> {
    MetaInitializer::with_optimizer(
        geom,
        config,
        optimizer::<B>(),
        warmkhorn_core::META_LEARNING_RATE,
        device,
    )
}

impl<B: AutodiffBackend, O> MetaInitializer<B, O> {
    /// # Panics
    ///
    /// If `config.potential_size` differs from the number of source samples.
    pub fn with_optimizer(
        geom: &PointCloud,
        config: &MetaMlpConfig,
        optim: O,
        learning_rate: f64,
        device: &B::Device,
    ) -> Self {
        let (n, m) = geom.shape();
        assert_eq!(
            config.potential_size, n,
            "network must predict one potential per source sample"
        );
        let model = config.init::<B>(n + m, device);
        Self {
            objective: DualObjective::new(geom, device),
            state: MetaState::new(model, optim, learning_rate),
        }
    }
    /// Predicted source potential for the marginals `(a, b)`.
    ///
    /// Runs the inference copy of the network, so no graph is recorded.
    pub fn predict(&self, a: &Marginal, b: &Marginal) -> Vec<Entropy> {
        let n = self.objective.shape().0;
        let z = self.objective.inputs(&[(a, b)]).inner();
        let f = self.state.model.valid().forward(z);
        rows(f, n).into_iter().next().unwrap_or_default()
    }
    /// Loss at the current weights, without stepping.
    pub fn loss(&self, a: &Marginal, b: &Marginal) -> Energy {
        let f = self.state.model.forward(self.objective.inputs(&[(a, b)]));
        scalar(self.objective.loss(f, &[(a, b)]).0)
    }
    pub fn steps(&self) -> usize {
        self.state.steps
    }
}

impl<B: AutodiffBackend, O: Optimizer<MetaMlp<B>, B>> MetaInitializer<B, O> {
    /// [`DualObjective::update`] against this initializer's geometry.
    ///
    /// To step the held state, go through the fields so the borrows split.
    pub fn update(
        &self,
        state: MetaState<B, O>,
        a: &Marginal,
        b: &Marginal,
    ) -> (Energy, MetaAux, MetaState<B, O>) {
        self.objective.update(state, a, b)
    }
    /// One gradient step on `(a, b)`.
    pub fn step(self, a: &Marginal, b: &Marginal) -> (Energy, MetaAux, Self) {
        let Self { objective, state } = self;
        let (loss, aux, state) = objective.update(state, a, b);
        (loss, aux, Self { objective, state })
    }
    /// Overfits to a single problem for `steps` gradient steps.
    ///
    /// Returns the trained initializer and the loss before every step.
    pub fn train(mut self, steps: usize, a: &Marginal, b: &Marginal) -> (Self, Vec<Energy>) {
        let mut losses = Vec::with_capacity(steps);
        for _ in 0..steps {
            let (loss, _, state) = self.objective.update(self.state, a, b);
            self.state = state;
            losses.push(loss);
            if self.state.steps % warmkhorn_core::META_LOG_INTERVAL == 0 {
                log::info!("meta step {:>4} loss {:.4}", self.state.steps, loss);
            }
        }
        (self, losses)
    }
}

impl<B: AutodiffBackend, O> Initializer for MetaInitializer<B, O> {
    /// Network prediction in the log domain, `exp(f/eps)` in the kernel
    /// domain. Problems over a different shape fall back to the default.
    fn init_dual_a(&self, problem: &LinearProblem, lse_mode: bool) -> Vec<Entropy> {
        if problem.shape() != self.objective.shape() {
            log::warn!(
                "meta initializer trained for {:?}, got {:?}; using default",
                self.objective.shape(),
                problem.shape()
            );
            return DefaultInitializer.init_dual_a(problem, lse_mode);
        }
        let f = self.predict(problem.a(), problem.b());
        if lse_mode {
            f
        } else {
            problem.geometry().scaling_from_potential(&f, problem.epsilon())
        }
    }
}
