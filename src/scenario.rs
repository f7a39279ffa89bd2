use burn::backend::Autodiff;
use burn::backend::NdArray;
use serde::Deserialize;
use serde::Serialize;
use warmkhorn_core::Energy;
use warmkhorn_core::Entropy;
use warmkhorn_meta::MetaInitializer;
use warmkhorn_meta::MetaMlpConfig;
use warmkhorn_transport::LinearProblem;
use warmkhorn_transport::Sinkhorn;
use warmkhorn_transport::SinkhornConfig;
use warmkhorn_transport::SinkhornOutput;
use warmkhorn_transport::TransportError;

/// CPU backend with reverse-mode autodiff, used to train the initializer.
pub type MetaBackend = Autodiff<NdArray>;

/// One cold-versus-warm experiment on a two-cluster problem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub n: usize,
    pub m: usize,
    pub dim: usize,
    pub epsilon: Entropy,
    pub batch_size: Option<usize>,
    pub max_iterations: usize,
    pub steps: usize,
    pub seed: u64,
    pub lse_mode: bool,
    pub hidden_units: usize,
    pub hidden_layers: usize,
    pub learning_rate: f64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            n: 32,
            m: 30,
            dim: 2,
            epsilon: 1e-2,
            batch_size: Some(3),
            max_iterations: 3000,
            steps: warmkhorn_core::META_TRAINING_STEPS,
            seed: warmkhorn_core::META_SEED,
            lse_mode: true,
            hidden_units: warmkhorn_core::META_HIDDEN_UNITS,
            hidden_layers: warmkhorn_core::META_HIDDEN_LAYERS,
            learning_rate: warmkhorn_core::META_LEARNING_RATE,
        }
    }
}

impl Scenario {
    pub fn with_lse_mode(self, lse_mode: bool) -> Self {
        Self { lse_mode, ..self }
    }
    pub fn problem(&self) -> Result<LinearProblem, TransportError> {
        warmkhorn_transport::two_clusters(
            self.seed,
            self.n,
            self.m,
            self.dim,
            self.epsilon,
            self.batch_size,
        )
    }
    pub fn solver(&self) -> Sinkhorn {
        Sinkhorn::new(
            SinkhornConfig::default()
                .with_lse_mode(self.lse_mode)
                .with_max_iterations(self.max_iterations),
        )
    }
    pub fn network(&self) -> MetaMlpConfig {
        MetaMlpConfig::new(self.n)
            .with_num_hidden_units(self.hidden_units)
            .with_num_hidden_layers(self.hidden_layers)
            .with_seed(self.seed)
    }

    /// Solves cold, overfits a meta initializer to the same problem, then
    /// solves again from its prediction.
    pub fn run(&self) -> Result<Comparison, TransportError> {
        let problem = self.problem()?;
        let solver = self.solver();
        let baseline = solver.solve(&problem);
        log::info!(
            "baseline {} after {} iterations",
            status(&baseline),
            baseline.n_iters
        );
        let device = Default::default();
        let meta = MetaInitializer::<MetaBackend, _>::with_optimizer(
            problem.geometry(),
            &self.network(),
            warmkhorn_meta::optimizer::<MetaBackend>(),
            self.learning_rate,
            &device,
        );
        let (meta, losses) = meta.train(self.steps, problem.a(), problem.b());
        let warm = solver.with_initializer(&meta).solve(&problem);
        log::info!(
            "meta     {} after {} iterations",
            status(&warm),
            warm.n_iters
        );
        Ok(Comparison {
            scenario: *self,
            baseline: Summary::from(&baseline),
            meta: Summary::from(&warm),
            losses,
        })
    }
}

fn status(output: &SinkhornOutput) -> &'static str {
    match (output.converged, output.diverged) {
        (true, _) => "converged",
        (_, true) => "diverged",
        _ => "stopped",
    }
}

/// The parts of a solve worth comparing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub converged: bool,
    pub diverged: bool,
    pub n_iters: usize,
    pub error: Option<Energy>,
    pub reg_ot_cost: Energy,
}

impl From<&SinkhornOutput> for Summary {
    fn from(output: &SinkhornOutput) -> Self {
        Self {
            converged: output.converged,
            diverged: output.diverged,
            n_iters: output.n_iters,
            error: output.error(),
            reg_ot_cost: output.reg_ot_cost,
        }
    }
}

/// Cold and warm solves of one scenario, with the training curve.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub scenario: Scenario,
    pub baseline: Summary,
    pub meta: Summary,
    pub losses: Vec<Energy>,
}

impl Comparison {
    /// Iterations the warm start saved; negative if it cost extra.
    pub fn saved(&self) -> isize {
        self.baseline.n_iters as isize - self.meta.n_iters as isize
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(
            f,
            "{} mode, n={} m={} d={} eps={}",
            if self.scenario.lse_mode { "lse" } else { "kernel" },
            self.scenario.n,
            self.scenario.m,
            self.scenario.dim,
            self.scenario.epsilon,
        )?;
        writeln!(
            f,
            "{:<9}{:>10}{:>8}{:>12}{:>14}",
            "", "converged", "iters", "error", "cost"
        )?;
        row(f, "baseline", &self.baseline)?;
        row(f, "meta", &self.meta)?;
        if let (Some(first), Some(last)) = (self.losses.first(), self.losses.last()) {
            writeln!(f, "meta loss {:.4} -> {:.4} over {} steps", first, last, self.losses.len())?;
        }
        write!(f, "iterations saved: {}", self.saved())
    }
}

fn row(f: &mut std::fmt::Formatter, name: &str, s: &Summary) -> std::fmt::Result {
    let converged = match (s.converged, s.diverged) {
        (true, _) => "yes",
        (_, true) => "diverged",
        _ => "no",
    };
    let error = s.error.map(|e| format!("{:.2e}", e)).unwrap_or_default();
    writeln!(
        f,
        "{:<9}{:>10}{:>8}{:>12}{:>14.4}",
        name, converged, s.n_iters, error, s.reg_ot_cost
    )
}
