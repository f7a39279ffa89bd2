//! Warm Start Binary
//!
//! Solves a two-cluster transport problem cold, trains the meta initializer
//! on it, and solves again from the learned potentials.
//!
//! Options: --n, --m, --dim, --epsilon, --batch-size, --max-iterations,
//! --steps, --seed, --kernel, --hidden-units, --hidden-layers,
//! --learning-rate, --json
use clap::Parser;
use warmkhorn::Scenario;

#[derive(Parser, Debug)]
#[command(about = "Compare cold and meta-initialized Sinkhorn solves")]
struct Args {
    /// Source samples
    #[arg(long, default_value_t = 32)]
    n: usize,
    /// Target samples
    #[arg(long, default_value_t = 30)]
    m: usize,
    /// Ambient dimension
    #[arg(long, default_value_t = 2)]
    dim: usize,
    /// Entropic regularization
    #[arg(long, default_value_t = 1e-2)]
    epsilon: f32,
    /// Rows of the cost matrix held at once; 0 materializes it
    #[arg(long, default_value_t = 3)]
    batch_size: usize,
    /// Solver iteration cap
    #[arg(long, default_value_t = 3000)]
    max_iterations: usize,
    /// Meta training steps
    #[arg(long, default_value_t = warmkhorn::core::META_TRAINING_STEPS)]
    steps: usize,
    /// Seed for sampling and weight initialization
    #[arg(long, default_value_t = warmkhorn::core::META_SEED)]
    seed: u64,
    /// Iterate on kernel scalings instead of log potentials
    #[arg(long)]
    kernel: bool,
    #[arg(long, default_value_t = warmkhorn::core::META_HIDDEN_UNITS)]
    hidden_units: usize,
    #[arg(long, default_value_t = warmkhorn::core::META_HIDDEN_LAYERS)]
    hidden_layers: usize,
    #[arg(long, default_value_t = warmkhorn::core::META_LEARNING_RATE)]
    learning_rate: f64,
    /// Print the comparison as JSON
    #[arg(long)]
    json: bool,
}

impl From<&Args> for Scenario {
    fn from(args: &Args) -> Self {
        Self {
            n: args.n,
            m: args.m,
            dim: args.dim,
            epsilon: args.epsilon,
            batch_size: Some(args.batch_size).filter(|k| *k > 0),
            max_iterations: args.max_iterations,
            steps: args.steps,
            seed: args.seed,
            lse_mode: !args.kernel,
            hidden_units: args.hidden_units,
            hidden_layers: args.hidden_layers,
            learning_rate: args.learning_rate,
        }
    }
}

fn main() -> anyhow::Result<()> {
    warmkhorn::core::log();
    let ref args = Args::parse();
    let scenario = Scenario::from(args);
    log::info!("running {:?}", scenario);
    let comparison = scenario.run()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        println!("{}", comparison);
    }
    Ok(())
}
