//! Core type aliases, traits, and constants for warmkhorn.
//!
//! This crate provides the foundational types and tuned parameters
//! shared by the transport solver and the meta initializer.
#![allow(dead_code)]

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Ground costs, marginal errors, and transport objectives.
pub type Energy = f32;
/// Regularization strengths and dual potentials (log domain).
pub type Entropy = f32;
/// Marginal weights, scalings, and transported mass.
pub type Probability = f32;

// ============================================================================
// TRAITS
// ============================================================================
/// Random instance generation for testing and Monte Carlo sampling.
pub trait Arbitrary {
    /// Generate a random instance.
    fn random() -> Self;
}

// ============================================================================
// SINKHORN SOLVER
// Entropy-regularized OT via alternating c-transforms (log domain) or
// diagonal scalings of the Gibbs kernel (kernel domain).
// ============================================================================
/// Early stopping threshold on the target marginal violation.
pub const SINKHORN_THRESHOLD: Energy = 1e-3;
/// Order p of the Lp norm used to measure marginal violation.
pub const SINKHORN_NORM_ERROR: usize = 1;
/// Iterations run between two convergence checks.
pub const SINKHORN_INNER_ITERATIONS: usize = 10;
/// Iterations that always run before early stopping is allowed.
pub const SINKHORN_MIN_ITERATIONS: usize = 0;
/// Hard cap on iterations before forced termination.
pub const SINKHORN_MAX_ITERATIONS: usize = 2000;

// ============================================================================
// GEOMETRY
// ============================================================================
/// Epsilon as a fraction of the mean ground cost, when none is given.
pub const DEFAULT_RELATIVE_EPSILON: Entropy = 0.05;

// ============================================================================
// META INITIALIZER
// Feed-forward net mapping [a ; b] to a source potential f, trained with
// Adam against the negated dual objective.
// ============================================================================
/// Width of every hidden layer.
pub const META_HIDDEN_UNITS: usize = 512;
/// Number of hidden ReLU layers.
pub const META_HIDDEN_LAYERS: usize = 3;
/// Adam step size.
pub const META_LEARNING_RATE: f64 = 1e-3;
/// Seed for weight initialization.
pub const META_SEED: u64 = 0;
/// Gradient steps taken when overfitting to a single problem.
pub const META_TRAINING_STEPS: usize = 50;
/// Gradient steps between two progress log messages.
pub const META_LOG_INTERVAL: usize = 10;

// ============================================================================
// SYNTHETIC PROBLEMS
// Two Gaussian clusters: source around 5·(-1, 1, ...), target around 0.
// ============================================================================
/// Distance scale of the source cluster center from the origin.
pub const CLUSTER_OFFSET: f32 = 5.0;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "logger")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
