use super::error::TransportError;
use super::pointcloud::PointCloud;
use super::problem::LinearProblem;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_distr::StandardNormal;
use warmkhorn_core::Entropy;

/// Synthetic problem with two well-separated Gaussian clusters.
///
/// Source samples are drawn from `N(μ, I)` with `μ = 5·(−1, 1, −1, …)`,
/// target samples from `N(0, I)`. Both marginals are uniform. The seed is
/// split into independent source and target streams, so changing `m` leaves
/// the source samples untouched.
pub fn two_clusters(
    seed: u64,
    n: usize,
    m: usize,
    d: usize,
    epsilon: Entropy,
    batch_size: Option<usize>,
) -> Result<LinearProblem, TransportError> {
    let ref mut root = SmallRng::seed_from_u64(seed);
    let ref mut x_rng = SmallRng::from_rng(root);
    let ref mut y_rng = SmallRng::from_rng(root);
    let mu = (0..d)
        .map(|k| if k % 2 == 0 { -1. } else { 1. })
        .map(|s: f32| s * warmkhorn_core::CLUSTER_OFFSET)
        .collect::<Vec<_>>();
    let x = (0..n)
        .flat_map(|_| mu.iter().map(|c| c + x_rng.sample::<f32, _>(StandardNormal)).collect::<Vec<_>>())
        .collect();
    let y = (0..m * d)
        .map(|_| y_rng.sample::<f32, _>(StandardNormal))
        .collect();
    let geom = PointCloud::new(x, y, d)?
        .with_epsilon(epsilon)?
        .with_batch_size(batch_size);
    log::debug!(
        "two clusters: n={} m={} d={} eps={} batch={:?} mean cost {:.2}",
        n,
        m,
        d,
        epsilon,
        batch_size,
        geom.mean_cost()
    );
    Ok(LinearProblem::from(geom))
}
