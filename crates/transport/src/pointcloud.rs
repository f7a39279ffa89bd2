use super::axis::Axis;
use super::cost::CostFn;
use super::error::TransportError;
use super::lse::LogSumExp;
use super::measure::Measure;
use std::borrow::Cow;
use std::ops::Range;
use warmkhorn_core::Energy;
use warmkhorn_core::Entropy;
use warmkhorn_core::Probability;

/// Ground cost geometry between two point clouds in ℝᵈ.
///
/// Source samples `x` (n × d) and target samples `y` (m × d) are stored
/// row-major. The pairwise cost is either materialized once as an n × m
/// matrix, or, when a batch size is set, recomputed in blocks of rows on
/// every kernel application so that no full matrix is ever held.
///
/// All kernel operations take `eps` explicitly so callers can anneal it;
/// [`PointCloud::epsilon`] is the value solvers use by default.
#[derive(Debug, Clone)]
pub struct PointCloud {
    x: Vec<f32>,
    y: Vec<f32>,
    n: usize,
    m: usize,
    d: usize,
    cost_fn: CostFn,
    epsilon: Option<Entropy>,
    relative: Entropy,
    batch_size: Option<usize>,
    matrix: Option<Vec<Energy>>,
    mean: Energy,
}

impl PointCloud {
    /// Builds a geometry from row-major coordinates of dimension `d`.
    ///
    /// Epsilon defaults to a fraction of the mean cost until set with
    /// [`PointCloud::with_epsilon`].
    pub fn new(x: Vec<f32>, y: Vec<f32>, d: usize) -> Result<Self, TransportError> {
        if d == 0 {
            return Err(TransportError::ZeroDimension);
        }
        for (side, points) in [("source", &x), ("target", &y)] {
            if points.is_empty() {
                return Err(TransportError::Empty(side));
            }
            if points.len() % d != 0 {
                return Err(TransportError::Ragged {
                    side,
                    len: points.len(),
                    dim: d,
                });
            }
            if let Some(index) = points.iter().position(|c| !c.is_finite()) {
                return Err(TransportError::Coordinate { side, index });
            }
        }
        let n = x.len() / d;
        let m = y.len() / d;
        Ok(Self {
            x,
            y,
            n,
            m,
            d,
            cost_fn: CostFn::default(),
            epsilon: None,
            relative: warmkhorn_core::DEFAULT_RELATIVE_EPSILON,
            batch_size: None,
            matrix: None,
            mean: 0.,
        }
        .refresh())
    }
    /// Sets an absolute regularization strength.
    pub fn with_epsilon(mut self, epsilon: Entropy) -> Result<Self, TransportError> {
        if !(epsilon.is_finite() && epsilon > 0.) {
            return Err(TransportError::Epsilon(epsilon));
        }
        self.epsilon = Some(epsilon);
        Ok(self)
    }
    /// Sets epsilon as a fraction of the mean cost.
    pub fn with_relative_epsilon(mut self, relative: Entropy) -> Result<Self, TransportError> {
        if !(relative.is_finite() && relative > 0.) {
            return Err(TransportError::Epsilon(relative));
        }
        self.epsilon = None;
        self.relative = relative;
        Ok(self)
    }
    /// Computes the cost in blocks of `batch_size` source rows instead of
    /// storing the full matrix. `None` materializes it.
    pub fn with_batch_size(mut self, batch_size: Option<usize>) -> Self {
        self.batch_size = batch_size;
        self.refresh()
    }
    pub fn with_cost_fn(mut self, cost_fn: CostFn) -> Self {
        self.cost_fn = cost_fn;
        self.refresh()
    }

    /// Recomputes the materialized matrix (if any) and the mean cost.
    fn refresh(mut self) -> Self {
        self.matrix = match self.batch_size {
            None => Some(self.compute(0..self.n)),
            Some(_) => None,
        };
        self.mean = self
            .blocks()
            .map(|(_, block)| block.iter().sum::<Energy>())
            .sum::<Energy>()
            / (self.n * self.m) as Energy;
        self
    }
    /// Cost rows for source samples in `rows`, row-major.
    fn compute(&self, rows: Range<usize>) -> Vec<Energy> {
        rows.flat_map(|i| (0..self.m).map(move |j| (i, j)))
            .map(|(i, j)| self.evaluate(i, j))
            .inspect(|c| debug_assert!(c.is_finite(), "cost overflow"))
            .collect()
    }
    fn evaluate(&self, i: usize, j: usize) -> Energy {
        self.cost_fn.apply(
            &self.x[i * self.d..(i + 1) * self.d],
            &self.y[j * self.d..(j + 1) * self.d],
        )
    }
    /// Number of source rows per block.
    fn height(&self) -> usize {
        match (self.matrix.as_ref(), self.batch_size) {
            (None, Some(k)) if k > 0 && k < self.n => k,
            _ => self.n,
        }
    }
    /// Iterates over row ranges of the cost matrix along with their costs.
    fn blocks(&self) -> impl Iterator<Item = (Range<usize>, Cow<'_, [Energy]>)> + '_ {
        let height = self.height();
        (0..self.n).step_by(height).map(move |start| {
            let rows = start..(start + height).min(self.n);
            let block = match self.matrix {
                Some(ref c) => Cow::Borrowed(&c[rows.start * self.m..rows.end * self.m]),
                None => Cow::Owned(self.compute(rows.clone())),
            };
            (rows, block)
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n, self.m)
    }
    pub fn dim(&self) -> usize {
        self.d
    }
    pub fn x(&self) -> &[f32] {
        &self.x
    }
    pub fn y(&self) -> &[f32] {
        &self.y
    }
    pub fn cost_fn(&self) -> CostFn {
        self.cost_fn
    }
    pub fn batch_size(&self) -> Option<usize> {
        self.batch_size
    }
    pub fn is_batched(&self) -> bool {
        self.matrix.is_none()
    }
    pub fn mean_cost(&self) -> Energy {
        self.mean
    }
    /// Regularization strength, absolute or derived from the mean cost.
    pub fn epsilon(&self) -> Entropy {
        self.epsilon.unwrap_or(self.relative * self.mean)
    }
    /// Cost between the i-th source and j-th target sample.
    pub fn cost(&self, i: usize, j: usize) -> Energy {
        match self.matrix {
            Some(ref c) => c[i * self.m + j],
            None => self.evaluate(i, j),
        }
    }
    /// Full n × m cost matrix, row-major, assembled from blocks if batched.
    pub fn cost_matrix(&self) -> Vec<Energy> {
        match self.matrix {
            Some(ref c) => c.clone(),
            None => self.compute(0..self.n),
        }
    }

    /// Softmin of `f_i + g_j − C_ij` contracted over `axis`, with the
    /// uncontracted potential removed again:
    ///
    /// - `Axis::X`: `eps·LSE_i((f_i + g_j − C_ij)/eps) − g_j`, one entry per target
    /// - `Axis::Y`: `eps·LSE_j((f_i + g_j − C_ij)/eps) − f_i`, one entry per source
    ///
    /// Non-finite potentials are treated as 0 when removed.
    pub fn apply_lse_kernel(
        &self,
        f: &[Entropy],
        g: &[Entropy],
        eps: Entropy,
        axis: Axis,
    ) -> Vec<Entropy> {
        let lse = self.softmin(f, g, eps, axis);
        let remove = match axis {
            Axis::X => g,
            Axis::Y => f,
        };
        lse.into_iter()
            .zip(remove)
            .map(|(l, r)| l - if r.is_finite() { *r } else { 0. })
            .collect()
    }
    /// `eps·LSE((f_i + g_j − C_ij)/eps)` contracted over `axis`.
    fn softmin(&self, f: &[Entropy], g: &[Entropy], eps: Entropy, axis: Axis) -> Vec<Entropy> {
        match axis {
            Axis::X => {
                let mut acc = vec![LogSumExp::default(); self.m];
                for (rows, block) in self.blocks() {
                    for (r, i) in rows.enumerate() {
                        let costs = &block[r * self.m..(r + 1) * self.m];
                        for (j, c) in costs.iter().enumerate() {
                            acc[j].push((f[i] + g[j] - c) / eps);
                        }
                    }
                }
                acc.into_iter().map(|l| eps * l.value()).collect()
            }
            Axis::Y => {
                let mut out = Vec::with_capacity(self.n);
                for (rows, block) in self.blocks() {
                    for (r, i) in rows.enumerate() {
                        let costs = &block[r * self.m..(r + 1) * self.m];
                        let lse = costs
                            .iter()
                            .zip(g)
                            .map(|(c, gj)| (f[i] + gj - c) / eps)
                            .collect::<LogSumExp>();
                        out.push(eps * lse.value());
                    }
                }
                out
            }
        }
    }
    /// One c-transform: the potential on the far side of `axis` that makes
    /// its marginal match `exp(log_marginal)` exactly.
    ///
    /// For `Axis::X` this is the new `g`, for `Axis::Y` the new `f`.
    pub fn update_potential(
        &self,
        f: &[Entropy],
        g: &[Entropy],
        log_marginal: &[Entropy],
        eps: Entropy,
        axis: Axis,
    ) -> Vec<Entropy> {
        self.apply_lse_kernel(f, g, eps, axis)
            .into_iter()
            .zip(log_marginal)
            .map(|(app, lm)| eps * lm - if app.is_finite() { app } else { 0. })
            .collect()
    }
    /// Gibbs kernel `K = exp(−C/eps)` applied to a scaling, contracted over `axis`:
    ///
    /// - `Axis::X`: `Σ_i K_ij u_i`, one entry per target
    /// - `Axis::Y`: `Σ_j K_ij v_j`, one entry per source
    pub fn apply_kernel(&self, scaling: &[Probability], eps: Entropy, axis: Axis) -> Vec<Probability> {
        match axis {
            Axis::X => {
                let mut out = vec![0.; self.m];
                for (rows, block) in self.blocks() {
                    for (r, i) in rows.enumerate() {
                        let costs = &block[r * self.m..(r + 1) * self.m];
                        for (j, c) in costs.iter().enumerate() {
                            out[j] += (-c / eps).exp() * scaling[i];
                        }
                    }
                }
                out
            }
            Axis::Y => {
                let mut out = Vec::with_capacity(self.n);
                for (rows, block) in self.blocks() {
                    for r in 0..rows.len() {
                        let costs = &block[r * self.m..(r + 1) * self.m];
                        out.push(
                            costs
                                .iter()
                                .zip(scaling)
                                .map(|(c, s)| (-c / eps).exp() * s)
                                .sum::<Probability>(),
                        );
                    }
                }
                out
            }
        }
    }
    /// Kernel-domain counterpart of [`PointCloud::update_potential`].
    /// Zero kernel mass leaves the marginal unscaled.
    pub fn update_scaling(
        &self,
        scaling: &[Probability],
        marginal: &[Probability],
        eps: Entropy,
        axis: Axis,
    ) -> Vec<Probability> {
        self.apply_kernel(scaling, eps, axis)
            .into_iter()
            .zip(marginal)
            .map(|(app, w)| w / if app > 0. { app } else { 1. })
            .collect()
    }
    /// Marginal of the coupling `exp((f_i + g_j − C_ij)/eps)` on the side
    /// left over after contracting `axis`.
    pub fn marginal_from_potentials(
        &self,
        f: &[Entropy],
        g: &[Entropy],
        eps: Entropy,
        axis: Axis,
    ) -> Vec<Probability> {
        self.softmin(f, g, eps, axis)
            .into_iter()
            .map(|l| (l / eps).exp())
            .collect()
    }
    /// Marginal of the coupling `u_i K_ij v_j` on the side left over after
    /// contracting `axis`.
    pub fn marginal_from_scalings(
        &self,
        u: &[Probability],
        v: &[Probability],
        eps: Entropy,
        axis: Axis,
    ) -> Vec<Probability> {
        let (contracted, kept) = match axis {
            Axis::X => (u, v),
            Axis::Y => (v, u),
        };
        self.apply_kernel(contracted, eps, axis)
            .into_iter()
            .zip(kept)
            .map(|(app, s)| app * s)
            .collect()
    }
    /// Dense n × m coupling from potentials, row-major.
    pub fn transport_from_potentials(
        &self,
        f: &[Entropy],
        g: &[Entropy],
        eps: Entropy,
    ) -> Vec<Probability> {
        self.blocks()
            .flat_map(|(rows, block)| {
                rows.enumerate()
                    .flat_map(|(r, i)| {
                        (0..self.m)
                            .map(|j| ((f[i] + g[j] - block[r * self.m + j]) / eps).exp())
                            .collect::<Vec<_>>()
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
    /// Dense n × m coupling from scalings, row-major.
    pub fn transport_from_scalings(
        &self,
        u: &[Probability],
        v: &[Probability],
        eps: Entropy,
    ) -> Vec<Probability> {
        self.blocks()
            .flat_map(|(rows, block)| {
                rows.enumerate()
                    .flat_map(|(r, i)| {
                        (0..self.m)
                            .map(|j| u[i] * (-block[r * self.m + j] / eps).exp() * v[j])
                            .collect::<Vec<_>>()
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
    /// `exp(f/eps)`
    pub fn scaling_from_potential(&self, potential: &[Entropy], eps: Entropy) -> Vec<Probability> {
        potential.iter().map(|p| (p / eps).exp()).collect()
    }
    /// `eps·ln(u)`
    pub fn potential_from_scaling(&self, scaling: &[Probability], eps: Entropy) -> Vec<Entropy> {
        scaling.iter().map(|s| eps * s.ln()).collect()
    }
}

impl Measure for PointCloud {
    type X = usize;
    type Y = usize;
    fn distance(&self, x: &Self::X, y: &Self::Y) -> Energy {
        self.cost(*x, *y)
    }
}
