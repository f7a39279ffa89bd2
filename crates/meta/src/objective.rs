use super::model::MetaMlp;
use super::state::MetaAux;
use super::state::MetaState;
use burn::optim::GradientsParams;
use burn::optim::Optimizer;
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use warmkhorn_core::Energy;
use warmkhorn_core::Entropy;
use warmkhorn_transport::Marginal;
use warmkhorn_transport::PointCloud;

/// Negated entropic dual objective of a predicted potential, over one
/// fixed geometry.
///
/// For a prediction `f` the target potential is its c-transform
/// `g_j = eps·ln b_j − eps·LSE_i((f_i − C_ij)/eps)` (zero where `b_j = 0`),
/// and the loss is `−D(f, g)`. Minimizing it pushes `f` towards the
/// optimal source potential.
pub struct DualObjective<B: Backend> {
    cost: Tensor<B, 2>,
    epsilon: Entropy,
    shape: (usize, usize),
    device: B::Device,
}

impl<B: Backend> DualObjective<B> {
    /// Uploads the cost matrix of `geom`, assembling it if batched.
    pub fn new(geom: &PointCloud, device: &B::Device) -> Self {
        let (n, m) = geom.shape();
        let cost = Tensor::from_data(TensorData::new(geom.cost_matrix(), [n, m]), device);
        Self {
            cost,
            epsilon: geom.epsilon(),
            shape: (n, m),
            device: device.clone(),
        }
    }
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }
    pub fn epsilon(&self) -> Entropy {
        self.epsilon
    }
    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// Network inputs `[a ; b]`, one row per problem.
    ///
    /// # Panics
    ///
    /// If a marginal does not match the geometry.
    pub fn inputs(&self, batch: &[(&Marginal, &Marginal)]) -> Tensor<B, 2> {
        let (n, m) = self.shape;
        for (a, b) in batch {
            assert_eq!(a.len(), n, "source marginal does not match geometry");
            assert_eq!(b.len(), m, "target marginal does not match geometry");
        }
        let data = batch
            .iter()
            .flat_map(|(a, b)| a.weights().iter().chain(b.weights()).copied())
            .collect();
        self.upload(data, [batch.len(), n + m])
    }

    /// Mean of `−D(f, g)` over the batch, and the c-transforms `g`.
    ///
    /// `f` is `[k, n]`; the returned `g` is `[k, m]`.
    pub fn loss(
        &self,
        f: Tensor<B, 2>,
        batch: &[(&Marginal, &Marginal)],
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let (n, m) = self.shape;
        let k = batch.len();
        let eps = self.epsilon;
        let a = batch.iter().flat_map(|(a, _)| a.weights()).copied();
        let b = batch.iter().flat_map(|(_, b)| b.weights()).copied();
        let log_b = b.clone().map(|w| if w > 0. { w.ln() } else { 0. });
        let support = b.clone().map(|w| if w > 0. { 1. } else { 0. });
        let norm = batch.iter().map(|(a, b)| a.mass() * b.mass());
        let a = self.upload(a.collect(), [k, n]);
        let b = self.upload(b.collect(), [k, m]);
        let log_b = self.upload(log_b.collect(), [k, m]);
        let support = self.upload(support.collect(), [k, m]);
        let norm = self.upload(norm.collect(), [k]);
        let cost = self.cost.clone().reshape([1, n, m]).expand([k, n, m]);
        let f3 = f.clone().reshape([k, n, 1]).expand([k, n, m]);
        // c-transform, stabilized by the detached column max
        let z = (f3.clone() - cost.clone()).div_scalar(eps);
        let max = z.clone().max_dim(1).detach();
        let lse = (z - max.clone().expand([k, n, m])).exp().sum_dim(1).log() + max;
        let g = (log_b.reshape([k, 1, m]) - lse).mul_scalar(eps).reshape([k, m]) * support;
        let g3 = g.clone().reshape([k, 1, m]).expand([k, n, m]);
        let mass = (f3 + g3 - cost)
            .div_scalar(eps)
            .exp()
            .sum_dim(2)
            .sum_dim(1)
            .reshape([k]);
        let linear = (a * f).sum_dim(1).reshape([k]) + (b * g.clone()).sum_dim(1).reshape([k]);
        let dual = linear - (mass - norm).mul_scalar(eps);
        (dual.neg().mean(), g)
    }

    fn upload<const D: usize>(&self, data: Vec<f32>, shape: [usize; D]) -> Tensor<B, D> {
        Tensor::from_data(TensorData::new(data, shape), &self.device)
    }
}

impl<B: AutodiffBackend> DualObjective<B> {
    /// One gradient step on a single problem.
    pub fn update<O>(
        &self,
        state: MetaState<B, O>,
        a: &Marginal,
        b: &Marginal,
    ) -> (Energy, MetaAux, MetaState<B, O>)
    where
        O: Optimizer<MetaMlp<B>, B>,
    {
        self.update_batch(state, &[(a, b)])
    }

    /// One gradient step on the mean loss of a batch of problems.
    pub fn update_batch<O>(
        &self,
        state: MetaState<B, O>,
        batch: &[(&Marginal, &Marginal)],
    ) -> (Energy, MetaAux, MetaState<B, O>)
    where
        O: Optimizer<MetaMlp<B>, B>,
    {
        let MetaState {
            model,
            mut optim,
            learning_rate,
            steps,
        } = state;
        let f = model.forward(self.inputs(batch));
        let (loss, g) = self.loss(f.clone(), batch);
        let value = scalar(loss.clone());
        let aux = MetaAux {
            f: rows(f, self.shape.0),
            g: rows(g, self.shape.1),
        };
        let grads = GradientsParams::from_grads(loss.backward(), &model);
        let model = optim.step(learning_rate, model, grads);
        let state = MetaState {
            model,
            optim,
            learning_rate,
            steps: steps + 1,
        };
        (value, aux, state)
    }
}

/// Host copy of a `[k, width]` tensor, one `Vec` per row.
pub(crate) fn rows<B: Backend>(tensor: Tensor<B, 2>, width: usize) -> Vec<Vec<Entropy>> {
    tensor
        .into_data()
        .iter::<Entropy>()
        .collect::<Vec<_>>()
        .chunks(width.max(1))
        .map(|row| row.to_vec())
        .collect()
}

/// Host copy of a one-element tensor.
pub(crate) fn scalar<B: Backend>(tensor: Tensor<B, 1>) -> Energy {
    tensor
        .into_data()
        .iter::<Energy>()
        .next()
        .unwrap_or(Energy::NAN)
}
