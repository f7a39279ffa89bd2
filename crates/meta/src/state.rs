use super::model::MetaMlp;
use burn::tensor::backend::AutodiffBackend;
use warmkhorn_core::Entropy;

/// Everything a gradient step consumes and produces: network weights,
/// optimizer moments, step size, and the number of steps taken so far.
pub struct MetaState<B: AutodiffBackend, O> {
    pub model: MetaMlp<B>,
    pub optim: O,
    pub learning_rate: f64,
    pub steps: usize,
}

impl<B: AutodiffBackend, O> MetaState<B, O> {
    pub fn new(model: MetaMlp<B>, optim: O, learning_rate: f64) -> Self {
        Self {
            model,
            optim,
            learning_rate,
            steps: 0,
        }
    }
}

/// Potentials seen during a step, one row per problem in the batch.
///
/// `f` is the network prediction, `g` its target c-transform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaAux {
    pub f: Vec<Vec<Entropy>>,
    pub g: Vec<Vec<Entropy>>,
}
