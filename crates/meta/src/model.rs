use burn::config::Config;
use burn::module::Module;
use burn::module::Param;
use burn::nn::Initializer;
use burn::nn::Linear;
use burn::nn::LinearConfig;
use burn::prelude::*;
use burn::tensor::activation::relu;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_distr::StandardNormal;

/// Standard deviation of a unit normal truncated to [-2, 2].
const TRUNCATED_STD: f32 = 0.879_625_66;

/// Shape of the meta network.
#[derive(Config, Debug)]
pub struct MetaMlpConfig {
    /// Output dimension: one potential per source sample.
    pub potential_size: usize,
    /// Width of every hidden layer.
    #[config(default = "warmkhorn_core::META_HIDDEN_UNITS")]
    pub num_hidden_units: usize,
    /// Number of hidden ReLU layers.
    #[config(default = "warmkhorn_core::META_HIDDEN_LAYERS")]
    pub num_hidden_layers: usize,
    /// Seed for weight initialization.
    #[config(default = "warmkhorn_core::META_SEED")]
    pub seed: u64,
}

/// Multilayer perceptron `[a ; b] ↦ f`.
///
/// Hidden layers are dense + ReLU; the output layer is dense with no
/// activation, since potentials are unbounded.
#[derive(Module, Debug)]
pub struct MetaMlp<B: Backend> {
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
}

impl MetaMlpConfig {
    /// Builds the network for inputs of width `input_size`.
    ///
    /// Weights are LeCun-normal (truncated at two standard deviations,
    /// variance 1/fan_in) drawn from `seed`; biases start at zero.
    pub fn init<B: Backend>(&self, input_size: usize, device: &B::Device) -> MetaMlp<B> {
        let ref mut rng = SmallRng::seed_from_u64(self.seed);
        let mut d_in = input_size;
        let mut hidden = Vec::with_capacity(self.num_hidden_layers);
        for _ in 0..self.num_hidden_layers {
            hidden.push(dense(d_in, self.num_hidden_units, rng, device));
            d_in = self.num_hidden_units;
        }
        let output = dense(d_in, self.potential_size, rng, device);
        MetaMlp { hidden, output }
    }
}

impl<B: Backend> MetaMlp<B> {
    /// `[batch, n + m]` marginals to `[batch, n]` potentials.
    pub fn forward(&self, z: Tensor<B, 2>) -> Tensor<B, 2> {
        let z = self
            .hidden
            .iter()
            .fold(z, |z, layer| relu(layer.forward(z)));
        self.output.forward(z)
    }
    pub fn input_size(&self) -> usize {
        self.hidden
            .first()
            .unwrap_or(&self.output)
            .weight
            .val()
            .dims()[0]
    }
    pub fn potential_size(&self) -> usize {
        self.output.weight.val().dims()[1]
    }
}

fn dense<B: Backend>(
    d_in: usize,
    d_out: usize,
    rng: &mut SmallRng,
    device: &B::Device,
) -> Linear<B> {
    let scale = (d_in as f32).recip().sqrt() / TRUNCATED_STD;
    let weights = (0..d_in * d_out)
        .map(|_| truncated(rng) * scale)
        .collect::<Vec<f32>>();
    let mut linear = LinearConfig::new(d_in, d_out)
        .with_initializer(Initializer::Zeros)
        .init(device);
    linear.weight = Param::from_tensor(Tensor::from_data(
        TensorData::new(weights, [d_in, d_out]),
        device,
    ));
    linear
}

fn truncated(rng: &mut SmallRng) -> f32 {
    loop {
        let z = rng.sample::<f32, _>(StandardNormal);
        if z.abs() <= 2. {
            return z;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    fn inputs(device: &<B as Backend>::Device) -> Tensor<B, 2> {
        let data = (0..2 * 11).map(|i| (i as f32 * 0.37).sin()).collect::<Vec<_>>();
        Tensor::from_data(TensorData::new(data, [2, 11]), device)
    }

    #[test]
    fn shapes_follow_config() {
        let device = Default::default();
        let model = MetaMlpConfig::new(6)
            .with_num_hidden_units(16)
            .with_num_hidden_layers(2)
            .init::<B>(11, &device);
        assert_eq!(model.input_size(), 11);
        assert_eq!(model.potential_size(), 6);
        assert_eq!(model.forward(inputs(&device)).dims(), [2, 6]);
    }

    #[test]
    fn defaults_match_constants() {
        let config = MetaMlpConfig::new(32);
        assert_eq!(config.num_hidden_units, warmkhorn_core::META_HIDDEN_UNITS);
        assert_eq!(config.num_hidden_layers, warmkhorn_core::META_HIDDEN_LAYERS);
        assert_eq!(config.seed, warmkhorn_core::META_SEED);
    }

    #[test]
    fn seeded_initialization_is_reproducible() {
        let device = Default::default();
        let config = MetaMlpConfig::new(4).with_num_hidden_units(8);
        let run = |config: &MetaMlpConfig| {
            config
                .init::<B>(11, &device)
                .forward(inputs(&device))
                .into_data()
                .iter::<f32>()
                .collect::<Vec<_>>()
        };
        assert_eq!(run(&config), run(&config));
        assert_ne!(run(&config), run(&config.clone().with_seed(1)));
    }

    #[test]
    fn without_hidden_layers_is_affine() {
        let device = Default::default();
        let model = MetaMlpConfig::new(3)
            .with_num_hidden_layers(0)
            .init::<B>(11, &device);
        assert_eq!(model.input_size(), 11);
        let zero = Tensor::<B, 2>::zeros([1, 11], &device);
        let out = model.forward(zero).into_data().iter::<f32>().collect::<Vec<_>>();
        assert_eq!(out, vec![0.; 3]);
    }

    #[test]
    fn truncation_bounds_samples() {
        let ref mut rng = SmallRng::seed_from_u64(5);
        assert!((0..1000).map(|_| truncated(rng)).all(|z| z.abs() <= 2.));
    }
}
