//! Labeled-vs-unlabeled discriminator: two ReLU hidden layers, sigmoid output.

use candle_core::{DType, Device, Module, Tensor, Var};
use candle_nn::Linear;
use rand::Rng;
use rand_distr::StandardNormal;

use cal_core::errors::SamplingError;
use cal_core::models::Embedding;

/// MLP `input -> hidden -> hidden -> 1` on the CPU.
///
/// Weights are Kaiming-normal (fan-in, ReLU gain) and biases zero. They are
/// drawn from the caller's RNG, so a seeded stream gives identical networks.
pub struct Discriminator {
    input_dim: usize,
    layers: Vec<Linear>,
    vars: Vec<Var>,
}

impl Discriminator {
    pub fn new<R: Rng + ?Sized>(
        input_dim: usize,
        hidden_dim: usize,
        rng: &mut R,
    ) -> Result<Self, SamplingError> {
        let widths = [(input_dim, hidden_dim), (hidden_dim, hidden_dim), (hidden_dim, 1)];
        let mut layers = Vec::with_capacity(widths.len());
        let mut vars = Vec::with_capacity(2 * widths.len());
        for (fan_in, fan_out) in widths {
            let (weight, bias) = kaiming_layer(fan_in, fan_out, rng).map_err(to_sampling)?;
            layers.push(Linear::new(
                weight.as_tensor().clone(),
                Some(bias.as_tensor().clone()),
            ));
            vars.push(weight);
            vars.push(bias);
        }
        Ok(Self {
            input_dim,
            layers,
            vars,
        })
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Trainable variables, in layer order (weight, bias).
    pub fn vars(&self) -> Vec<Var> {
        self.vars.clone()
    }

    /// Output logits, shape `(n, 1)`.
    pub fn logits(&self, codes: &Tensor) -> candle_core::Result<Tensor> {
        let last = self.layers.len() - 1;
        let mut xs = codes.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            xs = layer.forward(&xs)?;
            if i < last {
                xs = xs.relu()?;
            }
        }
        Ok(xs)
    }

    /// Binary cross-entropy of `codes` against a constant `target` label.
    pub fn loss(&self, codes: &Tensor, target: f32) -> candle_core::Result<Tensor> {
        let logits = self.logits(codes)?;
        let targets = logits.ones_like()?.affine(f64::from(target), 0.0)?;
        candle_nn::loss::binary_cross_entropy_with_logit(&logits, &targets)
    }

    /// Probability that each code belongs to a labeled sample.
    pub fn predict(&self, codes: &[Embedding]) -> Result<Vec<f64>, SamplingError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let probs = self
            .logits(&code_tensor(codes, self.input_dim).map_err(to_sampling)?)
            .and_then(|l| candle_nn::ops::sigmoid(&l))
            .and_then(|p| p.flatten_all())
            .and_then(|p| p.to_vec1::<f32>())
            .map_err(to_sampling)?;
        Ok(probs.into_iter().map(f64::from).collect())
    }
}

/// Stack embedding means into an `(n, dim)` tensor.
pub fn code_tensor(codes: &[Embedding], dim: usize) -> candle_core::Result<Tensor> {
    let flat: Vec<f32> = codes.iter().flat_map(|e| e.mean.iter().copied()).collect();
    Tensor::from_vec(flat, (codes.len(), dim), &Device::Cpu)
}

pub(crate) fn to_sampling(e: candle_core::Error) -> SamplingError {
    SamplingError::Discriminator {
        reason: e.to_string(),
    }
}

fn kaiming_layer<R: Rng + ?Sized>(
    fan_in: usize,
    fan_out: usize,
    rng: &mut R,
) -> candle_core::Result<(Var, Var)> {
    let std = (2.0 / fan_in.max(1) as f64).sqrt() as f32;
    let weights: Vec<f32> = (0..fan_in * fan_out)
        .map(|_| rng.sample::<f32, _>(StandardNormal) * std)
        .collect();
    let weight = Var::from_tensor(&Tensor::from_vec(weights, (fan_out, fan_in), &Device::Cpu)?)?;
    let bias = Var::zeros(fan_out, DType::F32, &Device::Cpu)?;
    Ok((weight, bias))
}
