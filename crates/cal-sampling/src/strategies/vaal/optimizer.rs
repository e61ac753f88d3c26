//! Discriminator optimizers backed by `candle-nn`.

use candle_core::{Tensor, Var};
use candle_nn::{AdamW, Optimizer as CandleOptimizer, ParamsAdamW, SGD};

use cal_core::config::OptimizerKind;

const ADAM_BETA1: f64 = 0.9;
const ADAM_BETA2: f64 = 0.999;
const ADAM_EPSILON: f64 = 1e-8;

/// Plain SGD, or Adam (AdamW with zero weight decay).
pub enum Optimizer {
    Sgd(SGD),
    Adam(AdamW),
}

impl Optimizer {
    pub fn new(kind: OptimizerKind, lr: f64, vars: Vec<Var>) -> candle_core::Result<Self> {
        match kind {
            OptimizerKind::Sgd => Ok(Self::Sgd(SGD::new(vars, lr)?)),
            OptimizerKind::Adam => Ok(Self::Adam(AdamW::new(
                vars,
                ParamsAdamW {
                    lr,
                    beta1: ADAM_BETA1,
                    beta2: ADAM_BETA2,
                    eps: ADAM_EPSILON,
                    weight_decay: 0.0,
                },
            )?)),
        }
    }

    /// Backpropagate `loss` and update every tracked variable once.
    pub fn backward_step(&mut self, loss: &Tensor) -> candle_core::Result<()> {
        match self {
            Self::Sgd(opt) => opt.backward_step(loss),
            Self::Adam(opt) => opt.backward_step(loss),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    fn scalar_var(x: f32) -> Var {
        Var::from_tensor(&Tensor::new(&[x], &Device::Cpu).unwrap()).unwrap()
    }

    fn value(v: &Var) -> f32 {
        v.as_tensor().to_vec1::<f32>().unwrap()[0]
    }

    #[test]
    fn sgd_moves_against_the_gradient() {
        let p = scalar_var(1.0);
        let mut opt = Optimizer::new(OptimizerKind::Sgd, 0.25, vec![p.clone()]).unwrap();
        // d/dp p^2 = 2 at p = 1.
        let loss = p.as_tensor().sqr().unwrap().sum_all().unwrap();
        opt.backward_step(&loss).unwrap();
        assert!((value(&p) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn adam_first_step_is_lr_sized() {
        let p = scalar_var(0.0);
        let mut opt = Optimizer::new(OptimizerKind::Adam, 0.01, vec![p.clone()]).unwrap();
        let loss = p.as_tensor().affine(3.0, 0.0).unwrap().sum_all().unwrap();
        opt.backward_step(&loss).unwrap();
        assert!((value(&p) + 0.01).abs() < 1e-5);
    }

    #[test]
    fn adam_minimizes_a_quadratic() {
        let p = scalar_var(5.0);
        let mut opt = Optimizer::new(OptimizerKind::Adam, 0.1, vec![p.clone()]).unwrap();
        for _ in 0..500 {
            let loss = p.as_tensor().sqr().unwrap().sum_all().unwrap();
            opt.backward_step(&loss).unwrap();
        }
        assert!(value(&p).abs() < 0.05);
    }
}
