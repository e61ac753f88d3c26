//! Acquisition strategies and the factory that builds them from config.

pub mod cal;
pub mod cal_pca;
pub mod random;
pub mod vaal;

pub use cal::{CalSampler, CalScore, CalScorer, ScoringPool};
pub use cal_pca::CalPcaSampler;
pub use random::RandomSampler;
pub use vaal::VaalSampler;

use cal_core::config::SamplerSpec;
use cal_core::traits::ISampler;

/// Build the sampler a resolved config asks for.
///
/// `seed` feeds the strategy's own RNG streams; strategies without
/// randomness ignore it.
pub fn build_sampler(spec: &SamplerSpec, seed: u64) -> Box<dyn ISampler> {
    match spec {
        SamplerSpec::Random => Box::new(RandomSampler::new(seed)),
        SamplerSpec::Cal {
            n_neighs,
            metric,
            score,
        } => Box::new(CalSampler::new(CalScorer::new(*n_neighs, *metric, *score))),
        SamplerSpec::CalPca {
            n_neighs,
            metric,
            score,
            n_components,
        } => Box::new(CalPcaSampler::new(
            CalScorer::new(*n_neighs, *metric, *score),
            *n_components,
        )),
        SamplerSpec::Vaal {
            latent_dim,
            hidden_dim,
            optimizer,
            lr,
            n_sub_epochs,
        } => Box::new(VaalSampler::new(
            seed,
            *latent_dim,
            *hidden_dim,
            *optimizer,
            *lr,
            *n_sub_epochs,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cal_core::config::SamplerConfig;

    #[test]
    fn factory_names_match_config() {
        for name in ["random", "cal", "cal_pca", "vaal"] {
            let spec = SamplerConfig {
                name: name.to_string(),
                ..Default::default()
            }
            .resolve()
            .unwrap();
            assert_eq!(build_sampler(&spec, 0).name(), name);
        }
    }
}
