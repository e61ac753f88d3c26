pub mod classifier;
pub mod embedding;
pub mod reporter;
pub mod sampler;

pub use classifier::IClassifierOracle;
pub use embedding::IEmbeddingProvider;
pub use reporter::IRunReporter;
pub use sampler::{ISampler, SamplerInputs};
