//! Synthetic Gaussian-blob dataset.

use rand::Rng;

use cal_core::models::SampleIndex;
use cal_core::rng::seeded_stream;

/// Labeled points scattered around one center per class.
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    pub points: Vec<Vec<f32>>,
    pub labels: Vec<usize>,
    pub n_classes: usize,
}

impl SyntheticDataset {
    /// `n_per_class` points per class in `dim` dimensions. Centers are drawn
    /// uniformly from `[-5, 5]^dim`; each point adds isotropic Gaussian noise
    /// with standard deviation `spread`. Classes are interleaved so sample
    /// index order carries no class information.
    pub fn gaussian_blobs(
        n_per_class: usize,
        n_classes: usize,
        dim: usize,
        spread: f32,
        seed: u64,
    ) -> Self {
        let mut rng = seeded_stream(seed, 0);
        let centers: Vec<Vec<f32>> = (0..n_classes)
            .map(|_| (0..dim).map(|_| rng.gen_range(-5.0f32..5.0)).collect())
            .collect();

        let mut points = Vec::with_capacity(n_per_class * n_classes);
        let mut labels = Vec::with_capacity(n_per_class * n_classes);
        for _ in 0..n_per_class {
            for (class, center) in centers.iter().enumerate() {
                points.push(
                    center
                        .iter()
                        .map(|c| c + spread * standard_normal(&mut rng))
                        .collect(),
                );
                labels.push(class);
            }
        }
        Self {
            points,
            labels,
            n_classes,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.points.first().map(Vec::len).unwrap_or(0)
    }

    pub fn indices(&self) -> Vec<SampleIndex> {
        (0..self.len()).collect()
    }
}

/// Box-Muller.
fn standard_normal<R: Rng>(rng: &mut R) -> f32 {
    let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
    let u2: f32 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
}
