//! Principal component projection of embedding means.

use nalgebra::{DMatrix, SymmetricEigen};

use cal_core::errors::SamplingError;
use cal_core::models::Embedding;

/// Fitted PCA: mean vector plus the top principal axes.
#[derive(Debug, Clone)]
pub struct Pca {
    mean: Vec<f64>,
    /// `n_components x n_features`, one axis per row.
    components: DMatrix<f64>,
    explained_variance: Vec<f64>,
    total_variance: f64,
}

impl Pca {
    /// Fit on the means of `embeddings`.
    ///
    /// Axes are ordered by descending eigenvalue and sign-fixed so their
    /// largest-magnitude coordinate is positive, which keeps projections
    /// reproducible across eigen solver runs.
    pub fn fit(embeddings: &[Embedding], n_components: usize) -> Result<Self, SamplingError> {
        let n_samples = embeddings.len();
        if n_samples < 2 {
            return Err(SamplingError::Projection {
                reason: format!("need at least 2 points, got {n_samples}"),
            });
        }
        let n_features = embeddings[0].dim();
        if n_components == 0 || n_components > n_features {
            return Err(SamplingError::Projection {
                reason: format!(
                    "cannot keep {n_components} components of a {n_features}-dimensional embedding"
                ),
            });
        }
        let data = to_matrix(embeddings, n_features)?;

        let mean: Vec<f64> = data.column_iter().map(|c| c.mean()).collect();
        let mut centered = data;
        for (j, mut column) in centered.column_iter_mut().enumerate() {
            column.add_scalar_mut(-mean[j]);
        }
        let cov = (centered.transpose() * &centered) / (n_samples - 1) as f64;

        let eigen = SymmetricEigen::new(cov);
        let mut order: Vec<usize> = (0..n_features).collect();
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[b]
                .total_cmp(&eigen.eigenvalues[a])
                .then_with(|| a.cmp(&b))
        });

        let mut components = DMatrix::<f64>::zeros(n_components, n_features);
        let mut explained_variance = Vec::with_capacity(n_components);
        for (row, &axis) in order.iter().take(n_components).enumerate() {
            let vector = eigen.eigenvectors.column(axis);
            let pivot = vector
                .iter()
                .copied()
                .fold(0.0f64, |best, v| if v.abs() > best.abs() { v } else { best });
            let sign = if pivot < 0.0 { -1.0 } else { 1.0 };
            for j in 0..n_features {
                components[(row, j)] = sign * vector[j];
            }
            explained_variance.push(eigen.eigenvalues[axis].max(0.0));
        }
        let total_variance = eigen.eigenvalues.iter().map(|v| v.max(0.0)).sum();

        Ok(Self {
            mean,
            components,
            explained_variance,
            total_variance,
        })
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Share of total variance captured by each kept axis.
    pub fn explained_variance_ratio(&self) -> Vec<f64> {
        if self.total_variance <= 0.0 {
            return vec![0.0; self.explained_variance.len()];
        }
        self.explained_variance
            .iter()
            .map(|v| v / self.total_variance)
            .collect()
    }

    /// Project embedding means onto the kept axes. Log-variances are dropped.
    pub fn transform(&self, embeddings: &[Embedding]) -> Result<Vec<Embedding>, SamplingError> {
        embeddings
            .iter()
            .map(|e| {
                if e.dim() != self.n_features() {
                    return Err(SamplingError::DimensionMismatch {
                        expected: self.n_features(),
                        actual: e.dim(),
                    });
                }
                let projected = self
                    .components
                    .row_iter()
                    .map(|axis| {
                        axis.iter()
                            .zip(e.mean.iter().zip(self.mean.iter()))
                            .map(|(a, (x, m))| a * (*x as f64 - m))
                            .sum::<f64>() as f32
                    })
                    .collect();
                Ok(Embedding::new(projected))
            })
            .collect()
    }
}

fn to_matrix(embeddings: &[Embedding], n_features: usize) -> Result<DMatrix<f64>, SamplingError> {
    let mut values = Vec::with_capacity(embeddings.len() * n_features);
    for e in embeddings {
        if e.dim() != n_features {
            return Err(SamplingError::DimensionMismatch {
                expected: n_features,
                actual: e.dim(),
            });
        }
        values.extend(e.mean.iter().map(|v| *v as f64));
    }
    Ok(DMatrix::from_row_slice(embeddings.len(), n_features, &values))
}
