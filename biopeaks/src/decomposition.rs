//! Principal component analysis over feature matrices.

use crate::kernel::{ConfigError, KernelLifecycle};
use biopeaks_core::{Error, Result};
use nalgebra::{DMatrix, DVector, SymmetricEigen};

/// Constructor config for [`PcaKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PcaConfig {
    /// Keep the smallest number of components whose cumulative explained variance ratio
    /// reaches this value. Must lie in `(0, 1]`.
    pub explained_variance: f64,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            explained_variance: 0.9,
        }
    }
}

/// Trait-first PCA kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PcaKernel {
    explained_variance: f64,
}

/// A fitted projection and the input expressed in it.
#[derive(Debug, Clone, PartialEq)]
pub struct PcaFit {
    /// Column means subtracted before projecting.
    pub mean: DVector<f64>,
    /// Principal axes, one per column, ordered by decreasing variance.
    pub components: DMatrix<f64>,
    /// Fraction of total variance carried by each kept component.
    pub explained_variance_ratio: Vec<f64>,
    /// Input rows projected onto [`PcaFit::components`].
    pub transformed: DMatrix<f64>,
}

impl KernelLifecycle for PcaKernel {
    type Config = PcaConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        let ev = config.explained_variance;
        if !(ev > 0.0 && ev <= 1.0) {
            return Err(ConfigError::InvalidArgument {
                arg: "explained_variance",
                reason: "must lie in (0, 1]",
            });
        }
        Ok(Self {
            explained_variance: ev,
        })
    }
}

impl PcaKernel {
    /// Fit the projection on `x` (rows are observations) and project `x` onto it.
    pub fn fit_transform(&self, x: &DMatrix<f64>) -> Result<PcaFit> {
        let (n, d) = x.shape();
        if n < 2 || d == 0 {
            return Err(Error::InvalidInput {
                reason: format!("PCA needs at least 2 observations of 1 feature, got {n}x{d}."),
            });
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(Error::Numerical {
                reason: "feature matrix contains non-finite values.".into(),
            });
        }

        let mean_row = x.row_mean();
        let mut centered = x.clone();
        for mut row in centered.row_iter_mut() {
            row -= &mean_row;
        }
        let mean = mean_row.transpose();
        let cov = (centered.transpose() * &centered) / (n as f64 - 1.0);

        let eig = SymmetricEigen::new(cov);
        let mut order: Vec<usize> = (0..d).collect();
        order.sort_by(|&a, &b| eig.eigenvalues[b].total_cmp(&eig.eigenvalues[a]));
        let variances: Vec<f64> = order
            .iter()
            .map(|&i| eig.eigenvalues[i].max(0.0))
            .collect();
        let total: f64 = variances.iter().sum();
        if !(total > 0.0) {
            return Err(Error::Numerical {
                reason: "features have zero total variance.".into(),
            });
        }

        let ratios: Vec<f64> = variances.iter().map(|v| v / total).collect();
        let mut cumulative = 0.0;
        let mut keep = d;
        for (i, r) in ratios.iter().enumerate() {
            cumulative += r;
            if cumulative >= self.explained_variance {
                keep = i + 1;
                break;
            }
        }

        let mut components = DMatrix::<f64>::zeros(d, keep);
        for (j, &i) in order.iter().take(keep).enumerate() {
            let mut axis = eig.eigenvectors.column(i).clone_owned();
            // Largest-magnitude loading is positive so fits are reproducible.
            let pivot = axis.iter().copied().fold(0.0f64, |acc, v| {
                if v.abs() > acc.abs() {
                    v
                } else {
                    acc
                }
            });
            if pivot < 0.0 {
                axis.neg_mut();
            }
            components.set_column(j, &axis);
        }

        let transformed = &centered * &components;
        Ok(PcaFit {
            mean,
            components,
            explained_variance_ratio: ratios.into_iter().take(keep).collect(),
            transformed,
        })
    }
}
