//! Seeded k-means clustering.
//!
//! Centroids are seeded with k-means++ and refined with Lloyd iterations. Several restarts are
//! drawn from one explicitly seeded generator and the lowest-inertia solution is kept, so a fit is
//! fully determined by the data and the seed.

use crate::kernel::{ConfigError, KernelLifecycle};
use biopeaks_core::{Error, Result};
use log::trace;
use nalgebra::{DMatrix, RowDVector};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Constructor config for [`KMeansKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansConfig {
    /// Number of clusters.
    pub n_clusters: usize,
    /// Seed of the generator driving centroid initialisation.
    pub seed: u64,
    /// Number of independent initialisations.
    pub n_init: usize,
    /// Maximum Lloyd iterations per initialisation.
    pub max_iter: usize,
    /// Relative tolerance on centroid movement, scaled by the mean feature variance.
    pub tol: f64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_clusters: 4,
            seed: 42,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
        }
    }
}

/// Trait-first k-means kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansKernel {
    n_clusters: usize,
    seed: u64,
    n_init: usize,
    max_iter: usize,
    tol: f64,
}

/// Result of [`KMeansKernel::fit`].
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Cluster label of each row, contiguous from 0.
    pub labels: Vec<usize>,
    /// One centroid per row, indexed by label.
    pub centroids: DMatrix<f64>,
    /// Euclidean distance of each row to the centroid of its own cluster.
    pub distances: Vec<f64>,
    /// Sum of squared distances to the assigned centroids.
    pub inertia: f64,
    /// Lloyd iterations run by the kept initialisation.
    pub n_iter: usize,
}

impl KMeansFit {
    /// Number of rows assigned to each label.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.centroids.nrows()];
        for &l in &self.labels {
            sizes[l] += 1;
        }
        sizes
    }
}

impl KernelLifecycle for KMeansKernel {
    type Config = KMeansConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        if config.n_clusters == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "n_clusters",
                reason: "must be > 0",
            });
        }
        if config.n_init == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "n_init",
                reason: "must be > 0",
            });
        }
        if config.max_iter == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "max_iter",
                reason: "must be > 0",
            });
        }
        if !config.tol.is_finite() || config.tol < 0.0 {
            return Err(ConfigError::InvalidArgument {
                arg: "tol",
                reason: "must be finite and >= 0",
            });
        }
        Ok(Self {
            n_clusters: config.n_clusters,
            seed: config.seed,
            n_init: config.n_init,
            max_iter: config.max_iter,
            tol: config.tol,
        })
    }
}

fn sq_dist(x: &DMatrix<f64>, row: usize, c: &DMatrix<f64>, k: usize) -> f64 {
    x.row(row)
        .iter()
        .zip(c.row(k).iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum()
}

/// Index and squared distance of the nearest centroid. Ties go to the lower index.
fn nearest(x: &DMatrix<f64>, row: usize, c: &DMatrix<f64>) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for k in 0..c.nrows() {
        let d = sq_dist(x, row, c, k);
        if d < best.1 {
            best = (k, d);
        }
    }
    best
}

/// Draw an index with probability proportional to `weights`; uniform when they sum to zero.
fn weighted_draw(rng: &mut StdRng, weights: &[f64]) -> usize {
    let total: f64 = weights.iter().sum();
    if !(total > 0.0) {
        return rng.random_range(0..weights.len());
    }
    let target = rng.random::<f64>() * total;
    let mut acc = 0.0;
    for (i, w) in weights.iter().enumerate() {
        acc += w;
        if acc > target {
            return i;
        }
    }
    // Rounding can leave `target` at the very top of the range.
    weights.iter().rposition(|w| *w > 0.0).unwrap_or(0)
}

fn kmeans_plus_plus(x: &DMatrix<f64>, k: usize, rng: &mut StdRng) -> DMatrix<f64> {
    let n = x.nrows();
    let mut centroids = DMatrix::<f64>::zeros(k, x.ncols());
    let first = rng.random_range(0..n);
    centroids.set_row(0, &x.row(first));
    let mut closest: Vec<f64> = (0..n).map(|i| sq_dist(x, i, &centroids, 0)).collect();
    for c in 1..k {
        let pick = weighted_draw(rng, &closest);
        centroids.set_row(c, &x.row(pick));
        for (i, d) in closest.iter_mut().enumerate() {
            *d = d.min(sq_dist(x, i, &centroids, c));
        }
    }
    centroids
}

struct Run {
    labels: Vec<usize>,
    centroids: DMatrix<f64>,
    inertia: f64,
    n_iter: usize,
}

impl KMeansKernel {
    fn lloyd(&self, x: &DMatrix<f64>, mut centroids: DMatrix<f64>, tol: f64) -> Run {
        let (n, d) = x.shape();
        let k = self.n_clusters;
        let mut labels = vec![0usize; n];
        let mut n_iter = 0;

        for it in 0..self.max_iter {
            n_iter = it + 1;
            let mut dists = vec![0.0; n];
            for i in 0..n {
                let (l, dist) = nearest(x, i, &centroids);
                labels[i] = l;
                dists[i] = dist;
            }

            let mut sums = DMatrix::<f64>::zeros(k, d);
            let mut counts = vec![0usize; k];
            for (i, &l) in labels.iter().enumerate() {
                let mut row = sums.row_mut(l);
                row += x.row(i);
                counts[l] += 1;
            }

            let mut updated = DMatrix::<f64>::zeros(k, d);
            for c in 0..k {
                if counts[c] > 0 {
                    let mean = sums.row(c) / counts[c] as f64;
                    updated.set_row(c, &mean);
                    continue;
                }
                // Empty cluster: move it onto the point worst served by its centroid.
                let far = dists
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1))
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                dists[far] = 0.0;
                updated.set_row(c, &x.row(far));
            }

            let shift = (&updated - &centroids).norm_squared();
            centroids = updated;
            if shift <= tol {
                break;
            }
        }

        let mut inertia = 0.0;
        for i in 0..n {
            let (l, dist) = nearest(x, i, &centroids);
            labels[i] = l;
            inertia += dist;
        }
        Run {
            labels,
            centroids,
            inertia,
            n_iter,
        }
    }

    /// Partition the rows of `x` into at most `n_clusters` clusters.
    ///
    /// Labels are renumbered so the label set is contiguous from 0, which means fewer than
    /// `n_clusters` centroids are returned when duplicate rows leave a cluster empty.
    pub fn fit(&self, x: &DMatrix<f64>) -> Result<KMeansFit> {
        let (n, d) = x.shape();
        if d == 0 {
            return Err(Error::InvalidInput {
                reason: "k-means input has no features.".into(),
            });
        }
        if self.n_clusters > n {
            return Err(Error::DegenerateCluster {
                reason: format!(
                    "cannot form {} clusters from {n} observations.",
                    self.n_clusters
                ),
            });
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(Error::Numerical {
                reason: "k-means input contains non-finite values.".into(),
            });
        }

        let mean_variance = x
            .column_iter()
            .map(|col| {
                let m = col.mean();
                col.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / n as f64
            })
            .sum::<f64>()
            / d as f64;
        let tol = self.tol * mean_variance;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<Run> = None;
        for init in 0..self.n_init {
            let seeds = kmeans_plus_plus(x, self.n_clusters, &mut rng);
            let run = self.lloyd(x, seeds, tol);
            trace!(
                "k-means init {init}: inertia {:.6} after {} iterations",
                run.inertia,
                run.n_iter
            );
            if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }
        let run = best.ok_or_else(|| Error::DegenerateCluster {
            reason: "k-means produced no solution.".into(),
        })?;

        // Renumber labels so the set is contiguous from 0.
        let mut remap = vec![None; self.n_clusters];
        let mut used = Vec::new();
        for c in 0..self.n_clusters {
            if run.labels.iter().any(|&l| l == c) {
                remap[c] = Some(used.len());
                used.push(c);
            }
        }
        let labels: Vec<usize> = run
            .labels
            .iter()
            .map(|&l| remap[l].unwrap_or(0))
            .collect();
        let rows: Vec<RowDVector<f64>> = used
            .iter()
            .map(|&c| run.centroids.row(c).clone_owned())
            .collect();
        let centroids = DMatrix::from_rows(&rows);
        let distances = labels
            .iter()
            .enumerate()
            .map(|(i, &l)| sq_dist(x, i, &centroids, l).sqrt())
            .collect();

        Ok(KMeansFit {
            labels,
            centroids,
            distances,
            inertia: run.inertia,
            n_iter: run.n_iter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn blobs() -> DMatrix<f64> {
        // Three tight groups far apart.
        let mut data = Vec::new();
        for (cx, cy) in [(0.0, 0.0), (10.0, 10.0), (-10.0, 10.0)] {
            for (dx, dy) in [(0.1, 0.0), (-0.1, 0.0), (0.0, 0.1), (0.0, -0.1)] {
                data.push(cx + dx);
                data.push(cy + dy);
            }
        }
        DMatrix::from_row_slice(12, 2, &data)
    }

    fn kernel(n_clusters: usize, seed: u64) -> KMeansKernel {
        KMeansKernel::try_new(KMeansConfig {
            n_clusters,
            seed,
            ..Default::default()
        })
        .expect("valid config")
    }

    #[test]
    fn separates_well_spaced_groups() {
        let fit = kernel(3, 42).fit(&blobs()).expect("fit");
        for group in fit.labels.chunks(4) {
            assert!(group.iter().all(|&l| l == group[0]));
        }
        let mut firsts = vec![fit.labels[0], fit.labels[4], fit.labels[8]];
        firsts.sort_unstable();
        assert_eq!(firsts, vec![0, 1, 2]);
        assert_eq!(fit.cluster_sizes(), vec![4, 4, 4]);
        for d in &fit.distances {
            assert_relative_eq!(*d, 0.1, epsilon = 1e-9);
        }
        assert_relative_eq!(fit.inertia, 12.0 * 0.01, epsilon = 1e-9);
    }

    #[test]
    fn same_seed_same_partition() {
        let x = blobs();
        let a = kernel(4, 7).fit(&x).expect("fit");
        let b = kernel(4, 7).fit(&x).expect("fit");
        assert_eq!(a, b);
    }

    #[test]
    fn duplicates_give_contiguous_labels() {
        let x = DMatrix::from_row_slice(5, 1, &[1.0, 1.0, 1.0, 5.0, 5.0]);
        let fit = kernel(4, 42).fit(&x).expect("fit");
        let max = fit.labels.iter().copied().max().unwrap_or(0);
        for l in 0..=max {
            assert!(fit.labels.contains(&l));
        }
        assert_eq!(fit.centroids.nrows(), max + 1);
        assert!(fit.distances.iter().all(|d| *d < 1e-12));
    }

    #[test]
    fn too_many_clusters_is_degenerate() {
        let x = DMatrix::from_row_slice(3, 1, &[1.0, 2.0, 3.0]);
        let err = kernel(4, 42).fit(&x).expect_err("k > n");
        assert!(matches!(err, Error::DegenerateCluster { .. }));
    }

    #[test]
    fn rejects_zero_clusters() {
        assert!(KMeansKernel::try_new(KMeansConfig {
            n_clusters: 0,
            ..Default::default()
        })
        .is_err());
    }
}
