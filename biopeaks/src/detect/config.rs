use serde::{Deserialize, Serialize};

/// How a cluster is scored against the heart-rate estimate when picking the beat cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterCriterion {
    /// `log10(median |amplitude|) / (|size - expected| + 1)`.
    #[default]
    AmplitudeTimesCount,
    /// `1 / (|size - expected| + 1)`.
    CountOnly,
    /// `log10(median |amplitude|)`.
    AmplitudeOnly,
}

impl ClusterCriterion {
    /// Score a cluster of `size` members whose median absolute amplitude is
    /// `median_abs_amplitude`, given `expected` beats. Larger is better.
    pub fn score(&self, median_abs_amplitude: f64, size: usize, expected: f64) -> f64 {
        let count = 1.0 / ((size as f64 - expected).abs() + 1.0);
        let amplitude = median_abs_amplitude.log10();
        match self {
            ClusterCriterion::AmplitudeTimesCount => amplitude * count,
            ClusterCriterion::CountOnly => count,
            ClusterCriterion::AmplitudeOnly => amplitude,
        }
    }
}

/// Every tunable constant of the detector.
///
/// Missing fields fall back to their defaults when deserialising, so a config file only has to
/// name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// Lower band-pass cutoff in Hz.
    pub low_hz: f64,
    /// Upper band-pass cutoff in Hz.
    pub high_hz: f64,
    /// Butterworth prototype order.
    pub filter_order: usize,
    /// Number of k-means clusters.
    pub cluster_count: usize,
    /// Seed of the k-means initialisation.
    pub seed: u64,
    /// Lower edge of the plausible heart-rate band in Hz.
    pub rate_band_low_hz: f64,
    /// Upper edge of the plausible heart-rate band in Hz.
    pub rate_band_high_hz: f64,
    /// Percentile of `|filtered|` the outlier threshold is derived from.
    pub outlier_percentile: f64,
    /// Samples beyond `outlier_factor` times that percentile are zeroed.
    pub outlier_factor: f64,
    /// Cumulative explained variance the PCA reduction keeps.
    pub explained_variance: f64,
    /// Consecutive peaks closer than this fraction of the expected IBI conflict.
    pub conflict_ratio: f64,
    /// Cluster scoring policy.
    pub criterion: ClusterCriterion,
    /// Independent k-means initialisations.
    pub kmeans_restarts: usize,
    /// Lloyd iteration cap per initialisation.
    pub kmeans_max_iter: usize,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            low_hz: 1.0,
            high_hz: 100.0,
            filter_order: 3,
            cluster_count: 4,
            seed: 42,
            rate_band_low_hz: 0.8,
            rate_band_high_hz: 2.5,
            outlier_percentile: 99.0,
            outlier_factor: 2.0,
            explained_variance: 0.9,
            conflict_ratio: 0.5,
            criterion: ClusterCriterion::AmplitudeTimesCount,
            kmeans_restarts: 10,
            kmeans_max_iter: 300,
        }
    }
}
