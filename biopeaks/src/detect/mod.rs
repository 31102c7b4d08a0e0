//! The detection pipeline: band-pass and clamp, collect extrema, describe and reduce them,
//! estimate the heart rate, cluster, then prune implausibly short intervals.
//!
//! [`detect`] runs the whole chain with one config. [`Detector::run`] does the same but returns
//! every intermediate artifact in a [`Detection`], which is what a viewer wants to draw.

mod candidates;
mod config;
mod conflicts;
mod features;
mod heart_rate;
mod preprocess;
mod selection;

pub use candidates::{extract_candidates, CandidateSet, MIN_CANDIDATES};
pub use config::{ClusterCriterion, DetectConfig};
pub use conflicts::resolve_conflicts;
pub use features::{instantaneous_frequency, Candidate, FeatureBuilder, Features, FEATURE_COUNT};
pub use heart_rate::{estimate_rate, HeartRateEstimate};
pub use preprocess::{filter, PreprocessConfig, Preprocessor};
pub use selection::{select_peak_cluster, ClusterSelection};

use crate::cluster::{KMeansConfig, KMeansKernel};
use crate::decomposition::{PcaConfig, PcaKernel};
use crate::kernel::{require_positive, ConfigError, KernelLifecycle, Read1D};
use crate::signal::filter::design::ButterConfig;
use biopeaks_core::Result;
use log::debug;

/// Every artifact of one detection run.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Band-passed signal with outliers zeroed.
    pub filtered: Vec<f64>,
    /// Candidates and their features.
    pub features: Features,
    /// Heart-rate estimate.
    pub heart_rate: HeartRateEstimate,
    /// Cluster partition and the chosen cluster.
    pub selection: ClusterSelection,
    /// Final R-peak indices, strictly increasing.
    pub peaks: Vec<usize>,
}

/// A validated detector.
#[derive(Debug, Clone, PartialEq)]
pub struct Detector {
    config: DetectConfig,
    pca: PcaKernel,
    kmeans: KMeansKernel,
}

impl KernelLifecycle for Detector {
    type Config = DetectConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        if config.filter_order == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "filter_order",
                reason: "must be > 0",
            });
        }
        require_positive("low_hz", config.low_hz)?;
        require_positive("high_hz", config.high_hz)?;
        if config.low_hz >= config.high_hz {
            return Err(ConfigError::InvalidArgument {
                arg: "low_hz",
                reason: "must be below high_hz",
            });
        }
        require_positive("rate_band_low_hz", config.rate_band_low_hz)?;
        require_positive("rate_band_high_hz", config.rate_band_high_hz)?;
        if config.rate_band_low_hz >= config.rate_band_high_hz {
            return Err(ConfigError::InvalidArgument {
                arg: "rate_band_low_hz",
                reason: "must be below rate_band_high_hz",
            });
        }
        if !(config.outlier_percentile > 0.0 && config.outlier_percentile <= 100.0) {
            return Err(ConfigError::InvalidArgument {
                arg: "outlier_percentile",
                reason: "must lie in (0, 100]",
            });
        }
        require_positive("outlier_factor", config.outlier_factor)?;
        require_positive("conflict_ratio", config.conflict_ratio)?;

        let pca = PcaKernel::try_new(PcaConfig {
            explained_variance: config.explained_variance,
        })?;
        let kmeans = KMeansKernel::try_new(KMeansConfig {
            n_clusters: config.cluster_count,
            seed: config.seed,
            n_init: config.kmeans_restarts,
            max_iter: config.kmeans_max_iter,
            ..Default::default()
        })?;
        Ok(Self {
            config,
            pca,
            kmeans,
        })
    }
}

impl Detector {
    /// The config this detector was built from.
    pub fn config(&self) -> &DetectConfig {
        &self.config
    }

    /// Detect R-peaks in `signal` sampled at `sampling_rate` Hz.
    pub fn run<I>(&self, signal: &I, sampling_rate: f64) -> Result<Detection>
    where
        I: Read1D<f64> + ?Sized,
    {
        let signal = signal.read_slice()?;
        let cfg = &self.config;
        require_positive("sampling_rate", sampling_rate)?;

        let preprocessor = Preprocessor::new(PreprocessConfig {
            band: ButterConfig {
                order: cfg.filter_order,
                low_hz: cfg.low_hz,
                high_hz: cfg.high_hz,
                fs: sampling_rate,
            },
            outlier_percentile: cfg.outlier_percentile,
            outlier_factor: cfg.outlier_factor,
        })?;
        let filtered = preprocessor.run(signal)?;

        let set = extract_candidates(&filtered)?;
        debug!(
            "candidates: {} ({} maxima, {} minima)",
            set.len(),
            set.maxima.len(),
            set.minima.len()
        );
        let features = FeatureBuilder::new(sampling_rate, self.pca).build(&filtered, &set)?;
        debug!(
            "features: kept {} axes, explained variance {:?}",
            features.reduced.ncols(),
            features.explained_variance_ratio
        );

        let squared: Vec<f64> = filtered.iter().map(|v| v * v).collect();
        let heart_rate = estimate_rate(
            &squared,
            sampling_rate,
            cfg.rate_band_low_hz,
            cfg.rate_band_high_hz,
        )?;
        debug!(
            "heart rate: {:.3} Hz ({:.1} bpm), {:.1} beats expected",
            heart_rate.frequency_hz,
            heart_rate.bpm(),
            heart_rate.expected_beat_count
        );

        let selection = select_peak_cluster(
            &features.reduced,
            &features.candidates,
            &heart_rate,
            &self.kmeans,
            cfg.criterion,
        )?;

        let min_gap = cfg.conflict_ratio * heart_rate.ibi_samples(sampling_rate);
        let peaks = resolve_conflicts(&selection.peaks, &selection.distances, min_gap)?;
        debug!(
            "peaks: {} selected, {} after conflict resolution",
            selection.peaks.len(),
            peaks.len()
        );

        Ok(Detection {
            filtered,
            features,
            heart_rate,
            selection,
            peaks,
        })
    }
}

/// Detect R-peaks in `signal` sampled at `sampling_rate` Hz.
///
/// Returns strictly increasing sample indices. The result depends only on the signal, the rate
/// and `config`, so repeated calls agree.
pub fn detect<I>(signal: &I, sampling_rate: f64, config: &DetectConfig) -> Result<Vec<usize>>
where
    I: Read1D<f64> + ?Sized,
{
    Ok(Detector::try_new(config.clone())?
        .run(signal, sampling_rate)?
        .peaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use biopeaks_core::Error;

    #[test]
    fn invalid_configs_are_rejected() {
        let bad = [
            DetectConfig {
                filter_order: 0,
                ..Default::default()
            },
            DetectConfig {
                low_hz: 40.0,
                high_hz: 20.0,
                ..Default::default()
            },
            DetectConfig {
                rate_band_low_hz: 3.0,
                ..Default::default()
            },
            DetectConfig {
                cluster_count: 0,
                ..Default::default()
            },
            DetectConfig {
                explained_variance: 1.2,
                ..Default::default()
            },
            DetectConfig {
                outlier_percentile: 0.0,
                ..Default::default()
            },
            DetectConfig {
                conflict_ratio: -0.5,
                ..Default::default()
            },
        ];
        for config in bad {
            let err: Error = Detector::try_new(config).expect_err("rejected").into();
            assert!(matches!(err, Error::InvalidArg { .. }));
        }
    }

    #[test]
    fn rejects_non_positive_rate() {
        let detector = Detector::try_new(DetectConfig::default()).expect("valid config");
        let x = vec![0.0; 1000];
        assert!(matches!(
            detector.run(&x, 0.0),
            Err(Error::InvalidArg { .. })
        ));
    }
}
