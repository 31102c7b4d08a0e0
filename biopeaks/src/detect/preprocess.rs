use crate::kernel::Read1D;
use crate::signal::filter::{design::ButterConfig, SosFiltFiltKernel};
use crate::signal::traits::SosFiltFilt1D;
use crate::stats::percentile;
use biopeaks_core::{Error, Result};
use itertools::Itertools;
use log::debug;

/// Constructor config for [`Preprocessor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessConfig {
    /// Band-pass design.
    pub band: ButterConfig,
    /// Percentile of `|filtered|` the clamp threshold derives from.
    pub outlier_percentile: f64,
    /// Multiple of that percentile beyond which samples are zeroed.
    pub outlier_factor: f64,
}

/// Zero-phase band-pass followed by outlier suppression.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    filter: SosFiltFiltKernel<f64>,
    outlier_percentile: f64,
    outlier_factor: f64,
}

impl Preprocessor {
    /// Design the band-pass and validate the clamp parameters.
    pub fn new(config: PreprocessConfig) -> Result<Self> {
        if !(config.outlier_percentile > 0.0 && config.outlier_percentile <= 100.0) {
            return Err(Error::InvalidArg {
                arg: "outlier_percentile".into(),
                reason: "must lie in (0, 100]".into(),
            });
        }
        if !(config.outlier_factor.is_finite() && config.outlier_factor > 0.0) {
            return Err(Error::InvalidArg {
                arg: "outlier_factor".into(),
                reason: "must be finite and > 0".into(),
            });
        }
        Ok(Self {
            filter: SosFiltFiltKernel::bandpass(config.band)?,
            outlier_percentile: config.outlier_percentile,
            outlier_factor: config.outlier_factor,
        })
    }

    /// Filter `signal` and zero the samples whose magnitude exceeds the clamp threshold.
    pub fn run<I>(&self, signal: &I) -> Result<Vec<f64>>
    where
        I: Read1D<f64> + ?Sized,
    {
        let signal = signal.read_slice()?;
        if signal.is_empty() {
            return Err(Error::InvalidInput {
                reason: "signal must be non-empty.".into(),
            });
        }
        if let Some(i) = signal.iter().position(|v| !v.is_finite()) {
            return Err(Error::InvalidInput {
                reason: format!("signal has a non-finite sample at index {i}."),
            });
        }
        if signal.iter().all_equal() {
            return Err(Error::InvalidInput {
                reason: "signal is constant.".into(),
            });
        }

        let mut filtered = self.filter.run_alloc(signal)?;
        let magnitudes: Vec<f64> = filtered.iter().map(|v| v.abs()).collect();
        let threshold = percentile(&magnitudes, self.outlier_percentile).ok_or_else(|| {
            Error::Numerical {
                reason: "outlier percentile is undefined.".into(),
            }
        })? * self.outlier_factor;

        let mut clamped = 0usize;
        for v in filtered.iter_mut() {
            if v.abs() > threshold {
                *v = 0.0;
                clamped += 1;
            }
        }
        debug!("preprocess: {} samples, {clamped} clamped above {threshold:.4}", filtered.len());
        Ok(filtered)
    }
}

/// Band-pass `signal` between `low_hz` and `high_hz` with a third-order Butterworth filter run
/// forward and backward, then zero samples beyond twice the 99th percentile of the magnitude.
pub fn filter(signal: &[f64], low_hz: f64, high_hz: f64, sampling_rate: f64) -> Result<Vec<f64>> {
    Preprocessor::new(PreprocessConfig {
        band: ButterConfig {
            order: 3,
            low_hz,
            high_hz,
            fs: sampling_rate,
        },
        outlier_percentile: 99.0,
        outlier_factor: 2.0,
    })?
    .run(signal)
}
