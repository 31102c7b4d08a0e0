use crate::kernel::{require_positive, KernelLifecycle};
use crate::signal::peak::argrelmax;
use crate::signal::spectral::{Detrend, WelchConfig, WelchKernel};
use crate::signal::traits::WelchPsd1D;
use biopeaks_core::{Error, Result};

/// Dominant beat frequency of a recording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartRateEstimate {
    /// Dominant frequency in Hz.
    pub frequency_hz: f64,
    /// Beats expected over the whole recording at that frequency.
    pub expected_beat_count: f64,
}

impl HeartRateEstimate {
    /// Expected inter-beat interval in samples.
    pub fn ibi_samples(&self, sampling_rate: f64) -> f64 {
        sampling_rate / self.frequency_hz
    }

    /// Beats per minute.
    pub fn bpm(&self) -> f64 {
        self.frequency_hz * 60.0
    }
}

/// Estimate the dominant beat frequency of `filtered_squared` from its power spectrum.
///
/// A single Hann-windowed segment spanning the whole signal is used, and the strongest strict
/// local maximum inside `[band_low_hz, band_high_hz]` wins.
pub fn estimate_rate(
    filtered_squared: &[f64],
    sampling_rate: f64,
    band_low_hz: f64,
    band_high_hz: f64,
) -> Result<HeartRateEstimate> {
    require_positive("sampling_rate", sampling_rate)?;
    require_positive("rate_band_low_hz", band_low_hz)?;
    require_positive("rate_band_high_hz", band_high_hz)?;
    if band_low_hz >= band_high_hz {
        return Err(Error::InvalidArg {
            arg: "rate_band_low_hz".into(),
            reason: "must be below rate_band_high_hz".into(),
        });
    }
    if filtered_squared.is_empty() {
        return Err(Error::InvalidInput {
            reason: "cannot estimate a rate from an empty signal.".into(),
        });
    }

    let welch = WelchKernel::try_new(WelchConfig {
        fs: sampling_rate,
        nperseg: filtered_squared.len(),
        detrend: Detrend::Constant,
    })?;
    let (freqs, psd) = welch.run_alloc(filtered_squared)?;
    let (band_freqs, band_psd): (Vec<f64>, Vec<f64>) = freqs
        .into_iter()
        .zip(psd)
        .filter(|(f, _)| *f >= band_low_hz && *f <= band_high_hz)
        .unzip();

    let best = argrelmax(&band_psd, 1)
        .into_iter()
        .rev()
        .max_by(|&a, &b| band_psd[a].total_cmp(&band_psd[b]))
        .ok_or_else(|| Error::Numerical {
            reason: format!("no spectral peak between {band_low_hz} and {band_high_hz} Hz."),
        })?;

    let frequency_hz = band_freqs[best];
    let duration = filtered_squared.len() as f64 / sampling_rate;
    Ok(HeartRateEstimate {
        frequency_hz,
        expected_beat_count: duration * frequency_hz,
    })
}
