//! Spectral analysis helpers analogous to `scipy.signal` spectral APIs.

use crate::kernel::{require_positive, ConfigError, KernelLifecycle, Read1D};
use crate::signal::traits::{AnalyticSignal1D, WelchPsd1D};
use biopeaks_core::{Error, Result};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Per-segment trend removal applied before the FFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Detrend {
    /// Use the samples as they are.
    None,
    /// Subtract the segment mean.
    #[default]
    Constant,
}

/// Periodic Hann window, as `scipy.signal.get_window("hann", n)`.
fn hann_window(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let n_f = n as f64;
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * core::f64::consts::PI * i as f64 / n_f).cos())
        .collect()
}

fn rfft_real(x: &[f64], nfft: usize) -> Vec<Complex<f64>> {
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(nfft);
    let mut buf = vec![Complex::new(0.0, 0.0); nfft];
    for (dst, src) in buf.iter_mut().zip(x.iter().copied()) {
        *dst = Complex::new(src, 0.0);
    }
    fft.process(&mut buf);
    buf
}

fn onesided_freqs(nfft: usize, fs: f64) -> Vec<f64> {
    let step = fs / nfft as f64;
    (0..=nfft / 2).map(|k| k as f64 * step).collect()
}

/// Density of the non-negative bins; every bin but DC and an even-length Nyquist also carries
/// the power of its negative twin.
fn onesided_psd(spec: &[Complex<f64>], fs: f64, norm: f64) -> Vec<f64> {
    let nfft = spec.len();
    let scale = 1.0 / (fs * norm);
    spec[..=nfft / 2]
        .iter()
        .enumerate()
        .map(|(k, c)| {
            let paired = k != 0 && 2 * k != nfft;
            c.norm_sqr() * scale * if paired { 2.0 } else { 1.0 }
        })
        .collect()
}

/// Start of every full segment; a signal shorter than one segment yields a single zero-padded
/// segment.
fn segment_starts(len: usize, nperseg: usize, noverlap: usize) -> Vec<usize> {
    if nperseg == 0 || noverlap >= nperseg {
        return Vec::new();
    }
    if len <= nperseg {
        return vec![0];
    }
    (0..=len - nperseg).step_by(nperseg - noverlap).collect()
}

fn detrend_segment(segment: &mut [f64], detrend: Detrend) {
    if let Detrend::Constant = detrend {
        if segment.is_empty() {
            return;
        }
        let mean = segment.iter().sum::<f64>() / segment.len() as f64;
        segment.iter_mut().for_each(|v| *v -= mean);
    }
}

fn welch_impl(x: &[f64], fs: f64, nperseg: usize, detrend: Detrend) -> (Vec<f64>, Vec<f64>) {
    let nperseg = nperseg.min(x.len());
    let noverlap = nperseg / 2;
    let starts = segment_starts(x.len(), nperseg, noverlap);
    let window = hann_window(nperseg);
    let win_norm = window.iter().map(|v| v * v).sum::<f64>();
    let n_freq = nperseg / 2 + 1;
    let mut accum = vec![0.0; n_freq];

    for &start in &starts {
        let avail = (x.len() - start).min(nperseg);
        let mut segment = vec![0.0; nperseg];
        segment[..avail].copy_from_slice(&x[start..start + avail]);
        detrend_segment(&mut segment, detrend);
        segment
            .iter_mut()
            .zip(window.iter())
            .for_each(|(s, w)| *s *= w);
        let spec = rfft_real(&segment, nperseg);
        let psd = onesided_psd(&spec, fs, win_norm);
        for (a, p) in accum.iter_mut().zip(psd.iter()) {
            *a += *p;
        }
    }

    let inv = 1.0 / starts.len() as f64;
    for v in &mut accum {
        *v *= inv;
    }
    (onesided_freqs(nperseg, fs), accum)
}

fn hilbert_impl(x: &[f64]) -> Vec<Complex<f64>> {
    let n = x.len();
    let mut spec = rfft_real(x, n);
    // Double the positive frequencies, keep DC (and Nyquist for even n), zero the rest.
    let half = n / 2;
    for (k, v) in spec.iter_mut().enumerate() {
        let h = if k == 0 || (n % 2 == 0 && k == half) {
            1.0
        } else if k < (n + 1) / 2 {
            2.0
        } else {
            0.0
        };
        *v *= h;
    }
    let mut planner = FftPlanner::<f64>::new();
    let ifft = planner.plan_fft_inverse(n);
    ifft.process(&mut spec);
    let scale = 1.0 / n as f64;
    spec.into_iter().map(|c| c * scale).collect()
}

/// Constructor config for [`WelchKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchConfig {
    /// Sampling frequency in Hz.
    pub fs: f64,
    /// Segment length; clipped to the input length.
    pub nperseg: usize,
    /// Per-segment trend removal.
    pub detrend: Detrend,
}

/// Trait-first Welch PSD kernel (Hann window, 50% overlap).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchKernel {
    fs: f64,
    nperseg: usize,
    detrend: Detrend,
}

impl KernelLifecycle for WelchKernel {
    type Config = WelchConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        require_positive("fs", config.fs)?;
        if config.nperseg == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "nperseg",
                reason: "nperseg must be > 0",
            });
        }
        Ok(Self {
            fs: config.fs,
            nperseg: config.nperseg,
            detrend: config.detrend,
        })
    }
}

impl WelchPsd1D for WelchKernel {
    fn run_alloc<I>(&self, input: &I) -> Result<(Vec<f64>, Vec<f64>)>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = input.read_slice()?;
        if input.is_empty() {
            return Err(Error::InvalidInput {
                reason: "welch input must be non-empty.".into(),
            });
        }
        Ok(welch_impl(input, self.fs, self.nperseg, self.detrend))
    }
}

/// FFT-based analytic signal kernel, as `scipy.signal.hilbert`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HilbertKernel;

impl KernelLifecycle for HilbertKernel {
    type Config = ();

    fn try_new(_: Self::Config) -> core::result::Result<Self, ConfigError> {
        Ok(Self)
    }
}

impl AnalyticSignal1D for HilbertKernel {
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<Complex<f64>>>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = input.read_slice()?;
        if input.is_empty() {
            return Err(Error::InvalidInput {
                reason: "hilbert input must be non-empty.".into(),
            });
        }
        Ok(hilbert_impl(input))
    }
}

/// Estimate PSD with Welch's method using Hann windows, 50% overlap and constant detrend.
pub fn welch(x: &[f64], fs: f64, nperseg: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    WelchKernel::try_new(WelchConfig {
        fs,
        nperseg,
        detrend: Detrend::Constant,
    })?
    .run_alloc(x)
}

/// Analytic signal `x + j * H{x}` computed in the frequency domain.
pub fn hilbert(x: &[f64]) -> Result<Vec<Complex<f64>>> {
    HilbertKernel.run_alloc(x)
}
