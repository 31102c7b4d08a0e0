//! Trait interfaces for signal-processing capabilities.
//!
//! These traits define the trait-first API shape used by the pipeline kernels.

use crate::kernel::Read1D;
use biopeaks_core::Result;
use rustfft::num_complex::Complex;

/// 1D zero-phase SOS filtering capability.
pub trait SosFiltFilt1D<F> {
    /// Filter forward and backward and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<F>>
    where
        I: Read1D<F> + ?Sized;
}

/// 1D Welch PSD capability.
pub trait WelchPsd1D {
    /// Estimate the one-sided PSD and allocate `(freqs, pxx)`.
    fn run_alloc<I>(&self, input: &I) -> Result<(Vec<f64>, Vec<f64>)>
    where
        I: Read1D<f64> + ?Sized;
}

/// 1D analytic-signal capability.
pub trait AnalyticSignal1D {
    /// Compute `x + j * hilbert(x)` and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<Complex<f64>>>
    where
        I: Read1D<f64> + ?Sized;
}
