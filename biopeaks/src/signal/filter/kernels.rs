use crate::kernel::{ConfigError, KernelLifecycle, Read1D};
use crate::signal::traits::SosFiltFilt1D;
use biopeaks_core::Result;
use nalgebra::RealField;

use super::design::{ButterConfig, ButterKernel, Sos};
use super::sosfiltfilt_checked_slice;

/// Constructor config for [`SosFiltFiltKernel`].
#[derive(Debug, Clone)]
pub struct SosFiltFiltConfig<F>
where
    F: RealField + Copy,
{
    /// Second-order sections used for forward-backward filtering.
    pub sos: Vec<Sos<F>>,
    /// Length of the odd edge extension; `None` uses three times the number of taps.
    pub padlen: Option<usize>,
}

/// Stateless 1D `sosfiltfilt` kernel.
#[derive(Debug, Clone)]
pub struct SosFiltFiltKernel<F>
where
    F: RealField + Copy,
{
    sos: Vec<Sos<F>>,
    padlen: Option<usize>,
}

impl<F> KernelLifecycle for SosFiltFiltKernel<F>
where
    F: RealField + Copy,
{
    type Config = SosFiltFiltConfig<F>;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        if config.sos.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "sos" });
        }
        Ok(Self {
            sos: config.sos,
            padlen: config.padlen,
        })
    }
}

impl SosFiltFiltKernel<f64> {
    /// Zero-phase Butterworth band-pass kernel with odd padding of the default length.
    pub fn bandpass(config: ButterConfig) -> Result<Self> {
        let sos = ButterKernel::try_new(config)?.sos()?;
        Ok(Self::try_new(SosFiltFiltConfig {
            sos,
            padlen: None,
        })?)
    }
}

impl<F> SosFiltFiltKernel<F>
where
    F: RealField + Copy,
{
    /// Sections of the cascade.
    pub fn sos(&self) -> &[Sos<F>] {
        &self.sos
    }
}

impl<F> SosFiltFilt1D<F> for SosFiltFiltKernel<F>
where
    F: RealField + Copy,
{
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<F>>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice()?;
        sosfiltfilt_checked_slice(input, &self.sos, self.padlen)
    }
}
