//! Butterworth band-pass design in second-order-section form.
//!
//! The design follows the classic analog route: a normalised Butterworth prototype is shifted
//! to a band-pass with [`lp2bp`], mapped to the z-plane with the bilinear transform and the
//! resulting poles are paired into biquads.

use crate::kernel::{require_positive, ConfigError, KernelLifecycle};
use biopeaks_core::{Error, Result};
use core::f64::consts::PI;
use nalgebra::{Complex, RealField};

/// One second-order section (biquad) with its transposed direct-form II state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sos<F>
where
    F: RealField + Copy,
{
    /// Numerator coefficients `b0, b1, b2`.
    pub b: [F; 3],
    /// Denominator coefficients `a0 (= 1), a1, a2`.
    pub a: [F; 3],
    /// First delay element.
    pub zi0: F,
    /// Second delay element.
    pub zi1: F,
}

impl<F> Sos<F>
where
    F: RealField + Copy,
{
    /// Build a section, normalising both polynomials by `a[0]`.
    pub fn new(b: [F; 3], a: [F; 3]) -> Self {
        let a0 = a[0];
        Sos {
            b: [b[0] / a0, b[1] / a0, b[2] / a0],
            a: [F::one(), a[1] / a0, a[2] / a0],
            zi0: F::zero(),
            zi1: F::zero(),
        }
    }

    /// Parse a flat `[b0, b1, b2, a0, a1, a2, ...]` layout as emitted by scipy.
    pub fn from_scipy_dyn(order: usize, sos: Vec<F>) -> Vec<Sos<F>> {
        sos.chunks_exact(6)
            .take(order)
            .map(|s| Sos::new([s[0], s[1], s[2]], [s[3], s[4], s[5]]))
            .collect()
    }
}

/// Constructor config for [`ButterKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButterConfig {
    /// Prototype order; the band-pass has `2 * order` poles and `order` sections.
    pub order: usize,
    /// Lower cutoff in Hz.
    pub low_hz: f64,
    /// Upper cutoff in Hz.
    pub high_hz: f64,
    /// Sampling frequency in Hz.
    pub fs: f64,
}

/// Butterworth band-pass design kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButterKernel {
    order: usize,
    wn: [f64; 2],
}

impl KernelLifecycle for ButterKernel {
    type Config = ButterConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        if config.order == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "order",
                reason: "order must be greater than zero",
            });
        }
        require_positive("fs", config.fs)?;
        require_positive("low_hz", config.low_hz)?;
        require_positive("high_hz", config.high_hz)?;
        let nyq = 0.5 * config.fs;
        if config.low_hz >= config.high_hz {
            return Err(ConfigError::InvalidArgument {
                arg: "low_hz",
                reason: "low cutoff must be below the high cutoff",
            });
        }
        if config.high_hz >= nyq {
            return Err(ConfigError::InvalidArgument {
                arg: "high_hz",
                reason: "high cutoff must be below the Nyquist frequency",
            });
        }
        Ok(Self {
            order: config.order,
            wn: [config.low_hz / nyq, config.high_hz / nyq],
        })
    }
}

impl ButterKernel {
    /// Critical frequencies normalised to Nyquist.
    pub fn wn(&self) -> [f64; 2] {
        self.wn
    }

    /// Design the band-pass as cascaded second-order sections.
    pub fn sos(&self) -> Result<Vec<Sos<f64>>> {
        let n = self.order;
        // Digital design is carried out at fs = 2 so that `wn` is already in half-cycles.
        let fs2 = 4.0;
        let warped = self.wn.map(|w| fs2 * (PI * w / 2.0).tan());
        let bw = warped[1] - warped[0];
        let wo = (warped[0] * warped[1]).sqrt();

        let prototype = buttap(n);
        let (zeros_at_origin, poles, gain) = lp2bp(&prototype, wo, bw);

        let mut gain = Complex::new(gain, 0.0);
        for _ in 0..zeros_at_origin {
            gain *= Complex::new(fs2, 0.0);
        }
        let mut z_poles = Vec::with_capacity(poles.len());
        for p in &poles {
            gain /= Complex::new(fs2, 0.0) - p;
            z_poles.push((Complex::new(fs2, 0.0) + p) / (Complex::new(fs2, 0.0) - p));
        }
        if z_poles.iter().any(|p| p.norm() >= 1.0) {
            return Err(Error::Numerical {
                reason: "bilinear transform produced an unstable pole".into(),
            });
        }

        let mut sections = pair_poles(&z_poles)?;
        // Poles closest to the unit circle go last.
        sections.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut sos: Vec<Sos<f64>> = sections
            .into_iter()
            .map(|(_, a1, a2)| Sos::new([1.0, 0.0, -1.0], [1.0, a1, a2]))
            .collect();
        if let Some(first) = sos.first_mut() {
            let k = gain.re;
            first.b = first.b.map(|b| b * k);
        }
        Ok(sos)
    }
}

/// Analog Butterworth prototype poles (unit cutoff, no zeros, unit gain).
fn buttap(order: usize) -> Vec<Complex<f64>> {
    let n = order as f64;
    (0..order)
        .map(|k| {
            let m = -n + 1.0 + 2.0 * k as f64;
            -Complex::from_polar(1.0, PI * m / (2.0 * n))
        })
        .collect()
}

/// Low-pass to band-pass transform of a zero-free prototype.
///
/// Returns the number of zeros placed at the origin, the band-pass poles and the gain.
fn lp2bp(poles: &[Complex<f64>], wo: f64, bw: f64) -> (usize, Vec<Complex<f64>>, f64) {
    let wo2 = Complex::new(wo * wo, 0.0);
    let mut bp = Vec::with_capacity(2 * poles.len());
    let mut lower = Vec::with_capacity(poles.len());
    for p in poles {
        let p_lp = p * (bw / 2.0);
        let root = (p_lp * p_lp - wo2).sqrt();
        bp.push(p_lp + root);
        lower.push(p_lp - root);
    }
    bp.extend(lower);
    (poles.len(), bp, bw.powi(poles.len() as i32))
}

/// Group conjugate pairs (and leftover real poles) into `(|p|, a1, a2)` denominators.
fn pair_poles(poles: &[Complex<f64>]) -> Result<Vec<(f64, f64, f64)>> {
    let tol = 1e-10;
    let mut sections = Vec::with_capacity(poles.len() / 2);
    let mut reals = Vec::new();
    for p in poles {
        if p.im.abs() <= tol * p.norm().max(1.0) {
            reals.push(p.re);
        } else if p.im > 0.0 {
            sections.push((p.norm(), -2.0 * p.re, p.norm_sqr()));
        }
    }
    if reals.len() % 2 != 0 {
        return Err(Error::Numerical {
            reason: "band-pass design produced an unpaired real pole".into(),
        });
    }
    reals.sort_by(|a, b| a.total_cmp(b));
    for pair in reals.chunks_exact(2) {
        let (p1, p2) = (pair[0], pair[1]);
        sections.push((p1.abs().max(p2.abs()), -(p1 + p2), p1 * p2));
    }
    Ok(sections)
}

/// Butterworth band-pass between `low_hz` and `high_hz` as second-order sections.
pub fn butter_bandpass(order: usize, low_hz: f64, high_hz: f64, fs: f64) -> Result<Vec<Sos<f64>>> {
    ButterKernel::try_new(ButterConfig {
        order,
        low_hz,
        high_hz,
        fs,
    })?
    .sos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Magnitude response of a SOS cascade at normalised angular frequency `w` (rad/sample).
    fn gain_at(sos: &[Sos<f64>], w: f64) -> f64 {
        let z1 = Complex::from_polar(1.0, -w);
        let z2 = z1 * z1;
        sos.iter()
            .map(|s| {
                let num = Complex::new(s.b[0], 0.0) + z1 * s.b[1] + z2 * s.b[2];
                let den = Complex::new(s.a[0], 0.0) + z1 * s.a[1] + z2 * s.a[2];
                (num / den).norm()
            })
            .product()
    }

    #[test]
    fn bandpass_has_order_sections_and_unit_passband() {
        let fs = 250.0;
        let sos = butter_bandpass(3, 1.0, 100.0, fs).expect("valid design");
        assert_eq!(sos.len(), 3);

        // Geometric centre of the band sits at unit gain for a Butterworth band-pass.
        let centre = (1.0f64 * 100.0).sqrt();
        let w = 2.0 * PI * centre / fs;
        assert_relative_eq!(gain_at(&sos, w), 1.0, epsilon = 1e-3);

        // Both edges sit at -3 dB.
        for edge in [1.0, 100.0] {
            let w = 2.0 * PI * edge / fs;
            assert_relative_eq!(gain_at(&sos, w), core::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-3);
        }

        // DC and Nyquist are rejected.
        assert!(gain_at(&sos, 1e-6) < 1e-3);
        assert!(gain_at(&sos, PI - 1e-6) < 1e-3);
    }

    #[test]
    fn designed_poles_are_stable() {
        let sos = butter_bandpass(4, 0.5, 40.0, 360.0).expect("valid design");
        for s in &sos {
            // |a2| < 1 and |a1| < 1 + a2 is the biquad stability triangle.
            assert!(s.a[2].abs() < 1.0);
            assert!(s.a[1].abs() < 1.0 + s.a[2]);
        }
    }

    #[test]
    fn design_rejects_cutoffs_outside_nyquist() {
        assert!(butter_bandpass(3, 1.0, 125.0, 250.0).is_err());
        assert!(butter_bandpass(3, 10.0, 5.0, 250.0).is_err());
        assert!(butter_bandpass(0, 1.0, 40.0, 250.0).is_err());
        assert!(matches!(
            butter_bandpass(3, -1.0, 40.0, 250.0),
            Err(Error::InvalidArg { .. })
        ));
    }

    #[test]
    fn scipy_layout_round_trips_into_sections() {
        let sos = Sos::from_scipy_dyn(1, vec![2.0f64, 0.0, -2.0, 2.0, 0.5, 0.25]);
        assert_eq!(sos.len(), 1);
        assert_eq!(sos[0].b, [1.0, 0.0, -1.0]);
        assert_eq!(sos[0].a, [1.0, 0.25, 0.125]);
    }
}
