use biopeaks_core::{Error, Result};
use nalgebra::RealField;

use super::{design::Sos, odd_ext, sosfilt_checked_slice, sosfilt_zi_checked_slice};

/// Default edge length of the forward-backward pass: three times the number of taps of the
/// equivalent transfer function, discounting trivial trailing coefficients.
pub fn default_padlen<F>(sos: &[Sos<F>]) -> usize
where
    F: RealField + Copy,
{
    let n = sos.len();
    let bzeros = sos.iter().filter(|s| s.b[2] == F::zero()).count();
    let azeros = sos.iter().filter(|s| s.a[2] == F::zero()).count();
    3 * (2 * n + 1 - bzeros.min(azeros))
}

///
/// A forward-backward digital filter using cascaded second-order sections, with odd
/// extension of `padlen` samples (default [`default_padlen`]) at both ends.
///
/// <https://docs.scipy.org/doc/scipy/reference/generated/scipy.signal.sosfiltfilt.html#scipy.signal.sosfiltfilt>
///
pub fn sosfiltfilt_checked_slice<F>(
    y: &[F],
    sos: &[Sos<F>],
    padlen: Option<usize>,
) -> Result<Vec<F>>
where
    F: RealField + Copy,
{
    if y.is_empty() {
        return Err(Error::InvalidInput {
            reason: "input must be non-empty.".into(),
        });
    }
    let y_len = y.len();
    let padlen = padlen.unwrap_or_else(|| default_padlen(sos));
    let ext = odd_ext(y, padlen)?;

    let mut init_sos = sos.to_vec();
    sosfilt_zi_checked_slice(init_sos.as_mut_slice())?;

    let x0 = ext[0];
    let mut sos_x = init_sos.clone();
    for s in sos_x.iter_mut() {
        s.zi0 *= x0;
        s.zi1 *= x0;
    }
    let y = sosfilt_checked_slice(ext.as_slice(), sos_x.as_mut_slice());

    let y0 = *y.last().ok_or(Error::InvalidInput {
        reason: "input must be non-empty.".into(),
    })?;
    let mut sos_y = init_sos;
    for s in sos_y.iter_mut() {
        s.zi0 *= y0;
        s.zi1 *= y0;
    }
    let mut y_rev = y;
    y_rev.reverse();
    let mut z = sosfilt_checked_slice(y_rev.as_slice(), sos_y.as_mut_slice());
    z = z.into_iter().skip(padlen).take(y_len).collect::<Vec<_>>();
    z.reverse();
    Ok(z)
}

///
/// Forward-backward filtering with odd padding of the default length.
///
#[inline]
pub fn sosfiltfilt_dyn<F>(y: &[F], sos: &[Sos<F>]) -> Result<Vec<F>>
where
    F: RealField + Copy,
{
    sosfiltfilt_checked_slice(y, sos, None)
}
