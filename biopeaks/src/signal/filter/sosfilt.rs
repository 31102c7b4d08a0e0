use biopeaks_core::{Error, Result};
use nalgebra::RealField;

use super::design::Sos;

///
/// Filter `y` through a cascade of second-order sections, carrying each section's
/// transposed direct-form II state in place.
///
/// <https://docs.scipy.org/doc/scipy/reference/generated/scipy.signal.sosfilt.html>
///
pub fn sosfilt_checked_slice<F>(y: &[F], sos: &mut [Sos<F>]) -> Vec<F>
where
    F: RealField + Copy,
{
    y.iter()
        .map(|&x| {
            let mut v = x;
            for s in sos.iter_mut() {
                let out = s.b[0] * v + s.zi0;
                s.zi0 = s.b[1] * v - s.a[1] * out + s.zi1;
                s.zi1 = s.b[2] * v - s.a[2] * out;
                v = out;
            }
            v
        })
        .collect()
}

///
/// Initial conditions of each section for the steady state of a unit step response.
///
/// <https://docs.scipy.org/doc/scipy/reference/generated/scipy.signal.sosfilt_zi.html>
///
pub fn sosfilt_zi_checked_slice<F>(sos: &mut [Sos<F>]) -> Result<()>
where
    F: RealField + Copy,
{
    let mut scale = F::one();
    for s in sos.iter_mut() {
        let a_sum = s.a[0] + s.a[1] + s.a[2];
        if a_sum == F::zero() {
            return Err(Error::Numerical {
                reason: "section has a pole at z = 1; no steady state exists".into(),
            });
        }
        let gain = (s.b[0] + s.b[1] + s.b[2]) / a_sum;
        let zi1 = s.b[2] - s.a[2] * gain;
        let zi0 = s.b[1] - s.a[1] * gain + zi1;
        s.zi0 = zi0 * scale;
        s.zi1 = zi1 * scale;
        scale *= gain;
    }
    Ok(())
}
