use biopeaks_core::{Error, Result};
use nalgebra::RealField;

/// Odd extension of `x` by `padlen` samples on both ends, mirroring each edge through its end
/// value.
///
/// Used by [super::sosfiltfilt_checked_slice] before the forward-backward pass. `x` must be
/// longer than `padlen`.
pub(crate) fn odd_ext<F>(x: &[F], padlen: usize) -> Result<Vec<F>>
where
    F: RealField + Copy,
{
    let n = x.len();
    if n <= padlen {
        return Err(Error::InvalidInput {
            reason: format!(
                "the signal needs more than {padlen} samples for stable filtering, got {n}."
            ),
        });
    }

    let first = x[0];
    let last = x[n - 1];
    let mut ext = Vec::with_capacity(n + 2 * padlen);
    ext.extend((1..=padlen).rev().map(|i| first + first - x[i]));
    ext.extend_from_slice(x);
    ext.extend((1..=padlen).map(|i| last + last - x[n - 1 - i]));
    Ok(ext)
}
