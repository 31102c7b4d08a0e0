//! Peak-finding helpers analogous to `scipy.signal` peak APIs.

use biopeaks_core::{Error, Result};
use num_traits::Float;

/// Prominence result bundle for [`peak_prominences`].
#[derive(Debug, Clone, PartialEq)]
pub struct PeakProminencesResult<F>
where
    F: Float + Copy,
{
    /// Prominence value for each input peak index.
    pub prominences: Vec<F>,
    /// Left base index for each peak.
    pub left_bases: Vec<usize>,
    /// Right base index for each peak.
    pub right_bases: Vec<usize>,
}

/// Indices `i` where `comparator(x[i], x[j])` holds for every `j` within `order` samples.
///
/// The first and last `order` samples never qualify.
pub fn argrelextrema<F, C>(x: &[F], comparator: C, order: usize) -> Vec<usize>
where
    F: PartialOrd + Copy,
    C: Fn(F, F) -> bool,
{
    if order == 0 || x.len() <= 2 * order {
        return Vec::new();
    }
    x.windows(2 * order + 1)
        .enumerate()
        .filter(|(_, w)| {
            let center = w[order];
            w[..order]
                .iter()
                .chain(&w[order + 1..])
                .all(|&v| comparator(center, v))
        })
        .map(|(start, _)| start + order)
        .collect()
}

/// Strict relative maxima.
pub fn argrelmax<F>(x: &[F], order: usize) -> Vec<usize>
where
    F: PartialOrd + Copy,
{
    argrelextrema(x, |a, b| a > b, order)
}

/// Strict relative minima.
pub fn argrelmin<F>(x: &[F], order: usize) -> Vec<usize>
where
    F: PartialOrd + Copy,
{
    argrelextrema(x, |a, b| a < b, order)
}

/// Lowest sample, and its index, met while walking from `peak` along `path` until the signal
/// rises above the peak.
fn side_base<F, I>(x: &[F], peak: usize, path: I) -> (F, usize)
where
    F: Float,
    I: Iterator<Item = usize>,
{
    let top = x[peak];
    path.map(|i| (x[i], i))
        .take_while(|&(v, _)| v <= top)
        .fold((top, peak), |best, cur| if cur.0 < best.0 { cur } else { best })
}

/// Topographic prominence of each peak with the bases it is measured from.
///
/// Every index in `peaks` must lie inside `x`.
pub fn peak_prominences<F>(x: &[F], peaks: &[usize]) -> Result<PeakProminencesResult<F>>
where
    F: Float + Copy,
{
    if let Some(&bad) = peaks.iter().find(|&&p| p >= x.len()) {
        return Err(Error::InvalidArg {
            arg: "peaks".into(),
            reason: format!("peak index {bad} is outside a signal of {}", x.len()),
        });
    }

    let mut out = PeakProminencesResult {
        prominences: Vec::with_capacity(peaks.len()),
        left_bases: Vec::with_capacity(peaks.len()),
        right_bases: Vec::with_capacity(peaks.len()),
    };
    for &peak in peaks {
        let (left_min, left) = side_base(x, peak, (0..peak).rev());
        let (right_min, right) = side_base(x, peak, peak + 1..x.len());
        out.prominences.push(x[peak] - left_min.max(right_min));
        out.left_bases.push(left);
        out.right_bases.push(right);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn argrel_variants_find_expected_indices() {
        let x = [0.0f64, 1.0, 0.0, -1.0, 0.0, 2.0, 1.0];
        assert_eq!(argrelmax(&x, 1), vec![1, 5]);
        assert_eq!(argrelmin(&x, 1), vec![3]);
        assert_eq!(argrelextrema(&x, |a, b| a > b, 1), vec![1, 5]);
    }

    #[test]
    fn plateaus_and_edges_are_not_strict_extrema() {
        let x = [3.0f64, 1.0, 1.0, 0.0, 2.0, 2.0, 1.0, 5.0];
        assert!(argrelmax(&x, 1).is_empty());
        assert_eq!(argrelmin(&x, 1), vec![3, 6]);
    }

    #[test]
    fn prominences_use_the_higher_of_both_bases() {
        let x = [0.0f64, 1.0, 0.2, 0.8, 0.1, 2.0, 0.0];
        let prom = peak_prominences(&x, &[1, 3, 5]).expect("valid peaks");
        assert_abs_diff_eq!(prom.prominences[0], 0.9, epsilon = 1e-12);
        assert_abs_diff_eq!(prom.prominences[1], 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(prom.prominences[2], 2.0, epsilon = 1e-12);
        assert_eq!(prom.left_bases, vec![0, 2, 0]);
        assert_eq!(prom.right_bases, vec![4, 4, 6]);
    }

    #[test]
    fn wider_windows_need_more_support() {
        let x = [0.0f64, 2.0, 1.0, 3.0, 2.5, 2.6, 0.0];
        assert_eq!(argrelmax(&x, 1), vec![1, 3, 5]);
        assert_eq!(argrelmax(&x, 2), vec![3]);
        assert!(argrelmax(&x, 4).is_empty());
    }

    #[test]
    fn prominences_reject_out_of_range_peaks() {
        let x = [0.0f64, 1.0, 0.0];
        assert!(peak_prominences(&x, &[3]).is_err());
    }
}
