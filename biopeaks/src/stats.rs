//! Descriptive statistics over 1D samples.

use core::{borrow::Borrow, iter::Sum, ops::Add};
use itertools::{Itertools, MinMaxResult};
use num_traits::{Float, Num, NumCast};

// Quick select finds the `i`th smallest element with 2N comparisons
fn quickselect<B, T>(y: &[B], k: usize) -> T
where
    B: Borrow<T>,
    T: Num + NumCast + PartialOrd + Copy,
{
    let n = y.len();
    if n == 1 {
        return *y[0].borrow();
    }

    let pivot = *y[n / 2].borrow();
    let lower = y
        .iter()
        .map(|yi| *yi.borrow())
        .filter(|yi| *yi < pivot)
        .collect::<Vec<T>>();
    let lowers = lower.len();
    let upper = y
        .iter()
        .map(|yi| *yi.borrow())
        .filter(|yi| *yi > pivot)
        .collect::<Vec<T>>();
    let uppers = upper.len();
    let pivots = n - lowers - uppers;

    if k < lowers {
        quickselect(&lower, k)
    } else if k < lowers + pivots {
        pivot
    } else {
        quickselect(&upper, k - lowers - pivots)
    }
}

///
/// Compute the median of the signal, `y`
///
/// Return the median and the number of points averaged
///
/// ```
/// use approx::assert_relative_eq;
/// use biopeaks::stats::median;
///
/// let y: [f64; 5] = [1.,2.,3.,4.,5.];
/// assert_relative_eq!(3f64, median(y.iter()).0);
///
/// let y: [f64; 4] = [1.,2.,3.,4.];
/// assert_relative_eq!(2.5f64, median(y.iter()).0);
///
/// let y: [f64; 6] = [3.,1.,4.,2.,3.,5.];
/// assert_relative_eq!(3f64, median(y.iter()).0);
///
/// let y: &[f32] = &[];
/// assert_eq!((0f32, 0), median(y.iter()));
/// ```
///
pub fn median<YI, T>(y: YI) -> (T, usize)
where
    T: Num + NumCast + PartialOrd + Copy + Default,
    YI: Iterator,
    YI::Item: Borrow<T>,
{
    // Materialize the values in the iterator in order to run O(n) quick select
    let y = y.collect::<Vec<_>>();
    let n = y.len();

    if n == 0 {
        Default::default()
    } else if n == 1 {
        (*y[0].borrow(), 1)
    } else if n % 2 == 1 {
        (quickselect(&y, n / 2), n)
    } else {
        let two = T::one() + T::one();
        (
            (quickselect(&y, n / 2 - 1) + quickselect(&y, n / 2)) / two,
            n,
        )
    }
}

///
/// Compute the mean of the signal, `y`
///
/// Return the mean and the number of points averaged
///
/// ```
/// use approx::assert_relative_eq;
/// use biopeaks::stats::mean;
///
/// let y: [f64; 5] = [1.,2.,3.,4.,5.];
/// assert_relative_eq!(3f64, mean(y.iter()).0);
///
/// let y: &[f32] = &[];
/// assert_eq!((0f32, 0), mean(y.iter()));
/// ```
///
pub fn mean<YI, F>(y: YI) -> (F, usize)
where
    F: Float + Default + Add,
    YI: Iterator,
    YI::Item: Borrow<F>,
{
    let (sum, count) = y.fold((F::zero(), 0usize), |acc, yi| {
        (acc.0 + *yi.borrow(), acc.1 + 1)
    });
    match F::from(count) {
        Some(n) if count > 0 => (sum / n, count),
        _ => Default::default(),
    }
}

///
/// Compute the population variance of the signal, `y`
///
/// Return the variance and the number of points averaged
///
/// ```
/// use approx::assert_relative_eq;
/// use biopeaks::stats::variance;
///
/// let y: [f64; 5] = [1.,2.,3.,4.,5.];
/// assert_relative_eq!(2f64, variance(y.iter()).0);
/// ```
///
pub fn variance<YI, F>(y: YI) -> (F, usize)
where
    F: Float + Default + Sum,
    YI: Iterator + Clone,
    YI::Item: Borrow<F>,
{
    let (avg, n) = mean(y.clone());
    let sum: F = y
        .map(|f| {
            let delta = *f.borrow() - avg;
            delta * delta
        })
        .sum::<F>();
    match F::from(n) {
        Some(count) if n > 0 => (sum / count, n),
        _ => Default::default(),
    }
}

///
/// Compute the population standard deviation of the signal, `y`
///
/// ```
/// use approx::assert_relative_eq;
/// use biopeaks::stats::stdev;
///
/// let y: [f64; 5] = [1.,2.,3.,4.,5.];
/// assert_relative_eq!(1.41421356237, stdev(y.iter()).0, max_relative = 1e-8);
/// ```
pub fn stdev<YI, F>(y: YI) -> (F, usize)
where
    F: Float + Default + Sum,
    YI: Iterator + Clone,
    YI::Item: Borrow<F>,
{
    match variance(y) {
        (_, 0) => Default::default(),
        (v, n) => (v.sqrt(), n),
    }
}

///
/// The `q`-th percentile (`0..=100`) of `y` with linear interpolation between closest ranks,
/// as `numpy.percentile` with its default method. `None` for empty input or `q` out of range.
///
/// ```
/// use biopeaks::stats::percentile;
///
/// let y = [1.0f64, 2.0, 3.0, 4.0];
/// assert_eq!(percentile(&y, 50.0), Some(2.5));
/// assert_eq!(percentile(&y, 100.0), Some(4.0));
/// assert_eq!(percentile::<f64>(&[], 50.0), None);
/// ```
pub fn percentile<F>(y: &[F], q: F) -> Option<F>
where
    F: Float,
{
    let hundred = F::from(100.0)?;
    if y.is_empty() || !(q >= F::zero() && q <= hundred) {
        return None;
    }
    let mut sorted = y.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
    let rank = q / hundred * F::from(sorted.len() - 1)?;
    let lo = rank.floor();
    let frac = rank - lo;
    let lo = lo.to_usize()?;
    let hi = (lo + 1).min(sorted.len() - 1);
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

///
/// Min-max scale `y` into `[0, 1]`. A constant input maps to zeros.
///
/// ```
/// use biopeaks::stats::min_max_scale;
///
/// assert_eq!(min_max_scale(&[2.0f64, 4.0, 3.0]), vec![0.0, 1.0, 0.5]);
/// assert_eq!(min_max_scale(&[7.0f64, 7.0]), vec![0.0, 0.0]);
/// ```
pub fn min_max_scale<F>(y: &[F]) -> Vec<F>
where
    F: Float,
{
    let (lo, hi) = match y
        .iter()
        .copied()
        .minmax_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal))
    {
        MinMaxResult::NoElements => return Vec::new(),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };
    let range = hi - lo;
    let range = if range == F::zero() { F::one() } else { range };
    y.iter().map(|v| (*v - lo) / range).collect()
}
