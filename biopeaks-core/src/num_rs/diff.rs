use core::ops::Sub;

/// First discrete difference, `out[i] = x[i + 1] - x[i]`.
///
/// Returns an empty vector when `x` has fewer than two elements.
///
/// ```
/// use biopeaks_core::num_rs::diff;
///
/// assert_eq!(diff(&[1.0, 4.0, 2.0]), vec![3.0, -2.0]);
/// assert!(diff::<f64>(&[1.0]).is_empty());
/// ```
pub fn diff<T>(x: &[T]) -> Vec<T>
where
    T: Copy + Sub<Output = T>,
{
    x.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Absolute first discrete difference, `out[i] = |x[i + 1] - x[i]|`.
pub fn abs_diff<T>(x: &[T]) -> Vec<T>
where
    T: num_traits::Float,
{
    x.windows(2).map(|w| (w[1] - w[0]).abs()).collect()
}
