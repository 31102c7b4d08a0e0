use core::cmp::Ordering;

/// Sorted union of two sorted slices without duplicates, as `numpy.union1d`.
///
/// Both inputs must already be sorted ascending.
///
/// ```
/// use biopeaks_core::num_rs::union1d;
///
/// assert_eq!(union1d(&[1usize, 4, 9], &[2, 4, 7]), vec![1, 2, 4, 7, 9]);
/// ```
pub fn union1d<T>(a: &[T], b: &[T]) -> Vec<T>
where
    T: Ord + Copy,
{
    let mut out: Vec<T> = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let next = match (a.get(i), b.get(j)) {
            (Some(&x), Some(&y)) => match x.cmp(&y) {
                Ordering::Less => {
                    i += 1;
                    x
                }
                Ordering::Greater => {
                    j += 1;
                    y
                }
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                    x
                }
            },
            (Some(&x), None) => {
                i += 1;
                x
            }
            (None, Some(&y)) => {
                j += 1;
                y
            }
            (None, None) => break,
        };
        if out.last() != Some(&next) {
            out.push(next);
        }
    }
    out
}
