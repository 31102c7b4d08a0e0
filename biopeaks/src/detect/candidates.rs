use crate::signal::peak::{argrelmax, argrelmin};
use biopeaks_core::{num_rs::union1d, Error, Result};

/// Fewest candidates the clustering stage can work with.
pub const MIN_CANDIDATES: usize = 4;

/// Strict local extrema of a filtered signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    /// Local maxima, increasing.
    pub maxima: Vec<usize>,
    /// Local minima, increasing.
    pub minima: Vec<usize>,
    /// Union of both, increasing and unique.
    pub indices: Vec<usize>,
}

impl CandidateSet {
    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// `true` if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Every strict local maximum and minimum of `filtered`. The first and last samples are never
/// candidates.
pub fn extract_candidates(filtered: &[f64]) -> Result<CandidateSet> {
    let maxima = argrelmax(filtered, 1);
    let minima = argrelmin(filtered, 1);
    let indices = union1d(&maxima, &minima);
    if indices.len() < MIN_CANDIDATES {
        return Err(Error::InsufficientPeaks {
            found: indices.len(),
            required: MIN_CANDIDATES,
        });
    }
    Ok(CandidateSet {
        maxima,
        minima,
        indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_maxima_and_minima() {
        let x = [0.0, 2.0, 1.0, 3.0, -1.0, 0.5, 0.5, 0.0];
        let set = extract_candidates(&x).expect("candidates");
        assert_eq!(set.maxima, vec![1, 3]);
        assert_eq!(set.minima, vec![2, 4]);
        assert_eq!(set.indices, vec![1, 2, 3, 4]);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn edges_and_plateaus_are_not_candidates() {
        let x = [5.0, 1.0, 1.0, 4.0, 4.0, 0.0];
        let err = extract_candidates(&x).expect_err("too few");
        assert_eq!(
            err,
            Error::InsufficientPeaks {
                found: 0,
                required: MIN_CANDIDATES
            }
        );
    }

    #[test]
    fn monotone_signal_has_no_candidates() {
        let x: Vec<f64> = (0..50).map(f64::from).collect();
        assert!(matches!(
            extract_candidates(&x),
            Err(Error::InsufficientPeaks { found: 0, .. })
        ));
    }
}
