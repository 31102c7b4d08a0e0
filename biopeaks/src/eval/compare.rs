use serde::Serialize;

/// Outcome of matching detections against reference annotations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Comparison {
    /// Detections matched to an annotation.
    pub true_positives: usize,
    /// Detections without a matching annotation.
    pub false_positives: usize,
    /// Annotations without a matching detection.
    pub false_negatives: usize,
}

impl Comparison {
    /// `TP / (TP + FN)`, `None` when there are no annotations.
    pub fn sensitivity(&self) -> Option<f64> {
        let denom = self.true_positives + self.false_negatives;
        (denom > 0).then(|| self.true_positives as f64 / denom as f64)
    }

    /// `TP / (TP + FP)`, `None` when there are no detections.
    pub fn precision(&self) -> Option<f64> {
        let denom = self.true_positives + self.false_positives;
        (denom > 0).then(|| self.true_positives as f64 / denom as f64)
    }
}

/// Match `detected` against `reference` one-to-one.
///
/// A detection and an annotation may pair when they are at most `tolerance` samples apart.
/// Pairs are committed closest first, ties going to the earlier annotation and then the
/// earlier detection, and each sample takes part in at most one pair. Inputs may be in any order.
pub fn compare_annotations(detected: &[usize], reference: &[usize], tolerance: usize) -> Comparison {
    let mut det = detected.to_vec();
    det.sort_unstable();
    let mut refs = reference.to_vec();
    refs.sort_unstable();

    // (distance, reference position, detection position)
    let mut pairs = Vec::new();
    for (r, &at) in refs.iter().enumerate() {
        let lo = det.partition_point(|&d| d + tolerance < at);
        for (k, &d) in det[lo..].iter().enumerate() {
            let dist = d.abs_diff(at);
            if d > at && dist > tolerance {
                break;
            }
            pairs.push((dist, r, lo + k));
        }
    }
    pairs.sort_unstable();

    let mut ref_used = vec![false; refs.len()];
    let mut det_used = vec![false; det.len()];
    let mut tp = 0;
    for (_, r, d) in pairs {
        if !ref_used[r] && !det_used[d] {
            ref_used[r] = true;
            det_used[d] = true;
            tp += 1;
        }
    }

    Comparison {
        true_positives: tp,
        false_positives: det.len() - tp,
        false_negatives: refs.len() - tp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn matches_within_tolerance() {
        let c = compare_annotations(&[101, 199, 305], &[100, 200, 300], 5);
        assert_eq!(
            c,
            Comparison {
                true_positives: 3,
                false_positives: 0,
                false_negatives: 0
            }
        );
        assert_eq!(c.sensitivity(), Some(1.0));
        assert_eq!(c.precision(), Some(1.0));
    }

    #[test]
    fn each_annotation_matches_once() {
        // Two detections compete for 100; the closer one wins, the other is a false positive.
        let c = compare_annotations(&[98, 101, 400], &[100, 300], 5);
        assert_eq!(c.true_positives, 1);
        assert_eq!(c.false_positives, 2);
        assert_eq!(c.false_negatives, 1);
        assert_relative_eq!(c.sensitivity().unwrap_or_default(), 0.5);
        assert_relative_eq!(c.precision().unwrap_or_default(), 1.0 / 3.0);
    }

    #[test]
    fn nearest_pair_is_committed_first() {
        // 104 is 4 from 100 and 1 from 105; pairing it with 105 frees 100 for 97.
        let c = compare_annotations(&[97, 104], &[100, 105], 5);
        assert_eq!(c.true_positives, 2);
    }

    #[test]
    fn empty_inputs_give_undefined_ratios() {
        let c = compare_annotations(&[], &[], 5);
        assert_eq!(c.sensitivity(), None);
        assert_eq!(c.precision(), None);
        let c = compare_annotations(&[10], &[], 5);
        assert_eq!(c.false_positives, 1);
        assert_eq!(c.precision(), Some(0.0));
    }
}
