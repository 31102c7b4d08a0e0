use biopeaks_core::{Error, Result};
use log::debug;

/// Drop peaks that sit closer than `min_gap` samples to their predecessor.
///
/// Every consecutive pair closer than `min_gap` keeps the member nearer its cluster centroid
/// (`distances[i]` belongs to `peaks[i]`); on a tie the left member goes. A discarded peak takes
/// a distance larger than any other so that it also loses the next pair it belongs to. The
/// survivors are scanned again until no pair conflicts, so the result keeps at least `min_gap`
/// between neighbours.
pub fn resolve_conflicts(peaks: &[usize], distances: &[f64], min_gap: f64) -> Result<Vec<usize>> {
    if peaks.len() != distances.len() {
        return Err(Error::InvalidArg {
            arg: "distances".into(),
            reason: format!("{} distances for {} peaks", distances.len(), peaks.len()),
        });
    }
    // Gaps below are computed as `peaks[p + 1] - peaks[p]` on usize.
    if peaks.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::InvalidArg {
            arg: "peaks".into(),
            reason: "must be strictly increasing".into(),
        });
    }

    let mut peaks = peaks.to_vec();
    let mut distances = distances.to_vec();
    let mut pass = 0;
    loop {
        let flagged: Vec<usize> = (0..peaks.len().saturating_sub(1))
            .filter(|&p| ((peaks[p + 1] - peaks[p]) as f64) < min_gap)
            .collect();
        if flagged.is_empty() {
            break;
        }
        pass += 1;

        let mut score = distances.clone();
        let mut discard = vec![false; peaks.len()];
        for p in flagged {
            let loser = if score[p + 1] > score[p] { p + 1 } else { p };
            discard[loser] = true;
            score[loser] = score.iter().copied().fold(f64::MIN, f64::max) + 1.0;
        }
        debug!(
            "conflict pass {pass}: discarding {} of {} peaks",
            discard.iter().filter(|d| **d).count(),
            peaks.len()
        );

        let (kept_peaks, kept_distances): (Vec<usize>, Vec<f64>) = peaks
            .iter()
            .zip(&distances)
            .zip(&discard)
            .filter(|&(_, &gone)| !gone)
            .map(|((&p, &d), _)| (p, d))
            .unzip();
        peaks = kept_peaks;
        distances = kept_distances;
    }
    Ok(peaks)
}
