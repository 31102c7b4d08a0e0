use super::config::ClusterCriterion;
use super::features::Candidate;
use super::heart_rate::HeartRateEstimate;
use crate::cluster::KMeansKernel;
use crate::stats::median;
use biopeaks_core::{Error, Result};
use log::debug;
use nalgebra::DMatrix;

/// The partition of the candidates and the cluster taken for heartbeats.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSelection {
    /// Cluster label of every candidate.
    pub labels: Vec<usize>,
    /// Criterion value of every cluster, indexed by label.
    pub scores: Vec<f64>,
    /// Label of the winning cluster.
    pub selected_label: usize,
    /// Signal indices of the winning cluster's members, increasing.
    pub peaks: Vec<usize>,
    /// Distance of each entry of `peaks` to the winning centroid, in feature space.
    pub distances: Vec<f64>,
}

/// Cluster `features` (one row per candidate) and pick the cluster that best looks like the
/// heartbeats announced by `estimate`.
pub fn select_peak_cluster(
    features: &DMatrix<f64>,
    candidates: &[Candidate],
    estimate: &HeartRateEstimate,
    kmeans: &KMeansKernel,
    criterion: ClusterCriterion,
) -> Result<ClusterSelection> {
    if features.nrows() != candidates.len() {
        return Err(Error::InvalidArg {
            arg: "features".into(),
            reason: format!(
                "{} feature rows for {} candidates",
                features.nrows(),
                candidates.len()
            ),
        });
    }
    let fit = kmeans.fit(features)?;
    let sizes = fit.cluster_sizes();

    let scores: Vec<f64> = sizes
        .iter()
        .enumerate()
        .map(|(label, &size)| {
            let amplitudes = candidates
                .iter()
                .zip(&fit.labels)
                .filter(|&(_, &l)| l == label)
                .map(|(c, _)| c.amplitude.abs());
            let (med, _) = median::<_, f64>(amplitudes);
            criterion.score(med, size, estimate.expected_beat_count)
        })
        .collect();

    let mut selected_label = 0;
    for (label, score) in scores.iter().enumerate() {
        if score.total_cmp(&scores[selected_label]).is_gt() {
            selected_label = label;
        }
    }
    debug!(
        "clusters: sizes {sizes:?}, scores {scores:?}, expected {:.1} beats, picked {selected_label}",
        estimate.expected_beat_count
    );

    let (peaks, distances): (Vec<usize>, Vec<f64>) = candidates
        .iter()
        .zip(&fit.labels)
        .zip(&fit.distances)
        .filter(|&((_, &l), _)| l == selected_label)
        .map(|((c, _), &d)| (c.index, d))
        .unzip();
    if peaks.is_empty() {
        return Err(Error::DegenerateCluster {
            reason: format!("cluster {selected_label} has no members."),
        });
    }

    Ok(ClusterSelection {
        labels: fit.labels,
        scores,
        selected_label,
        peaks,
        distances,
    })
}
