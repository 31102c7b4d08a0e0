use super::candidates::CandidateSet;
use crate::decomposition::PcaKernel;
use crate::signal::{peak::peak_prominences, spectral::hilbert};
use crate::stats::{mean, min_max_scale};
use biopeaks_core::{
    num_rs::{abs_diff, diff, unwrap},
    Error, Result,
};
use core::f64::consts::PI;
use nalgebra::DMatrix;

/// Number of descriptors per candidate.
pub const FEATURE_COUNT: usize = 4;

const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["amplitude", "instantaneous frequency", "prominence", "slope"];

/// A local extremum and its descriptors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Position in the signal.
    pub index: usize,
    /// Filtered value at `index`.
    pub amplitude: f64,
    /// Instantaneous frequency at `index`, in Hz.
    pub instantaneous_frequency: f64,
    /// Topographic prominence; minima are measured on the inverted signal.
    pub prominence: f64,
    /// Mean absolute first difference between the neighbouring candidates; 0 at both ends.
    pub slope: f64,
}

/// Candidate descriptors at every stage of the reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    /// Candidates with their raw descriptors, by increasing index.
    pub candidates: Vec<Candidate>,
    /// Min-max scaled descriptors, one row per candidate. Columns are amplitude,
    /// instantaneous frequency, prominence and slope.
    pub scaled: DMatrix<f64>,
    /// Scaled descriptors projected onto the kept principal axes.
    pub reduced: DMatrix<f64>,
    /// Variance fraction carried by each kept axis.
    pub explained_variance_ratio: Vec<f64>,
}

/// Instantaneous frequency of every sample transition, in Hz. One shorter than `x`.
pub fn instantaneous_frequency(x: &[f64], sampling_rate: f64) -> Result<Vec<f64>> {
    let phase: Vec<f64> = hilbert(x)?.iter().map(|c| c.arg()).collect();
    Ok(diff(&unwrap(&phase))
        .into_iter()
        .map(|d| d / (2.0 * PI) * sampling_rate)
        .collect())
}

fn slopes(x: &[f64], indices: &[usize]) -> Vec<f64> {
    let first_diff = abs_diff(x);
    let mut out = vec![0.0; indices.len()];
    for (p, w) in indices.windows(3).enumerate() {
        out[p + 1] = mean(first_diff[w[0]..w[2]].iter()).0;
    }
    out
}

fn prominences(x: &[f64], set: &CandidateSet) -> Result<Vec<f64>> {
    let mut at = vec![0.0; x.len()];
    let pos = peak_prominences(x, &set.maxima)?;
    for (&i, p) in set.maxima.iter().zip(pos.prominences) {
        at[i] = p;
    }
    let inverted: Vec<f64> = x.iter().map(|v| -v).collect();
    let neg = peak_prominences(&inverted, &set.minima)?;
    for (&i, p) in set.minima.iter().zip(neg.prominences) {
        at[i] = p;
    }
    Ok(set.indices.iter().map(|&i| at[i]).collect())
}

/// Describes candidates and reduces the descriptors for clustering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureBuilder {
    sampling_rate: f64,
    pca: PcaKernel,
}

impl FeatureBuilder {
    /// Builder for signals sampled at `sampling_rate` Hz.
    pub fn new(sampling_rate: f64, pca: PcaKernel) -> Self {
        Self { sampling_rate, pca }
    }

    /// Describe each candidate of `filtered`, scale every descriptor to `[0, 1]` and keep the
    /// principal axes the PCA kernel asks for.
    pub fn build(&self, filtered: &[f64], set: &CandidateSet) -> Result<Features> {
        let inst_freq = instantaneous_frequency(filtered, self.sampling_rate)?;
        let slope = slopes(filtered, &set.indices);
        let prominence = prominences(filtered, set)?;

        let candidates: Vec<Candidate> = set
            .indices
            .iter()
            .enumerate()
            .map(|(k, &i)| Candidate {
                index: i,
                amplitude: filtered[i],
                instantaneous_frequency: inst_freq[i],
                prominence: prominence[k],
                slope: slope[k],
            })
            .collect();

        let columns: [Vec<f64>; FEATURE_COUNT] = [
            candidates.iter().map(|c| c.amplitude).collect(),
            candidates.iter().map(|c| c.instantaneous_frequency).collect(),
            candidates.iter().map(|c| c.prominence).collect(),
            candidates.iter().map(|c| c.slope).collect(),
        ];
        for (col, name) in columns.iter().zip(FEATURE_NAMES) {
            if col.iter().any(|v| !v.is_finite()) {
                return Err(Error::Numerical {
                    reason: format!("{name} feature has non-finite values."),
                });
            }
        }

        let n = candidates.len();
        let mut scaled = DMatrix::<f64>::zeros(n, FEATURE_COUNT);
        for (j, col) in columns.iter().enumerate() {
            for (i, v) in min_max_scale(col).into_iter().enumerate() {
                scaled[(i, j)] = v;
            }
        }

        let fit = self.pca.fit_transform(&scaled)?;
        Ok(Features {
            candidates,
            scaled,
            reduced: fit.transformed,
            explained_variance_ratio: fit.explained_variance_ratio,
        })
    }
}
