use thiserror::Error as ThisError;

/// Errors raised whilst detecting peaks.
///
/// Conditions the pipeline can recover from (outlier clamping, zero-division guards) are
/// handled internally and never surface here.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// The signal is empty, too short, constant, or contains non-finite samples.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Explaining why the input was rejected.
        reason: String,
    },
    /// Fewer local extrema were found than the clustering stage requires.
    #[error("Insufficient peaks: found {found} candidates, at least {required} required.")]
    InsufficientPeaks {
        /// Number of candidates found.
        found: usize,
        /// Number of candidates required.
        required: usize,
    },
    /// A feature column or spectral estimate degenerated.
    #[error("Numerical error: {reason}")]
    Numerical {
        /// Explaining which computation degenerated.
        reason: String,
    },
    /// The chosen cluster is empty or cannot be formed.
    #[error("Degenerate cluster: {reason}")]
    DegenerateCluster {
        /// Explaining why the clustering is unusable.
        reason: String,
    },
    /// A configuration argument was rejected.
    #[error("Invalid argument `{arg}`: {reason}")]
    InvalidArg {
        /// The invalid arg.
        arg: String,
        /// Explaining why arg is invalid.
        reason: String,
    },
}

/// Result alias used throughout `biopeaks`.
pub type Result<T> = core::result::Result<T, Error>;
