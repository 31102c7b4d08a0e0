//! Unsupervised R-peak detection for single-lead physiological recordings.
//!
//! The detector band-limits the raw waveform, takes every local extremum as a candidate,
//! describes the candidates with a handful of features, clusters them, and keeps the cluster
//! whose size and amplitude best match a heart rate estimated from the power spectrum. Pairs of
//! peaks that sit implausibly close are then pruned.
//!
//! ```no_run
//! use biopeaks::{detect, DetectConfig};
//!
//! # fn load() -> Vec<f64> { vec![] }
//! let ecg: Vec<f64> = load();
//! let peaks = detect(&ecg, 250.0, &DetectConfig::default())?;
//! println!("{} beats", peaks.len());
//! # Ok::<(), biopeaks::Error>(())
//! ```
//!
//! The building blocks the pipeline is made of live in [`signal`], [`stats`],
//! [`decomposition`] and [`cluster`] and can be used on their own. [`eval`] scores detections
//! against reference annotations.

#![deny(missing_docs)]

pub use nalgebra as na;

pub use biopeaks_core::{Error, Result};

/// Seeded k-means clustering.
pub mod cluster;

/// Principal component analysis.
pub mod decomposition;

/// The R-peak detection pipeline.
pub mod detect;

/// Scoring and benchmarking of detectors against annotations.
pub mod eval;

/// Kernel construction and input adapters shared by every stage.
pub mod kernel;

/// Signal processing.
pub mod signal;

/// Descriptive statistics.
pub mod stats;

pub use detect::{detect, ClusterCriterion, DetectConfig, Detection, Detector};
