//! Core types shared across the `biopeaks` crates.
//!
//! Holds the crate-wide [`Error`] taxonomy and a handful of numpy-analog array helpers
//! ([`num_rs`]) used by the detection pipeline.

#![deny(missing_docs)]

mod error;

/// Numpy-analog helpers over 1D slices.
pub mod num_rs;

pub use error::{Error, Result};
