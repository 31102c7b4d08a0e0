//! Scoring detections against reference annotations, and a benchmark driver built on it.

mod bench;
mod compare;

pub use bench::*;
pub use compare::*;
