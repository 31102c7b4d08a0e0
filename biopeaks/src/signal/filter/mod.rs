//! Zero-phase IIR filtering built from cascaded second-order sections.
//!
//! Mirrors the `butter(..., output="sos")` / `sosfiltfilt` pair of `scipy.signal`.

/// Digital IIR filter design.
pub mod design;

mod ext;
mod kernels;
mod sosfilt;
mod sosfiltfilt;

pub use ext::*;
pub use kernels::*;
pub use sosfilt::*;
pub use sosfiltfilt::*;
