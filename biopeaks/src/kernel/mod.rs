//! Shared trait-first kernel substrate.
//!
//! Every pipeline stage is a small kernel struct built from a config through
//! [`KernelLifecycle::try_new`], and reads its 1D input through [`Read1D`] so callers can hand
//! over slices, vectors or `ndarray` arrays alike.

mod errors;
mod io;
mod lifecycle;

pub use errors::*;
pub use io::*;
pub use lifecycle::*;
