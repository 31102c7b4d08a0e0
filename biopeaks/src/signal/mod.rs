//! Signal processing building blocks: filter design and application, peak finding, and
//! spectral estimation.

/// Butterworth design and zero-phase SOS filtering.
pub mod filter;

/// Relative extrema, peak finding and topographic prominence.
pub mod peak;

/// Welch PSD and analytic signal.
pub mod spectral;

/// Trait-first capability interfaces implemented by the signal kernels.
pub mod traits;
