//! Best effort parallels of the numpy routines the detector leans on.

mod diff;
mod set;
mod unwrap;

pub use diff::*;
pub use set::*;
pub use unwrap::*;
