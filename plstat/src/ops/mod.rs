//! Operations over sets of landscapes.
//!
//! Every operation returns new landscapes (or vectors) and leaves its inputs untouched.
//! [`average`] requires a common grid, [`snap`] produces one and [`pad_flatten`] snaps before
//! flattening, so arbitrary batches can be vectorised.

pub mod average;
pub mod pad;
pub mod snap;

pub use average::*;
pub use pad::*;
pub use snap::*;
