//! Pattern matching for NEM addresses.
//!
//! A needle matches anywhere in the address; only the first occurrence is
//! reported.

mod pattern;

pub use pattern::{Needle, NeedleError};
