//! Data source types.

pub mod groups;

pub use groups::*;
